pub mod app;
pub mod atm_view;
pub mod ethereum;
pub mod session_state;
