pub mod abi;
pub mod activity;
pub mod config;
pub mod contract;
pub mod error;
pub mod provider;
pub mod session;
pub mod units;

#[cfg(any(test, feature = "dev"))]
pub mod dev_wallet;
