use dioxus::prelude::*;

use atm_common::config::AtmConfig;
use atm_common::contract::describe_failure;
use atm_common::error::SessionError;
use atm_common::session::WalletSession;

#[cfg(not(feature = "dev-wallet"))]
pub type PageWallet = super::ethereum::BrowserWallet;
#[cfg(feature = "dev-wallet")]
pub type PageWallet = atm_common::dev_wallet::DevWallet;

pub type AtmSession = WalletSession<PageWallet>;

/// The wallet this page talks to, if any.
pub fn page_wallet() -> Option<PageWallet> {
    #[cfg(not(feature = "dev-wallet"))]
    {
        super::ethereum::BrowserWallet::detect()
    }
    #[cfg(feature = "dev-wallet")]
    {
        Some(atm_common::dev_wallet::DevWallet::default().with_atm_balance(100))
    }
}

pub fn new_session() -> AtmSession {
    WalletSession::new(page_wallet(), AtmConfig::from_env())
}

/// UI-only flags around the session.
#[derive(Clone, Debug, Default)]
pub struct UiStatus {
    /// An action is in flight; buttons are disabled until it settles.
    pub busy: bool,
    pub last_error: Option<String>,
}

pub fn use_session() -> Signal<AtmSession> {
    use_context::<Signal<AtmSession>>()
}

pub fn use_ui_status() -> Signal<UiStatus> {
    use_context::<Signal<UiStatus>>()
}

/// Mark an action as started.
pub fn begin(mut status: Signal<UiStatus>) {
    let mut s = status.write();
    s.busy = true;
    s.last_error = None;
}

/// Settle an action: clear the busy flag and alert on failure.
pub fn finish<T>(mut status: Signal<UiStatus>, result: Result<T, SessionError>) -> Option<T> {
    status.write().busy = false;
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            let message = describe_failure(&err);
            tracing::warn!("{message}");
            alert(&message);
            status.write().last_error = Some(message);
            None
        }
    }
}

/// Show a blocking browser alert.
pub fn alert(message: &str) {
    #[cfg(target_family = "wasm")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
    #[cfg(not(target_family = "wasm"))]
    {
        tracing::info!("alert: {message}");
    }
}
