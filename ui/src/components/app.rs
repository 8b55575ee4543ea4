use dioxus::prelude::*;

use atm_common::session::Phase;

use super::atm_view::AtmView;
use super::session_state::{begin, finish, new_session, AtmSession, UiStatus};

#[component]
pub fn App() -> Element {
    let mut session = use_context_provider(|| Signal::new(new_session()));
    let status = use_context_provider(|| Signal::new(UiStatus::default()));

    // Pick up an account the wallet authorized on an earlier visit.
    use_future(move || async move {
        let mut s = session.read().clone();
        match s.detect().await {
            Ok(Some(_)) => load_account_data(&mut s).await,
            Ok(None) => tracing::debug!("no account connected yet"),
            Err(e) => tracing::warn!("account detection failed: {e}"),
        }
        session.set(s);
    });

    rsx! {
        main { class: "atm-app",
            header {
                h1 { "Welcome to the Metacrafters ATM!" }
            }
            HomePage {}
            if let Some(err) = status.read().last_error.clone() {
                p { class: "last-error", "{err}" }
            }
        }
    }
}

/// Initial reads once an account is known. Failures are logged, not alerted.
pub async fn load_account_data(session: &mut AtmSession) {
    if let Err(e) = session.get_balance().await {
        tracing::warn!("balance read failed: {e}");
    }
    if let Err(e) = session.network_id().await {
        tracing::warn!("chain id read failed: {e}");
    }
}

#[component]
fn HomePage() -> Element {
    let session = use_context::<Signal<AtmSession>>();
    let phase = session.read().phase();

    match phase {
        Phase::NoWallet => rsx! {
            p { class: "install-wallet", "Please install Metamask in order to use this ATM." }
        },
        Phase::NoAccount | Phase::Unbound => rsx! { ConnectButton {} },
        Phase::Idle | Phase::Pending => rsx! { AtmView {} },
    }
}

#[component]
fn ConnectButton() -> Element {
    let mut session = use_context::<Signal<AtmSession>>();
    let status = use_context::<Signal<UiStatus>>();
    let busy = status.read().busy;

    rsx! {
        button {
            class: "connect-btn",
            disabled: busy,
            onclick: move |_| {
                spawn(async move {
                    begin(status);
                    let mut s = session.read().clone();
                    let result = s.connect().await;
                    if result.is_ok() {
                        load_account_data(&mut s).await;
                    }
                    session.set(s);
                    finish(status, result);
                });
            },
            "Please connect your Metamask wallet"
        }
    }
}
