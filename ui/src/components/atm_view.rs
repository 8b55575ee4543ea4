use dioxus::prelude::*;

use alloy_primitives::utils::format_ether;
use atm_common::activity::ActivityKind;
use atm_common::config::TransferMode;
use atm_common::session::PendingTransfer;
use atm_common::units::format_balance;

use super::session_state::{begin, finish, use_session, use_ui_status};

/// Account, balance and the deposit / withdraw / transfer forms.
#[component]
pub fn AtmView() -> Element {
    let mut session = use_session();
    let status = use_ui_status();

    let mut deposit_amount = use_signal(String::new);
    let mut withdraw_amount = use_signal(String::new);
    let mut transfer = use_signal(PendingTransfer::default);

    let s = session.read();
    let account = s.account().map(|a| a.to_string()).unwrap_or_default();
    let balance = s.balance().map(format_balance);
    let chain_id = s.chain_id();
    let owner = s.owner().map(|a| a.to_string());
    let transfer_mode = s.config().transfer_mode;
    drop(s);
    let busy = status.read().busy;

    let amount_placeholder = match transfer_mode {
        TransferMode::Native => "Enter transfer amount (ETH)",
        TransferMode::Contract => "Enter transfer amount",
    };

    rsx! {
        div { class: "atm-view",
            div { class: "account-row",
                p { class: "account-label", "Your Account:" }
                p { class: "account-address", "{account}" }
            }
            if let Some(id) = chain_id {
                p { class: "network-id", "Network ID: {id}" }
            }

            p { class: "balance-display",
                match &balance {
                    Some(b) => rsx! { "Your Balance: {b}" },
                    None => rsx! { "Your Balance: …" },
                }
            }

            div { class: "atm-forms",
                input {
                    r#type: "number",
                    min: "1",
                    placeholder: "Enter deposit amount",
                    value: "{deposit_amount}",
                    oninput: move |e| deposit_amount.set(e.value()),
                }
                button {
                    class: "deposit-btn",
                    disabled: busy,
                    onclick: move |_| {
                        let amount = deposit_amount.read().clone();
                        spawn(async move {
                            begin(status);
                            let mut s = session.read().clone();
                            let result = s.deposit(&amount).await;
                            session.set(s);
                            if let Some(Some(_)) = finish(status, result) {
                                deposit_amount.set(String::new());
                            }
                        });
                    },
                    "Deposit"
                }
                input {
                    r#type: "number",
                    min: "1",
                    placeholder: "Enter withdrawal amount",
                    value: "{withdraw_amount}",
                    oninput: move |e| withdraw_amount.set(e.value()),
                }
                button {
                    class: "withdraw-btn",
                    disabled: busy,
                    onclick: move |_| {
                        let amount = withdraw_amount.read().clone();
                        spawn(async move {
                            begin(status);
                            let mut s = session.read().clone();
                            let result = s.withdraw(&amount).await;
                            session.set(s);
                            if let Some(Some(_)) = finish(status, result) {
                                withdraw_amount.set(String::new());
                            }
                        });
                    },
                    "Withdraw"
                }
            }

            div { class: "transfer-form",
                input {
                    r#type: "text",
                    placeholder: "Recipient address",
                    value: "{transfer.read().to}",
                    oninput: move |e| transfer.write().to = e.value(),
                }
                input {
                    r#type: "number",
                    placeholder: "{amount_placeholder}",
                    value: "{transfer.read().amount}",
                    oninput: move |e| transfer.write().amount = e.value(),
                }
                button {
                    class: "transfer-btn",
                    disabled: busy,
                    onclick: move |_| {
                        let form = transfer.read().clone();
                        spawn(async move {
                            begin(status);
                            let mut s = session.read().clone();
                            let result = s.submit_transfer(&form).await;
                            session.set(s);
                            if finish(status, result).is_some() {
                                super::session_state::alert("Transfer successful!");
                                transfer.set(PendingTransfer::default());
                            }
                        });
                    },
                    "Transfer Funds"
                }
            }

            div { class: "owner-lookup",
                button {
                    disabled: busy,
                    onclick: move |_| {
                        spawn(async move {
                            begin(status);
                            let mut s = session.read().clone();
                            let result = s.account_owner().await;
                            session.set(s);
                            finish(status, result);
                        });
                    },
                    "Show Account Owner"
                }
                if let Some(owner) = owner {
                    p { class: "owner-address", "Owner: {owner}" }
                }
            }

            ActivityTable {}
        }
    }
}

/// Confirmed transactions from this page view, newest first.
#[component]
fn ActivityTable() -> Element {
    let session = use_session();
    let entries: Vec<_> = session.read().activity().iter().rev().cloned().collect();
    let transfer_mode = session.read().config().transfer_mode;

    if entries.is_empty() {
        return rsx! {};
    }

    rsx! {
        h3 { "Recent Transactions" }
        table { class: "tx-history",
            thead {
                tr {
                    th { "Time" }
                    th { "Action" }
                    th { "Amount" }
                    th { "Transaction" }
                }
            }
            tbody {
                for entry in entries {
                    {
                        let amount = match (entry.kind, transfer_mode) {
                            (ActivityKind::Transfer, TransferMode::Native) => {
                                format!("{} ETH", format_ether(entry.amount))
                            }
                            _ => entry.amount.to_string(),
                        };
                        let action = match entry.recipient {
                            Some(to) => format!("{} to {}", entry.kind.label(), short_hex(&to.to_string())),
                            None => entry.kind.label().to_string(),
                        };
                        rsx! {
                            tr {
                                td { class: "tx-time", "{short_timestamp(&entry.confirmed_at)}" }
                                td { "{action}" }
                                td { "{amount}" }
                                td { class: "tx-hash", "{short_hex(&entry.tx_hash.to_string())}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// "0x1234abcd…" → "0x1234…abcd".
fn short_hex(hex: &str) -> String {
    if hex.len() > 12 {
        format!("{}…{}", &hex[..6], &hex[hex.len() - 4..])
    } else {
        hex.to_string()
    }
}

/// "2026-02-23T10:30:00.000+00:00" → "10:30:00".
fn short_timestamp(ts: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| ts.to_string())
}
