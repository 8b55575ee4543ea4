use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A confirmed transaction issued from this page view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    /// Contract units for deposit/withdraw/contract transfers, wei for native transfers.
    pub amount: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Address>,
    pub tx_hash: B256,
    /// RFC 3339 timestamp of when the confirmation was observed.
    pub confirmed_at: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Deposit,
    Withdraw,
    Transfer,
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Deposit => "Deposit",
            ActivityKind::Withdraw => "Withdraw",
            ActivityKind::Transfer => "Transfer",
        }
    }
}

#[cfg(feature = "std")]
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(not(feature = "std"))]
pub(crate) fn now_rfc3339() -> String {
    String::new()
}
