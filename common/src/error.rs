use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EIP-1193 code for a request the user declined in the wallet.
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// Error object returned by an EIP-1193 `request()` call.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// The user declined the prompt (account access, transaction signing).
    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_REQUEST
    }
}

/// Everything a `WalletSession` operation can fail with.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("MetaMask wallet is required to connect")]
    WalletMissing,

    #[error("the wallet did not authorize any account")]
    NoAccount,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    #[error("invalid recipient address {0:?}")]
    InvalidAddress(String),

    #[error("balance {0} does not fit in a 64-bit integer")]
    BalanceOverflow(U256),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("malformed {method} response: {reason}")]
    Decode { method: &'static str, reason: String },

    #[error("transaction {0} reverted")]
    Reverted(B256),

    #[error("transaction {hash} not confirmed after {polls} receipt polls")]
    Unconfirmed { hash: B256, polls: u32 },
}

impl SessionError {
    pub(crate) fn decode(method: &'static str, reason: impl ToString) -> Self {
        Self::Decode {
            method,
            reason: reason.to_string(),
        }
    }
}
