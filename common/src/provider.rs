//! Abstraction over the injected wallet provider (EIP-1193).
//!
//! The browser build bridges `window.ethereum` into [`WalletProvider`]; tests
//! and local development use the in-memory [`crate::dev_wallet::DevWallet`].
//! The typed helpers below cover the handful of JSON-RPC methods the ATM
//! page needs.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ProviderError, SessionError};

/// An EIP-1193 provider: one `request({ method, params })` entry point.
///
/// Futures are not required to be `Send`; browser promises never are.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    /// Forward a JSON-RPC request to the wallet.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Yield to the host between receipt polls.
    async fn pause(&self, interval: Duration);

    /// Human-readable provider name (e.g. "metamask", "dev-wallet").
    fn provider_name(&self) -> &str;
}

/// Parameters of `eth_call` / `eth_sendTransaction`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

/// The subset of an `eth_getTransactionReceipt` result the session reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default)]
    pub block_number: Option<U64>,
    /// `0x1` on success, `0x0` when the transaction reverted.
    #[serde(default)]
    pub status: Option<U64>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)).unwrap_or(true)
    }
}

async fn typed_request<P, T>(
    provider: &P,
    method: &'static str,
    params: Value,
) -> Result<T, SessionError>
where
    P: WalletProvider,
    T: DeserializeOwned,
{
    tracing::debug!(provider = provider.provider_name(), method, "wallet request");
    let raw = provider.request(method, params).await?;
    serde_json::from_value(raw).map_err(|e| SessionError::decode(method, e))
}

/// Accounts already authorized for this page, without prompting.
pub async fn accounts<P: WalletProvider>(provider: &P) -> Result<Vec<Address>, SessionError> {
    typed_request(provider, "eth_accounts", json!([])).await
}

/// Prompt the user to authorize an account.
pub async fn request_accounts<P: WalletProvider>(
    provider: &P,
) -> Result<Vec<Address>, SessionError> {
    typed_request(provider, "eth_requestAccounts", json!([])).await
}

pub async fn chain_id<P: WalletProvider>(provider: &P) -> Result<u64, SessionError> {
    let id: U64 = typed_request(provider, "eth_chainId", json!([])).await?;
    Ok(id.to::<u64>())
}

/// Read-only call against the latest block.
pub async fn call<P: WalletProvider>(
    provider: &P,
    tx: &TransactionRequest,
) -> Result<Bytes, SessionError> {
    typed_request(provider, "eth_call", json!([tx, "latest"])).await
}

/// Ask the wallet to sign and broadcast a transaction. Returns its hash.
pub async fn send_transaction<P: WalletProvider>(
    provider: &P,
    tx: &TransactionRequest,
) -> Result<B256, SessionError> {
    typed_request(provider, "eth_sendTransaction", json!([tx])).await
}

/// `None` while the transaction is still pending.
pub async fn transaction_receipt<P: WalletProvider>(
    provider: &P,
    hash: B256,
) -> Result<Option<TransactionReceipt>, SessionError> {
    typed_request(provider, "eth_getTransactionReceipt", json!([hash])).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_request_wire_format() {
        let tx = TransactionRequest {
            from: Address::repeat_byte(0xaa),
            to: Some(Address::repeat_byte(0xbb)),
            value: Some(U256::from(16u64)),
            data: None,
        };
        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["value"], "0x10");
        assert!(v.get("data").is_none());
        assert_eq!(
            v["to"].as_str().unwrap().to_lowercase(),
            format!("0x{}", "bb".repeat(20))
        );
    }

    #[test]
    fn test_receipt_parses_wallet_payload() {
        let raw = json!({
            "transactionHash": format!("0x{}", "12".repeat(32)),
            "blockNumber": "0x5",
            "status": "0x0",
            "gasUsed": "0x5208",
            "logs": []
        });
        let receipt: TransactionReceipt = serde_json::from_value(raw).unwrap();
        assert_eq!(receipt.block_number, Some(U64::from(5)));
        assert!(!receipt.succeeded());
    }

    #[test]
    fn test_receipt_without_status_counts_as_success() {
        let raw = json!({ "transactionHash": format!("0x{}", "00".repeat(32)) });
        let receipt: TransactionReceipt = serde_json::from_value(raw).unwrap();
        assert!(receipt.succeeded());
    }
}
