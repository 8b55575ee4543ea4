//! Typed binding to the deployed ATM contract.

use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolInterface, SolValue};
use serde_json::Value;

use crate::abi::IAssessment;
use crate::error::{ProviderError, SessionError};
use crate::provider::{self, TransactionReceipt, TransactionRequest, WalletProvider};

/// Contract address + ABI + signer. Only built once an account is known.
#[derive(Clone, Debug)]
pub struct AtmContract<P> {
    provider: P,
    address: Address,
    signer: Address,
}

impl<P: WalletProvider> AtmContract<P> {
    pub fn new(provider: P, address: Address, signer: Address) -> Self {
        Self {
            provider,
            address,
            signer,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    fn contract_tx(&self, data: Vec<u8>) -> TransactionRequest {
        TransactionRequest {
            from: self.signer,
            to: Some(self.address),
            value: None,
            data: Some(Bytes::from(data)),
        }
    }

    async fn view(&self, data: Vec<u8>) -> Result<Bytes, SessionError> {
        provider::call(&self.provider, &self.contract_tx(data)).await
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<PendingTx<'_, P>, SessionError> {
        let hash = provider::send_transaction(&self.provider, &tx).await?;
        tracing::info!(%hash, "transaction submitted");
        Ok(PendingTx {
            provider: &self.provider,
            hash,
        })
    }

    pub async fn get_balance(&self) -> Result<U256, SessionError> {
        let raw = self.view(IAssessment::getBalanceCall {}.abi_encode()).await?;
        U256::abi_decode(&raw).map_err(|e| SessionError::decode("getBalance", e))
    }

    pub async fn get_account_owner(&self) -> Result<Address, SessionError> {
        let raw = self.view(IAssessment::getAccountOwnerCall {}.abi_encode()).await?;
        Address::abi_decode(&raw).map_err(|e| SessionError::decode("getAccountOwner", e))
    }

    pub async fn deposit(&self, amount: U256) -> Result<PendingTx<'_, P>, SessionError> {
        let data = IAssessment::depositCall { amount }.abi_encode();
        self.submit(self.contract_tx(data)).await
    }

    pub async fn withdraw(&self, amount: U256) -> Result<PendingTx<'_, P>, SessionError> {
        let data = IAssessment::withdrawCall { amount }.abi_encode();
        self.submit(self.contract_tx(data)).await
    }

    /// Contract-level transfer between ATM balances.
    pub async fn transfer(
        &self,
        to: Address,
        amount: U256,
    ) -> Result<PendingTx<'_, P>, SessionError> {
        let data = IAssessment::transferCall { to, amount }.abi_encode();
        self.submit(self.contract_tx(data)).await
    }

    /// Plain value transfer from the signer, bypassing the contract.
    pub async fn send_value(&self, to: Address, wei: U256) -> Result<PendingTx<'_, P>, SessionError> {
        self.submit(TransactionRequest {
            from: self.signer,
            to: Some(to),
            value: Some(wei),
            data: None,
        })
        .await
    }
}

/// A submitted transaction awaiting its receipt.
pub struct PendingTx<'a, P> {
    provider: &'a P,
    pub hash: B256,
}

impl<P: WalletProvider> PendingTx<'_, P> {
    /// Poll for the receipt until the transaction is mined.
    ///
    /// `max_polls = None` never gives up. A mined-but-reverted transaction is
    /// reported as [`SessionError::Reverted`].
    pub async fn wait(
        self,
        interval: Duration,
        max_polls: Option<u32>,
    ) -> Result<TransactionReceipt, SessionError> {
        let mut polls = 0u32;
        loop {
            if let Some(receipt) = provider::transaction_receipt(self.provider, self.hash).await? {
                if !receipt.succeeded() {
                    tracing::warn!(hash = %self.hash, "transaction reverted");
                    return Err(SessionError::Reverted(self.hash));
                }
                tracing::info!(hash = %self.hash, polls, "transaction confirmed");
                return Ok(receipt);
            }
            polls += 1;
            if max_polls.is_some_and(|max| polls >= max) {
                return Err(SessionError::Unconfirmed {
                    hash: self.hash,
                    polls,
                });
            }
            self.provider.pause(interval).await;
        }
    }
}

/// Decode a contract revert carried in a provider error, if there is one.
///
/// Wallets nest the revert bytes differently: MetaMask reports
/// `{ data: "0x…" }` or `{ data: { data: "0x…" } }`.
pub fn decode_revert(err: &ProviderError) -> Option<IAssessment::IAssessmentErrors> {
    let hex = match err.data.as_ref()? {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("data")?.as_str()?,
        _ => return None,
    };
    let bytes: Bytes = hex.parse().ok()?;
    IAssessment::IAssessmentErrors::abi_decode(&bytes).ok()
}

/// A user-facing sentence for a failed session operation.
pub fn describe_failure(err: &SessionError) -> String {
    if let SessionError::Provider(provider_err) = err {
        if provider_err.is_user_rejection() {
            return "Request rejected in the wallet".to_string();
        }
        if let Some(IAssessment::IAssessmentErrors::InsufficientBalance(e)) =
            decode_revert(provider_err)
        {
            return format!(
                "Insufficient balance: have {}, requested {}",
                e.balance, e.withdrawAmount
            );
        }
    }
    err.to_string()
}
