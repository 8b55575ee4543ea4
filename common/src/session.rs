//! The wallet/contract interaction flow behind the ATM page.
//!
//! ```text
//! NoWallet → NoAccount → Unbound → Idle ⇄ Pending
//! ```
//!
//! `Unbound` only exists between storing an account and building the
//! contract binding, which happen back to back. A confirmed deposit, withdraw
//! or transfer drops the cached balance before re-reading it, so the session
//! never reports a balance older than the last confirmation. If the re-read
//! fails the balance stays unknown and the action still counts as confirmed.

use alloy_primitives::{Address, B256, U256};

use crate::activity::{now_rfc3339, ActivityEntry, ActivityKind};
use crate::config::{AtmConfig, TransferMode};
use crate::contract::AtmContract;
use crate::error::SessionError;
use crate::provider::{self, TransactionReceipt, WalletProvider};
use crate::units::{parse_amount, parse_ether_amount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No injected provider on the page.
    NoWallet,
    /// Provider present, no account authorized.
    NoAccount,
    /// Account stored, binding not yet built.
    Unbound,
    /// Ready for the next action.
    Idle,
    /// A transaction was submitted and its receipt is outstanding.
    Pending,
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Deposit(U256),
    Withdraw(U256),
    Transfer { to: Address, value: U256 },
}

/// Recipient + amount exactly as typed into the transfer form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingTransfer {
    pub to: String,
    pub amount: String,
}

/// One page view's worth of wallet state.
#[derive(Clone, Debug)]
pub struct WalletSession<P> {
    config: AtmConfig,
    wallet: Option<P>,
    account: Option<Address>,
    contract: Option<AtmContract<P>>,
    balance: Option<u64>,
    chain_id: Option<u64>,
    owner: Option<Address>,
    pending: Option<B256>,
    activity: Vec<ActivityEntry>,
}

impl<P: WalletProvider + Clone> WalletSession<P> {
    /// `wallet` is the injected provider, if the page found one.
    pub fn new(wallet: Option<P>, config: AtmConfig) -> Self {
        Self {
            config,
            wallet,
            account: None,
            contract: None,
            balance: None,
            chain_id: None,
            owner: None,
            pending: None,
            activity: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        match (&self.wallet, self.account, &self.contract) {
            (None, _, _) => Phase::NoWallet,
            (Some(_), None, _) => Phase::NoAccount,
            (Some(_), Some(_), None) => Phase::Unbound,
            (Some(_), Some(_), Some(_)) if self.pending.is_some() => Phase::Pending,
            (Some(_), Some(_), Some(_)) => Phase::Idle,
        }
    }

    pub fn config(&self) -> &AtmConfig {
        &self.config
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn contract(&self) -> Option<&AtmContract<P>> {
        self.contract.as_ref()
    }

    /// Last balance read from the contract.
    pub fn balance(&self) -> Option<u64> {
        self.balance
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner
    }

    /// Confirmed transactions, oldest first.
    pub fn activity(&self) -> &[ActivityEntry] {
        &self.activity
    }

    /// Pick up an account the wallet has already authorized, without prompting.
    ///
    /// Runs once when the page loads. Silently does nothing without a wallet
    /// or when no account is authorized yet.
    pub async fn detect(&mut self) -> Result<Option<Address>, SessionError> {
        let Some(wallet) = self.wallet.as_ref() else {
            return Ok(None);
        };
        let accounts = provider::accounts(wallet).await?;
        match accounts.first() {
            Some(account) => {
                tracing::info!(%account, "account already authorized");
                self.bind(*account);
                Ok(Some(*account))
            }
            None => {
                tracing::debug!("no authorized account found");
                Ok(None)
            }
        }
    }

    /// Ask the wallet for account access and build the contract binding.
    pub async fn connect(&mut self) -> Result<Address, SessionError> {
        let wallet = self.wallet.as_ref().ok_or(SessionError::WalletMissing)?;
        let accounts = provider::request_accounts(wallet).await?;
        let account = *accounts.first().ok_or(SessionError::NoAccount)?;
        tracing::info!(%account, "account connected");
        self.bind(account);
        Ok(account)
    }

    fn bind(&mut self, account: Address) {
        let Some(wallet) = self.wallet.clone() else {
            return;
        };
        if self.account != Some(account) {
            self.balance = None;
            self.owner = None;
        }
        self.account = Some(account);
        self.contract = Some(AtmContract::new(
            wallet,
            self.config.contract_address,
            account,
        ));
    }

    /// Re-read the balance. `None` when there is no binding yet.
    pub async fn get_balance(&mut self) -> Result<Option<u64>, SessionError> {
        let Some(contract) = self.contract.as_ref() else {
            return Ok(None);
        };
        let raw = contract.get_balance().await?;
        let balance = u64::try_from(raw).map_err(|_| SessionError::BalanceOverflow(raw))?;
        self.balance = Some(balance);
        Ok(Some(balance))
    }

    /// Deposit `amount` contract units. Empty input or no binding is a no-op.
    pub async fn deposit(&mut self, amount: &str) -> Result<Option<TransactionReceipt>, SessionError> {
        if self.contract.is_none() || amount.trim().is_empty() {
            return Ok(None);
        }
        let amount = parse_amount(amount)?;
        self.contract_op(Op::Deposit(amount)).await.map(Some)
    }

    /// Withdraw `amount` contract units. Empty input or no binding is a no-op.
    pub async fn withdraw(&mut self, amount: &str) -> Result<Option<TransactionReceipt>, SessionError> {
        if self.contract.is_none() || amount.trim().is_empty() {
            return Ok(None);
        }
        let amount = parse_amount(amount)?;
        self.contract_op(Op::Withdraw(amount)).await.map(Some)
    }

    /// Send funds to `to`, routed according to [`TransferMode`].
    pub async fn transfer_funds(
        &mut self,
        to: &str,
        amount: &str,
    ) -> Result<TransactionReceipt, SessionError> {
        if self.wallet.is_none() || self.account.is_none() || self.contract.is_none() {
            return Err(SessionError::NotConnected);
        }
        let recipient: Address = to
            .trim()
            .parse()
            .map_err(|_| SessionError::InvalidAddress(to.to_string()))?;
        let value = match self.config.transfer_mode {
            TransferMode::Native => parse_ether_amount(amount)?,
            TransferMode::Contract => parse_amount(amount)?,
        };
        self.contract_op(Op::Transfer {
            to: recipient,
            value,
        })
        .await
    }

    /// Submit from a typed [`PendingTransfer`] form.
    pub async fn submit_transfer(
        &mut self,
        form: &PendingTransfer,
    ) -> Result<TransactionReceipt, SessionError> {
        self.transfer_funds(&form.to, &form.amount).await
    }

    async fn contract_op(&mut self, op: Op) -> Result<TransactionReceipt, SessionError> {
        let contract = self.contract.as_ref().ok_or(SessionError::NotConnected)?;
        let pending = match op {
            Op::Deposit(amount) => contract.deposit(amount).await?,
            Op::Withdraw(amount) => contract.withdraw(amount).await?,
            Op::Transfer { to, value } => match self.config.transfer_mode {
                TransferMode::Native => contract.send_value(to, value).await?,
                TransferMode::Contract => contract.transfer(to, value).await?,
            },
        };
        self.pending = Some(pending.hash);
        let confirmed = pending
            .wait(self.config.poll_interval, self.config.max_receipt_polls)
            .await;
        self.pending = None;
        let receipt = confirmed?;
        self.balance = None;

        let (kind, amount, recipient) = match op {
            Op::Deposit(amount) => (ActivityKind::Deposit, amount, None),
            Op::Withdraw(amount) => (ActivityKind::Withdraw, amount, None),
            Op::Transfer { to, value } => (ActivityKind::Transfer, value, Some(to)),
        };
        self.activity.push(ActivityEntry {
            kind,
            amount,
            recipient,
            tx_hash: receipt.transaction_hash,
            confirmed_at: now_rfc3339(),
        });
        if let Err(e) = self.get_balance().await {
            tracing::warn!(
                tx = %receipt.transaction_hash,
                "balance refresh after confirmation failed: {e}"
            );
        }
        Ok(receipt)
    }

    /// Look up the contract's recorded owner. `None` without a binding.
    pub async fn account_owner(&mut self) -> Result<Option<Address>, SessionError> {
        let Some(contract) = self.contract.as_ref() else {
            return Ok(None);
        };
        let owner = contract.get_account_owner().await?;
        self.owner = Some(owner);
        Ok(Some(owner))
    }

    /// Read the wallet's current chain id. `None` without a wallet.
    pub async fn network_id(&mut self) -> Result<Option<u64>, SessionError> {
        let Some(wallet) = self.wallet.as_ref() else {
            tracing::warn!("ethereum provider not found");
            return Ok(None);
        };
        let id = provider::chain_id(wallet).await?;
        self.chain_id = Some(id);
        Ok(Some(id))
    }
}
