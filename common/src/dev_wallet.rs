//! In-memory wallet + chain for local development and tests.
//!
//! Answers the same JSON-RPC methods the browser wallet does and executes the
//! ATM contract's calls against plain Rust state. Transactions are mined
//! instantly unless a confirmation delay is configured, in which case
//! `eth_getTransactionReceipt` returns `null` that many times first.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{hex, keccak256, Address, B256, U256};
use alloy_sol_types::{SolError, SolInterface, SolValue};
use serde_json::{json, Value};

use crate::abi::{IAssessment, DEFAULT_CONTRACT_ADDRESS};
use crate::error::{ProviderError, USER_REJECTED_REQUEST};
use crate::provider::{TransactionRequest, WalletProvider};

/// Chain id of a local Hardhat/Anvil node.
pub const DEV_CHAIN_ID: u64 = 31337;

const EXECUTION_REVERTED: i64 = 3;
const INTERNAL_ERROR: i64 = -32603;
const INVALID_PARAMS: i64 = -32602;
const UNAUTHORIZED: i64 = 4100;
const UNSUPPORTED_METHOD: i64 = 4200;

#[derive(Debug)]
struct MinedTx {
    remaining_polls: u32,
    block_number: u64,
    success: bool,
}

#[derive(Debug)]
struct DevChain {
    accounts: Vec<Address>,
    authorized: bool,
    reject_prompts: bool,
    chain_id: u64,
    contract: Address,
    owner: Address,
    atm_balance: U256,
    native: HashMap<Address, U256>,
    confirmation_delay: u32,
    revert_next: bool,
    block_number: u64,
    nonce: u64,
    receipts: HashMap<B256, MinedTx>,
    requests: Vec<String>,
    pauses: u32,
}

/// Cheaply cloneable handle; clones share one chain.
#[derive(Clone, Debug)]
pub struct DevWallet {
    chain: Arc<Mutex<DevChain>>,
}

impl Default for DevWallet {
    fn default() -> Self {
        Self::new(vec![Address::with_last_byte(1)])
    }
}

impl DevWallet {
    /// A wallet holding `accounts`; the first one owns the ATM contract.
    pub fn new(accounts: Vec<Address>) -> Self {
        let owner = accounts.first().copied().unwrap_or_default();
        Self {
            chain: Arc::new(Mutex::new(DevChain {
                accounts,
                authorized: false,
                reject_prompts: false,
                chain_id: DEV_CHAIN_ID,
                contract: DEFAULT_CONTRACT_ADDRESS,
                owner,
                atm_balance: U256::ZERO,
                native: HashMap::new(),
                confirmation_delay: 0,
                revert_next: false,
                block_number: 1,
                nonce: 0,
                receipts: HashMap::new(),
                requests: Vec::new(),
                pauses: 0,
            })),
        }
    }

    fn with_chain<T>(&self, f: impl FnOnce(&mut DevChain) -> T) -> T {
        let mut guard = match self.chain.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Pretend the user already granted this page access on a previous visit.
    pub fn authorized(self) -> Self {
        self.with_chain(|c| c.authorized = true);
        self
    }

    /// Decline every account / signing prompt with EIP-1193 code 4001.
    pub fn rejecting(self) -> Self {
        self.with_chain(|c| c.reject_prompts = true);
        self
    }

    pub fn with_atm_balance(self, balance: u64) -> Self {
        self.set_atm_balance(U256::from(balance));
        self
    }

    pub fn with_native_balance(self, account: Address, wei: U256) -> Self {
        self.with_chain(|c| c.native.insert(account, wei));
        self
    }

    pub fn with_contract(self, contract: Address) -> Self {
        self.with_chain(|c| c.contract = contract);
        self
    }

    /// Report each new receipt as pending for `polls` lookups.
    pub fn with_confirmation_delay(self, polls: u32) -> Self {
        self.with_chain(|c| c.confirmation_delay = polls);
        self
    }

    /// Mine the next transaction with a failed status.
    pub fn revert_next_transaction(&self) {
        self.with_chain(|c| c.revert_next = true);
    }

    /// Change the ATM balance behind the session's back.
    pub fn set_atm_balance(&self, balance: U256) {
        self.with_chain(|c| c.atm_balance = balance);
    }

    pub fn atm_balance(&self) -> U256 {
        self.with_chain(|c| c.atm_balance)
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.with_chain(|c| c.native.get(&account).copied().unwrap_or_default())
    }

    /// Every method requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.with_chain(|c| c.requests.clone())
    }

    pub fn request_count(&self, method: &str) -> usize {
        self.with_chain(|c| c.requests.iter().filter(|m| *m == method).count())
    }

    pub fn pauses(&self) -> u32 {
        self.with_chain(|c| c.pauses)
    }
}

impl WalletProvider for DevWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.with_chain(|chain| {
            chain.requests.push(method.to_string());
            chain.handle(method, &params)
        })
    }

    async fn pause(&self, _interval: Duration) {
        self.with_chain(|c| c.pauses += 1);
    }

    fn provider_name(&self) -> &str {
        "dev-wallet"
    }
}

fn first_param<T: serde::de::DeserializeOwned>(params: &Value) -> Result<T, ProviderError> {
    let raw = params
        .get(0)
        .cloned()
        .ok_or_else(|| ProviderError::new(INVALID_PARAMS, "missing params[0]"))?;
    serde_json::from_value(raw).map_err(|e| ProviderError::new(INVALID_PARAMS, e.to_string()))
}

fn reverted(message: &str, data: Option<Vec<u8>>) -> ProviderError {
    ProviderError {
        code: EXECUTION_REVERTED,
        message: format!("execution reverted: {message}"),
        data: data.map(|d| Value::String(hex::encode_prefixed(d))),
    }
}

impl DevChain {
    fn handle(&mut self, method: &str, params: &Value) -> Result<Value, ProviderError> {
        match method {
            "eth_accounts" => Ok(self.visible_accounts()),
            "eth_requestAccounts" => {
                if self.reject_prompts {
                    return Err(ProviderError::new(
                        USER_REJECTED_REQUEST,
                        "User rejected the request.",
                    ));
                }
                self.authorized = true;
                Ok(self.visible_accounts())
            }
            "eth_chainId" => Ok(json!(format!("{:#x}", self.chain_id))),
            "eth_call" => {
                let tx: TransactionRequest = first_param(params)?;
                self.call(&tx).map(|out| json!(hex::encode_prefixed(out)))
            }
            "eth_sendTransaction" => {
                let tx: TransactionRequest = first_param(params)?;
                self.send(&tx).map(|hash| json!(hash))
            }
            "eth_getTransactionReceipt" => {
                let hash: B256 = first_param(params)?;
                Ok(self.receipt(hash))
            }
            other => Err(ProviderError::new(
                UNSUPPORTED_METHOD,
                format!("method {other} not supported by the dev wallet"),
            )),
        }
    }

    fn visible_accounts(&self) -> Value {
        if self.authorized {
            json!(self.accounts)
        } else {
            json!([])
        }
    }

    fn decode_call(&self, tx: &TransactionRequest) -> Result<IAssessment::IAssessmentCalls, ProviderError> {
        let data: &[u8] = tx.data.as_ref().map_or(&[][..], |b| &b[..]);
        IAssessment::IAssessmentCalls::abi_decode(data)
            .map_err(|e| reverted(&format!("unknown call: {e}"), None))
    }

    fn call(&self, tx: &TransactionRequest) -> Result<Vec<u8>, ProviderError> {
        if tx.to != Some(self.contract) {
            return Ok(Vec::new());
        }
        match self.decode_call(tx)? {
            IAssessment::IAssessmentCalls::getBalance(_) => Ok(self.atm_balance.abi_encode()),
            IAssessment::IAssessmentCalls::getAccountOwner(_) => Ok(self.owner.abi_encode()),
            _ => Ok(Vec::new()),
        }
    }

    fn send(&mut self, tx: &TransactionRequest) -> Result<B256, ProviderError> {
        if self.reject_prompts {
            return Err(ProviderError::new(
                USER_REJECTED_REQUEST,
                "User denied transaction signature.",
            ));
        }
        if !self.authorized || !self.accounts.contains(&tx.from) {
            return Err(ProviderError::new(
                UNAUTHORIZED,
                "The requested account has not been authorized by the user.",
            ));
        }

        let success = !std::mem::take(&mut self.revert_next);
        if success {
            if tx.to == Some(self.contract) {
                self.execute(tx)?;
            } else {
                self.move_native(tx)?;
            }
        }

        self.nonce += 1;
        self.block_number += 1;
        let hash = keccak256(self.nonce.to_be_bytes());
        self.receipts.insert(
            hash,
            MinedTx {
                remaining_polls: self.confirmation_delay,
                block_number: self.block_number,
                success,
            },
        );
        Ok(hash)
    }

    fn execute(&mut self, tx: &TransactionRequest) -> Result<(), ProviderError> {
        let call = self.decode_call(tx)?;
        let owner_only = matches!(
            call,
            IAssessment::IAssessmentCalls::deposit(_)
                | IAssessment::IAssessmentCalls::withdraw(_)
                | IAssessment::IAssessmentCalls::transfer(_)
        );
        if owner_only && tx.from != self.owner {
            return Err(reverted("You are not the owner of this account", None));
        }
        match call {
            IAssessment::IAssessmentCalls::deposit(c) => {
                self.atm_balance += c.amount;
            }
            IAssessment::IAssessmentCalls::withdraw(c) => {
                self.debit_atm(c.amount)?;
            }
            IAssessment::IAssessmentCalls::transfer(c) => {
                self.debit_atm(c.amount)?;
                let credited = self.native.entry(c.to).or_default();
                *credited += c.amount;
            }
            IAssessment::IAssessmentCalls::getBalance(_)
            | IAssessment::IAssessmentCalls::getAccountOwner(_) => {}
        }
        Ok(())
    }

    fn debit_atm(&mut self, amount: U256) -> Result<(), ProviderError> {
        if self.atm_balance < amount {
            let err = IAssessment::InsufficientBalance {
                balance: self.atm_balance,
                withdrawAmount: amount,
            };
            return Err(reverted("InsufficientBalance", Some(err.abi_encode())));
        }
        self.atm_balance -= amount;
        Ok(())
    }

    fn move_native(&mut self, tx: &TransactionRequest) -> Result<(), ProviderError> {
        let to = tx
            .to
            .ok_or_else(|| ProviderError::new(INVALID_PARAMS, "contract creation not supported"))?;
        let value = tx.value.unwrap_or_default();
        let available = self.native.get(&tx.from).copied().unwrap_or_default();
        if available < value {
            return Err(ProviderError::new(
                INTERNAL_ERROR,
                "insufficient funds for gas * price + value",
            ));
        }
        self.native.insert(tx.from, available - value);
        *self.native.entry(to).or_default() += value;
        Ok(())
    }

    fn receipt(&mut self, hash: B256) -> Value {
        let Some(mined) = self.receipts.get_mut(&hash) else {
            return Value::Null;
        };
        if mined.remaining_polls > 0 {
            mined.remaining_polls -= 1;
            return Value::Null;
        }
        json!({
            "transactionHash": hash,
            "blockNumber": format!("{:#x}", mined.block_number),
            "status": if mined.success { "0x1" } else { "0x0" },
        })
    }
}
