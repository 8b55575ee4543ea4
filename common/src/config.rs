//! Build-time configuration.
//!
//! The contract address is a deployment constant, not something the page lets
//! the user change. Each value can be overridden when the UI is compiled:
//!
//! - `ATM_CONTRACT_ADDRESS`  deployed contract address
//! - `ATM_TRANSFER_MODE`     `native` (default) or `contract`
//! - `ATM_POLL_INTERVAL_MS`  pause between receipt polls (default 1000)
//! - `ATM_MAX_RECEIPT_POLLS` give up after this many polls (default: never)

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::abi::DEFAULT_CONTRACT_ADDRESS;

const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// How "Transfer Funds" moves value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Plain ether transfer from the signer to the recipient, bypassing the contract.
    #[default]
    Native,
    /// The contract's own `transfer(to, amount)` method.
    Contract,
}

impl FromStr for TransferMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "contract" => Ok(Self::Contract),
            other => Err(format!("unknown transfer mode {other:?}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtmConfig {
    pub contract_address: Address,
    pub transfer_mode: TransferMode,
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    /// `None` waits for a receipt indefinitely.
    pub max_receipt_polls: Option<u32>,
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            transfer_mode: TransferMode::Native,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_receipt_polls: None,
        }
    }
}

impl AtmConfig {
    /// Configuration baked in at compile time.
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("ATM_CONTRACT_ADDRESS"),
            option_env!("ATM_TRANSFER_MODE"),
            option_env!("ATM_POLL_INTERVAL_MS"),
            option_env!("ATM_MAX_RECEIPT_POLLS"),
        )
    }

    /// Build from raw override strings. Empty or unparseable values fall back
    /// to the default with a warning.
    pub fn from_values(
        contract_address: Option<&str>,
        transfer_mode: Option<&str>,
        poll_interval_ms: Option<&str>,
        max_receipt_polls: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            contract_address: parse_or(
                "ATM_CONTRACT_ADDRESS",
                contract_address,
                defaults.contract_address,
            ),
            transfer_mode: parse_or("ATM_TRANSFER_MODE", transfer_mode, defaults.transfer_mode),
            poll_interval: Duration::from_millis(parse_or(
                "ATM_POLL_INTERVAL_MS",
                poll_interval_ms,
                DEFAULT_POLL_INTERVAL_MS,
            )),
            max_receipt_polls: non_empty(max_receipt_polls).and_then(|raw| {
                raw.parse()
                    .map_err(|_| tracing::warn!(value = raw, "ignoring ATM_MAX_RECEIPT_POLLS"))
                    .ok()
            }),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_or<T: FromStr>(name: &str, value: Option<&str>, default: T) -> T {
    match non_empty(value) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = raw, "ignoring unparseable override");
            default
        }),
        None => default,
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
