use alloy_primitives::{Address, U256};

use atm_common::config::{AtmConfig, TransferMode};
use atm_common::dev_wallet::DevWallet;

pub mod harness;

/// One ether in wei.
pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

/// Deterministic account address for participant `n` (1-based).
pub fn account(n: u8) -> Address {
    Address::with_last_byte(n)
}

/// Checksummed string form, as a user would paste it from their wallet.
pub fn address_input(address: Address) -> String {
    address.to_string()
}

/// Config with fast polling and the given transfer routing.
pub fn test_config(mode: TransferMode) -> AtmConfig {
    AtmConfig {
        transfer_mode: mode,
        poll_interval: std::time::Duration::from_millis(1),
        ..AtmConfig::default()
    }
}

/// A dev wallet where account 1 owns the ATM and holds `ether` ETH natively.
pub fn funded_wallet(atm_balance: u64, ether: u128) -> DevWallet {
    DevWallet::new(vec![account(1), account(2)])
        .with_atm_balance(atm_balance)
        .with_native_balance(account(1), U256::from(ether * ONE_ETHER))
}

pub fn init_tracing() {
    tracing_subscriber::fmt::try_init().ok();
}
