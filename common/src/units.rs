//! Parsing of the amounts typed into the ATM forms.

use alloy_primitives::utils::parse_ether;
use alloy_primitives::U256;

use crate::error::SessionError;

/// Parse a whole-number contract amount (deposit, withdraw, contract transfer).
///
/// The contract works in plain integers; no decimal scaling is applied.
pub fn parse_amount(input: &str) -> Result<U256, SessionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SessionError::InvalidAmount(input.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| SessionError::InvalidAmount(input.to_string()))
}

/// Parse an ether-denominated amount ("0.5") into wei.
pub fn parse_ether_amount(input: &str) -> Result<U256, SessionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return Err(SessionError::InvalidAmount(input.to_string()));
    }
    parse_ether(trimmed).map_err(|_| SessionError::InvalidAmount(input.to_string()))
}

/// Format a balance for display next to the account.
pub fn format_balance(balance: u64) -> String {
    format!("{balance} ETH")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("42").unwrap(), U256::from(42u64));
        assert_eq!(parse_amount(" 7 ").unwrap(), U256::from(7u64));
        assert!(parse_amount("").is_err());
        assert!(parse_amount("1.5").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("0x10").is_err());
        assert!(parse_amount("1_000").is_err());
        assert!(parse_amount("+5").is_err());
        assert!(parse_amount("1 000").is_err());
    }

    #[test]
    fn test_parse_ether_amount() {
        assert_eq!(
            parse_ether_amount("1").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(
            parse_ether_amount("0.25").unwrap(),
            U256::from(250_000_000_000_000_000u128)
        );
        assert!(parse_ether_amount("").is_err());
        assert!(parse_ether_amount("abc").is_err());
        assert!(parse_ether_amount("-1").is_err());
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(0), "0 ETH");
        assert_eq!(format_balance(1500), "1500 ETH");
    }
}
