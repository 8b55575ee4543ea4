//! ABI of the deployed `Assessment` ATM contract.
//!
//! Only the surface the front-end touches is declared here; the compiled
//! artifact itself is produced by the contract build.

use alloy_primitives::{address, Address};
use alloy_sol_types::sol;

/// Address the contract is deployed at on the local development chain.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IAssessment {
        event Deposit(uint256 amount);
        event Withdraw(uint256 amount);

        error InsufficientBalance(uint256 balance, uint256 withdrawAmount);

        function getBalance() external view returns (uint256);
        function deposit(uint256 amount) external payable;
        function withdraw(uint256 amount) external;
        function transfer(address to, uint256 amount) external;
        function getAccountOwner() external view returns (address);
    }
}
