//! End-to-end session flows against the in-memory dev wallet.

use alloy_primitives::U256;

use atm_common::activity::ActivityKind;
use atm_common::config::TransferMode;
use atm_common::contract::describe_failure;
use atm_common::dev_wallet::DevWallet;
use atm_common::error::SessionError;
use atm_common::session::{PendingTransfer, Phase, WalletSession};

use atm_integration::harness::TestAtm;
use atm_integration::{account, address_input, funded_wallet, init_tracing, test_config, ONE_ETHER};

#[tokio::test]
async fn page_load_then_connect() {
    init_tracing();
    let wallet = funded_wallet(10, 1);
    let mut session = WalletSession::new(Some(wallet.clone()), test_config(TransferMode::Native));

    // First visit: nothing authorized yet, no prompt on load.
    assert_eq!(session.detect().await.unwrap(), None);
    assert_eq!(session.phase(), Phase::NoAccount);
    assert_eq!(wallet.request_count("eth_requestAccounts"), 0);

    let connected = session.connect().await.unwrap();
    assert_eq!(connected, account(1));
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.get_balance().await.unwrap(), Some(10));

    // A later page view picks the account up without prompting.
    let mut reload = WalletSession::new(Some(wallet.clone()), test_config(TransferMode::Native));
    assert_eq!(reload.detect().await.unwrap(), Some(account(1)));
    assert_eq!(reload.phase(), Phase::Idle);
    assert_eq!(wallet.request_count("eth_requestAccounts"), 1);
}

#[tokio::test]
async fn rejected_prompt_never_binds_contract() {
    init_tracing();
    let wallet = DevWallet::default().rejecting();
    let mut session = WalletSession::new(Some(wallet), test_config(TransferMode::Native));

    let err = session.connect().await.unwrap_err();
    assert_eq!(describe_failure(&err), "Request rejected in the wallet");
    assert_eq!(session.account(), None);
    assert!(session.contract().is_none());
    assert_eq!(session.phase(), Phase::NoAccount);
}

#[tokio::test]
async fn no_wallet_reports_missing_wallet() {
    let mut session: WalletSession<DevWallet> =
        WalletSession::new(None, test_config(TransferMode::Native));
    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::WalletMissing));
    assert_eq!(err.to_string(), "MetaMask wallet is required to connect");
    assert!(session.deposit("1").await.unwrap().is_none());
    assert!(matches!(
        session.transfer_funds(&address_input(account(2)), "1").await,
        Err(SessionError::NotConnected)
    ));
}

#[tokio::test]
async fn balance_tracks_latest_confirmation() {
    init_tracing();
    let mut atm = TestAtm::connected(funded_wallet(100, 0), test_config(TransferMode::Native)).await;
    assert_eq!(atm.session.balance(), Some(100));

    atm.session.deposit("25").await.unwrap().unwrap();
    assert_eq!(atm.session.balance(), Some(125));

    // Something else moves the balance between our calls; the next
    // confirmation must pick that up rather than adding to a stale value.
    atm.wallet.set_atm_balance(U256::from(1_000u64));
    atm.session.withdraw("50").await.unwrap().unwrap();
    assert_eq!(atm.session.balance(), Some(950));
    assert_eq!(atm.session.balance(), Some(atm.chain_balance()));

    let kinds: Vec<_> = atm.session.activity().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ActivityKind::Deposit, ActivityKind::Withdraw]);
    assert!(atm
        .session
        .activity()
        .iter()
        .all(|e| !e.confirmed_at.is_empty()));
}

#[tokio::test]
async fn withdraw_beyond_balance_surfaces_revert() {
    init_tracing();
    let mut atm = TestAtm::connected(funded_wallet(5, 0), test_config(TransferMode::Native)).await;

    let err = atm.session.withdraw("9").await.unwrap_err();
    assert_eq!(
        describe_failure(&err),
        "Insufficient balance: have 5, requested 9"
    );
    assert_eq!(atm.session.phase(), Phase::Idle);
    assert_eq!(atm.session.balance(), Some(5));
    assert!(atm.session.activity().is_empty());
}

#[tokio::test]
async fn reverted_receipt_returns_to_idle() {
    init_tracing();
    let mut atm = TestAtm::connected(funded_wallet(5, 0), test_config(TransferMode::Native)).await;
    atm.wallet.revert_next_transaction();

    let err = atm.session.deposit("3").await.unwrap_err();
    assert!(matches!(err, SessionError::Reverted(_)));
    assert_eq!(atm.session.phase(), Phase::Idle);
    assert_eq!(atm.chain_balance(), 5);
    assert!(atm.session.activity().is_empty());

    // The next attempt goes through normally.
    atm.session.deposit("3").await.unwrap().unwrap();
    assert_eq!(atm.session.balance(), Some(8));
}

#[tokio::test]
async fn slow_confirmation_is_polled_until_mined() {
    init_tracing();
    let wallet = funded_wallet(0, 0).with_confirmation_delay(4);
    let mut atm = TestAtm::connected(wallet, test_config(TransferMode::Native)).await;

    atm.session.deposit("7").await.unwrap().unwrap();
    assert_eq!(atm.session.balance(), Some(7));
    assert_eq!(atm.wallet.pauses(), 4);
    assert_eq!(atm.wallet.request_count("eth_getTransactionReceipt"), 5);
}

#[tokio::test]
async fn receipt_poll_limit_is_honored() {
    init_tracing();
    let wallet = funded_wallet(0, 0).with_confirmation_delay(10);
    let mut config = test_config(TransferMode::Native);
    config.max_receipt_polls = Some(2);
    let mut atm = TestAtm::connected(wallet, config).await;

    let err = atm.session.deposit("1").await.unwrap_err();
    assert!(matches!(err, SessionError::Unconfirmed { polls: 2, .. }));
    assert_eq!(atm.session.phase(), Phase::Idle);
}

#[tokio::test]
async fn native_transfer_sends_ether_around_the_contract() {
    init_tracing();
    let mut atm = TestAtm::connected(funded_wallet(40, 2), test_config(TransferMode::Native)).await;
    let form = PendingTransfer {
        to: address_input(account(7)),
        amount: "0.5".to_string(),
    };

    atm.session.submit_transfer(&form).await.unwrap();

    assert_eq!(
        atm.wallet.native_balance(account(7)),
        U256::from(ONE_ETHER / 2)
    );
    assert_eq!(
        atm.wallet.native_balance(account(1)),
        U256::from(ONE_ETHER * 3 / 2)
    );
    // The ATM balance is untouched but still re-read after confirmation.
    assert_eq!(atm.session.balance(), Some(40));
    assert_eq!(atm.wallet.request_count("eth_call"), 2);

    let entry = atm.session.activity().last().unwrap();
    assert_eq!(entry.kind, ActivityKind::Transfer);
    assert_eq!(entry.recipient, Some(account(7)));
}

#[tokio::test]
async fn contract_transfer_calls_the_contract() {
    init_tracing();
    let mut atm = TestAtm::connected(funded_wallet(40, 0), test_config(TransferMode::Contract)).await;

    atm.session
        .transfer_funds(&address_input(account(2)), "15")
        .await
        .unwrap();

    assert_eq!(atm.session.balance(), Some(25));
    assert_eq!(atm.chain_balance(), 25);
    assert_eq!(atm.wallet.native_balance(account(2)), U256::from(15u64));
}

#[tokio::test]
async fn transfer_validates_inputs_before_submitting() {
    let mut atm = TestAtm::connected(funded_wallet(40, 1), test_config(TransferMode::Native)).await;

    assert!(matches!(
        atm.session.transfer_funds("", "1").await,
        Err(SessionError::InvalidAddress(_))
    ));
    assert!(matches!(
        atm.session.transfer_funds("0x1234", "1").await,
        Err(SessionError::InvalidAddress(_))
    ));
    assert!(matches!(
        atm.session
            .transfer_funds(&address_input(account(3)), "")
            .await,
        Err(SessionError::InvalidAmount(_))
    ));
    assert_eq!(atm.wallet.request_count("eth_sendTransaction"), 0);
}

#[tokio::test]
async fn wrong_contract_address_fails_balance_decode() {
    let wallet = funded_wallet(1, 0).with_contract(account(99));
    let mut atm = TestAtm::new(wallet, test_config(TransferMode::Native));
    atm.session.connect().await.unwrap();

    let err = atm.session.get_balance().await.unwrap_err();
    assert!(matches!(err, SessionError::Decode { method: "getBalance", .. }));
    assert_eq!(atm.session.balance(), None);
}
