use atm_common::config::AtmConfig;
use atm_common::dev_wallet::DevWallet;
use atm_common::session::{Phase, WalletSession};

/// A session wired to a dev wallet, with the wallet handle kept for assertions.
pub struct TestAtm {
    pub wallet: DevWallet,
    pub session: WalletSession<DevWallet>,
}

impl TestAtm {
    pub fn new(wallet: DevWallet, config: AtmConfig) -> Self {
        let session = WalletSession::new(Some(wallet.clone()), config);
        Self { wallet, session }
    }

    /// Connect through the account prompt and read the initial balance, the
    /// way the page does right after the user clicks "connect".
    pub async fn connected(wallet: DevWallet, config: AtmConfig) -> Self {
        let mut atm = Self::new(wallet, config);
        let account = atm
            .session
            .connect()
            .await
            .expect("dev wallet grants account access");
        let balance = atm
            .session
            .get_balance()
            .await
            .expect("initial balance read");
        assert_eq!(atm.session.phase(), Phase::Idle);
        tracing::info!(%account, ?balance, "test ATM connected");
        atm
    }

    /// Balance the contract holds right now, independent of the session.
    pub fn chain_balance(&self) -> u64 {
        self.wallet.atm_balance().to::<u64>()
    }
}
