use std::str::FromStr;

use cashlet_core::{
    primitives::{CurrencyUnit, MintInfoResponse},
    proof::Proofs,
    token::TokenV3,
};
use lightning_invoice::Bolt11Invoice as LNInvoice;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::PollConfig,
    connector::{MeltResult, MintConnector, MintQuote},
    error::WalletError,
    localstore::LocalStore,
    poll::PollHandle,
    proofstore::ProofStore,
    session::MintSession,
};

/// Quote and issued proofs of a completed deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintDeposit {
    pub quote: MintQuote,
    pub proofs: Proofs,
}

pub struct Wallet<L: LocalStore, M: MintConnector> {
    connector: M,
    store: ProofStore<L>,
    session: RwLock<Option<MintSession>>,
    unit: CurrencyUnit,
    poll_config: PollConfig,
    // selection and redemption of spent proofs span several awaits
    spend_lock: Mutex<()>,
}

pub struct WalletBuilder<L: LocalStore, M: MintConnector> {
    localstore: Option<L>,
    connector: Option<M>,
    unit: CurrencyUnit,
    poll_config: PollConfig,
}

impl<L: LocalStore, M: MintConnector> WalletBuilder<L, M> {
    fn new() -> Self {
        Self {
            localstore: None,
            connector: None,
            unit: CurrencyUnit::default(),
            poll_config: PollConfig::default(),
        }
    }

    pub fn with_localstore(mut self, localstore: L) -> Self {
        self.localstore = Some(localstore);
        self
    }

    pub fn with_connector(mut self, connector: M) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_unit(mut self, unit: CurrencyUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    /// Restores the persisted session and proofs. The mint is not contacted.
    pub async fn build(self) -> Result<Wallet<L, M>, WalletError> {
        let localstore = self
            .localstore
            .ok_or(WalletError::MissingBuilderField("localstore"))?;
        let connector = self
            .connector
            .ok_or(WalletError::MissingBuilderField("connector"))?;

        let session = match MintSession::restore(&localstore).await? {
            Some(session) if session.keyset.unit != self.unit => {
                warn!(
                    "stored session of {} uses unit {}, connect again for {}",
                    session.mint_url, session.keyset.unit, self.unit
                );
                None
            }
            session => session,
        };
        let store = ProofStore::load(localstore).await?;

        Ok(Wallet {
            connector,
            store,
            session: RwLock::new(session),
            unit: self.unit,
            poll_config: self.poll_config,
            spend_lock: Mutex::new(()),
        })
    }
}

impl<L: LocalStore, M: MintConnector> Default for WalletBuilder<L, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: LocalStore, M: MintConnector> Wallet<L, M> {
    pub fn builder() -> WalletBuilder<L, M> {
        WalletBuilder::default()
    }

    /// Connects to the mint at `mint_url`. The current session is only replaced on success.
    pub async fn connect_mint(&self, mint_url: Url) -> Result<MintInfoResponse, WalletError> {
        let (session, info) =
            MintSession::connect(&self.connector, self.store.localstore(), mint_url, &self.unit)
                .await?;
        *self.session.write().await = Some(session);
        Ok(info)
    }

    pub async fn get_mint_quote(&self, amount: u64) -> Result<MintQuote, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount);
        }
        let session = self.current_session().await?;
        let quote = self.connector.get_mint_quote(&session, amount).await?;
        debug!("created mint quote {} for {amount}", quote.quote);
        Ok(quote)
    }

    /// Polls the mint until the invoice of `quote` is paid and stores the issued proofs.
    ///
    /// Ends with `PollCancelled` once `poll` is cancelled and with `PollLimitReached` after the
    /// configured number of attempts.
    pub async fn mint_tokens(
        &self,
        quote: &MintQuote,
        poll: &PollHandle,
    ) -> Result<Proofs, WalletError> {
        let session = self.current_session().await?;
        let mut attempts = 0;

        loop {
            if poll.is_cancelled() {
                return Err(WalletError::PollCancelled);
            }

            attempts += 1;
            match self
                .connector
                .issue(&session, quote.amount, &quote.quote)
                .await
            {
                Ok(proofs) => {
                    self.store.add_proofs(&proofs).await?;
                    info!(
                        "minted {} {} for quote {}",
                        proofs.total_amount(),
                        self.unit,
                        quote.quote
                    );
                    return Ok(proofs);
                }
                Err(WalletError::QuoteNotPaid(_)) => {
                    debug!("quote {} not paid yet, attempt {attempts}", quote.quote);
                }
                Err(err) => return Err(err),
            }

            if self.poll_config.attempts_exhausted(attempts) {
                return Err(WalletError::PollLimitReached(attempts));
            }

            tokio::select! {
                _ = poll.cancelled() => return Err(WalletError::PollCancelled),
                _ = tokio::time::sleep(self.poll_config.interval) => {}
            }
        }
    }

    pub async fn mint_deposit(
        &self,
        amount: u64,
        poll: &PollHandle,
    ) -> Result<MintDeposit, WalletError> {
        let quote = self.get_mint_quote(amount).await?;
        let proofs = self.mint_tokens(&quote, poll).await?;
        Ok(MintDeposit { quote, proofs })
    }

    /// Pays a bolt11 invoice with proofs of the session keyset.
    ///
    /// The selected proofs are only removed, and the change only added, if the mint reports the
    /// invoice as paid or has otherwise accepted the inputs.
    pub async fn melt(&self, invoice: &str) -> Result<MeltResult, WalletError> {
        let session = self.current_session().await?;
        let invoice = invoice.trim();
        Self::decode_invoice(invoice)?;

        let _guard = self.spend_lock.lock().await;
        let quote = self.connector.get_melt_quote(&session, invoice).await?;
        let required = quote.required_amount()?;

        let selected = self
            .store
            .get_proofs_by_amount(required, Some(session.keyset_id()))
            .await;
        if selected.is_empty() {
            return Err(WalletError::InsufficientBalance {
                required,
                available: self.store.balance().await,
            });
        }

        let result = match self.connector.redeem(&session, &quote, &selected).await {
            Ok(result) => result,
            Err(err) => return Err(self.drop_spent_inputs(&selected, err).await),
        };

        if !result.paid {
            warn!("melt quote {} was not paid", quote.quote);
            return Err(WalletError::RedemptionFailed(format!(
                "invoice of quote {} was not paid",
                quote.quote
            )));
        }

        self.store.replace_proofs(&selected, &result.change).await?;
        info!(
            "paid invoice of {} with {} fee reserve, received {} change",
            quote.amount,
            quote.fee_reserve,
            result.change.total_amount()
        );
        Ok(result)
    }

    /// Swaps proofs for a token worth exactly `amount`. The sent proofs are never stored.
    pub async fn swap_send(&self, amount: u64) -> Result<String, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount);
        }
        let session = self.current_session().await?;

        let _guard = self.spend_lock.lock().await;
        let selected = self.store.get_proofs_by_amount(amount, None).await;
        if selected.is_empty() {
            return Err(WalletError::InsufficientBalance {
                required: amount,
                available: self.store.balance().await,
            });
        }

        let result = match self.connector.split(&session, amount, &selected).await {
            Ok(result) => result,
            Err(err) => return Err(self.drop_spent_inputs(&selected, err).await),
        };

        self.store
            .replace_proofs(&selected, &result.return_change)
            .await?;

        let token =
            TokenV3::from((session.mint_url.clone(), result.send)).with_unit(self.unit.clone());
        info!("created token of {amount} {}", self.unit);
        Ok(token.serialize()?)
    }

    /// Redeems a received token and stores the new proofs.
    ///
    /// Fails with `PartialFailure` if only some of the proofs could be redeemed, the redeemed
    /// proofs are stored anyway.
    pub async fn swap_claim(&self, token: &str) -> Result<Proofs, WalletError> {
        let token = TokenV3::deserialize(token)
            .map_err(|err| WalletError::DecodeError(err.to_string()))?;
        if token.proofs().is_empty() {
            return Err(WalletError::DecodeError("token contains no proofs".to_owned()));
        }
        if token.checked_total_amount().is_none() {
            return Err(WalletError::DecodeError("token amount overflows".to_owned()));
        }
        let session = self.current_session().await?;

        let result = self
            .connector
            .receive(&session, &token)
            .await
            .map_err(WalletError::into_redemption_error)?;

        if result.redeemed.is_empty() {
            return Err(WalletError::RedemptionFailed(format!(
                "none of the {} proofs could be redeemed",
                result.failed.len()
            )));
        }

        self.store.add_proofs(&result.redeemed).await?;
        info!("received {} {}", result.redeemed.total_amount(), self.unit);

        if !result.failed.is_empty() {
            warn!(
                "dropped {} proofs worth {} that could not be redeemed",
                result.failed.len(),
                result.failed.total_amount()
            );
            return Err(WalletError::PartialFailure {
                redeemed: result.redeemed,
                failed: result.failed,
            });
        }
        Ok(result.redeemed)
    }

    pub async fn balance(&self) -> u64 {
        self.store.balance().await
    }

    pub async fn proofs(&self) -> Proofs {
        self.store.proofs().await
    }

    pub async fn session(&self) -> Option<MintSession> {
        self.session.read().await.clone()
    }

    pub async fn mint_url(&self) -> Option<Url> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.mint_url.clone())
    }

    pub const fn unit(&self) -> &CurrencyUnit {
        &self.unit
    }

    async fn current_session(&self) -> Result<MintSession, WalletError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or(WalletError::NoMintSession)
    }

    /// Removes `inputs` from the store if the mint already accepted them, and maps mint errors
    /// to `RedemptionFailed`.
    async fn drop_spent_inputs(&self, inputs: &Proofs, err: WalletError) -> WalletError {
        if let WalletError::InputsSpent(reason) = &err {
            warn!(
                "mint accepted {} sats of inputs without usable outputs: {reason}",
                inputs.total_amount()
            );
            if let Err(store_err) = self.store.remove_proofs(inputs).await {
                return store_err;
            }
        }
        err.into_redemption_error()
    }

    fn decode_invoice(payment_request: &str) -> Result<LNInvoice, WalletError> {
        LNInvoice::from_str(payment_request)
            .map_err(|err| WalletError::DecodeInvoice(payment_request.to_owned(), err))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicU32, Ordering},
            Arc,
        },
        time::Duration,
    };

    use cashlet_core::{
        blind::BlindedSignature,
        fixture::{fixture_keyset, fixture_proof, fixture_proof_with_keyset},
        primitives::{
            CurrencyUnit, MintInfoResponse, PostMeltBolt11Response, PostMeltQuoteBolt11Response,
            PostSwapResponse,
        },
        proof::Proofs,
        token::{Token, TokenV3},
    };
    use url::Url;

    use super::{Wallet, WalletBuilder};
    use crate::{
        client::MockCashuClient,
        config::PollConfig,
        connector::{
            http::HttpMintConnector, MeltQuote, MeltResult, MintConnector, MintQuote,
            MockMintConnector, ReceiveResult, SplitResult,
        },
        error::WalletError,
        localstore::{memory::MemoryLocalStore, LocalStore},
        poll::PollHandle,
        session::MintSession,
    };

    const INVOICE: &str = "lnbcrt210n1pjg6mqhpp5pza5wzh0csjjuvfpjpv4zdjmg30vedj9ycv5tyfes9x7dp8axy0sdqqcqzzsxqyz5vqsp5vtxg4c5tw2s2zxxya2a7an0psn9mcfmlqctxzntm3sngnpyk3muq9qyyssqf8z5f90yu3wrmsufnnza25qjlnvc6ukdr094ckzn63ktcy6z5fw5mxf9skndpg2p4648gfjfvvx4qg2lqvlryyycg5k7x9h4dw70t4qq37pegm";

    fn mint_session() -> MintSession {
        let (_, keyset) = fixture_keyset("mint");
        MintSession {
            mint_url: Url::parse("http://localhost:3338").expect("invalid url"),
            keyset,
        }
    }

    fn proof(amount: u64, secret: &str) -> cashlet_core::proof::Proof {
        fixture_proof_with_keyset(amount, secret, &mint_session().keyset.id)
    }

    fn mint_quote(amount: u64) -> MintQuote {
        MintQuote {
            quote: "mint-quote".to_owned(),
            amount,
            payment_request: "lnbcrt100n1...".to_owned(),
            paid: false,
            expiry: None,
        }
    }

    async fn wallet_with<M: MintConnector>(
        connector: M,
        proofs: Proofs,
    ) -> anyhow::Result<(MemoryLocalStore, Wallet<MemoryLocalStore, M>)> {
        let localstore = MemoryLocalStore::default();
        localstore.save_mint_session(&mint_session()).await?;
        localstore.save_proofs(&proofs).await?;

        let wallet = Wallet::builder()
            .with_localstore(localstore.clone())
            .with_connector(connector)
            .with_poll_config(PollConfig::new(Duration::from_millis(1), None))
            .build()
            .await?;
        Ok((localstore, wallet))
    }

    #[tokio::test]
    async fn test_build_requires_connector() -> anyhow::Result<()> {
        let result = WalletBuilder::<MemoryLocalStore, MockMintConnector>::default()
            .with_localstore(MemoryLocalStore::default())
            .build()
            .await;
        assert!(matches!(
            result,
            Err(WalletError::MissingBuilderField("connector"))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_build_restores_state() -> anyhow::Result<()> {
        let proofs = Proofs::new(vec![proof(4, "a"), proof(2, "b")]);
        let (_, wallet) = wallet_with(MockMintConnector::default(), proofs.clone()).await?;

        assert_eq!(6, wallet.balance().await);
        assert_eq!(proofs, wallet.proofs().await);
        assert_eq!(Some(mint_session()), wallet.session().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_build_ignores_session_of_other_unit() -> anyhow::Result<()> {
        let localstore = MemoryLocalStore::default();
        localstore.save_mint_session(&mint_session()).await?;

        let wallet = Wallet::builder()
            .with_localstore(localstore)
            .with_connector(MockMintConnector::default())
            .with_unit(CurrencyUnit::Usd)
            .build()
            .await?;
        assert!(wallet.session().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_connect_mint() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_get_info()
            .returning(|_| Ok(MintInfoResponse::default()));
        connector
            .expect_get_keys()
            .returning(|_| Ok(vec![mint_session().keyset]));

        let localstore = MemoryLocalStore::default();
        let wallet = Wallet::builder()
            .with_localstore(localstore.clone())
            .with_connector(connector)
            .build()
            .await?;
        assert!(wallet.mint_url().await.is_none());

        let url = Url::parse("http://localhost:3338")?;
        wallet.connect_mint(url.clone()).await?;
        assert_eq!(Some(url), wallet.mint_url().await);
        assert_eq!(Some(mint_session()), localstore.load_mint_session().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_flows_require_session() -> anyhow::Result<()> {
        let wallet = Wallet::builder()
            .with_localstore(MemoryLocalStore::default())
            .with_connector(MockMintConnector::default())
            .build()
            .await?;

        assert!(matches!(
            wallet.get_mint_quote(10).await,
            Err(WalletError::NoMintSession)
        ));
        assert!(matches!(
            wallet.swap_send(10).await,
            Err(WalletError::NoMintSession)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_mint_deposit_polls_until_paid() -> anyhow::Result<()> {
        let calls = Arc::new(AtomicU32::new(0));
        let issue_calls = calls.clone();

        let mut connector = MockMintConnector::default();
        connector
            .expect_get_mint_quote()
            .returning(|_, amount| Ok(mint_quote(amount)));
        connector
            .expect_issue()
            .times(4)
            .returning(move |_, amount, _| {
                if issue_calls.fetch_add(1, Ordering::SeqCst) < 3 {
                    return Err(WalletError::QuoteNotPaid("quote not paid".to_owned()));
                }
                assert_eq!(10, amount);
                Ok(Proofs::new(vec![proof(8, "x"), proof(2, "y")]))
            });

        let (localstore, wallet) =
            wallet_with(connector, Proofs::new(vec![proof(1, "a")])).await?;
        let deposit = wallet.mint_deposit(10, &PollHandle::new()).await?;

        assert_eq!(4, calls.load(Ordering::SeqCst));
        assert_eq!(10, deposit.proofs.total_amount());
        assert_eq!(11, wallet.balance().await);
        assert_eq!(11, localstore.load_proofs().await?.total_amount());
        Ok(())
    }

    #[tokio::test]
    async fn test_mint_zero_amount() -> anyhow::Result<()> {
        let (_, wallet) = wallet_with(MockMintConnector::default(), Proofs::empty()).await?;
        let result = wallet.mint_deposit(0, &PollHandle::new()).await;
        assert!(matches!(result, Err(WalletError::InvalidAmount)));
        Ok(())
    }

    #[tokio::test]
    async fn test_mint_poll_cancelled() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_issue()
            .returning(|_, _, _| Err(WalletError::QuoteNotPaid("quote not paid".to_owned())));

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        let poll = PollHandle::new();
        let cancel = poll.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let result = wallet.mint_tokens(&mint_quote(10), &poll).await;
        assert!(matches!(result, Err(WalletError::PollCancelled)));
        assert_eq!(0, wallet.balance().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_mint_poll_limit() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_issue()
            .times(3)
            .returning(|_, _, _| Err(WalletError::QuoteNotPaid("quote not paid".to_owned())));

        let localstore = MemoryLocalStore::default();
        localstore.save_mint_session(&mint_session()).await?;
        let wallet = Wallet::builder()
            .with_localstore(localstore)
            .with_connector(connector)
            .with_poll_config(PollConfig::new(Duration::from_millis(1), Some(3)))
            .build()
            .await?;

        let result = wallet.mint_tokens(&mint_quote(10), &PollHandle::new()).await;
        assert!(matches!(result, Err(WalletError::PollLimitReached(3))));
        Ok(())
    }

    #[tokio::test]
    async fn test_mint_stops_on_mint_error() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_issue().times(1).returning(|_, _, _| {
            Err(WalletError::MintError {
                code: 20002,
                detail: "outputs have already been signed".to_owned(),
            })
        });

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        let result = wallet.mint_tokens(&mint_quote(10), &PollHandle::new()).await;
        assert!(matches!(result, Err(WalletError::MintError { code: 20002, .. })));
        Ok(())
    }

    fn melt_quote(amount: u64, fee_reserve: u64) -> MeltQuote {
        MeltQuote {
            quote: "melt-quote".to_owned(),
            amount,
            fee_reserve,
            paid: false,
            expiry: None,
        }
    }

    #[tokio::test]
    async fn test_melt_insufficient_balance() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_get_melt_quote()
            .returning(|_, _| Ok(melt_quote(5, 1)));
        connector.expect_redeem().never();

        let proofs = Proofs::new(vec![proof(4, "a"), proof(1, "b")]);
        let (localstore, wallet) = wallet_with(connector, proofs.clone()).await?;

        let result = wallet.melt(INVOICE).await;
        assert!(matches!(
            result,
            Err(WalletError::InsufficientBalance {
                required: 6,
                available: 5
            })
        ));
        assert_eq!(proofs, wallet.proofs().await);
        assert_eq!(proofs, localstore.load_proofs().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_melt_invalid_invoice() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_get_melt_quote().never();

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        let result = wallet.melt("lnbc-not-an-invoice").await;
        assert!(matches!(result, Err(WalletError::DecodeInvoice(_, _))));
        Ok(())
    }

    #[tokio::test]
    async fn test_melt_paid_with_change() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_get_melt_quote()
            .withf(|_, invoice| invoice.starts_with("lnbcrt210n1"))
            .returning(|_, _| Ok(melt_quote(21, 2)));
        connector
            .expect_redeem()
            .withf(|_, _, proofs| proofs.total_amount() == 32)
            .returning(|_, _, _| {
                Ok(MeltResult {
                    paid: true,
                    preimage: Some("preimage".to_owned()),
                    change: Proofs::new(vec![proof(8, "change")]),
                })
            });

        let (localstore, wallet) = wallet_with(
            connector,
            Proofs::new(vec![proof(32, "a"), proof(4, "b"), proof(1, "c")]),
        )
        .await?;

        let result = wallet.melt(INVOICE).await?;
        assert!(result.paid);

        let expected = Proofs::new(vec![proof(4, "b"), proof(1, "c"), proof(8, "change")]);
        assert_eq!(expected, wallet.proofs().await);
        assert_eq!(expected, localstore.load_proofs().await?);
        assert_eq!(13, wallet.balance().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_melt_not_paid_keeps_store() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_get_melt_quote()
            .returning(|_, _| Ok(melt_quote(21, 2)));
        connector.expect_redeem().returning(|_, _, _| {
            Ok(MeltResult {
                paid: false,
                preimage: None,
                change: Proofs::empty(),
            })
        });

        let proofs = Proofs::new(vec![proof(32, "a")]);
        let (localstore, wallet) = wallet_with(connector, proofs.clone()).await?;

        let result = wallet.melt(INVOICE).await;
        assert!(matches!(result, Err(WalletError::RedemptionFailed(_))));
        assert_eq!(proofs, wallet.proofs().await);
        assert_eq!(proofs, localstore.load_proofs().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_melt_rejected_keeps_store() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_get_melt_quote()
            .returning(|_, _| Ok(melt_quote(21, 2)));
        connector.expect_redeem().returning(|_, _, _| {
            Err(WalletError::MintError {
                code: 11001,
                detail: "Token already spent.".to_owned(),
            })
        });

        let proofs = Proofs::new(vec![proof(32, "a")]);
        let (_, wallet) = wallet_with(connector, proofs.clone()).await?;

        let result = wallet.melt(INVOICE).await;
        assert!(
            matches!(result, Err(WalletError::RedemptionFailed(detail)) if detail == "Token already spent.")
        );
        assert_eq!(proofs, wallet.proofs().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_melt_uses_session_keyset_only() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_get_melt_quote()
            .returning(|_, _| Ok(melt_quote(21, 2)));
        connector.expect_redeem().never();

        let (_, wallet) = wallet_with(
            connector,
            Proofs::new(vec![
                fixture_proof(64, "other-keyset"),
                proof(16, "a"),
            ]),
        )
        .await?;

        let result = wallet.melt(INVOICE).await;
        assert!(matches!(
            result,
            Err(WalletError::InsufficientBalance { required: 23, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_melt_paid_with_unusable_change() -> anyhow::Result<()> {
        let mut client = MockCashuClient::default();
        client
            .expect_post_melt_quote_bolt11()
            .returning(|_, _, _| {
                Ok(PostMeltQuoteBolt11Response {
                    quote: "melt-quote".to_owned(),
                    amount: 21,
                    fee_reserve: 2,
                    paid: false,
                    expiry: None,
                })
            });
        client
            .expect_post_melt_bolt11()
            .returning(|_, _, _, outputs| {
                // change for an amount the keyset has no key for
                let change = outputs
                    .into_iter()
                    .take(1)
                    .map(|output| BlindedSignature {
                        amount: 3,
                        c_: output.b_,
                        id: output.id,
                    })
                    .collect();
                Ok(PostMeltBolt11Response {
                    paid: true,
                    payment_preimage: Some("preimage".to_owned()),
                    change,
                })
            });

        let (localstore, wallet) = wallet_with(
            HttpMintConnector::new(client),
            Proofs::new(vec![proof(32, "a"), proof(4, "b")]),
        )
        .await?;

        let result = wallet.melt(INVOICE).await?;
        assert!(result.paid);
        assert!(result.change.is_empty());

        let expected = Proofs::new(vec![proof(4, "b")]);
        assert_eq!(expected, wallet.proofs().await);
        assert_eq!(expected, localstore.load_proofs().await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_melt_quote_amount_overflow() -> anyhow::Result<()> {
        let mut client = MockCashuClient::default();
        client
            .expect_post_melt_quote_bolt11()
            .returning(|_, _, _| {
                Ok(PostMeltQuoteBolt11Response {
                    quote: "melt-quote".to_owned(),
                    amount: u64::MAX,
                    fee_reserve: 1,
                    paid: false,
                    expiry: None,
                })
            });
        client.expect_post_melt_bolt11().never();

        let proofs = Proofs::new(vec![proof(32, "a")]);
        let (_, wallet) = wallet_with(HttpMintConnector::new(client), proofs.clone()).await?;

        let result = wallet.melt(INVOICE).await;
        assert!(matches!(result, Err(WalletError::UnexpectedResponse(_))));
        assert_eq!(proofs, wallet.proofs().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_send() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_split()
            .withf(|_, amount, proofs| *amount == 3 && proofs.total_amount() == 5)
            .returning(|_, _, _| {
                Ok(SplitResult {
                    send: Proofs::new(vec![proof(3, "send")]),
                    return_change: Proofs::new(vec![proof(2, "change")]),
                })
            });

        let (localstore, wallet) = wallet_with(connector, Proofs::new(vec![proof(5, "five")])).await?;

        let token = wallet.swap_send(3).await?;

        let stored = wallet.proofs().await;
        assert_eq!(Proofs::new(vec![proof(2, "change")]), stored);
        assert_eq!(stored, localstore.load_proofs().await?);
        assert!(!stored.contains_secret("send"));

        let decoded = TokenV3::deserialize(token)?;
        assert_eq!(Some(mint_session().mint_url), decoded.mint());
        assert_eq!(Proofs::new(vec![proof(3, "send")]), decoded.proofs());
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_send_insufficient_balance() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_split().never();

        let (_, wallet) = wallet_with(connector, Proofs::new(vec![proof(2, "a")])).await?;
        let result = wallet.swap_send(3).await;
        assert!(matches!(
            result,
            Err(WalletError::InsufficientBalance {
                required: 3,
                available: 2
            })
        ));
        assert!(matches!(
            wallet.swap_send(0).await,
            Err(WalletError::InvalidAmount)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_send_split_failure_keeps_store() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector
            .expect_split()
            .returning(|_, _, _| Err(WalletError::MintUnreachable("timeout".to_owned())));

        let proofs = Proofs::new(vec![proof(5, "five")]);
        let (_, wallet) = wallet_with(connector, proofs.clone()).await?;
        let result = wallet.swap_send(3).await;
        assert!(matches!(result, Err(WalletError::MintUnreachable(_))));
        assert_eq!(proofs, wallet.proofs().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_send_unusable_signatures_drops_inputs() -> anyhow::Result<()> {
        let mut client = MockCashuClient::default();
        client
            .expect_post_swap()
            .times(1)
            .returning(|_, _, _| Ok(PostSwapResponse::default()));

        let (localstore, wallet) = wallet_with(
            HttpMintConnector::new(client),
            Proofs::new(vec![proof(8, "a"), proof(2, "b")]),
        )
        .await?;

        let result = wallet.swap_send(5).await;
        assert!(matches!(result, Err(WalletError::InputsSpent(_))));

        let expected = Proofs::new(vec![proof(2, "b")]);
        assert_eq!(expected, wallet.proofs().await);
        assert_eq!(expected, localstore.load_proofs().await?);
        Ok(())
    }

    fn token_of(proofs: Proofs) -> anyhow::Result<String> {
        Ok(TokenV3::from((mint_session().mint_url, proofs)).serialize()?)
    }

    #[tokio::test]
    async fn test_swap_claim() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_receive().returning(|_, token| {
            assert_eq!(10, token.total_amount());
            Ok(ReceiveResult {
                redeemed: Proofs::new(vec![proof(8, "new-8"), proof(2, "new-2")]),
                failed: Proofs::empty(),
            })
        });

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        let token = token_of(Proofs::new(vec![proof(8, "a"), proof(2, "b")]))?;

        let redeemed = wallet.swap_claim(&token).await?;
        assert_eq!(10, redeemed.total_amount());
        assert_eq!(10, wallet.balance().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_claim_partial_failure() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_receive().returning(|_, _| {
            Ok(ReceiveResult {
                redeemed: Proofs::new(vec![proof(8, "new-8")]),
                failed: Proofs::new(vec![proof(2, "b")]),
            })
        });

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        let token = token_of(Proofs::new(vec![proof(8, "a"), proof(2, "b")]))?;

        let result = wallet.swap_claim(&token).await;
        match result {
            Err(WalletError::PartialFailure { redeemed, failed }) => {
                assert_eq!(8, redeemed.total_amount());
                assert_eq!(2, failed.total_amount());
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert_eq!(8, wallet.balance().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_claim_all_failed() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_receive().returning(|_, token| {
            Ok(ReceiveResult {
                redeemed: Proofs::empty(),
                failed: token.proofs(),
            })
        });

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        let token = token_of(Proofs::new(vec![proof(8, "a")]))?;

        let result = wallet.swap_claim(&token).await;
        assert!(matches!(result, Err(WalletError::RedemptionFailed(_))));
        assert_eq!(0, wallet.balance().await);
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_claim_decode_error() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_receive().never();

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        assert!(matches!(
            wallet.swap_claim("cashuAnot-base64!").await,
            Err(WalletError::DecodeError(_))
        ));
        assert!(matches!(
            wallet.swap_claim(&token_of(Proofs::empty())?).await,
            Err(WalletError::DecodeError(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_swap_claim_amount_overflow() -> anyhow::Result<()> {
        let mut connector = MockMintConnector::default();
        connector.expect_receive().never();

        let (_, wallet) = wallet_with(connector, Proofs::empty()).await?;
        let token = TokenV3 {
            tokens: vec![Token {
                mint: Some(mint_session().mint_url),
                proofs: Proofs::new(vec![proof(u64::MAX, "a"), proof(u64::MAX, "b")]),
            }],
            unit: None,
            memo: None,
        }
        .serialize()?;

        let result = wallet.swap_claim(&token).await;
        assert!(matches!(result, Err(WalletError::DecodeError(_))));
        assert_eq!(0, wallet.balance().await);
        Ok(())
    }
}
