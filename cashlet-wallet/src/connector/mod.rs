//! The mint capability the wallet orchestrator talks to.
//!
//! `MintConnector` works on proofs only. Creating blinded outputs and unblinding the signatures of
//! the mint is up to the implementation, see [`http::HttpMintConnector`].
use async_trait::async_trait;
use cashlet_core::{
    keyset::Keyset,
    primitives::{MintInfoResponse, PostMeltQuoteBolt11Response},
    proof::Proofs,
    token::TokenV3,
};
use url::Url;

use crate::{error::WalletError, session::MintSession};

pub mod http;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintQuote {
    pub quote: String,
    pub amount: u64,
    /// bolt11 invoice that has to be paid before the proofs are issued
    pub payment_request: String,
    pub paid: bool,
    pub expiry: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeltQuote {
    pub quote: String,
    pub amount: u64,
    pub fee_reserve: u64,
    pub paid: bool,
    pub expiry: Option<u64>,
}

impl MeltQuote {
    /// Amount the inputs of the melt have to cover
    pub fn required_amount(&self) -> Result<u64, WalletError> {
        self.amount.checked_add(self.fee_reserve).ok_or_else(|| {
            WalletError::UnexpectedResponse(format!(
                "melt quote {} overflows: amount {} fee reserve {}",
                self.quote, self.amount, self.fee_reserve
            ))
        })
    }
}

impl From<PostMeltQuoteBolt11Response> for MeltQuote {
    fn from(response: PostMeltQuoteBolt11Response) -> Self {
        Self {
            quote: response.quote,
            amount: response.amount,
            fee_reserve: response.fee_reserve,
            paid: response.paid,
            expiry: response.expiry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeltResult {
    pub paid: bool,
    pub preimage: Option<String>,
    /// returned overpaid fees
    pub change: Proofs,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitResult {
    pub send: Proofs,
    pub return_change: Proofs,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceiveResult {
    pub redeemed: Proofs,
    pub failed: Proofs,
}

#[cfg_attr(test, automock)]
#[async_trait(?Send)]
pub trait MintConnector {
    async fn get_info(&self, mint_url: &Url) -> Result<MintInfoResponse, WalletError>;

    /// Active keysets of the mint
    async fn get_keys(&self, mint_url: &Url) -> Result<Vec<Keyset>, WalletError>;

    async fn get_mint_quote(
        &self,
        session: &MintSession,
        amount: u64,
    ) -> Result<MintQuote, WalletError>;

    /// Fails with `QuoteNotPaid` as long as the invoice of the quote is unpaid.
    async fn issue(
        &self,
        session: &MintSession,
        amount: u64,
        quote_id: &str,
    ) -> Result<Proofs, WalletError>;

    async fn get_melt_quote(
        &self,
        session: &MintSession,
        invoice: &str,
    ) -> Result<MeltQuote, WalletError>;

    /// A paid melt is reported as paid even if the change can't be unblinded.
    async fn redeem(
        &self,
        session: &MintSession,
        quote: &MeltQuote,
        proofs: &Proofs,
    ) -> Result<MeltResult, WalletError>;

    /// Swaps `proofs` for new proofs worth `amount` to send and the remaining change.
    ///
    /// Fails with `InputsSpent` if the mint answered the swap but its signatures are unusable.
    async fn split(
        &self,
        session: &MintSession,
        amount: u64,
        proofs: &Proofs,
    ) -> Result<SplitResult, WalletError>;

    /// Swaps the proofs of a received token for new proofs owned by this wallet.
    async fn receive(
        &self,
        session: &MintSession,
        token: &TokenV3,
    ) -> Result<ReceiveResult, WalletError>;
}

#[cfg(test)]
mod tests {
    use super::MeltQuote;
    use crate::error::WalletError;

    fn melt_quote(amount: u64, fee_reserve: u64) -> MeltQuote {
        MeltQuote {
            quote: "melt-quote".to_owned(),
            amount,
            fee_reserve,
            paid: false,
            expiry: None,
        }
    }

    #[test]
    fn test_required_amount() -> anyhow::Result<()> {
        assert_eq!(23, melt_quote(21, 2).required_amount()?);
        assert!(matches!(
            melt_quote(u64::MAX, 1).required_amount(),
            Err(WalletError::UnexpectedResponse(_))
        ));
        Ok(())
    }
}
