use async_trait::async_trait;
use cashlet_core::{
    blind::BlindedMessage,
    keyset::Keysets,
    primitives::{
        CurrencyUnit, KeysResponse, MintInfoResponse, PostMeltBolt11Response,
        PostMeltQuoteBolt11Response, PostMintBolt11Response, PostMintQuoteBolt11Response,
        PostSwapResponse,
    },
    proof::Proofs,
};

use url::Url;

use crate::error::WalletError;

pub mod crossplatform;

#[cfg(test)]
use mockall::automock;

/// The cashu v1 REST api of a mint.
#[cfg_attr(test, automock)]
#[async_trait(?Send)]
pub trait CashuClient {
    async fn get_info(&self, mint_url: &Url) -> Result<MintInfoResponse, WalletError>;

    async fn get_keys(&self, mint_url: &Url) -> Result<KeysResponse, WalletError>;

    async fn get_keysets(&self, mint_url: &Url) -> Result<Keysets, WalletError>;

    async fn post_mint_quote_bolt11(
        &self,
        mint_url: &Url,
        amount: u64,
        unit: CurrencyUnit,
    ) -> Result<PostMintQuoteBolt11Response, WalletError>;

    async fn post_mint_bolt11(
        &self,
        mint_url: &Url,
        quote: String,
        blinded_messages: Vec<BlindedMessage>,
    ) -> Result<PostMintBolt11Response, WalletError>;

    async fn post_melt_quote_bolt11(
        &self,
        mint_url: &Url,
        payment_request: String,
        unit: CurrencyUnit,
    ) -> Result<PostMeltQuoteBolt11Response, WalletError>;

    async fn post_melt_bolt11(
        &self,
        mint_url: &Url,
        proofs: Proofs,
        quote: String,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostMeltBolt11Response, WalletError>;

    async fn post_swap(
        &self,
        mint_url: &Url,
        proofs: Proofs,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostSwapResponse, WalletError>;
}
