use async_trait::async_trait;

use cashlet_core::{
    blind::BlindedMessage,
    keyset::Keysets,
    primitives::{
        CurrencyUnit, KeysResponse, MintInfoResponse, PostMeltBolt11Request,
        PostMeltBolt11Response, PostMeltQuoteBolt11Request, PostMeltQuoteBolt11Response,
        PostMintBolt11Request, PostMintBolt11Response, PostMintQuoteBolt11Request,
        PostMintQuoteBolt11Response, PostSwapRequest, PostSwapResponse,
    },
    proof::Proofs,
};

use crate::{error::WalletError, http::CrossPlatformHttpClient};
use url::Url;

use super::CashuClient;

#[async_trait(?Send)]
impl CashuClient for CrossPlatformHttpClient {
    async fn get_info(&self, mint_url: &Url) -> Result<MintInfoResponse, WalletError> {
        self.do_get(&mint_url.join("v1/info")?).await
    }

    async fn get_keys(&self, mint_url: &Url) -> Result<KeysResponse, WalletError> {
        self.do_get(&mint_url.join("v1/keys")?).await
    }

    async fn get_keysets(&self, mint_url: &Url) -> Result<Keysets, WalletError> {
        self.do_get(&mint_url.join("v1/keysets")?).await
    }

    async fn post_mint_quote_bolt11(
        &self,
        mint_url: &Url,
        amount: u64,
        unit: CurrencyUnit,
    ) -> Result<PostMintQuoteBolt11Response, WalletError> {
        let body = PostMintQuoteBolt11Request { amount, unit };
        self.do_post(&mint_url.join("v1/mint/quote/bolt11")?, &body)
            .await
    }

    async fn post_mint_bolt11(
        &self,
        mint_url: &Url,
        quote: String,
        blinded_messages: Vec<BlindedMessage>,
    ) -> Result<PostMintBolt11Response, WalletError> {
        let body = PostMintBolt11Request {
            quote,
            outputs: blinded_messages,
        };
        self.do_post(&mint_url.join("v1/mint/bolt11")?, &body).await
    }

    async fn post_melt_quote_bolt11(
        &self,
        mint_url: &Url,
        payment_request: String,
        unit: CurrencyUnit,
    ) -> Result<PostMeltQuoteBolt11Response, WalletError> {
        let body = PostMeltQuoteBolt11Request {
            request: payment_request,
            unit,
        };
        self.do_post(&mint_url.join("v1/melt/quote/bolt11")?, &body)
            .await
    }

    async fn post_melt_bolt11(
        &self,
        mint_url: &Url,
        inputs: Proofs,
        quote: String,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostMeltBolt11Response, WalletError> {
        let body = PostMeltBolt11Request {
            quote,
            inputs,
            outputs,
        };
        self.do_post(&mint_url.join("v1/melt/bolt11")?, &body).await
    }

    async fn post_swap(
        &self,
        mint_url: &Url,
        inputs: Proofs,
        outputs: Vec<BlindedMessage>,
    ) -> Result<PostSwapResponse, WalletError> {
        let body = PostSwapRequest { inputs, outputs };
        self.do_post(&mint_url.join("v1/swap")?, &body).await
    }
}
