use async_trait::async_trait;
use cashlet_core::{
    amount::{blank_output_count, Amount, SplitAmount},
    blind::{BlindedMessage, BlindedSignature},
    dhke::Dhke,
    keyset::Keyset,
    primitives::MintInfoResponse,
    proof::{Proof, Proofs},
    token::TokenV3,
};
use secp256k1::SecretKey;
use tracing::{debug, warn};
use url::Url;

use crate::{
    client::CashuClient, error::WalletError, http::CrossPlatformHttpClient, session::MintSession,
};

use super::{MeltQuote, MeltResult, MintConnector, MintQuote, ReceiveResult, SplitResult};

/// Amount of a blank output. The mint overwrites it with the amount of the returned change.
const BLANK_OUTPUT_AMOUNT: u64 = 1;

/// Blinded messages together with the secrets and blinding factors needed to unblind the
/// signatures of the mint.
struct BlindedOutputs {
    messages: Vec<BlindedMessage>,
    secrets: Vec<(String, SecretKey)>,
}

impl BlindedOutputs {
    fn len(&self) -> usize {
        self.messages.len()
    }
}

/// Talks to a mint over the cashu v1 REST api.
#[derive(Debug, Clone)]
pub struct HttpMintConnector<C: CashuClient = CrossPlatformHttpClient> {
    client: C,
    dhke: Dhke,
}

impl Default for HttpMintConnector<CrossPlatformHttpClient> {
    fn default() -> Self {
        Self::new(CrossPlatformHttpClient::new())
    }
}

impl<C: CashuClient> HttpMintConnector<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            dhke: Dhke::new(),
        }
    }

    fn create_blinded_outputs(
        &self,
        keyset_id: &str,
        amounts: SplitAmount,
    ) -> Result<BlindedOutputs, WalletError> {
        let mut messages = Vec::with_capacity(amounts.len());
        let mut secrets = Vec::with_capacity(amounts.len());

        let random_secrets = amounts.create_secrets();
        for (amount, secret) in amounts.into_iter().zip(random_secrets) {
            let (b_, blinding_factor) = self.dhke.step1_alice(secret.clone(), None)?;
            messages.push(BlindedMessage {
                amount,
                b_,
                id: keyset_id.to_owned(),
            });
            secrets.push((secret, blinding_factor));
        }
        Ok(BlindedOutputs { messages, secrets })
    }

    /// Unblinds the signatures in the order of the outputs they were created for.
    fn create_proofs_from_blinded_signatures(
        &self,
        keyset: &Keyset,
        signatures: Vec<BlindedSignature>,
        secrets: Vec<(String, SecretKey)>,
    ) -> Result<Proofs, WalletError> {
        if signatures.len() > secrets.len() {
            return Err(WalletError::UnexpectedResponse(format!(
                "received {} signatures for {} outputs",
                signatures.len(),
                secrets.len()
            )));
        }

        signatures
            .into_iter()
            .zip(secrets)
            .map(|(signature, (secret, blinding_factor))| {
                let key = keyset
                    .public_key(signature.amount)
                    .ok_or(WalletError::PubkeyNotFound(signature.amount))?;
                let c = self.dhke.step3_alice(signature.c_, blinding_factor, *key)?;
                Ok(Proof::new(signature.amount, secret, c, signature.id))
            })
            .collect::<Result<Vec<Proof>, WalletError>>()
            .map(Proofs::from)
    }

    async fn swap(
        &self,
        session: &MintSession,
        inputs: &Proofs,
        outputs: BlindedOutputs,
    ) -> Result<Proofs, WalletError> {
        let expected = outputs.len();
        let response = self
            .client
            .post_swap(&session.mint_url, inputs.clone(), outputs.messages)
            .await?;

        // the inputs are spent from here on
        if response.signatures.len() != expected {
            return Err(WalletError::InputsSpent(format!(
                "expected {expected} signatures, received {}",
                response.signatures.len()
            )));
        }
        self.create_proofs_from_blinded_signatures(
            &session.keyset,
            response.signatures,
            outputs.secrets,
        )
        .map_err(|err| WalletError::InputsSpent(err.to_string()))
    }
}

#[async_trait(?Send)]
impl<C: CashuClient> MintConnector for HttpMintConnector<C> {
    async fn get_info(&self, mint_url: &Url) -> Result<MintInfoResponse, WalletError> {
        self.client.get_info(mint_url).await
    }

    async fn get_keys(&self, mint_url: &Url) -> Result<Vec<Keyset>, WalletError> {
        let keys = self.client.get_keys(mint_url).await?;
        let keysets = self.client.get_keysets(mint_url).await?;

        Ok(keys
            .keysets
            .into_iter()
            .filter(|key| keysets.is_active(&key.id))
            .map(Keyset::from)
            .collect())
    }

    async fn get_mint_quote(
        &self,
        session: &MintSession,
        amount: u64,
    ) -> Result<MintQuote, WalletError> {
        let response = self
            .client
            .post_mint_quote_bolt11(&session.mint_url, amount, session.keyset.unit.clone())
            .await?;
        Ok(MintQuote {
            quote: response.quote,
            amount,
            payment_request: response.payment_request,
            paid: response.paid,
            expiry: response.expiry,
        })
    }

    async fn issue(
        &self,
        session: &MintSession,
        amount: u64,
        quote_id: &str,
    ) -> Result<Proofs, WalletError> {
        let outputs = self.create_blinded_outputs(session.keyset_id(), Amount(amount).split())?;
        let expected = outputs.len();

        let response = self
            .client
            .post_mint_bolt11(&session.mint_url, quote_id.to_owned(), outputs.messages)
            .await?;

        if response.signatures.len() != expected {
            return Err(WalletError::UnexpectedResponse(format!(
                "expected {expected} signatures, received {}",
                response.signatures.len()
            )));
        }
        self.create_proofs_from_blinded_signatures(
            &session.keyset,
            response.signatures,
            outputs.secrets,
        )
    }

    async fn get_melt_quote(
        &self,
        session: &MintSession,
        invoice: &str,
    ) -> Result<MeltQuote, WalletError> {
        Ok(self
            .client
            .post_melt_quote_bolt11(
                &session.mint_url,
                invoice.to_owned(),
                session.keyset.unit.clone(),
            )
            .await?
            .into())
    }

    async fn redeem(
        &self,
        session: &MintSession,
        quote: &MeltQuote,
        proofs: &Proofs,
    ) -> Result<MeltResult, WalletError> {
        let overpaid = proofs.total_amount().saturating_sub(quote.amount);
        let blank_amounts = vec![BLANK_OUTPUT_AMOUNT; blank_output_count(overpaid)];
        let outputs = self.create_blinded_outputs(session.keyset_id(), blank_amounts.into())?;
        debug!(
            "melting {} sats with {} blank outputs",
            proofs.total_amount(),
            outputs.len()
        );

        let response = self
            .client
            .post_melt_bolt11(
                &session.mint_url,
                proofs.clone(),
                quote.quote.clone(),
                outputs.messages,
            )
            .await?;

        let change = if response.paid {
            self.create_proofs_from_blinded_signatures(
                &session.keyset,
                response.change,
                outputs.secrets,
            )
            .unwrap_or_else(|err| {
                warn!("invoice of quote {} was paid, dropping its change: {err}", quote.quote);
                Proofs::empty()
            })
        } else {
            Proofs::empty()
        };

        Ok(MeltResult {
            paid: response.paid,
            preimage: response.payment_preimage,
            change,
        })
    }

    async fn split(
        &self,
        session: &MintSession,
        amount: u64,
        proofs: &Proofs,
    ) -> Result<SplitResult, WalletError> {
        let total = proofs.total_amount();
        if amount > total {
            return Err(WalletError::InsufficientBalance {
                required: amount,
                available: total,
            });
        }

        let send_amounts = Amount(amount).split();
        let change_amounts = Amount(total - amount).split();
        let send_count = send_amounts.len();
        let amounts = [send_amounts.amounts(), change_amounts.amounts()].concat();
        let outputs = self.create_blinded_outputs(session.keyset_id(), amounts.into())?;

        let mut proofs = self.swap(session, proofs, outputs).await?.proofs();
        let return_change = proofs.split_off(send_count);

        Ok(SplitResult {
            send: proofs.into(),
            return_change: return_change.into(),
        })
    }

    async fn receive(
        &self,
        session: &MintSession,
        token: &TokenV3,
    ) -> Result<ReceiveResult, WalletError> {
        let mut redeemed = vec![];
        let mut failed = vec![];

        for entry in &token.tokens {
            if entry.proofs.is_empty() {
                continue;
            }

            if let Some(mint_url) = &entry.mint {
                if mint_url != &session.mint_url {
                    warn!("token entry of mint {mint_url} can't be redeemed at {}", session.mint_url);
                    failed.extend(entry.proofs.iter().cloned());
                    continue;
                }
            }

            let Some(amount) = entry.proofs.checked_total_amount() else {
                warn!("token entry of {} proofs overflows its amount", entry.proofs.len());
                failed.extend(entry.proofs.iter().cloned());
                continue;
            };
            let outputs =
                self.create_blinded_outputs(session.keyset_id(), Amount(amount).split())?;

            match self.swap(session, &entry.proofs, outputs).await {
                Ok(proofs) => redeemed.extend(proofs),
                Err(WalletError::MintUnreachable(reason)) if redeemed.is_empty() => {
                    return Err(WalletError::MintUnreachable(reason));
                }
                Err(err) => {
                    warn!("failed to redeem {amount} sats: {err}");
                    failed.extend(entry.proofs.iter().cloned());
                }
            }
        }

        Ok(ReceiveResult {
            redeemed: redeemed.into(),
            failed: failed.into(),
        })
    }
}
