//! The connection of the wallet to a single mint.
//!
//! A `MintSession` is created by connecting to a mint and is persisted, so the wallet can be
//! restored later without contacting the mint again.
use cashlet_core::{keyset::Keyset, primitives::CurrencyUnit, primitives::MintInfoResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::{connector::MintConnector, error::WalletError, localstore::LocalStore};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintSession {
    pub mint_url: Url,
    pub keyset: Keyset,
}

impl MintSession {
    /// Fetches the info and the keysets of the mint at `mint_url` and persists the session for the
    /// keyset matching `unit`. Nothing is persisted if the mint can't be used.
    pub async fn connect(
        connector: &impl MintConnector,
        localstore: &impl LocalStore,
        mint_url: Url,
        unit: &CurrencyUnit,
    ) -> Result<(Self, MintInfoResponse), WalletError> {
        let info = connector
            .get_info(&mint_url)
            .await
            .map_err(into_unreachable)?;
        let keysets = connector
            .get_keys(&mint_url)
            .await
            .map_err(into_unreachable)?;

        let keyset = keysets
            .into_iter()
            .find(|keyset| &keyset.unit == unit)
            .ok_or_else(|| WalletError::NoMatchingKeyset(unit.clone()))?;

        if !keyset.has_valid_id() {
            warn!("keyset id {} does not match its public keys", keyset.id);
        }

        let session = Self { mint_url, keyset };
        localstore.save_mint_session(&session).await?;
        info!(
            "connected to mint {} with keyset {}",
            session.mint_url, session.keyset.id
        );
        Ok((session, info))
    }

    pub async fn restore(localstore: &impl LocalStore) -> Result<Option<Self>, WalletError> {
        localstore.load_mint_session().await
    }

    pub fn keyset_id(&self) -> &str {
        &self.keyset.id
    }
}

fn into_unreachable(err: WalletError) -> WalletError {
    match err {
        WalletError::MintUnreachable(_) => err,
        other => WalletError::MintUnreachable(other.to_string()),
    }
}
