//! Persistence of the wallet state.
//!
//! The wallet keeps the full proof collection and the session of the connected mint in memory and
//! writes them through a `LocalStore` after every change.
use async_trait::async_trait;
use cashlet_core::proof::Proofs;

use crate::{error::WalletError, session::MintSession};

pub mod memory;
pub mod sqlite;

#[async_trait(?Send)]
pub trait LocalStore {
    async fn load_mint_session(&self) -> Result<Option<MintSession>, WalletError>;

    async fn save_mint_session(&self, session: &MintSession) -> Result<(), WalletError>;

    async fn load_proofs(&self) -> Result<Proofs, WalletError>;

    /// Replaces the stored proofs with `proofs`, keeping their order.
    async fn save_proofs(&self, proofs: &Proofs) -> Result<(), WalletError>;
}
