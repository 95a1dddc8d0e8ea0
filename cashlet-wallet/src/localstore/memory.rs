use std::sync::Arc;

use async_trait::async_trait;
use cashlet_core::proof::Proofs;
use tokio::sync::Mutex;

use crate::{error::WalletError, session::MintSession};

use super::LocalStore;

#[derive(Default, Debug, Clone)]
pub struct MemoryLocalStore {
    proofs: Arc<Mutex<Proofs>>,
    session: Arc<Mutex<Option<MintSession>>>,
}

#[async_trait(?Send)]
impl LocalStore for MemoryLocalStore {
    async fn load_mint_session(&self) -> Result<Option<MintSession>, WalletError> {
        Ok(self.session.lock().await.clone())
    }

    async fn save_mint_session(&self, session: &MintSession) -> Result<(), WalletError> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn load_proofs(&self) -> Result<Proofs, WalletError> {
        Ok(self.proofs.lock().await.clone())
    }

    async fn save_proofs(&self, proofs: &Proofs) -> Result<(), WalletError> {
        *self.proofs.lock().await = proofs.clone();
        Ok(())
    }
}
