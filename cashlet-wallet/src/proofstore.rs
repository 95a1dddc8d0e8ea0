//! The local ledger of unspent proofs.
//!
//! `ProofStore` keeps the proofs of the wallet in memory and writes the whole collection through
//! its `LocalStore` on every change. The persisted state is written first, the in-memory state is
//! only updated if that succeeded, so both never diverge.
use std::collections::HashSet;

use cashlet_core::proof::{Proof, Proofs};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::{error::WalletError, localstore::LocalStore};

pub struct ProofStore<L: LocalStore> {
    proofs: Mutex<Proofs>,
    localstore: L,
}

impl<L: LocalStore> ProofStore<L> {
    pub async fn load(localstore: L) -> Result<Self, WalletError> {
        let proofs = localstore.load_proofs().await?;
        debug!("loaded {} proofs", proofs.len());
        Ok(Self {
            proofs: Mutex::new(proofs),
            localstore,
        })
    }

    pub const fn localstore(&self) -> &L {
        &self.localstore
    }

    /// Adds proofs whose secret isn't held yet. Returns the proofs that were actually added.
    #[instrument(level = "debug", skip_all, fields(count = proofs.len()), err)]
    pub async fn add_proofs(&self, proofs: &Proofs) -> Result<Proofs, WalletError> {
        self.replace_proofs(&Proofs::empty(), proofs).await
    }

    #[instrument(level = "debug", skip_all, fields(count = proofs.len()), err)]
    pub async fn remove_proofs(&self, proofs: &Proofs) -> Result<(), WalletError> {
        self.replace_proofs(proofs, &Proofs::empty()).await?;
        Ok(())
    }

    /// Removes `remove` and adds `add` as a single persisted change.
    pub async fn replace_proofs(
        &self,
        remove: &Proofs,
        add: &Proofs,
    ) -> Result<Proofs, WalletError> {
        if remove.is_empty() && add.is_empty() {
            return Ok(Proofs::empty());
        }

        let mut proofs = self.proofs.lock().await;
        let removed = remove.secrets();

        let mut kept = proofs
            .iter()
            .filter(|p| !removed.contains(p.secret.as_str()))
            .cloned()
            .collect::<Vec<Proof>>();

        let mut known = kept
            .iter()
            .map(|p| p.secret.clone())
            .collect::<HashSet<String>>();
        let added = add
            .iter()
            .filter(|p| known.insert(p.secret.clone()))
            .cloned()
            .collect::<Vec<Proof>>();
        if added.len() < add.len() {
            debug!("skipped {} already known proofs", add.len() - added.len());
        }

        kept.extend(added.iter().cloned());
        let updated = Proofs::new(kept);
        if updated == *proofs {
            return Ok(Proofs::empty());
        }

        self.localstore.save_proofs(&updated).await?;
        *proofs = updated;
        Ok(added.into())
    }

    /// Greedy selection in stored order, see [`Proofs::proofs_for_amount`].
    pub async fn get_proofs_by_amount(&self, amount: u64, keyset_id: Option<&str>) -> Proofs {
        self.proofs.lock().await.proofs_for_amount(amount, keyset_id)
    }

    pub async fn balance(&self) -> u64 {
        self.proofs.lock().await.total_amount()
    }

    pub async fn proofs(&self) -> Proofs {
        self.proofs.lock().await.clone()
    }
}
