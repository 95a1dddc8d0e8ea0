//! This module defines the `Proof` and `Proofs` structs, which are used for representing proofs as described in [Nut-00](https://github.com/cashubtc/nuts/blob/main/00.md)
//!
//! The `Proof` struct represents a single bearer token, with an `amount` field for the amount, a `secret` field that uniquely identifies the token, a `c` field for the unblinded signature of the mint and an `keyset_id` field for the keyset it was signed with.
//!
//! The `Proofs` struct is an ordered collection of proofs. It provides the amount based selection the wallet uses to pick the proofs for a payment.

use std::collections::HashSet;

use secp256k1::PublicKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proof {
    pub amount: u64,
    #[serde(rename = "id")]
    pub keyset_id: String,
    pub secret: String,
    #[serde(rename = "C")]
    pub c: PublicKey,
}

impl Proof {
    pub const fn new(amount: u64, secret: String, c: PublicKey, id: String) -> Self {
        Self {
            amount,
            secret,
            c,
            keyset_id: id,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Proofs(pub(super) Vec<Proof>);

impl Proofs {
    pub fn new(proofs: Vec<Proof>) -> Self {
        Self(proofs)
    }

    pub fn with_proof(proof: Proof) -> Self {
        Self(vec![proof])
    }

    pub const fn empty() -> Self {
        Self(vec![])
    }

    /// Sum of all amounts, saturating at `u64::MAX`.
    pub fn total_amount(&self) -> u64 {
        self.0
            .iter()
            .fold(0, |acc: u64, proof| acc.saturating_add(proof.amount))
    }

    /// Sum of all amounts or `None` if it overflows.
    pub fn checked_total_amount(&self) -> Option<u64> {
        self.0
            .iter()
            .try_fold(0u64, |acc, proof| acc.checked_add(proof.amount))
    }

    pub fn proofs(&self) -> Vec<Proof> {
        self.0.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Proof> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn secrets(&self) -> HashSet<&str> {
        self.0.iter().map(|p| p.secret.as_str()).collect()
    }

    pub fn contains_secret(&self, secret: &str) -> bool {
        self.0.iter().any(|p| p.secret == secret)
    }

    /// Selects proofs in stored order until their sum reaches `amount`.
    ///
    /// Only proofs of `keyset_id` are considered if one is given. The selection may overshoot
    /// the amount, the exact split into send and change is done by the mint. Returns an empty
    /// collection if the considered proofs can't cover the amount.
    pub fn proofs_for_amount(&self, amount: u64, keyset_id: Option<&str>) -> Self {
        let mut selected_proofs = vec![];
        let mut selected_amount: u64 = 0;

        for proof in self
            .0
            .iter()
            .filter(|p| keyset_id.map_or(true, |id| p.keyset_id == id))
        {
            if selected_amount >= amount {
                break;
            }
            selected_amount = selected_amount.saturating_add(proof.amount);
            selected_proofs.push(proof.clone());
        }

        if selected_amount < amount {
            return Self::empty();
        }
        selected_proofs.into()
    }
}

impl From<Vec<Proof>> for Proofs {
    fn from(from: Vec<Proof>) -> Self {
        Self(from)
    }
}

impl From<Proof> for Proofs {
    fn from(from: Proof) -> Self {
        Self(vec![from])
    }
}

impl IntoIterator for Proofs {
    type Item = Proof;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<Proof> for Proofs {
    fn from_iter<I: IntoIterator<Item = Proof>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
