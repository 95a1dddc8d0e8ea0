//! This module defines the `Keyset` struct, the wallet side view of a mint keyset as described in [Nut-02](https://github.com/cashubtc/nuts/blob/main/02.md)
//!
//! A `Keyset` holds the keyset id, the currency unit and the public key the mint uses for every supported amount.
//! The wallet needs these public keys to unblind the signatures it receives from the mint.

use hex::ToHex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use bitcoin_hashes::{sha256, Hash};

use itertools::Itertools;
use secp256k1::PublicKey;

use crate::primitives::{CurrencyUnit, KeyResponse};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyset {
    pub id: String,
    pub unit: CurrencyUnit,
    pub keys: HashMap<u64, PublicKey>,
}

impl Keyset {
    pub fn new(id: impl Into<String>, unit: CurrencyUnit, keys: HashMap<u64, PublicKey>) -> Self {
        Self {
            id: id.into(),
            unit,
            keys,
        }
    }

    /// All amounts this keyset can sign, in ascending order.
    pub fn amounts(&self) -> Vec<u64> {
        self.keys.keys().copied().sorted().collect()
    }

    pub fn public_key(&self, amount: u64) -> Option<&PublicKey> {
        self.keys.get(&amount)
    }

    /// Returns true if the id matches the id derived from the public keys.
    /// Legacy (base64) keyset ids can't be checked and always return false.
    pub fn has_valid_id(&self) -> bool {
        derive_keyset_id(&self.keys) == self.id
    }
}

impl From<KeyResponse> for Keyset {
    fn from(response: KeyResponse) -> Self {
        Self {
            id: response.id,
            unit: response.unit,
            keys: response.keys,
        }
    }
}

/// Entry of the `/v1/keysets` response
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeysetInfo {
    pub id: String,
    pub unit: CurrencyUnit,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Keysets {
    pub keysets: Vec<KeysetInfo>,
}

impl Keysets {
    pub fn new(keysets: Vec<KeysetInfo>) -> Self {
        Self { keysets }
    }

    pub fn is_active(&self, keyset_id: &str) -> bool {
        self.keysets.iter().any(|k| k.active && k.id == keyset_id)
    }
}

/// Derives a v1 keyset id: `00` followed by the first 7 bytes of the sha256 over the
/// concatenated compressed public keys sorted by amount.
pub fn derive_keyset_id(keys: &HashMap<u64, PublicKey>) -> String {
    let pubkeys = keys
        .iter()
        .sorted_by(|(amt_a, _), (amt_b, _)| amt_a.cmp(amt_b))
        .flat_map(|(_, pubkey)| pubkey.serialize())
        .collect::<Vec<u8>>();
    let hashed_pubkeys: String = sha256::Hash::hash(&pubkeys).encode_hex();
    format!("00{}", &hashed_pubkeys[..14])
}
