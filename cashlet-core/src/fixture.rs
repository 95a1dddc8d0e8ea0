//! Helpers for loading fixtures and building deterministic proofs and keysets in tests.
//!
//! `read_fixture` reads a file from the `src/fixtures` directory of this crate,
//! `read_fixture_as` deserializes its json content.
//!
//! `fixture_mint_keys` derives the private keys a mint would use for a seed, `fixture_keyset` the matching
//! wallet `Keyset`. `fixture_proof` builds a proof with a valid (but unsigned) point for a given secret.
use std::collections::HashMap;

use bitcoin_hashes::{sha256, Hash};
use secp256k1::{PublicKey, Secp256k1, SecretKey};

use crate::{
    keyset::{derive_keyset_id, Keyset},
    primitives::CurrencyUnit,
    proof::Proof,
};

pub const FIXTURE_KEYSET_ID: &str = "009a1f293253e41e";

const MAX_ORDER: u32 = 32;

pub fn read_fixture(name: &str) -> anyhow::Result<String> {
    let base_dir = env!("CARGO_MANIFEST_DIR");
    let raw_token = std::fs::read_to_string(format!("{base_dir}/src/fixtures/{name}"))?;
    Ok(raw_token.trim().to_string())
}

pub fn read_fixture_as<T>(name: &str) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    Ok(serde_json::from_str::<T>(&read_fixture(name)?)?)
}

fn key_from_seed(seed: &str) -> SecretKey {
    let hash = sha256::Hash::hash(seed.as_bytes());
    SecretKey::from_slice(hash.as_byte_array()).expect("sha256 is a valid secret key")
}

/// Derives one private key per power of two amount from a seed.
pub fn fixture_mint_keys(seed: &str) -> HashMap<u64, SecretKey> {
    (0..MAX_ORDER)
        .map(|i| (2u64.pow(i), key_from_seed(&format!("{seed}{i}"))))
        .collect()
}

/// Returns the mint private keys for a seed and the keyset a wallet would fetch for them.
pub fn fixture_keyset(seed: &str) -> (HashMap<u64, SecretKey>, Keyset) {
    let secp = Secp256k1::new();
    let private_keys = fixture_mint_keys(seed);
    let public_keys = private_keys
        .iter()
        .map(|(amount, key)| (*amount, key.public_key(&secp)))
        .collect::<HashMap<u64, PublicKey>>();
    let keyset = Keyset::new(
        derive_keyset_id(&public_keys),
        CurrencyUnit::Sat,
        public_keys,
    );
    (private_keys, keyset)
}

pub fn fixture_proof(amount: u64, secret: &str) -> Proof {
    fixture_proof_with_keyset(amount, secret, FIXTURE_KEYSET_ID)
}

pub fn fixture_proof_with_keyset(amount: u64, secret: &str, keyset_id: &str) -> Proof {
    let secp = Secp256k1::new();
    let c = key_from_seed(secret).public_key(&secp);
    Proof::new(amount, secret.to_owned(), c, keyset_id.to_owned())
}
