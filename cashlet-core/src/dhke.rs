//! This module defines the basic crypto primitives for Blind Diffie-Hellman Key Exchange (blind ecash).
//!
//! Implementation of [RubenSomsen/Blind-DH-ecash.md](https://gist.github.com/RubenSomsen/be7a4760dd4596d06963d67baf140406)
//! with the `hash_to_curve` function of [Nut-00](https://github.com/cashubtc/nuts/blob/main/00.md)
//!
//! Bob (Mint):
//!```python
//! A = a*G
//! return A
//! ```
//!
//! Alice (Client):
//!```python
//! Y = hash_to_curve(secret_message)
//! r = random blinding factor
//! B'= Y + r*G
//! return B'
//! ```
//!
//! Bob:
//!```python
//! C' = a*B'
//! return C'
//!```
//!
//! Alice:
//!```python
//! C = C' - r*A
//! (= a*Y)
//! return C, secret_message
//!```
//!
//! The wallet only runs the steps of Alice. `step2_bob` and `verify` are kept for emulating a mint.
use crate::error::CashletCoreError;
use bitcoin_hashes::{sha256, Hash};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};

const DOMAIN_SEPARATOR: &[u8] = b"Secp256k1_HashToCurve_Cashu_";

#[derive(Clone, Debug)]
pub struct Dhke {
    secp: Secp256k1<All>,
}

impl Default for Dhke {
    fn default() -> Self {
        Self::new()
    }
}

impl Dhke {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Maps a message to a point with an even y coordinate.
    /// Tries up to 2^16 counters appended to the domain separated message hash.
    pub fn hash_to_curve(message: &[u8]) -> Result<PublicKey, CashletCoreError> {
        let msg_to_hash = sha256::Hash::hash(&[DOMAIN_SEPARATOR, message].concat());

        for counter in 0..2u32.pow(16) {
            let mut to_hash = msg_to_hash.as_byte_array().to_vec();
            to_hash.extend_from_slice(&counter.to_le_bytes());
            let hash = sha256::Hash::hash(&to_hash);
            let mut candidate = Vec::with_capacity(33);
            candidate.push(0x02);
            candidate.extend_from_slice(hash.as_byte_array());
            if let Ok(point) = PublicKey::from_slice(&candidate) {
                return Ok(point);
            }
        }
        Err(CashletCoreError::NoValidPoint)
    }

    pub fn step1_alice(
        &self,
        secret_msg: impl Into<String>,
        blinding_factor: Option<&[u8]>,
    ) -> Result<(PublicKey, SecretKey), CashletCoreError> {
        let mut rng = rand::thread_rng();

        let y = Self::hash_to_curve(secret_msg.into().as_bytes())?;
        let secret_key = match blinding_factor {
            Some(f) => SecretKey::from_slice(f)?,
            None => SecretKey::new(&mut rng),
        };
        let b = y.combine(&PublicKey::from_secret_key(&self.secp, &secret_key))?;
        Ok((b, secret_key))
    }

    pub fn step2_bob(&self, b: PublicKey, a: &SecretKey) -> Result<PublicKey, CashletCoreError> {
        b.mul_tweak(&self.secp, &Scalar::from(*a))
            .map_err(CashletCoreError::Secp256k1Error)
    }

    pub fn step3_alice(
        &self,
        c_: PublicKey,
        r: SecretKey,
        a: PublicKey,
    ) -> Result<PublicKey, CashletCoreError> {
        c_.combine(
            &a.mul_tweak(&self.secp, &Scalar::from(r))
                .map_err(CashletCoreError::Secp256k1Error)?
                .negate(&self.secp),
        )
        .map_err(CashletCoreError::Secp256k1Error)
    }

    pub fn verify(
        &self,
        a: SecretKey,
        c: PublicKey,
        secret_msg: impl Into<String>,
    ) -> Result<bool, CashletCoreError> {
        let y = Self::hash_to_curve(secret_msg.into().as_bytes())?;
        Ok(c == y.mul_tweak(&self.secp, &Scalar::from(a))?)
    }
}

pub fn public_key_from_hex(hex: &str) -> Result<PublicKey, CashletCoreError> {
    use std::str::FromStr;
    Ok(PublicKey::from_str(hex)?)
}
