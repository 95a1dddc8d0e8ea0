//! This module defines the `Amount` and `SplitAmount` structs, which are used for splitting amounts into the denominations of a mint.
//!
//! A mint signs powers of two only, so every amount the wallet asks to be signed is first split into its binary components.
//! `SplitAmount::create_secrets` generates one random secret per component.
//!
//! `blank_output_count` returns the number of outputs the wallet attaches to a melt so the mint can return overpaid fees ([Nut-08](https://github.com/cashubtc/nuts/blob/main/08.md)).
use rand::distributions::Alphanumeric;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount(pub u64);

impl Amount {
    pub fn split(&self) -> SplitAmount {
        split_amount(self.0).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitAmount(Vec<u64>);

impl From<Vec<u64>> for SplitAmount {
    fn from(from: Vec<u64>) -> Self {
        Self(from)
    }
}

impl SplitAmount {
    pub fn create_secrets(&self) -> Vec<String> {
        (0..self.0.len())
            .map(|_| generate_random_string())
            .collect::<Vec<String>>()
    }

    pub fn amounts(&self) -> &[u64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<u64> for Amount {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl IntoIterator for SplitAmount {
    type Item = u64;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// split a decimal amount into a vector of powers of 2
pub fn split_amount(amount: u64) -> Vec<u64> {
    (0..u64::BITS)
        .filter(|i| amount & (1 << i) != 0)
        .map(|i| 1 << i)
        .collect()
}

/// Number of blank outputs needed to receive the change for an overpaid amount.
pub fn blank_output_count(overpaid: u64) -> usize {
    if overpaid == 0 {
        return 0;
    }
    // ceil(log2(overpaid)), at least one output
    let bits = u64::BITS - (overpaid - 1).leading_zeros();
    std::cmp::max(bits as usize, 1)
}

pub fn generate_random_string() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}
