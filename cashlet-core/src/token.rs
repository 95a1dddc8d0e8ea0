//! This module defines the `Token` and `TokenV3` structs, the portable form of proofs as described in [Nut-00](https://github.com/cashubtc/nuts/blob/main/00.md)
//!
//! A `TokenV3` bundles one or more `Token` entries, each with the url of the mint and the proofs issued by it.
//! It is serialized as `cashuA` followed by the url safe base64 encoding of its json representation.

use std::str::FromStr;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::skip_serializing_none;
use url::Url;

use crate::{error::CashletCoreError, primitives::CurrencyUnit, proof::Proofs};

const TOKEN_PREFIX_V3: &str = "cashuA";

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    #[serde(serialize_with = "serialize_url", deserialize_with = "deserialize_url")]
    pub mint: Option<Url>,
    pub proofs: Proofs,
}

fn deserialize_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let url_str: Option<String> = Option::deserialize(deserializer)?;
    url_str.map_or_else(
        || Ok(None),
        |s| Url::parse(&s).map_err(serde::de::Error::custom).map(Some),
    )
}

fn serialize_url<S>(url: &Option<Url>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match url {
        Some(url) => {
            let mut url_str = url.as_str().to_owned();
            if url_str.ends_with('/') {
                url_str.pop();
            }
            serializer.serialize_str(&url_str)
        }
        None => serializer.serialize_none(),
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenV3 {
    #[serde(rename = "token")]
    pub tokens: Vec<Token>,
    pub unit: Option<CurrencyUnit>,
    pub memo: Option<String>,
}

impl TokenV3 {
    pub fn new(token: Token) -> Self {
        Self {
            tokens: vec![token],
            memo: None,
            unit: None,
        }
    }

    pub const fn empty() -> Self {
        Self {
            tokens: vec![],
            memo: None,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: CurrencyUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn total_amount(&self) -> u64 {
        self.tokens
            .iter()
            .fold(0, |acc: u64, token| acc.saturating_add(token.proofs.total_amount()))
    }

    /// Total amount of the token or `None` if the proof amounts overflow.
    pub fn checked_total_amount(&self) -> Option<u64> {
        self.tokens.iter().try_fold(0u64, |acc, token| {
            acc.checked_add(token.proofs.checked_total_amount()?)
        })
    }

    pub fn proofs(&self) -> Proofs {
        self.tokens
            .iter()
            .flat_map(|token| token.proofs.iter().cloned())
            .collect()
    }

    pub fn serialize(&self) -> Result<String, CashletCoreError> {
        let json = serde_json::to_string(&self)?;
        Ok(format!(
            "{}{}",
            TOKEN_PREFIX_V3,
            general_purpose::URL_SAFE.encode(json.as_bytes())
        ))
    }

    pub fn deserialize(data: impl Into<String>) -> Result<Self, CashletCoreError> {
        let data = data.into();
        let token = data
            .trim()
            .strip_prefix(TOKEN_PREFIX_V3)
            .ok_or(CashletCoreError::InvalidTokenPrefix)?;

        let json = general_purpose::URL_SAFE_NO_PAD
            .decode(token.as_bytes())
            .or_else(|_| general_purpose::URL_SAFE.decode(token.as_bytes()))
            .map_err(|_| CashletCoreError::InvalidToken)?;

        Ok(serde_json::from_slice::<Self>(&json)?)
    }

    pub fn mint(&self) -> Option<Url> {
        self.tokens
            .first()
            .and_then(|token| token.mint.as_ref())
            .map(|url| url.to_owned())
    }
}

impl TryFrom<TokenV3> for String {
    type Error = CashletCoreError;

    fn try_from(token: TokenV3) -> Result<Self, Self::Error> {
        token.serialize()
    }
}

impl TryFrom<String> for TokenV3 {
    type Error = CashletCoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::deserialize(value)
    }
}

impl FromStr for TokenV3 {
    type Err = CashletCoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialize(s)
    }
}

impl From<(Url, Proofs)> for TokenV3 {
    fn from(from: (Url, Proofs)) -> Self {
        Self::new(Token {
            mint: Some(from.0),
            proofs: from.1,
        })
    }
}
