use cashlet_core::{primitives::CurrencyUnit, proof::Proofs};
use lightning_invoice::ParseOrSemanticError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Mint unreachable - {0}")]
    MintUnreachable(String),

    #[error("Mint has no active keyset for unit {0}")]
    NoMatchingKeyset(CurrencyUnit),

    #[error("Quote not paid yet - {0}")]
    QuoteNotPaid(String),

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("Redemption failed - {0}")]
    RedemptionFailed(String),

    #[error(
        "Claimed {}, {} proofs worth {} could not be redeemed",
        .redeemed.total_amount(),
        .failed.len(),
        .failed.total_amount()
    )]
    PartialFailure { redeemed: Proofs, failed: Proofs },

    #[error("Invalid token - {0}")]
    DecodeError(String),

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("No mint connected. Connect a mint first")]
    NoMintSession,

    #[error("Polling for the quote payment was cancelled")]
    PollCancelled,

    #[error("Quote was not paid after {0} attempts")]
    PollLimitReached(u32),

    #[error("Mint accepted the inputs but returned unusable outputs - {0}")]
    InputsSpent(String),

    #[error("Mint error {code} - {detail}")]
    MintError { code: u64, detail: String },

    #[error("UnexpectedResponse - {0}")]
    UnexpectedResponse(String),

    #[error("Pubkey for amount {0} not found in keyset")]
    PubkeyNotFound(u64),

    #[error("Failed to decode payment request {0} - Error {1}")]
    DecodeInvoice(String, ParseOrSemanticError),

    #[error("WalletBuilder: {0} is required")]
    MissingBuilderField(&'static str),

    #[error("SerdeJsonError - {0}")]
    Json(#[from] serde_json::Error),

    #[error("ReqwestError - {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("InvalidHeaderValueError - {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error("CashletCoreError - {0}")]
    CashletCore(#[from] cashlet_core::error::CashletCoreError),

    #[error("DB Error {0}")]
    Db(#[from] sqlx::Error),

    #[error("Migrate Error {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("URLParseError - {0}")]
    Url(#[from] url::ParseError),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("IO Error {0}")]
    Io(#[from] std::io::Error),
}

impl WalletError {
    /// Maps errors reported by the mint to `RedemptionFailed`, so callers can tell a rejection
    /// apart from a missing local balance or an unreachable mint.
    pub fn into_redemption_error(self) -> Self {
        match self {
            Self::MintError { detail, .. } => Self::RedemptionFailed(detail),
            other => other,
        }
    }
}
