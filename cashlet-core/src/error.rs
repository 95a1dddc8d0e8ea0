use base64::DecodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CashletCoreError {
    #[error("Secp256k1Error {0}")]
    Secp256k1Error(#[from] secp256k1::Error),

    #[error("InvalidTokenType")]
    InvalidTokenPrefix,

    #[error("InvalidToken")]
    InvalidToken,

    #[error("Base64DecodeError {0}")]
    Base64DecodeError(#[from] DecodeError),

    #[error("SerdeJsonError {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("No valid curve point found for message")]
    NoValidPoint,
}
