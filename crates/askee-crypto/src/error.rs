use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("malformed key: expected {expected} bytes, got {got}")]
    MalformedKey { expected: usize, got: usize },

    #[error("canonicalization error: {0}")]
    CanonicalizationError(String),
}
