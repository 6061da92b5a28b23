use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("malformed discovery signal: {0}")]
    MalformedSignal(String),

    #[error("discovery signal hash mismatch")]
    HashMismatch,

    #[error("discovery signal is stale")]
    Stale,

    #[error("signal user/channel does not match the requested invitation")]
    Mismatch,

    #[error(transparent)]
    Crypto(#[from] askee_crypto::CryptoError),

    #[error("transport error: {0}")]
    Transport(String),
}
