use thiserror::Error;

/// The union of every component error a `Core` call can surface.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Crypto(#[from] askee_crypto::CryptoError),

    #[error(transparent)]
    Ledger(#[from] askee_ledger::LedgerError),

    #[error(transparent)]
    Discovery(#[from] askee_discovery::DiscoveryError),

    #[error(transparent)]
    Consent(#[from] askee_consent::ConsentError),

    #[error(transparent)]
    Gate(#[from] askee_gate::GateError),
}
