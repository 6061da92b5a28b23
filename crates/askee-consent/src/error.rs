use askee_policy::ResourceKind;
use thiserror::Error;

/// One distinct variant per §4.D precondition/validation rule, so callers
/// and tests can match on exactly which rule failed.
#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("no verified invitation for this user/channel")]
    NoVerifiedInvitation,

    #[error("user already has {active}/{max} active tokens")]
    TooManyActiveTokens { active: usize, max: usize },

    #[error("requested permissions must be non-empty")]
    EmptyPermissions,

    #[error("requested limits must be non-empty")]
    EmptyLimits,

    #[error("CPU limit {got} out of range [0, 100]")]
    CpuLimitOutOfRange { got: u64 },

    #[error("duration {got}h out of range [{min}, {max}]")]
    DurationOutOfRange { got: u32, min: u32, max: u32 },

    #[error("consent token not found")]
    NotFound,

    #[error("consent token is revoked")]
    Revoked,

    #[error("consent token is expired")]
    Expired,

    #[error(transparent)]
    Crypto(#[from] askee_crypto::CryptoError),

    #[error("task type {0} is not permitted by this token")]
    PermissionDenied(String),

    #[error("token resource limit for {resource} is {limit}, task requires {required}")]
    InsufficientResourceLimit {
        resource: ResourceKind,
        limit: u64,
        required: u64,
    },

    #[error("insufficient credits for resource {0}")]
    InsufficientCreditsFor(ResourceKind),

    #[error(transparent)]
    Ledger(#[from] askee_ledger::LedgerError),
}
