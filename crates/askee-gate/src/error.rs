use thiserror::Error;

/// One variant per §6 wire error code, in admission-pipeline order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("HEADER_INVALID")]
    HeaderInvalid,

    #[error("NETWORK_MISMATCH")]
    NetworkMismatch,

    #[error("AGENT_UNKNOWN")]
    AgentUnknown,

    #[error("AGENT_BLACKLISTED")]
    AgentBlacklisted,

    #[error("MODEL_UNAUTHORIZED")]
    ModelUnauthorized,

    #[error("CONCURRENCY_LIMIT")]
    ConcurrencyLimit,

    #[error("CONSENT_MISSING")]
    ConsentMissing,

    #[error("CONSENT_INVALID")]
    ConsentInvalid,

    #[error("ACL_DENIED")]
    AclDenied,

    #[error("RATE_LIMIT")]
    RateLimit,

    #[error("INSUFFICIENT_CREDITS")]
    InsufficientCredits,

    #[error("SIGNATURE_INVALID")]
    SignatureInvalid,

    #[error("DURATION_EXCEEDS_POLICY")]
    DurationExceedsPolicy,

    #[error("EXECUTION_FAILED")]
    ExecutionFailed,
}

impl GateError {
    /// The exact wire code string (§6), independent of the `Display`
    /// message (which may be suppressed in production — see `Gate::diagnostics`).
    pub fn wire_code(&self) -> &'static str {
        match self {
            GateError::HeaderInvalid => "HEADER_INVALID",
            GateError::NetworkMismatch => "NETWORK_MISMATCH",
            GateError::AgentUnknown => "AGENT_UNKNOWN",
            GateError::AgentBlacklisted => "AGENT_BLACKLISTED",
            GateError::ModelUnauthorized => "MODEL_UNAUTHORIZED",
            GateError::ConcurrencyLimit => "CONCURRENCY_LIMIT",
            GateError::ConsentMissing => "CONSENT_MISSING",
            GateError::ConsentInvalid => "CONSENT_INVALID",
            GateError::AclDenied => "ACL_DENIED",
            GateError::RateLimit => "RATE_LIMIT",
            GateError::InsufficientCredits => "INSUFFICIENT_CREDITS",
            GateError::SignatureInvalid => "SIGNATURE_INVALID",
            GateError::DurationExceedsPolicy => "DURATION_EXCEEDS_POLICY",
            GateError::ExecutionFailed => "EXECUTION_FAILED",
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("executor failed: {0}")]
    Failed(String),

    #[error("executor timed out after {0}ms")]
    TimedOut(u64),
}
