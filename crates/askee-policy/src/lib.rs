pub mod constants;
pub mod model_acl;
pub mod policy;
pub mod rates;
pub mod tiers;

pub use constants::{
    FRESHNESS_WINDOW_MS, MAX_CPU_LIMIT_PERCENT, MAX_TOKENS_PER_USER, MAX_TOKEN_DURATION_HOURS,
    MAX_WORKLOAD_DURATION_SECS, MCC_PER_CREDIT, MIN_CPU_LIMIT_PERCENT, MIN_TOKEN_DURATION_HOURS,
    PRIORITY_MULTIPLIER_CRITICAL, PRIORITY_MULTIPLIER_HIGH, PRIORITY_MULTIPLIER_LOW,
    PRIORITY_MULTIPLIER_MEDIUM, REPUTATION_DELTA_FAILURE, REPUTATION_DELTA_SUCCESS,
    REPUTATION_MAX, REPUTATION_MIN, REVOKED_TOKEN_RETENTION_SECS, WILDCARD_MODEL_ID,
    WORKLOAD_CPU_RATE_MCC_PER_SECOND, WORKLOAD_MEMORY_RATE_MCC_PER_MB,
    WORKLOAD_TOKEN_RATE_MCC_PER_TOKEN,
};
pub use model_acl::{AccessLevel, ModelAcl, ModelAclEntry, RateLimits};
pub use policy::{AlertThresholds, Policy};
pub use rates::{BaseRates, ResourceKind, UnitKind, ALL_RESOURCE_KINDS};
pub use tiers::{allowed_models_includes, AgentTier};
