//! ─── Askee Protocol Constants ───────────────────────────────────────────────
//!
//! Base unit: milli-credit (mCC). 1 credit = 1000 mCC.

// ── Consent tokens ────────────────────────────────────────────────────────────

/// Maximum number of simultaneously-active consent tokens per user.
pub const MAX_TOKENS_PER_USER: usize = 10;

/// Minimum token duration (hours).
pub const MIN_TOKEN_DURATION_HOURS: u32 = 1;

/// Maximum token duration (hours). 720h = 30 days.
pub const MAX_TOKEN_DURATION_HOURS: u32 = 720;

/// Revoked-token retention window before a cleanup pass may forget them.
pub const REVOKED_TOKEN_RETENTION_SECS: i64 = 24 * 3600;

/// Minimum permitted CPU limit percentage on a consent token.
pub const MIN_CPU_LIMIT_PERCENT: u32 = 0;
/// Maximum permitted CPU limit percentage on a consent token.
pub const MAX_CPU_LIMIT_PERCENT: u32 = 100;

// ── Protocol header / admission ──────────────────────────────────────────────

/// Freshness window for protocol headers (milliseconds).
pub const FRESHNESS_WINDOW_MS: i64 = 300_000;

/// Maximum workload execution duration the gate will admit (seconds).
pub const MAX_WORKLOAD_DURATION_SECS: u64 = 3_600;

// ── Base rates ────────────────────────────────────────────────────────────────

/// Default per-resource base rates, expressed in mCC per unit per second.
///
/// The source expresses these as mCC per unit per *hour*; they are converted
/// once at load time (divide by 3600) rather than carried as a per-hour rate
/// through the billing path.
pub const DEFAULT_CPU_RATE_MCC_PER_HOUR: u64 = 10;
pub const DEFAULT_RAM_RATE_MCC_PER_HOUR: u64 = 5;
pub const DEFAULT_STORAGE_RATE_MCC_PER_HOUR: u64 = 1;
pub const DEFAULT_BANDWIDTH_RATE_MCC_PER_HOUR: u64 = 2;

// ── Priority multipliers (workload pricing) ──────────────────────────────────

pub const PRIORITY_MULTIPLIER_LOW: f64 = 1.0;
pub const PRIORITY_MULTIPLIER_MEDIUM: f64 = 1.5;
pub const PRIORITY_MULTIPLIER_HIGH: f64 = 2.0;
pub const PRIORITY_MULTIPLIER_CRITICAL: f64 = 3.0;

/// Workload pricing base rates (§4.E): mCC per CPU-second, per resident MB,
/// per generated token. Distinct from [`crate::rates::BaseRates`], which
/// prices consent-token resource reservations rather than completed workloads.
pub const WORKLOAD_CPU_RATE_MCC_PER_SECOND: f64 = 1.0;
pub const WORKLOAD_MEMORY_RATE_MCC_PER_MB: f64 = 0.01;
pub const WORKLOAD_TOKEN_RATE_MCC_PER_TOKEN: f64 = 0.05;

// ── Agent reputation ──────────────────────────────────────────────────────────

pub const REPUTATION_MIN: i32 = 0;
pub const REPUTATION_MAX: i32 = 100;
pub const REPUTATION_DELTA_SUCCESS: i32 = 1;
pub const REPUTATION_DELTA_FAILURE: i32 = -2;

// ── Agent authorization tiers ─────────────────────────────────────────────────

pub const TIER_BASIC_MAX_CONCURRENT: u32 = 1;
pub const TIER_BASIC_CREDIT_LIMIT_CREDITS: u128 = 1_000;

pub const TIER_ADVANCED_MAX_CONCURRENT: u32 = 3;
pub const TIER_ADVANCED_CREDIT_LIMIT_CREDITS: u128 = 5_000;

pub const TIER_EXPERT_MAX_CONCURRENT: u32 = 5;
pub const TIER_EXPERT_CREDIT_LIMIT_CREDITS: u128 = 15_000;

pub const TIER_ADMIN_MAX_CONCURRENT: u32 = 10;
pub const TIER_ADMIN_CREDIT_LIMIT_CREDITS: u128 = 50_000;

/// 1 credit = 1000 mCC.
pub const MCC_PER_CREDIT: u128 = 1_000;

/// Wildcard model id permitted for the admin tier.
pub const WILDCARD_MODEL_ID: &str = "*";
