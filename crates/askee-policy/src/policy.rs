use serde::{Deserialize, Serialize};

use crate::constants::{
    FRESHNESS_WINDOW_MS, MAX_TOKEN_DURATION_HOURS, MAX_TOKENS_PER_USER,
    MAX_WORKLOAD_DURATION_SECS, MIN_TOKEN_DURATION_HOURS,
};
use crate::model_acl::ModelAcl;
use crate::rates::BaseRates;

/// Optional alerting thresholds for reputation and latency escalation.
/// Not consulted by the admission pipeline itself — a diagnostics/ops
/// concern layered on top.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub reputation_floor: i32,
    pub latency_escalation_ms: u64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            reputation_floor: 20,
            latency_escalation_ms: 30_000,
        }
    }
}

/// The configuration object consulted by every other component.
///
/// Pure data; no I/O. A binary (e.g. `askee-cli`) loads this from a JSON
/// file via `serde_json` and passes it in explicitly — no singleton.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Policy {
    pub base_rates: BaseRates,
    pub minimum_balance_mcc: u128,
    pub deposit_required_mcc: u128,
    pub freshness_window_ms: i64,
    pub max_workload_duration_s: u64,
    pub max_tokens_per_user: usize,
    pub min_token_duration_hours: u32,
    pub max_token_duration_hours: u32,
    pub model_acl: ModelAcl,
    pub alert_thresholds: Option<AlertThresholds>,
    /// Whether the gate requires a consent token at all (§4.E step 5).
    pub require_consent_token: bool,
    /// Whether diagnostic (predicate-revealing) error detail is enabled.
    /// Must be `false` in production builds per the error-handling design.
    pub diagnostics: bool,
    /// Expected network id for header validation (§4.E step 1).
    pub network_id: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            base_rates: BaseRates::default(),
            minimum_balance_mcc: 0,
            deposit_required_mcc: 0,
            freshness_window_ms: FRESHNESS_WINDOW_MS,
            max_workload_duration_s: MAX_WORKLOAD_DURATION_SECS,
            max_tokens_per_user: MAX_TOKENS_PER_USER,
            min_token_duration_hours: MIN_TOKEN_DURATION_HOURS,
            max_token_duration_hours: MAX_TOKEN_DURATION_HOURS,
            model_acl: ModelAcl::default(),
            alert_thresholds: None,
            require_consent_token: true,
            diagnostics: false,
            network_id: "askee-mainnet".to_string(),
        }
    }
}
