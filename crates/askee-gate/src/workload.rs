use std::collections::BTreeMap;

use askee_policy::constants::{
    PRIORITY_MULTIPLIER_CRITICAL, PRIORITY_MULTIPLIER_HIGH, PRIORITY_MULTIPLIER_LOW,
    PRIORITY_MULTIPLIER_MEDIUM,
};
use askee_policy::rates::ResourceKind;
use serde::{Deserialize, Serialize};

use crate::header::ProtocolHeader;

/// Scheduling priority, carrying a pricing multiplier (§4.E).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn multiplier(&self) -> f64 {
        match self {
            Priority::Low => PRIORITY_MULTIPLIER_LOW,
            Priority::Medium => PRIORITY_MULTIPLIER_MEDIUM,
            Priority::High => PRIORITY_MULTIPLIER_HIGH,
            Priority::Critical => PRIORITY_MULTIPLIER_CRITICAL,
        }
    }
}

/// An inbound workload admission request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkloadRequest {
    pub header: ProtocolHeader,
    pub model_id: String,
    pub task_type: String,
    pub required_resources: BTreeMap<ResourceKind, u64>,
    pub max_execution_time_ms: u64,
    pub priority: Priority,
    pub consent_token_id: Option<String>,
}

/// A workload admitted into `active_workloads`, pending execution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Workload {
    pub request_id: String,
    pub agent_id: String,
    pub owner_user_id: String,
    pub model_id: String,
    pub priority: Priority,
    pub admitted_at: i64,
}

/// Metrics reported by the executor after a workload completes.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct WorkloadMetrics {
    pub exec_seconds: f64,
    pub memory_mb: f64,
    pub tokens_generated: u64,
    pub success: bool,
}

/// A terminal record kept in the gate's workload history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub request_id: String,
    pub agent_id: String,
    pub success: bool,
    pub cost_mcc: u128,
    pub completed_at: i64,
}
