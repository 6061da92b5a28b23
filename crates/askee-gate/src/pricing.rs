use askee_policy::constants::{
    WORKLOAD_CPU_RATE_MCC_PER_SECOND, WORKLOAD_MEMORY_RATE_MCC_PER_MB,
    WORKLOAD_TOKEN_RATE_MCC_PER_TOKEN,
};

use crate::workload::{Priority, WorkloadMetrics};

/// `cost_mCC = ceil((exec_seconds * cpu_rate + memory_MB * memory_rate +
/// tokens_generated * token_rate) * priority_multiplier)` (§4.E).
pub fn compute_cost_mcc(metrics: &WorkloadMetrics, priority: Priority) -> u128 {
    let raw = metrics.exec_seconds * WORKLOAD_CPU_RATE_MCC_PER_SECOND
        + metrics.memory_mb * WORKLOAD_MEMORY_RATE_MCC_PER_MB
        + metrics.tokens_generated as f64 * WORKLOAD_TOKEN_RATE_MCC_PER_TOKEN;
    let priced = (raw * priority.multiplier()).ceil();
    if priced <= 0.0 {
        0
    } else {
        priced as u128
    }
}
