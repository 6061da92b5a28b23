use async_trait::async_trait;

use crate::error::ExecutorError;
use crate::workload::{Workload, WorkloadMetrics};

/// The external workload-execution surface (§4.E: "the component does not
/// itself execute"). The gate depends only on this capability, never on a
/// concrete runtime (Design Notes §9).
#[async_trait]
pub trait Executor: Send + Sync {
    async fn run(&self, workload: &Workload) -> Result<(String, WorkloadMetrics), ExecutorError>;
}
