use std::collections::HashMap;

use askee_consent::ConsentManager;
use askee_crypto::hash::UserHash;
use askee_crypto::keypair::PublicKeyBytes;
use askee_crypto::{canonical_bytes, verify};
use askee_ledger::Ledger;
use askee_policy::Policy;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::agent::AgentRegistry;
use crate::error::{ExecutorError, GateError};
use crate::executor::Executor;
use crate::header::HeaderSigningPayload;
use crate::pricing::compute_cost_mcc;
use crate::rate_limit::RateLimitTracker;
use crate::workload::{CompletionRecord, Workload, WorkloadMetrics, WorkloadRequest};

/// The workload protocol admission gate (§4.E): an ordered, short-circuiting
/// pipeline that turns a signed request into an admitted `Workload`, then
/// meters and bills its execution.
pub struct Gate {
    policy: Policy,
    issuer_public_key: PublicKeyBytes,
    registry: AgentRegistry,
    rate_limits: RateLimitTracker,
    active_workloads: RwLock<HashMap<String, Workload>>,
    history: RwLock<Vec<CompletionRecord>>,
}

impl Gate {
    /// `issuer_public_key` verifies consent tokens at step 5 — tokens are
    /// signed by the node's issuer key, never by the requesting agent.
    pub fn new(policy: Policy, issuer_public_key: PublicKeyBytes) -> Self {
        Self {
            policy,
            issuer_public_key,
            registry: AgentRegistry::new(),
            rate_limits: RateLimitTracker::new(),
            active_workloads: RwLock::new(HashMap::new()),
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    fn active_count_for(&self, agent_id: &str) -> usize {
        self.active_workloads
            .read()
            .values()
            .filter(|w| w.agent_id == agent_id)
            .count()
    }

    /// Run the nine-step admission pipeline (§4.E), short-circuiting on the
    /// first failing step. On success the workload is inserted into
    /// `active_workloads`.
    #[allow(clippy::too_many_arguments)]
    pub fn admit(
        &self,
        request: &WorkloadRequest,
        consent: &ConsentManager,
        ledger: &Ledger,
        now_ms: i64,
    ) -> Result<Workload, GateError> {
        let result = self.admit_inner(request, consent, ledger, now_ms);
        if let Err(e) = &result {
            // Production builds must not leak which predicate rejected a
            // request (§7); the rejected-step detail is only logged when
            // `Policy::diagnostics` is on.
            if self.policy.diagnostics {
                warn!(request_id = %request.header.request_id, error = %e, "workload admission rejected");
            } else {
                warn!(request_id = %request.header.request_id, "workload admission rejected");
            }
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn admit_inner(
        &self,
        request: &WorkloadRequest,
        consent: &ConsentManager,
        ledger: &Ledger,
        now_ms: i64,
    ) -> Result<Workload, GateError> {
        let header = &request.header;

        // 1. Header well-formed, correct network, fresh.
        if header.network_id != self.policy.network_id {
            return Err(GateError::NetworkMismatch);
        }
        if !header.is_fresh(now_ms, self.policy.freshness_window_ms) {
            return Err(GateError::HeaderInvalid);
        }

        // 2-3. Agent registered, not blacklisted, authorized for the model.
        let agent = self.registry.check_admissible(&header.agent_id, &request.model_id)?;

        // 4. Concurrency limit.
        if self.active_count_for(&agent.agent_id) as u32 >= agent.max_concurrent_workloads {
            return Err(GateError::ConcurrencyLimit);
        }

        // 5. Consent-token presence and (if enabled) full §4.D validation.
        if self.policy.require_consent_token {
            let token_id = request.consent_token_id.as_deref().ok_or(GateError::ConsentMissing)?;
            if consent.get(token_id).is_none() {
                return Err(GateError::ConsentMissing);
            }
            let base_rate = |resource| self.policy.base_rates.rate_per_second(resource);
            consent
                .validate_for_task(
                    token_id,
                    &request.task_type,
                    &request.required_resources,
                    request.max_execution_time_ms,
                    &self.issuer_public_key,
                    ledger,
                    base_rate,
                    now_ms / 1000,
                )
                .map_err(|_| GateError::ConsentInvalid)?;
        }

        // 6. Model ACL: network, access level, rate limits.
        if let Some(acl) = self.policy.model_acl.get(&request.model_id) {
            if !acl.authorized_networks.contains(&header.network_id) {
                return Err(GateError::AclDenied);
            }
            if acl.access_level.requires_agent_allowlist() && !acl.authorized_agents.contains(&header.agent_id) {
                return Err(GateError::AclDenied);
            }
            if !self
                .rate_limits
                .check_and_record(&header.agent_id, &request.model_id, now_ms, &acl.rate_limits)
            {
                return Err(GateError::RateLimit);
            }
        }

        // 7. Solvency.
        let owner_hash = UserHash::of_user_id(&agent.owner_user_id);
        if ledger.balance(&owner_hash).total_mcc < self.policy.minimum_balance_mcc as i128 {
            return Err(GateError::InsufficientCredits);
        }

        // 8. Header signature.
        let signing_bytes =
            canonical_bytes(&HeaderSigningPayload::from(header)).map_err(|_| GateError::SignatureInvalid)?;
        verify(&agent.public_key, &signing_bytes, &header.signature).map_err(|_| GateError::SignatureInvalid)?;

        // 9. Duration within policy.
        if request.max_execution_time_ms > self.policy.max_workload_duration_s * 1000 {
            return Err(GateError::DurationExceedsPolicy);
        }

        self.registry.touch(&agent.agent_id, now_ms);
        let workload = Workload {
            request_id: header.request_id.clone(),
            agent_id: agent.agent_id.clone(),
            owner_user_id: agent.owner_user_id.clone(),
            model_id: request.model_id.clone(),
            priority: request.priority,
            admitted_at: now_ms,
        };
        self.active_workloads.write().insert(workload.request_id.clone(), workload.clone());
        info!(request_id = %workload.request_id, agent_id = %workload.agent_id, "workload admitted");
        Ok(workload)
    }

    /// Run an admitted workload to completion: invoke the executor, price
    /// its metrics, charge the owner's account, update agent reputation,
    /// and retire the workload from the active set (§4.E "Execution &
    /// accounting").
    pub async fn execute(
        &self,
        workload: Workload,
        executor: &dyn Executor,
        ledger: &Ledger,
        now: i64,
    ) -> Result<(String, WorkloadMetrics), GateError> {
        let result = executor.run(&workload).await;

        let (output, metrics) = match result {
            Ok(ok) => ok,
            Err(err) => {
                self.finish(&workload, false, 0, now);
                return Err(map_executor_error(err));
            }
        };

        let cost_mcc = compute_cost_mcc(&metrics, workload.priority);
        let owner_hash = UserHash::of_user_id(&workload.owner_user_id);
        let billed = if cost_mcc == 0 {
            Ok(())
        } else {
            ledger.spend(owner_hash, cost_mcc, Some(workload.request_id.clone()), now)
        };

        let success = metrics.success && billed.is_ok();
        self.finish(&workload, success, cost_mcc, now);

        if let Err(e) = billed {
            warn!(request_id = %workload.request_id, error = %e, "failed to charge for completed workload");
            return Err(GateError::InsufficientCredits);
        }
        Ok((output, metrics))
    }

    fn finish(&self, workload: &Workload, success: bool, cost_mcc: u128, now: i64) {
        self.active_workloads.write().remove(&workload.request_id);
        let delta = if success {
            askee_policy::REPUTATION_DELTA_SUCCESS
        } else {
            askee_policy::REPUTATION_DELTA_FAILURE
        };
        self.registry.adjust_reputation(&workload.agent_id, delta);
        self.history.write().push(CompletionRecord {
            request_id: workload.request_id.clone(),
            agent_id: workload.agent_id.clone(),
            success,
            cost_mcc,
            completed_at: now,
        });
    }

    pub fn active_workload_count(&self) -> usize {
        self.active_workloads.read().len()
    }

    pub fn history(&self) -> Vec<CompletionRecord> {
        self.history.read().clone()
    }
}

fn map_executor_error(err: ExecutorError) -> GateError {
    match err {
        ExecutorError::Failed(_) | ExecutorError::TimedOut(_) => GateError::ExecutionFailed,
    }
}
