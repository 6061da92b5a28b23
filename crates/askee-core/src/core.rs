use askee_consent::{ConsentManager, ConsentToken, TokenRequest};
use askee_crypto::hash::UserHash;
use askee_crypto::keypair::KeyPair;
use askee_discovery::{Channel, InvitationStore, VerifiedInvitation};
use askee_gate::{AgentRegistration, Executor, Gate, Workload, WorkloadMetrics, WorkloadRequest};
use askee_ledger::{AccountProjection, Ledger};
use askee_policy::Policy;

use crate::error::CoreError;

/// Wires the ledger, discovery, consent, and gate components behind a
/// single owned handle (Design Notes §9: "instantiate a `Core` and pass it
/// explicitly" — no process-level singletons).
pub struct Core {
    ledger: Ledger,
    invitations: InvitationStore,
    consent: ConsentManager,
    gate: Gate,
    issuer: KeyPair,
}

impl Core {
    /// Build a fresh in-memory `Core`. `issuer` signs invitations and
    /// consent tokens on this node's behalf.
    pub fn new(policy: Policy, issuer: KeyPair) -> Self {
        let gate = Gate::new(policy, issuer.public_key.clone());
        Self {
            ledger: Ledger::new(),
            invitations: InvitationStore::new(),
            consent: ConsentManager::new(),
            gate,
            issuer,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn issuer_public_key(&self) -> askee_crypto::keypair::PublicKeyBytes {
        self.issuer.public_key.clone()
    }

    // ── Ledger (§4.B) ────────────────────────────────────────────────────

    pub fn award(&self, user_id: &str, amount_mcc: u128, now: i64) -> Result<(), CoreError> {
        self.ledger.award(UserHash::of_user_id(user_id), amount_mcc, now)?;
        Ok(())
    }

    pub fn balance(&self, user_id: &str) -> AccountProjection {
        self.ledger.balance(&UserHash::of_user_id(user_id))
    }

    pub fn assert_conservation(&self) {
        self.ledger.assert_conservation();
    }

    // ── Discovery (§4.C) ─────────────────────────────────────────────────

    pub fn verify_invitation(
        &self,
        user_id: &str,
        channel: Channel,
        signal: &str,
        now_ms: i64,
    ) -> Result<Option<VerifiedInvitation>, CoreError> {
        let freshness_window_ms = Some(self.gate.policy().freshness_window_ms);
        Ok(self
            .invitations
            .verify_signal(user_id, channel, signal, &self.issuer, now_ms, freshness_window_ms)?)
    }

    // ── Consent (§4.D) ───────────────────────────────────────────────────

    pub fn issue_consent_token(&self, request: TokenRequest, now: i64) -> Result<ConsentToken, CoreError> {
        Ok(self.consent.issue(request, &self.invitations, &self.issuer, now)?)
    }

    pub fn revoke_consent_token(&self, token_id: &str, now: i64) -> bool {
        self.consent.revoke(token_id, now)
    }

    pub fn consent_cleanup(&self, now: i64) {
        self.consent.cleanup(now);
    }

    // ── Gate (§4.E) ──────────────────────────────────────────────────────

    pub fn register_agent(&self, registration: AgentRegistration) {
        self.gate.registry().register(registration);
    }

    pub fn admit_workload(&self, request: &WorkloadRequest, now_ms: i64) -> Result<Workload, CoreError> {
        Ok(self.gate.admit(request, &self.consent, &self.ledger, now_ms)?)
    }

    pub async fn execute_workload(
        &self,
        workload: Workload,
        executor: &dyn Executor,
        now: i64,
    ) -> Result<(String, WorkloadMetrics), CoreError> {
        Ok(self.gate.execute(workload, executor, &self.ledger, now).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askee_discovery::{encode_signal, DiscoverySignalPayload};
    use askee_policy::tiers::AgentTier;
    use std::collections::BTreeMap;

    #[test]
    fn award_verify_issue_round_trip() {
        let issuer = KeyPair::generate();
        let core = Core::new(Policy::default(), issuer);

        core.award("alice", 100_000, 0).unwrap();
        assert_eq!(core.balance("alice").total_mcc, 100_000);

        let user_key = KeyPair::generate();
        let signal = encode_signal(&DiscoverySignalPayload {
            user_id: "alice".to_string(),
            channel: Channel::Dns,
            public_key: user_key.public_key,
            timestamp: 0,
        })
        .unwrap();
        let verified = core.verify_invitation("alice", Channel::Dns, &signal, 0).unwrap();
        assert!(verified.is_some());

        let mut permissions = BTreeMap::new();
        permissions.insert("ml_training".to_string(), true);
        let mut limits = BTreeMap::new();
        limits.insert(askee_policy::ResourceKind::Cpu, 50);
        let request = TokenRequest {
            user_id: "alice".to_string(),
            requested_permissions: permissions,
            requested_limits: limits,
            duration_hours: 24,
            verification_channel: Channel::Dns,
        };
        let token = core.issue_consent_token(request, 0).unwrap();
        assert!(token.is_active(0));
    }

    #[tokio::test]
    async fn agent_registration_and_admission() {
        let issuer = KeyPair::generate();
        let mut policy = Policy::default();
        policy.require_consent_token = false;
        let core = Core::new(policy, issuer);
        core.award("alice", 1_000_000, 0).unwrap();

        let agent_key = KeyPair::generate();
        core.register_agent(AgentRegistration::from_tier(
            "agent-1",
            "alice",
            agent_key.public_key.clone(),
            AgentTier::Basic,
            0,
        ));

        let mut header = askee_gate::ProtocolHeader {
            version: 1,
            network_id: core.gate().policy().network_id.clone(),
            request_id: "req-1".to_string(),
            timestamp_ms: 1_000,
            node_id: "node-1".to_string(),
            agent_id: "agent-1".to_string(),
            nonce: "nonce".to_string(),
            signature: askee_crypto::keypair::SignatureBytes([0u8; 64]),
        };
        let signing_bytes =
            askee_crypto::canonical_bytes(&askee_gate::HeaderSigningPayload::from(&header)).unwrap();
        header.signature = agent_key.sign(&signing_bytes);

        let request = WorkloadRequest {
            header,
            model_id: "mini-text-v1".to_string(),
            task_type: "ml_training".to_string(),
            required_resources: BTreeMap::new(),
            max_execution_time_ms: 60_000,
            priority: askee_gate::Priority::Low,
            consent_token_id: None,
        };
        let workload = core.admit_workload(&request, 1_000).unwrap();
        assert_eq!(workload.agent_id, "agent-1");
        core.assert_conservation();
    }
}
