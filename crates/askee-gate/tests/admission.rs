use std::collections::BTreeMap;

use askee_consent::{ConsentManager, TokenRequest};
use askee_crypto::canonical_bytes;
use askee_crypto::keypair::{KeyPair, SignatureBytes};
use askee_discovery::{encode_signal, Channel, DiscoverySignalPayload, InvitationStore};
use askee_gate::{AgentRegistration, Gate, GateError, HeaderSigningPayload, Priority, ProtocolHeader, WorkloadRequest};
use askee_ledger::Ledger;
use askee_policy::tiers::AgentTier;
use askee_policy::{Policy, ResourceKind};

fn signed_header(agent_id: &str, network_id: &str, timestamp_ms: i64, signer: &KeyPair) -> ProtocolHeader {
    let mut header = ProtocolHeader {
        version: 1,
        network_id: network_id.to_string(),
        request_id: "req-s5".to_string(),
        timestamp_ms,
        node_id: "node-1".to_string(),
        agent_id: agent_id.to_string(),
        nonce: "nonce-1".to_string(),
        signature: SignatureBytes([0u8; 64]),
    };
    let bytes = canonical_bytes(&HeaderSigningPayload::from(&header)).unwrap();
    header.signature = signer.sign(&bytes);
    header
}

fn request(agent_id: &str, model_id: &str, signer: &KeyPair, timestamp_ms: i64) -> WorkloadRequest {
    WorkloadRequest {
        header: signed_header(agent_id, "askee-mainnet", timestamp_ms, signer),
        model_id: model_id.to_string(),
        task_type: "ml_training".to_string(),
        required_resources: BTreeMap::new(),
        max_execution_time_ms: 60_000,
        priority: Priority::Low,
        consent_token_id: None,
    }
}

/// S5 — admission gate composed: each predicate failure surfaces distinctly
/// and in pipeline order.
#[test]
fn s5_admission_gate_composed() {
    let mut policy = Policy::default();
    policy.require_consent_token = false;
    let gate = Gate::new(policy, KeyPair::generate().public_key);
    let ledger = Ledger::new();
    let consent = ConsentManager::new();
    let signer = KeyPair::generate();

    // Stale timestamp -> HEADER_INVALID, before the agent is even looked up.
    let stale = request("agent-1", "mini-text-v1", &signer, 0);
    assert_eq!(
        gate.admit(&stale, &consent, &ledger, 400_000).unwrap_err(),
        GateError::HeaderInvalid
    );

    // Fresh header, unknown agent -> AGENT_UNKNOWN.
    let fresh_unknown = request("agent-1", "mini-text-v1", &signer, 1_000);
    assert_eq!(
        gate.admit(&fresh_unknown, &consent, &ledger, 1_000).unwrap_err(),
        GateError::AgentUnknown
    );

    // Registered agent lacking model access -> MODEL_UNAUTHORIZED.
    gate.registry()
        .register(AgentRegistration::from_tier("agent-1", "alice", signer.public_key.clone(), AgentTier::Basic, 0));
    let wrong_model = request("agent-1", "llm-8b-instruct", &signer, 1_000);
    assert_eq!(
        gate.admit(&wrong_model, &consent, &ledger, 1_000).unwrap_err(),
        GateError::ModelUnauthorized
    );

    // Everything else passes but balance is below the policy floor ->
    // INSUFFICIENT_CREDITS. Alice never received an award.
    let mut funded_policy = Policy::default();
    funded_policy.require_consent_token = false;
    funded_policy.minimum_balance_mcc = 1;
    let gate = Gate::new(funded_policy, KeyPair::generate().public_key);
    gate.registry()
        .register(AgentRegistration::from_tier("agent-1", "alice", signer.public_key.clone(), AgentTier::Basic, 0));
    let ok_model = request("agent-1", "mini-text-v1", &signer, 1_000);
    assert_eq!(
        gate.admit(&ok_model, &consent, &ledger, 1_000).unwrap_err(),
        GateError::InsufficientCredits
    );
}

/// S1 through the gate, with the default `require_consent_token = true`:
/// a token issued and signed by the node's issuer key validates at step 5,
/// which checks the token against the issuer's key rather than the
/// requesting agent's.
#[test]
fn consent_token_issued_by_node_validates_through_the_gate() {
    let issuer = KeyPair::generate();
    let policy = Policy::default();
    assert!(policy.require_consent_token);
    let gate = Gate::new(policy, issuer.public_key.clone());
    let ledger = Ledger::new();
    let consent = ConsentManager::new();
    let invitations = InvitationStore::new();
    let signer = KeyPair::generate();

    gate.registry()
        .register(AgentRegistration::from_tier("agent-1", "alice", signer.public_key.clone(), AgentTier::Basic, 0));
    ledger.award(askee_crypto::hash::UserHash::of_user_id("alice"), 1_000_000, 0).unwrap();

    let alice_key = KeyPair::generate();
    let signal = encode_signal(&DiscoverySignalPayload {
        user_id: "alice".to_string(),
        channel: Channel::Dns,
        public_key: alice_key.public_key,
        timestamp: 0,
    })
    .unwrap();
    invitations
        .verify_signal("alice", Channel::Dns, &signal, &issuer, 0, None)
        .unwrap();

    let mut permissions = BTreeMap::new();
    permissions.insert("ml_training".to_string(), true);
    let mut limits = BTreeMap::new();
    limits.insert(ResourceKind::Cpu, 50);
    limits.insert(ResourceKind::Ram, 2048);
    limits.insert(ResourceKind::Storage, 10);
    limits.insert(ResourceKind::Bandwidth, 100);
    let token = consent
        .issue(
            TokenRequest {
                user_id: "alice".to_string(),
                requested_permissions: permissions,
                requested_limits: limits,
                duration_hours: 24,
                verification_channel: Channel::Dns,
            },
            &invitations,
            &issuer,
            0,
        )
        .unwrap();

    let mut req = request("agent-1", "mini-text-v1", &signer, 1_000);
    req.consent_token_id = Some(token.token_id.clone());

    let workload = gate.admit(&req, &consent, &ledger, 1_000).unwrap();
    assert_eq!(workload.agent_id, "agent-1");
}
