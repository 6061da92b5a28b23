//! askee-cli — a scripted, in-memory demo driver for the askee protocol
//! kernel.
//!
//! This binary never opens a socket: the HTTP/WebSocket surface is an
//! explicit non-goal of the protocol kernel. It assembles a `Core` in
//! memory, runs one scripted end-to-end scenario, and logs each step —
//! useful for manual smoke-testing and as a reference for embedding `Core`
//! in a real service.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use askee_core::{
    AgentRegistration, Channel, Core, Policy, Priority, ProtocolHeader, ResourceKind, TokenRequest,
    WorkloadMetrics, WorkloadRequest,
};
use askee_crypto::canonical_bytes;
use askee_crypto::keypair::{KeyPair, SignatureBytes};
use askee_discovery::{encode_signal, DiscoverySignalPayload};
use askee_gate::HeaderSigningPayload;
use askee_policy::tiers::AgentTier;
use async_trait::async_trait;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "askee", version, about = "Askee protocol kernel — scripted demo driver")]
struct Args {
    /// Path to a JSON file overriding default policy values.
    #[arg(long)]
    policy: Option<PathBuf>,
}

struct DemoExecutor;

#[async_trait]
impl askee_gate::Executor for DemoExecutor {
    async fn run(
        &self,
        workload: &askee_core::Workload,
    ) -> Result<(String, WorkloadMetrics), askee_gate::ExecutorError> {
        info!(request_id = %workload.request_id, "executing workload");
        Ok((
            "synthetic output".to_string(),
            WorkloadMetrics { exec_seconds: 12.0, memory_mb: 512.0, tokens_generated: 800, success: true },
        ))
    }
}

fn load_policy(path: Option<&std::path::Path>) -> anyhow::Result<Policy> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(p).with_context(|| format!("reading policy from {}", p.display()))?;
            serde_json::from_str(&json).context("parsing policy JSON")
        }
        None => Ok(Policy::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,askee=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let policy = load_policy(args.policy.as_deref())?;
    info!("askee demo starting");

    let issuer = KeyPair::generate();
    let core = Core::new(policy, issuer);

    // Award alice some credits and verify a DNS invitation.
    core.award("alice", 1_000_000, 0)?;
    info!(balance = core.balance("alice").total_mcc, "alice funded");

    let user_key = KeyPair::generate();
    let signal = encode_signal(&DiscoverySignalPayload {
        user_id: "alice".to_string(),
        channel: Channel::Dns,
        public_key: user_key.public_key,
        timestamp: 0,
    })?;
    core.verify_invitation("alice", Channel::Dns, &signal, 0)?;
    info!("alice's DNS invitation verified");

    // Issue a consent token scoped to ml_training.
    let mut permissions = BTreeMap::new();
    permissions.insert("ml_training".to_string(), true);
    let mut limits = BTreeMap::new();
    limits.insert(ResourceKind::Cpu, 50);
    limits.insert(ResourceKind::Ram, 2048);
    limits.insert(ResourceKind::Storage, 10);
    limits.insert(ResourceKind::Bandwidth, 100);
    let token = core.issue_consent_token(
        TokenRequest {
            user_id: "alice".to_string(),
            requested_permissions: permissions,
            requested_limits: limits,
            duration_hours: 24,
            verification_channel: Channel::Dns,
        },
        0,
    )?;
    info!(token_id = %token.token_id, "consent token issued");

    // Register an agent owned by alice and admit a workload request.
    let agent_key = KeyPair::generate();
    core.register_agent(AgentRegistration::from_tier(
        "agent-1",
        "alice",
        agent_key.public_key.clone(),
        AgentTier::Basic,
        0,
    ));

    let mut header = ProtocolHeader {
        version: 1,
        network_id: core.gate().policy().network_id.clone(),
        request_id: "demo-req-1".to_string(),
        timestamp_ms: 1_000,
        node_id: "demo-node".to_string(),
        agent_id: "agent-1".to_string(),
        nonce: "demo-nonce".to_string(),
        signature: SignatureBytes([0u8; 64]),
    };
    let signing_bytes = canonical_bytes(&HeaderSigningPayload::from(&header))?;
    header.signature = agent_key.sign(&signing_bytes);

    let request = WorkloadRequest {
        header,
        model_id: "mini-text-v1".to_string(),
        task_type: "ml_training".to_string(),
        required_resources: BTreeMap::new(),
        max_execution_time_ms: 60_000,
        priority: Priority::Low,
        consent_token_id: Some(token.token_id.clone()),
    };

    let workload = core.admit_workload(&request, 1_000)?;
    info!(request_id = %workload.request_id, "workload admitted");

    let (output, metrics) = core.execute_workload(workload, &DemoExecutor, 2_000).await?;
    info!(?metrics, output, "workload completed");

    info!(balance = core.balance("alice").total_mcc, "final alice balance");
    core.assert_conservation();
    info!("conservation holds — demo complete");

    Ok(())
}
