use std::collections::{BTreeSet, HashMap};

use askee_crypto::keypair::PublicKeyBytes;
use askee_policy::tiers::AgentTier;
use askee_policy::constants::{REPUTATION_MAX, REPUTATION_MIN};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// A registered workload-executing agent, owned by a human user who foots
/// the bill (§3 — credits are charged to `owner_user_id`, never the agent).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentRegistration {
    pub agent_id: String,
    pub owner_user_id: String,
    pub public_key: PublicKeyBytes,
    pub allowed_models: BTreeSet<String>,
    pub max_concurrent_workloads: u32,
    pub credit_limit_mcc: u128,
    pub reputation: i32,
    pub last_seen: i64,
    pub blacklisted: bool,
    pub tier: AgentTier,
}

impl AgentRegistration {
    /// Build a registration from an authorization tier, taking the tier's
    /// default allowed-model set, concurrency cap, and credit limit.
    pub fn from_tier(
        agent_id: impl Into<String>,
        owner_user_id: impl Into<String>,
        public_key: PublicKeyBytes,
        tier: AgentTier,
        now: i64,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            owner_user_id: owner_user_id.into(),
            public_key,
            allowed_models: tier.allowed_models().into_iter().collect(),
            max_concurrent_workloads: tier.max_concurrent_workloads(),
            credit_limit_mcc: tier.credit_limit_mcc(),
            reputation: REPUTATION_MAX,
            last_seen: now,
            blacklisted: false,
            tier,
        }
    }

    /// Does this agent's allowed-model set cover `model_id`? The wildcard
    /// `"*"` (admin tier) matches any model.
    pub fn allows_model(&self, model_id: &str) -> bool {
        self.allowed_models.contains(model_id) || self.allowed_models.contains("*")
    }
}

/// Registered agents, keyed by `agent_id`. No direct pointers between
/// records; look-ups are always by id (§9 design notes).
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<String, AgentRegistration>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, registration: AgentRegistration) {
        self.agents
            .write()
            .insert(registration.agent_id.clone(), registration);
    }

    pub fn remove(&self, agent_id: &str) {
        self.agents.write().remove(agent_id);
    }

    pub fn get(&self, agent_id: &str) -> Option<AgentRegistration> {
        self.agents.read().get(agent_id).cloned()
    }

    pub fn is_registered(&self, agent_id: &str) -> bool {
        self.agents.read().contains_key(agent_id)
    }

    pub fn set_blacklisted(&self, agent_id: &str, blacklisted: bool) {
        if let Some(a) = self.agents.write().get_mut(agent_id) {
            a.blacklisted = blacklisted;
        }
    }

    pub fn touch(&self, agent_id: &str, now: i64) {
        if let Some(a) = self.agents.write().get_mut(agent_id) {
            a.last_seen = now;
        }
    }

    /// Apply a reputation delta, clamped to `[REPUTATION_MIN, REPUTATION_MAX]`.
    pub fn adjust_reputation(&self, agent_id: &str, delta: i32) {
        if let Some(a) = self.agents.write().get_mut(agent_id) {
            a.reputation = (a.reputation + delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
        }
    }

    pub fn active_count(&self) -> usize {
        self.agents.read().values().filter(|a| !a.blacklisted).count()
    }

    /// Registered agents ranked by reputation descending.
    pub fn ranked(&self) -> Vec<AgentRegistration> {
        let mut list: Vec<_> = self.agents.read().values().cloned().collect();
        list.sort_by(|a, b| b.reputation.cmp(&a.reputation));
        list
    }

    /// Steps 2–3 of the admission pipeline: registered, not blacklisted,
    /// and authorized for `model_id`.
    pub fn check_admissible(&self, agent_id: &str, model_id: &str) -> Result<AgentRegistration, GateError> {
        let agent = self.get(agent_id).ok_or(GateError::AgentUnknown)?;
        if agent.blacklisted {
            return Err(GateError::AgentBlacklisted);
        }
        if !agent.allows_model(model_id) {
            return Err(GateError::ModelUnauthorized);
        }
        Ok(agent)
    }
}
