use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Visibility level for a model, gating §4.E rule 6 (model ACL).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Any agent on an authorized network may invoke the model.
    Public,
    /// Only agents named in `authorized_agents` may invoke it.
    Restricted,
    /// Same gate as `Restricted`; kept distinct for policy readability.
    Private,
}

impl AccessLevel {
    pub fn requires_agent_allowlist(&self) -> bool {
        matches!(self, AccessLevel::Restricted | AccessLevel::Private)
    }
}

/// Rate limit counters for a model, checked per `agent_id × model_id`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RateLimits {
    pub per_minute: u32,
    pub per_hour: u32,
    pub per_day: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_minute: 60,
            per_hour: 1_000,
            per_day: 10_000,
        }
    }
}

/// Access-control entry for a single model id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelAclEntry {
    pub authorized_networks: BTreeSet<String>,
    pub access_level: AccessLevel,
    pub authorized_agents: BTreeSet<String>,
    pub rate_limits: RateLimits,
}

impl ModelAclEntry {
    pub fn public(network_id: impl Into<String>) -> Self {
        let mut networks = BTreeSet::new();
        networks.insert(network_id.into());
        Self {
            authorized_networks: networks,
            access_level: AccessLevel::Public,
            authorized_agents: BTreeSet::new(),
            rate_limits: RateLimits::default(),
        }
    }
}

/// `model_id → ModelAclEntry` table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ModelAcl {
    entries: BTreeMap<String, ModelAclEntry>,
}

impl ModelAcl {
    pub fn insert(&mut self, model_id: impl Into<String>, entry: ModelAclEntry) {
        self.entries.insert(model_id.into(), entry);
    }

    pub fn get(&self, model_id: &str) -> Option<&ModelAclEntry> {
        self.entries.get(model_id)
    }
}
