use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    DEFAULT_BANDWIDTH_RATE_MCC_PER_HOUR, DEFAULT_CPU_RATE_MCC_PER_HOUR,
    DEFAULT_RAM_RATE_MCC_PER_HOUR, DEFAULT_STORAGE_RATE_MCC_PER_HOUR,
};

/// A consent-token resource dimension: `{CPU, RAM, Storage, Bandwidth}`.
///
/// Distinct from [`UnitKind`] — `ResourceKind` bounds what a consent token
/// *authorizes*, `UnitKind` is what a completed task *actually metered*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ResourceKind {
    #[serde(rename = "CPU")]
    Cpu,
    Ram,
    Storage,
    Bandwidth,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResourceKind::Cpu => "CPU",
            ResourceKind::Ram => "RAM",
            ResourceKind::Storage => "Storage",
            ResourceKind::Bandwidth => "Bandwidth",
        };
        write!(f, "{s}")
    }
}

pub const ALL_RESOURCE_KINDS: [ResourceKind; 4] = [
    ResourceKind::Cpu,
    ResourceKind::Ram,
    ResourceKind::Storage,
    ResourceKind::Bandwidth,
];

/// A metering unit recorded against completed ledger entries:
/// `{NCU_s, GCU_s, IO_GB}` — normalized-compute-unit-seconds,
/// GPU-compute-unit-seconds, and gigabytes of I/O.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    #[serde(rename = "NCU_s")]
    NcuS,
    #[serde(rename = "GCU_s")]
    GcuS,
    #[serde(rename = "IO_GB")]
    IoGb,
}

/// Per-resource base rates in mCC per unit per second.
///
/// The spec's source data expresses these per unit per *hour*; [`BaseRates::from_hourly`]
/// performs the one-time conversion at load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BaseRates {
    rates: BTreeMap<ResourceKind, f64>,
}

impl BaseRates {
    /// Build base rates from per-hour mCC figures, converting once to per-second.
    pub fn from_hourly(hourly: BTreeMap<ResourceKind, u64>) -> Self {
        let rates = hourly
            .into_iter()
            .map(|(k, v)| (k, v as f64 / 3600.0))
            .collect();
        Self { rates }
    }

    pub fn rate_per_second(&self, kind: ResourceKind) -> f64 {
        self.rates.get(&kind).copied().unwrap_or(0.0)
    }
}

impl Default for BaseRates {
    fn default() -> Self {
        let mut hourly = BTreeMap::new();
        hourly.insert(ResourceKind::Cpu, DEFAULT_CPU_RATE_MCC_PER_HOUR);
        hourly.insert(ResourceKind::Ram, DEFAULT_RAM_RATE_MCC_PER_HOUR);
        hourly.insert(ResourceKind::Storage, DEFAULT_STORAGE_RATE_MCC_PER_HOUR);
        hourly.insert(ResourceKind::Bandwidth, DEFAULT_BANDWIDTH_RATE_MCC_PER_HOUR);
        Self::from_hourly(hourly)
    }
}
