pub mod core;
pub mod error;

pub use crate::core::Core;
pub use error::CoreError;

pub use askee_consent::{ConsentError, ConsentManager, ConsentToken, TokenRequest};
pub use askee_discovery::{Channel, DiscoveryError, DiscoveryTransport, InvitationStore, VerifiedInvitation};
pub use askee_gate::{
    AgentRegistration, AgentRegistry, Executor, Gate, GateError, Priority, ProtocolHeader, Workload,
    WorkloadMetrics, WorkloadRequest,
};
pub use askee_ledger::{AccountProjection, Ledger, LedgerError, LedgerSink};
pub use askee_policy::{Policy, ResourceKind};
