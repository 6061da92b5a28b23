use async_trait::async_trait;

use crate::error::DiscoveryError;
use crate::invitation::Channel;

/// The external publish/scan surface (§6). The core depends only on this
/// capability, never on a concrete transport (Design Notes §9).
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    async fn publish(&self, channel: Channel, payload: &str) -> Result<(), DiscoveryError>;
    async fn scan(&self, channel: Channel) -> Result<Vec<String>, DiscoveryError>;
}
