use askee_crypto::keypair::SignatureBytes;
use serde::{Deserialize, Serialize};

/// The protocol header accompanying every workload request (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolHeader {
    pub version: u32,
    pub network_id: String,
    pub request_id: String,
    pub timestamp_ms: i64,
    pub node_id: String,
    pub agent_id: String,
    pub nonce: String,
    pub signature: SignatureBytes,
}

impl ProtocolHeader {
    /// `|now - timestamp| <= window_ms`.
    pub fn is_fresh(&self, now_ms: i64, window_ms: i64) -> bool {
        (now_ms - self.timestamp_ms).abs() <= window_ms
    }
}

/// The fields signed over, `signature` held out (§4.A canonicalization rule).
#[derive(Serialize)]
pub struct HeaderSigningPayload<'a> {
    pub version: u32,
    pub network_id: &'a str,
    pub request_id: &'a str,
    pub timestamp_ms: i64,
    pub node_id: &'a str,
    pub agent_id: &'a str,
    pub nonce: &'a str,
}

impl<'a> From<&'a ProtocolHeader> for HeaderSigningPayload<'a> {
    fn from(h: &'a ProtocolHeader) -> Self {
        Self {
            version: h.version,
            network_id: &h.network_id,
            request_id: &h.request_id,
            timestamp_ms: h.timestamp_ms,
            node_id: &h.node_id,
            agent_id: &h.agent_id,
            nonce: &h.nonce,
        }
    }
}
