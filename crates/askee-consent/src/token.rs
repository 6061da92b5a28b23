use std::collections::BTreeMap;

use askee_crypto::keypair::SignatureBytes;
use askee_discovery::Channel;
use askee_policy::ResourceKind;
use serde::{Deserialize, Serialize};

/// An inbound request to issue a consent token (§4.D).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenRequest {
    pub user_id: String,
    pub requested_permissions: BTreeMap<String, bool>,
    pub requested_limits: BTreeMap<ResourceKind, u64>,
    pub duration_hours: u32,
    pub verification_channel: Channel,
}

/// A signed capability granting a user the right to spend bounded
/// resources on enumerated task types for a bounded time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsentToken {
    pub token_id: String,
    pub user_id: String,
    pub permissions: BTreeMap<String, bool>,
    pub resource_limits: BTreeMap<ResourceKind, u64>,
    pub issued_at: i64,
    pub expires_at: i64,
    pub revoked: bool,
    pub signature: SignatureBytes,
}

impl ConsentToken {
    pub fn is_active(&self, now: i64) -> bool {
        !self.revoked && now < self.expires_at
    }
}

/// The fields signed over when issuing a token — identical to the public
/// fields with `signature` held out, per §4.A ("tokens ... are hashed then
/// signed").
#[derive(Serialize)]
pub struct TokenSigningPayload<'a> {
    pub token_id: &'a str,
    pub user_id: &'a str,
    pub permissions: &'a BTreeMap<String, bool>,
    pub resource_limits: &'a BTreeMap<ResourceKind, u64>,
    pub issued_at: i64,
    pub expires_at: i64,
    pub revoked: bool,
}

impl<'a> From<&'a ConsentToken> for TokenSigningPayload<'a> {
    fn from(t: &'a ConsentToken) -> Self {
        Self {
            token_id: &t.token_id,
            user_id: &t.user_id,
            permissions: &t.permissions,
            resource_limits: &t.resource_limits,
            issued_at: t.issued_at,
            expires_at: t.expires_at,
            revoked: t.revoked,
        }
    }
}
