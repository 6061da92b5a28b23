use std::collections::HashMap;

use askee_crypto::KeyPair;
use parking_lot::RwLock;
use tracing::info;

use crate::error::DiscoveryError;
use crate::invitation::{decode_signal, Channel, VerifiedInvitation};

/// Holds every verified invitation, keyed `(user_id, channel)` — exactly
/// one per pair (§4.C).
pub struct InvitationStore {
    invitations: RwLock<HashMap<(String, Channel), VerifiedInvitation>>,
}

impl InvitationStore {
    pub fn new() -> Self {
        Self {
            invitations: RwLock::new(HashMap::new()),
        }
    }

    /// Verify a raw discovery signal for `(user_id, channel)` and record the
    /// resulting invitation, signed by `issuer`.
    ///
    /// Idempotent: if an invitation already exists for this pair, returns
    /// `Ok(None)` rather than duplicating or erroring. `freshness_window_ms`
    /// is an optional policy-enforced staleness bound on the signal's
    /// embedded timestamp, evaluated against `now_ms`.
    pub fn verify_signal(
        &self,
        user_id: &str,
        channel: Channel,
        signal: &str,
        issuer: &KeyPair,
        now_ms: i64,
        freshness_window_ms: Option<i64>,
    ) -> Result<Option<VerifiedInvitation>, DiscoveryError> {
        let key = (user_id.to_string(), channel);
        if self.invitations.read().contains_key(&key) {
            return Ok(None);
        }

        let payload = decode_signal(signal)?;
        if payload.user_id != user_id || payload.channel != channel {
            return Err(DiscoveryError::Mismatch);
        }
        if let Some(window) = freshness_window_ms {
            if (now_ms - payload.timestamp).abs() > window {
                return Err(DiscoveryError::Stale);
            }
        }

        let verified_at = now_ms;
        let signing_bytes = VerifiedInvitation::signing_bytes(user_id, channel, verified_at)?;
        let issuer_signature = issuer.sign(&signing_bytes);

        let invitation = VerifiedInvitation {
            user_id: user_id.to_string(),
            channel,
            verified_at,
            issuer_signature,
        };

        self.invitations.write().insert(key, invitation.clone());
        info!(user_id, ?channel, "recorded verified invitation");
        Ok(Some(invitation))
    }

    pub fn get(&self, user_id: &str, channel: Channel) -> Option<VerifiedInvitation> {
        self.invitations
            .read()
            .get(&(user_id.to_string(), channel))
            .cloned()
    }

    pub fn is_verified(&self, user_id: &str, channel: Channel) -> bool {
        self.invitations
            .read()
            .contains_key(&(user_id.to_string(), channel))
    }
}

impl Default for InvitationStore {
    fn default() -> Self {
        Self::new()
    }
}
