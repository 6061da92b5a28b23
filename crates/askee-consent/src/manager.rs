use std::collections::{BTreeMap, HashMap, HashSet};

use askee_crypto::keypair::PublicKeyBytes;
use askee_crypto::{canonical_bytes, token_id, verify, KeyPair};
use askee_discovery::InvitationStore;
use askee_ledger::Ledger;
use askee_policy::{
    ResourceKind, MAX_CPU_LIMIT_PERCENT, MAX_TOKENS_PER_USER, MAX_TOKEN_DURATION_HOURS,
    MIN_CPU_LIMIT_PERCENT, MIN_TOKEN_DURATION_HOURS, REVOKED_TOKEN_RETENTION_SECS,
};
use askee_crypto::hash::UserHash;
use parking_lot::RwLock;
use tracing::{info, warn};

use crate::error::ConsentError;
use crate::token::{ConsentToken, TokenRequest, TokenSigningPayload};

/// Owns every consent token, indexed by id and by user, plus a
/// process-wide revoked-id set for the cleanup pass (§4.D).
pub struct ConsentManager {
    tokens: RwLock<HashMap<String, ConsentToken>>,
    by_user: RwLock<HashMap<String, Vec<String>>>,
    revoked_at: RwLock<HashMap<String, i64>>,
}

impl ConsentManager {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            by_user: RwLock::new(HashMap::new()),
            revoked_at: RwLock::new(HashMap::new()),
        }
    }

    fn active_count(&self, user_id: &str, now: i64) -> usize {
        let by_user = self.by_user.read();
        let tokens = self.tokens.read();
        by_user
            .get(user_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tokens.get(id))
                    .filter(|t| t.is_active(now))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Issue a new consent token, checking every §4.D precondition in order.
    pub fn issue(
        &self,
        request: TokenRequest,
        invitations: &InvitationStore,
        issuer: &KeyPair,
        now: i64,
    ) -> Result<ConsentToken, ConsentError> {
        if !invitations.is_verified(&request.user_id, request.verification_channel) {
            return Err(ConsentError::NoVerifiedInvitation);
        }

        let active = self.active_count(&request.user_id, now);
        if active >= MAX_TOKENS_PER_USER {
            return Err(ConsentError::TooManyActiveTokens {
                active,
                max: MAX_TOKENS_PER_USER,
            });
        }

        if request.requested_permissions.is_empty() {
            return Err(ConsentError::EmptyPermissions);
        }
        if request.requested_limits.is_empty() {
            return Err(ConsentError::EmptyLimits);
        }
        if let Some(cpu) = request.requested_limits.get(&ResourceKind::Cpu) {
            if *cpu < MIN_CPU_LIMIT_PERCENT as u64 || *cpu > MAX_CPU_LIMIT_PERCENT as u64 {
                return Err(ConsentError::CpuLimitOutOfRange { got: *cpu });
            }
        }
        if request.duration_hours < MIN_TOKEN_DURATION_HOURS
            || request.duration_hours > MAX_TOKEN_DURATION_HOURS
        {
            return Err(ConsentError::DurationOutOfRange {
                got: request.duration_hours,
                min: MIN_TOKEN_DURATION_HOURS,
                max: MAX_TOKEN_DURATION_HOURS,
            });
        }

        let issued_at = now;
        let expires_at = issued_at + request.duration_hours as i64 * 3600;
        let id = token_id();

        let mut token = ConsentToken {
            token_id: id.clone(),
            user_id: request.user_id.clone(),
            permissions: request.requested_permissions,
            resource_limits: request.requested_limits,
            issued_at,
            expires_at,
            revoked: false,
            signature: askee_crypto::keypair::SignatureBytes([0u8; 64]),
        };
        let signing_bytes = canonical_bytes(&TokenSigningPayload::from(&token))?;
        token.signature = issuer.sign(&signing_bytes);

        self.tokens.write().insert(id.clone(), token.clone());
        self.by_user
            .write()
            .entry(request.user_id)
            .or_default()
            .push(id);

        info!(token_id = %token.token_id, "issued consent token");
        Ok(token)
    }

    /// Flip `revoked := true`. Idempotent; returns whether state changed.
    pub fn revoke(&self, token_id: &str, now: i64) -> bool {
        let mut tokens = self.tokens.write();
        match tokens.get_mut(token_id) {
            Some(t) if !t.revoked => {
                t.revoked = true;
                self.revoked_at.write().insert(token_id.to_string(), now);
                info!(token_id, "revoked consent token");
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, token_id: &str) -> Option<ConsentToken> {
        self.tokens.read().get(token_id).cloned()
    }

    /// Validate `token_id` against a candidate task (§4.D "Validation for a
    /// task"). All five conditions must hold.
    #[allow(clippy::too_many_arguments)]
    pub fn validate_for_task(
        &self,
        token_id: &str,
        task_type: &str,
        required: &BTreeMap<ResourceKind, u64>,
        max_execution_time_ms: u64,
        issuer_public_key: &PublicKeyBytes,
        ledger: &Ledger,
        base_rate_per_second: impl Fn(ResourceKind) -> f64,
        now: i64,
    ) -> Result<(), ConsentError> {
        let token = self.tokens.read().get(token_id).cloned().ok_or(ConsentError::NotFound)?;

        if token.revoked {
            return Err(ConsentError::Revoked);
        }
        if now >= token.expires_at {
            return Err(ConsentError::Expired);
        }

        let signing_bytes = canonical_bytes(&TokenSigningPayload::from(&token))?;
        verify(issuer_public_key, &signing_bytes, &token.signature)?;

        let estimated_seconds = max_execution_time_ms as f64 / 1000.0;
        let estimated_cost: f64 = required
            .iter()
            .map(|(resource, amount)| base_rate_per_second(*resource) * *amount as f64 * estimated_seconds)
            .sum();
        let user_hash = UserHash::of_user_id(&token.user_id);
        let balance = ledger.balance(&user_hash).total_mcc;
        if (balance as f64) < estimated_cost {
            return Err(ConsentError::InsufficientCreditsFor(
                required.keys().next().copied().unwrap_or(ResourceKind::Cpu),
            ));
        }

        if !*token.permissions.get(task_type).unwrap_or(&false) {
            return Err(ConsentError::PermissionDenied(task_type.to_string()));
        }

        for (resource, amount) in required {
            let limit = token.resource_limits.get(resource).copied().unwrap_or(0);
            if limit < *amount {
                return Err(ConsentError::InsufficientResourceLimit {
                    resource: *resource,
                    limit,
                    required: *amount,
                });
            }
        }

        Ok(())
    }

    /// Charge the ledger for metered usage during execution (§4.D "Billing
    /// during execution"). The first failed charge aborts; resources
    /// already charged in this loop are not rolled back.
    pub fn charge_for_task(
        &self,
        token_id: &str,
        usage: &BTreeMap<ResourceKind, u64>,
        duration_ms: u64,
        base_rate_per_second: impl Fn(ResourceKind) -> f64,
        ledger: &Ledger,
        task_id: &str,
        now: i64,
    ) -> Result<(), ConsentError> {
        let token = self.tokens.read().get(token_id).cloned().ok_or(ConsentError::NotFound)?;
        let user_hash = UserHash::of_user_id(&token.user_id);
        let seconds = duration_ms as f64 / 1000.0;

        for (resource, amount) in usage {
            let cost_mcc = (base_rate_per_second(*resource) * *amount as f64 * seconds).ceil() as u128;
            if cost_mcc == 0 {
                continue;
            }
            ledger
                .spend(user_hash, cost_mcc, Some(task_id.to_string()), now)
                .map_err(|_| ConsentError::InsufficientCreditsFor(*resource))?;
        }
        Ok(())
    }

    /// Remove expired tokens from the per-user index and drop revoked ids
    /// older than the retention window.
    pub fn cleanup(&self, now: i64) {
        let expired_ids: HashSet<String> = {
            let tokens = self.tokens.read();
            tokens
                .values()
                .filter(|t| now >= t.expires_at)
                .map(|t| t.token_id.clone())
                .collect()
        };
        if !expired_ids.is_empty() {
            let mut by_user = self.by_user.write();
            for ids in by_user.values_mut() {
                ids.retain(|id| !expired_ids.contains(id));
            }
        }

        let mut revoked_at = self.revoked_at.write();
        let stale: Vec<String> = revoked_at
            .iter()
            .filter(|(_, at)| now - **at > REVOKED_TOKEN_RETENTION_SECS)
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            revoked_at.remove(&id);
        }
        if !expired_ids.is_empty() {
            warn!(count = expired_ids.len(), "cleaned up expired consent tokens");
        }
    }
}

impl Default for ConsentManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askee_discovery::{encode_signal, Channel, DiscoverySignalPayload};

    fn base_rates(resource: ResourceKind) -> f64 {
        match resource {
            ResourceKind::Cpu => 10.0 / 3600.0,
            ResourceKind::Ram => 5.0 / 3600.0,
            ResourceKind::Storage => 1.0 / 3600.0,
            ResourceKind::Bandwidth => 2.0 / 3600.0,
        }
    }

    fn verified_invitation(store: &InvitationStore, issuer: &KeyPair, user_id: &str) {
        let user_key = KeyPair::generate();
        let signal = encode_signal(&DiscoverySignalPayload {
            user_id: user_id.to_string(),
            channel: Channel::Dns,
            public_key: user_key.public_key.clone(),
            timestamp: 0,
        })
        .unwrap();
        store
            .verify_signal(user_id, Channel::Dns, &signal, issuer, 0, None)
            .unwrap();
    }

    fn limits(cpu: u64, ram: u64, storage: u64, bandwidth: u64) -> BTreeMap<ResourceKind, u64> {
        let mut m = BTreeMap::new();
        m.insert(ResourceKind::Cpu, cpu);
        m.insert(ResourceKind::Ram, ram);
        m.insert(ResourceKind::Storage, storage);
        m.insert(ResourceKind::Bandwidth, bandwidth);
        m
    }

    #[test]
    fn issue_validate_execute_scenario() {
        // S1
        let manager = ConsentManager::new();
        let invitations = InvitationStore::new();
        let issuer = KeyPair::generate();
        let ledger = Ledger::new();

        verified_invitation(&invitations, &issuer, "alice");
        let alice_hash = UserHash::of_user_id("alice");
        ledger.award(alice_hash, 100_000, 0).unwrap();

        let mut permissions = BTreeMap::new();
        permissions.insert("ml_training".to_string(), true);

        let request = TokenRequest {
            user_id: "alice".to_string(),
            requested_permissions: permissions,
            requested_limits: limits(50, 2048, 10, 100),
            duration_hours: 24,
            verification_channel: Channel::Dns,
        };
        let token = manager.issue(request, &invitations, &issuer, 0).unwrap();

        let required = limits(25, 1024, 5, 50);
        let result = manager.validate_for_task(
            &token.token_id,
            "ml_training",
            &required,
            60_000,
            &issuer.public_key,
            &ledger,
            base_rates,
            0,
        );
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn tampered_token_fails_signature_verification() {
        // §8 property 4
        let manager = ConsentManager::new();
        let invitations = InvitationStore::new();
        let issuer = KeyPair::generate();
        let ledger = Ledger::new();

        verified_invitation(&invitations, &issuer, "alice");
        let alice_hash = UserHash::of_user_id("alice");
        ledger.award(alice_hash, 100_000, 0).unwrap();

        let mut permissions = BTreeMap::new();
        permissions.insert("ml_training".to_string(), true);
        let request = TokenRequest {
            user_id: "alice".to_string(),
            requested_permissions: permissions,
            requested_limits: limits(50, 2048, 10, 100),
            duration_hours: 24,
            verification_channel: Channel::Dns,
        };
        let token = manager.issue(request, &invitations, &issuer, 0).unwrap();

        // Tamper with a resource limit after issuance, bypassing `issue`.
        manager
            .tokens
            .write()
            .get_mut(&token.token_id)
            .unwrap()
            .resource_limits
            .insert(ResourceKind::Cpu, 999);

        let required = limits(25, 1024, 5, 50);
        let err = manager
            .validate_for_task(
                &token.token_id,
                "ml_training",
                &required,
                60_000,
                &issuer.public_key,
                &ledger,
                base_rates,
                0,
            )
            .unwrap_err();
        assert!(matches!(err, ConsentError::Crypto(_)));
    }

    #[test]
    fn revocation_invalidates_token() {
        // S2
        let manager = ConsentManager::new();
        let invitations = InvitationStore::new();
        let issuer = KeyPair::generate();
        let ledger = Ledger::new();

        verified_invitation(&invitations, &issuer, "alice");
        let alice_hash = UserHash::of_user_id("alice");
        ledger.award(alice_hash, 100_000, 0).unwrap();

        let mut permissions = BTreeMap::new();
        permissions.insert("ml_training".to_string(), true);
        let request = TokenRequest {
            user_id: "alice".to_string(),
            requested_permissions: permissions,
            requested_limits: limits(50, 2048, 10, 100),
            duration_hours: 24,
            verification_channel: Channel::Dns,
        };
        let token = manager.issue(request, &invitations, &issuer, 0).unwrap();

        assert!(manager.revoke(&token.token_id, 1));
        assert!(!manager.revoke(&token.token_id, 2), "revoke must be idempotent");

        let required = limits(25, 1024, 5, 50);
        let err = manager
            .validate_for_task(
                &token.token_id,
                "ml_training",
                &required,
                60_000,
                &issuer.public_key,
                &ledger,
                base_rates,
                2,
            )
            .unwrap_err();
        assert!(matches!(err, ConsentError::Revoked));
    }

    #[test]
    fn max_tokens_per_user_enforced() {
        // §8 property 3
        let manager = ConsentManager::new();
        let invitations = InvitationStore::new();
        let issuer = KeyPair::generate();
        verified_invitation(&invitations, &issuer, "dave");

        let mut permissions = BTreeMap::new();
        permissions.insert("ml_training".to_string(), true);

        let mut last_err = None;
        let mut issued = 0;
        for _ in 0..(MAX_TOKENS_PER_USER + 1) {
            let request = TokenRequest {
                user_id: "dave".to_string(),
                requested_permissions: permissions.clone(),
                requested_limits: limits(10, 10, 10, 10),
                duration_hours: 1,
                verification_channel: Channel::Dns,
            };
            match manager.issue(request, &invitations, &issuer, 0) {
                Ok(_) => issued += 1,
                Err(e) => last_err = Some(e),
            }
        }
        assert_eq!(issued, MAX_TOKENS_PER_USER);
        assert!(matches!(last_err, Some(ConsentError::TooManyActiveTokens { .. })));
    }

    proptest::proptest! {
        #[test]
        fn token_is_active_exactly_until_its_computed_expiry(
            duration_hours in MIN_TOKEN_DURATION_HOURS..=MAX_TOKEN_DURATION_HOURS,
            issued_at in 0i64..1_000_000i64,
        ) {
            let manager = ConsentManager::new();
            let invitations = InvitationStore::new();
            let issuer = KeyPair::generate();
            verified_invitation(&invitations, &issuer, "proptest-user");

            let mut permissions = BTreeMap::new();
            permissions.insert("ml_training".to_string(), true);
            let request = TokenRequest {
                user_id: "proptest-user".to_string(),
                requested_permissions: permissions,
                requested_limits: limits(10, 10, 10, 10),
                duration_hours,
                verification_channel: Channel::Dns,
            };
            let token = manager.issue(request, &invitations, &issuer, issued_at).unwrap();
            let expires_at = issued_at + duration_hours as i64 * 3600;

            proptest::prop_assert_eq!(token.expires_at, expires_at);
            proptest::prop_assert!(token.is_active(issued_at));
            proptest::prop_assert!(token.is_active(expires_at - 1));
            proptest::prop_assert!(!token.is_active(expires_at));
        }
    }
}
