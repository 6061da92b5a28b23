use std::collections::BTreeMap;

use askee_crypto::{keypair::SignatureBytes, UserHash};
use askee_policy::UnitKind;
use serde::{Deserialize, Serialize};

/// The four kinds of ledger movement. Wire strings match §6 exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    Earn,
    Redeem,
    Refund,
    Slash,
}

impl EntryKind {
    /// `true` for kinds that increase a user's total (EARN, REFUND).
    pub fn is_credit(&self) -> bool {
        matches!(self, EntryKind::Earn | EntryKind::Refund)
    }
}

/// A single immutable journal entry. Once posted, never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub timestamp: i64,
    pub user_hash: UserHash,
    pub task_id: Option<String>,
    pub kind: EntryKind,
    /// Signed delta in milli-credits. Positive for EARN/REFUND, negative
    /// for REDEEM/SLASH.
    pub delta_mcc: i128,
    pub units: Option<BTreeMap<UnitKind, u64>>,
    pub signature: Option<SignatureBytes>,
}

/// A derived view over a user's entries, recomputed by folding the journal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProjection {
    pub user_hash: UserHash,
    pub total_mcc: i128,
    pub earned_lifetime_mcc: u128,
    pub redeemed_lifetime_mcc: u128,
    pub last_updated: i64,
}

impl AccountProjection {
    pub fn empty(user_hash: UserHash) -> Self {
        Self {
            user_hash,
            total_mcc: 0,
            earned_lifetime_mcc: 0,
            redeemed_lifetime_mcc: 0,
            last_updated: 0,
        }
    }

    /// Fold a single entry into this projection. Entries must be folded in
    /// insertion order; this is a pure function of (projection, entry).
    pub fn fold(mut self, entry: &LedgerEntry) -> Self {
        self.total_mcc += entry.delta_mcc;
        match entry.kind {
            EntryKind::Earn | EntryKind::Refund => {
                self.earned_lifetime_mcc += entry.delta_mcc.unsigned_abs();
            }
            EntryKind::Redeem | EntryKind::Slash => {
                self.redeemed_lifetime_mcc += entry.delta_mcc.unsigned_abs();
            }
        }
        self.last_updated = entry.timestamp;
        self
    }
}
