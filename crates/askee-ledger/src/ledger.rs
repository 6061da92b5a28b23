use std::collections::HashMap;
use std::sync::Arc;

use askee_crypto::UserHash;
use parking_lot::RwLock;
use tracing::{error, info};

use crate::entry::{AccountProjection, EntryKind, LedgerEntry};
use crate::error::LedgerError;
use crate::hold::Hold;
use crate::sink::LedgerSink;

struct LedgerState {
    entries: Vec<LedgerEntry>,
    next_id: u64,
    holds: HashMap<String, Hold>,
    /// Memoized per-user fold, invalidated on every post touching that user.
    projections: HashMap<UserHash, AccountProjection>,
}

impl LedgerState {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
            holds: HashMap::new(),
            projections: HashMap::new(),
        }
    }

    /// Recompute a user's projection by folding their entries in order.
    /// Called only on a cache miss.
    fn fold_projection(&self, user_hash: &UserHash) -> AccountProjection {
        self.entries
            .iter()
            .filter(|e| &e.user_hash == user_hash)
            .fold(AccountProjection::empty(*user_hash), |acc, e| acc.fold(e))
    }
}

/// The append-only credit journal. All posts serialize through a single
/// critical section (Design Notes §9): mutation takes the write lock,
/// `balance` takes the read lock over an immutable snapshot.
pub struct Ledger {
    state: RwLock<LedgerState>,
    sink: Option<Arc<dyn LedgerSink>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
            sink: None,
        }
    }

    pub fn with_sink(sink: Arc<dyn LedgerSink>) -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
            sink: Some(sink),
        }
    }

    /// Rebuild ledger state by replaying every entry a durable sink recorded.
    /// Holds are reconstructed from REDEEM/REFUND history: any REDEEM with a
    /// `task_id` opens (or tops up) a hold; a REFUND against that task drains
    /// it, mirroring the indexed side-table relationship described in §4.B.
    pub fn from_replay(sink: Arc<dyn LedgerSink>) -> Result<Self, LedgerError> {
        let entries = sink.replay()?;
        let mut state = LedgerState::new();
        for entry in entries {
            if let Some(task_id) = entry.task_id.clone() {
                match entry.kind {
                    EntryKind::Redeem => {
                        let hold = state
                            .holds
                            .entry(task_id.clone())
                            .or_insert_with(|| Hold::new(task_id, entry.user_hash, 0));
                        hold.reserved_mcc += entry.delta_mcc.unsigned_abs();
                    }
                    EntryKind::Refund => {
                        if let Some(hold) = state.holds.get_mut(&task_id) {
                            hold.refunded_mcc += entry.delta_mcc.unsigned_abs();
                            if hold.is_drained() {
                                state.holds.remove(&task_id);
                            }
                        }
                    }
                    _ => {}
                }
            }
            state.next_id = state.next_id.max(entry.id + 1);
            state.entries.push(entry);
        }
        Ok(Self {
            state: RwLock::new(state),
            sink: Some(sink),
        })
    }

    // ── Internal post ────────────────────────────────────────────────────

    fn post_locked(
        &self,
        state: &mut LedgerState,
        user_hash: UserHash,
        task_id: Option<String>,
        kind: EntryKind,
        delta_mcc: i128,
        timestamp: i64,
    ) -> Result<LedgerEntry, LedgerError> {
        let id = state.next_id;
        let entry = LedgerEntry {
            id,
            timestamp,
            user_hash,
            task_id,
            kind,
            delta_mcc,
            units: None,
            signature: None,
        };
        if let Some(sink) = &self.sink {
            sink.on_post(&entry)?;
        }
        state.next_id += 1;
        state.entries.push(entry.clone());
        state.projections.remove(&user_hash);
        info!(id, ?kind, delta_mcc, %user_hash, "posted ledger entry");
        Ok(entry)
    }

    // ── Public contract (§4.B) ───────────────────────────────────────────

    /// Credit `amount_mcc` to `user_hash` (an EARN entry).
    pub fn award(&self, user_hash: UserHash, amount_mcc: u128, timestamp: i64) -> Result<(), LedgerError> {
        if amount_mcc == 0 {
            return Err(LedgerError::InvalidAmount("award amount must be > 0".into()));
        }
        let mut state = self.state.write();
        self.post_locked(&mut state, user_hash, None, EntryKind::Earn, amount_mcc as i128, timestamp)?;
        Ok(())
    }

    /// Burn `amount_mcc` from `user_hash` with no corresponding hold (a
    /// SLASH entry) — non-refundable, e.g. a penalty.
    pub fn slash(
        &self,
        user_hash: UserHash,
        amount_mcc: u128,
        task_id: Option<String>,
        timestamp: i64,
    ) -> Result<(), LedgerError> {
        if amount_mcc == 0 {
            return Err(LedgerError::InvalidAmount("slash amount must be > 0".into()));
        }
        let mut state = self.state.write();
        let current = self.balance_locked(&mut state, &user_hash);
        if current.total_mcc < amount_mcc as i128 {
            return Err(LedgerError::InsufficientBalance {
                have: current.total_mcc,
                need: amount_mcc as i128,
            });
        }
        self.post_locked(&mut state, user_hash, task_id, EntryKind::Slash, -(amount_mcc as i128), timestamp)?;
        Ok(())
    }

    /// Immediately debit `amount_mcc` from `user_hash` with no hold — a
    /// direct REDEEM entry (§4.D billing-during-execution). Unlike
    /// `reserve`, a failed `spend` leaves any already-posted charges from
    /// the same billing loop in place; callers wanting atomicity must
    /// reserve first.
    pub fn spend(
        &self,
        user_hash: UserHash,
        amount_mcc: u128,
        task_id: Option<String>,
        timestamp: i64,
    ) -> Result<(), LedgerError> {
        if amount_mcc == 0 {
            return Err(LedgerError::InvalidAmount("spend amount must be > 0".into()));
        }
        let mut state = self.state.write();
        let current = self.balance_locked(&mut state, &user_hash);
        if current.total_mcc < amount_mcc as i128 {
            return Err(LedgerError::InsufficientBalance {
                have: current.total_mcc,
                need: amount_mcc as i128,
            });
        }
        self.post_locked(&mut state, user_hash, task_id, EntryKind::Redeem, -(amount_mcc as i128), timestamp)?;
        Ok(())
    }

    /// Reserve `amount_mcc` against `user_hash`'s balance for `task_id`.
    /// Posts a REDEEM entry and opens (or tops up) the task's hold.
    pub fn reserve(
        &self,
        user_hash: UserHash,
        amount_mcc: u128,
        task_id: impl Into<String>,
        timestamp: i64,
    ) -> Result<(), LedgerError> {
        if amount_mcc == 0 {
            return Err(LedgerError::InvalidAmount("reserve amount must be > 0".into()));
        }
        let task_id = task_id.into();
        let mut state = self.state.write();

        let projection = self.balance_locked(&mut state, &user_hash);
        if projection.total_mcc < amount_mcc as i128 {
            return Err(LedgerError::InsufficientBalance {
                have: projection.total_mcc,
                need: amount_mcc as i128,
            });
        }

        self.post_locked(
            &mut state,
            user_hash,
            Some(task_id.clone()),
            EntryKind::Redeem,
            -(amount_mcc as i128),
            timestamp,
        )?;

        state
            .holds
            .entry(task_id.clone())
            .and_modify(|h| h.reserved_mcc += amount_mcc)
            .or_insert_with(|| Hold::new(task_id, user_hash, amount_mcc));
        Ok(())
    }

    /// Drain `amount_mcc` from the hold for `task_id`. Posts no new entry —
    /// the REDEEM already accounts for it (Design Notes §9).
    pub fn consume_from_hold(&self, task_id: &str, amount_mcc: u128) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        let hold = state
            .holds
            .get_mut(task_id)
            .ok_or_else(|| LedgerError::NoSuchHold(task_id.to_string()))?;
        if amount_mcc > hold.remaining() {
            return Err(LedgerError::InsufficientHold {
                task_id: task_id.to_string(),
                remaining: hold.remaining(),
                requested: amount_mcc,
            });
        }
        hold.consumed_mcc += amount_mcc;
        if hold.is_drained() {
            state.holds.remove(task_id);
        }
        Ok(())
    }

    /// Refund `amount_mcc` from the hold for `task_id` back to its owner.
    /// Posts a REFUND entry and drains the hold by the same amount.
    pub fn refund_hold(&self, task_id: &str, amount_mcc: u128, timestamp: i64) -> Result<(), LedgerError> {
        if amount_mcc == 0 {
            return Err(LedgerError::InvalidAmount("refund amount must be > 0".into()));
        }
        let mut state = self.state.write();
        let (user_hash, remaining) = {
            let hold = state
                .holds
                .get(task_id)
                .ok_or_else(|| LedgerError::NoSuchHold(task_id.to_string()))?;
            (hold.user_hash, hold.remaining())
        };
        if amount_mcc > remaining {
            return Err(LedgerError::InsufficientHold {
                task_id: task_id.to_string(),
                remaining,
                requested: amount_mcc,
            });
        }

        self.post_locked(
            &mut state,
            user_hash,
            Some(task_id.to_string()),
            EntryKind::Refund,
            amount_mcc as i128,
            timestamp,
        )?;

        let drained = {
            let hold = state.holds.get_mut(task_id).expect("checked above");
            hold.refunded_mcc += amount_mcc;
            hold.is_drained()
        };
        if drained {
            state.holds.remove(task_id);
        }
        Ok(())
    }

    fn balance_locked(&self, state: &mut LedgerState, user_hash: &UserHash) -> AccountProjection {
        if let Some(p) = state.projections.get(user_hash) {
            return p.clone();
        }
        let projection = state.fold_projection(user_hash);
        state.projections.insert(*user_hash, projection.clone());
        projection
    }

    /// The current projection for `user_hash`, computed by folding the
    /// journal and memoized until the next post touching this user.
    pub fn balance(&self, user_hash: &UserHash) -> AccountProjection {
        let mut state = self.state.write();
        self.balance_locked(&mut state, user_hash)
    }

    /// Remaining mCC reserved-but-not-yet-drained for `task_id`.
    pub fn hold_remaining(&self, task_id: &str) -> Option<u128> {
        self.state.read().holds.get(task_id).map(Hold::remaining)
    }

    /// Sum of every posted delta. Equals the sum of balances plus the sum
    /// of active holds by invariant 1.
    pub fn total_circulation(&self) -> i128 {
        self.state.read().entries.iter().map(|e| e.delta_mcc).sum()
    }

    /// Sum of mCC still tied up across all active holds.
    pub fn total_held(&self) -> u128 {
        self.state.read().holds.values().map(Hold::remaining).sum()
    }

    /// Verify §3 invariant 1: total circulation equals the sum of every
    /// account's balance plus every active hold. A mismatch is a fatal
    /// invariant violation (§7) — the process aborts rather than continue
    /// with corrupt accounting.
    pub fn assert_conservation(&self) {
        let state = self.state.read();
        let circulation: i128 = state.entries.iter().map(|e| e.delta_mcc).sum();

        let mut accounted: i128 = 0;
        let mut seen = std::collections::HashSet::new();
        for entry in &state.entries {
            if seen.insert(entry.user_hash) {
                accounted += state.fold_projection(&entry.user_hash).total_mcc;
            }
        }
        let held: i128 = state.holds.values().map(|h| h.remaining() as i128).sum();
        accounted += held;

        if circulation != accounted {
            error!(circulation, accounted, "conservation invariant violated");
            let err = LedgerError::ConservationViolated { circulation, accounted };
            panic!("{err}");
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uh(id: &str) -> UserHash {
        UserHash::of_user_id(id)
    }

    #[test]
    fn award_then_balance() {
        let ledger = Ledger::new();
        let bob = uh("bob");
        ledger.award(bob, 1_000_000, 0).unwrap();
        assert_eq!(ledger.balance(&bob).total_mcc, 1_000_000);
        ledger.assert_conservation();
    }

    #[test]
    fn reserve_redeem_refund_scenario() {
        // S3 from the testable-properties scenario suite.
        let ledger = Ledger::new();
        let bob = uh("bob");
        ledger.award(bob, 1_000_000, 0).unwrap();

        ledger.reserve(bob, 200_000, "task-A", 1).unwrap();
        assert_eq!(ledger.balance(&bob).total_mcc, 800_000);

        ledger.consume_from_hold("task-A", 150_000).unwrap();
        assert_eq!(ledger.hold_remaining("task-A"), Some(50_000));

        ledger.refund_hold("task-A", 50_000, 2).unwrap();
        assert_eq!(ledger.balance(&bob).total_mcc, 850_000);
        assert_eq!(ledger.hold_remaining("task-A"), None);

        ledger.assert_conservation();
    }

    #[test]
    fn reserve_then_full_refund_restores_projection() {
        // §8 property 5.
        let ledger = Ledger::new();
        let carol = uh("carol");
        ledger.award(carol, 500_000, 0).unwrap();
        let before = ledger.balance(&carol);

        ledger.reserve(carol, 100_000, "task-B", 1).unwrap();
        ledger.refund_hold("task-B", 100_000, 2).unwrap();

        let after = ledger.balance(&carol);
        assert_eq!(before.total_mcc, after.total_mcc);
        assert_eq!(before.earned_lifetime_mcc + 100_000, after.earned_lifetime_mcc);
    }

    #[test]
    fn reserve_insufficient_balance_rejected() {
        let ledger = Ledger::new();
        let dan = uh("dan");
        ledger.award(dan, 100, 0).unwrap();
        let err = ledger.reserve(dan, 200, "task-C", 1).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    #[test]
    fn consume_more_than_remaining_rejected() {
        let ledger = Ledger::new();
        let erin = uh("erin");
        ledger.award(erin, 1_000, 0).unwrap();
        ledger.reserve(erin, 500, "task-D", 1).unwrap();
        let err = ledger.consume_from_hold("task-D", 600).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientHold { .. }));
    }

    #[test]
    fn concurrent_reserves_respect_conservation() {
        // S6: N reserves of B/N each against balance B; exactly N succeed.
        let ledger = Ledger::new();
        let frank = uh("frank");
        let b: u128 = 1_000_000;
        let n: u128 = 10;
        ledger.award(frank, b, 0).unwrap();

        let per_reserve = b / n;
        let mut successes = 0;
        for i in 0..(n + 5) {
            if ledger
                .reserve(frank, per_reserve, format!("task-{i}"), i as i64)
                .is_ok()
            {
                successes += 1;
            }
        }
        assert_eq!(successes, n);
        ledger.assert_conservation();
    }

    #[test]
    fn slash_requires_sufficient_balance() {
        let ledger = Ledger::new();
        let gail = uh("gail");
        ledger.award(gail, 100, 0).unwrap();
        assert!(ledger.slash(gail, 50, None, 1).is_ok());
        assert!(matches!(
            ledger.slash(gail, 1_000, None, 2).unwrap_err(),
            LedgerError::InsufficientBalance { .. }
        ));
        ledger.assert_conservation();
    }

    proptest::proptest! {
        #[test]
        fn conservation_holds_over_random_reserve_refund_sequences(
            award in 1_000u128..1_000_000u128,
            ops in proptest::collection::vec((0u128..200_000u128, 0u8..100u8), 0..20),
        ) {
            let ledger = Ledger::new();
            let who = uh("randomized-user");
            ledger.award(who, award, 0).unwrap();

            for (i, (amount, refund_pct)) in ops.into_iter().enumerate() {
                let task_id = format!("task-{i}");
                if ledger.reserve(who, amount, task_id.clone(), i as i64).is_ok() {
                    let refund = (amount * refund_pct as u128) / 100;
                    if refund > 0 {
                        ledger.refund_hold(&task_id, refund, i as i64).unwrap();
                    }
                }
            }
            ledger.assert_conservation();
        }
    }
}
