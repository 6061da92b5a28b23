use std::collections::HashMap;

use askee_policy::model_acl::RateLimits;
use parking_lot::RwLock;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Sliding-window admission counters keyed on `agent_id x model_id` (§4.E
/// step 6). Timestamps older than the day window are pruned on every check.
#[derive(Default)]
pub struct RateLimitTracker {
    hits: RwLock<HashMap<(String, String), Vec<i64>>>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a new hit at `now_ms` is within `limits`; if so,
    /// records it.
    pub fn check_and_record(&self, agent_id: &str, model_id: &str, now_ms: i64, limits: &RateLimits) -> bool {
        let key = (agent_id.to_string(), model_id.to_string());
        let mut hits = self.hits.write();
        let entry = hits.entry(key).or_default();
        entry.retain(|&t| now_ms - t <= DAY_MS);

        let per_minute = entry.iter().filter(|&&t| now_ms - t <= MINUTE_MS).count() as u32;
        let per_hour = entry.iter().filter(|&&t| now_ms - t <= HOUR_MS).count() as u32;
        let per_day = entry.len() as u32;

        if per_minute >= limits.per_minute || per_hour >= limits.per_hour || per_day >= limits.per_day {
            return false;
        }
        entry.push(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_per_minute_limit() {
        let tracker = RateLimitTracker::new();
        let limits = RateLimits { per_minute: 2, per_hour: 100, per_day: 1000 };
        assert!(tracker.check_and_record("agent-1", "model-1", 0, &limits));
        assert!(tracker.check_and_record("agent-1", "model-1", 1_000, &limits));
        assert!(!tracker.check_and_record("agent-1", "model-1", 2_000, &limits));
    }

    #[test]
    fn window_rolls_off_old_hits() {
        let tracker = RateLimitTracker::new();
        let limits = RateLimits { per_minute: 1, per_hour: 100, per_day: 1000 };
        assert!(tracker.check_and_record("agent-1", "model-1", 0, &limits));
        assert!(!tracker.check_and_record("agent-1", "model-1", 1_000, &limits));
        assert!(tracker.check_and_record("agent-1", "model-1", 70_000, &limits));
    }
}
