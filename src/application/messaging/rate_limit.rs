//! Per-key cooldown gate shared by the dispatch loop and membership events

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fixed-window cooldown keyed by conversation or group id.
///
/// Check and record are separate steps, so two near-simultaneous events for
/// the same key may both pass; last write wins.
pub struct RateLimiter {
    ledger: Mutex<HashMap<String, Instant>>,
    window: Duration,
    capacity: usize,
}

impl RateLimiter {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            ledger: Mutex::new(HashMap::new()),
            window,
            capacity: capacity.max(1),
        }
    }

    /// Whether an action for `key` at `now` falls inside the cooldown window
    pub fn is_throttled(&self, key: &str, now: Instant) -> bool {
        let ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        match ledger.get(key) {
            Some(last) => now.saturating_duration_since(*last) < self.window,
            None => false,
        }
    }

    /// Record `now` as the last action time for `key`
    pub fn record(&self, key: &str, now: Instant) {
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        ledger.insert(key.to_string(), now);

        if ledger.len() > self.capacity {
            let window = self.window;
            let before = ledger.len();
            // Entries at least one window old can no longer throttle anything.
            ledger.retain(|_, last| now.saturating_duration_since(*last) < window);
            tracing::debug!(evicted = before - ledger.len(), "Pruned rate ledger");
        }
    }

    /// Throttle check followed by a record when not throttled
    pub fn check_and_record(&self, key: &str, now: Instant) -> bool {
        if self.is_throttled(key, now) {
            return true;
        }
        self.record(key, now);
        false
    }

    pub fn len(&self) -> usize {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
