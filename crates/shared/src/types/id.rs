//! Timestamped record IDs.
//!
//! Records are keyed by `<PREFIX>-<epoch_millis>`. The generator hands out
//! strictly increasing millisecond stamps so two inserts landing in the same
//! millisecond still get distinct keys.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Monotonic generator for prefixed record IDs.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_millis: AtomicI64,
}

static GLOBAL: IdGenerator = IdGenerator::new();

impl IdGenerator {
    /// Creates a generator with no history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_millis: AtomicI64::new(0),
        }
    }

    /// Process-wide generator.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Returns the stamp for `now`, bumped past the last one handed out.
    pub fn next_millis(&self, now: DateTime<Utc>) -> i64 {
        let now_ms = now.timestamp_millis();
        let previous = self
            .last_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now_ms.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now_ms.max(previous + 1)
    }

    /// Generates `<prefix>-<epoch_millis>`.
    pub fn next_id(&self, prefix: &str, now: DateTime<Utc>) -> String {
        format!("{prefix}-{}", self.next_millis(now))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
