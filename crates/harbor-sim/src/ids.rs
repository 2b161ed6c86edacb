//! Unique ids for alert rules and notifications.

use chrono::{DateTime, Utc};

/// Monotonic id generator for rules and notifications.
///
/// Ids combine a prefix, the emission time in milliseconds and a per-monitor
/// sequence number, so two items created in the same millisecond still differ.
#[derive(Debug, Clone, Default)]
pub struct IdSequence {
    counter: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id with the given prefix.
    pub fn next_id(&mut self, prefix: &str, now: DateTime<Utc>) -> String {
        self.counter += 1;
        format!("{prefix}-{}-{}", now.timestamp_millis(), self.counter)
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut seq = IdSequence::new();
        let now = Utc::now();
        let ids: HashSet<String> = (0..100).map(|_| seq.next_id("T02", now)).collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(seq.issued(), 100);
    }

    #[test]
    fn test_id_format() {
        let mut seq = IdSequence::new();
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        assert_eq!(seq.next_id("alert", now), "alert-1700000000000-1");
        assert_eq!(seq.next_id("C01", now), "C01-1700000000000-2");
    }
}
