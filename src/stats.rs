//! Per-crawl statistics accumulator.
//!
//! `EventStats` is the key/value mapping behind the crawl summary event:
//! counters with read-with-default-then-increment semantics, plus one-shot
//! timestamps and labels. Entries are only added or updated during a crawl,
//! never removed; the whole mapping is emitted once at crawl close.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

/// A single recorded statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(i64),
    Time(DateTime<Utc>),
    Text(String),
}

/// Ordered key/value statistics for one crawl.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventStats {
    values: BTreeMap<String, StatValue>,
}

impl EventStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the entry for `key` regardless of any prior value.
    pub fn set_value(&mut self, key: impl Into<String>, value: StatValue) {
        self.values.insert(key.into(), value);
    }

    /// Adds `amount` to the counter at `key`, reading `default` when the key
    /// has never been set. Safe on never-set keys.
    pub fn inc_value(&mut self, key: &str, amount: i64, default: i64) {
        let current = match self.values.get(key) {
            Some(StatValue::Count(n)) => *n,
            None => default,
            Some(other) => {
                // Host lifecycle bug: the key holds a timestamp or label.
                warn!(key, ?other, "incrementing a non-counter stat, restarting from default");
                default
            }
        };
        self.values
            .insert(key.to_string(), StatValue::Count(current + amount));
    }

    /// `inc_value` with the usual step of 1 from 0.
    pub fn inc(&mut self, key: &str) {
        self.inc_value(key, 1, 0);
    }

    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.values.get(key)
    }

    /// Counter value at `key`; absent keys read as zero.
    pub fn count(&self, key: &str) -> i64 {
        match self.values.get(key) {
            Some(StatValue::Count(n)) => *n,
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StatValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_sum_per_key_with_default() {
        let mut stats = EventStats::new();
        stats.inc("a");
        stats.inc("a");
        stats.inc_value("a", 3, 0);
        stats.inc_value("b", 2, 10);

        assert_eq!(stats.count("a"), 5);
        assert_eq!(stats.count("b"), 12);
        assert_eq!(stats.count("never_set"), 0);
    }

    #[test]
    fn set_value_overwrites_then_increments_compound() {
        let mut stats = EventStats::new();
        stats.inc_value("k", 7, 0);
        stats.set_value("k", StatValue::Count(100));
        stats.inc("k");
        stats.inc("k");

        assert_eq!(stats.count("k"), 102);
    }

    #[test]
    fn set_value_overwrites_any_prior_kind() {
        let mut stats = EventStats::new();
        stats.set_value("spider", StatValue::Text("quotes".into()));
        stats.set_value("spider", StatValue::Text("books".into()));

        assert_eq!(stats.get("spider"), Some(&StatValue::Text("books".into())));
    }

    #[test]
    fn incrementing_non_counter_restarts_from_default() {
        let mut stats = EventStats::new();
        stats.set_value("k", StatValue::Text("oops".into()));
        stats.inc("k");

        assert_eq!(stats.count("k"), 1);
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut stats = EventStats::new();
        stats.inc_value("item_scraped_count", 3, 0);
        stats.set_value("spider", StatValue::Text("quotes".into()));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["item_scraped_count"], 3);
        assert_eq!(json["spider"], "quotes");
    }
}
