//! Tie-breaking priorities for events that share a timestamp.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fixed integer priority of an event name within a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(pub u32);

impl OrderKey {
    /// Key of the visit-opening sentinel; precedes every other event.
    pub const OPENING: OrderKey = OrderKey(0);
    /// Key of the visit-closing sentinel; follows every other event.
    pub const CLOSING: OrderKey = OrderKey(u32::MAX);

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Resolves event names to order keys.
///
/// Ranked names come from the configured priority table. Boarding events
/// (`"<prefix> - (<terminal>)"`) share one priority. Names absent from the
/// table sort after every ranked name and before the closing sentinel.
#[derive(Debug, Clone)]
pub struct ProcessOrder {
    ranks: BTreeMap<String, u32>,
    boarding_prefix: String,
    boarding_priority: u32,
    opening_sentinel: String,
    closing_sentinel: String,
    unranked: u32,
}

impl ProcessOrder {
    pub fn new(
        ranks: BTreeMap<String, u32>,
        boarding_prefix: impl Into<String>,
        boarding_priority: u32,
        opening_sentinel: impl Into<String>,
        closing_sentinel: impl Into<String>,
    ) -> Self {
        let highest = ranks
            .values()
            .copied()
            .chain(std::iter::once(boarding_priority))
            .max()
            .unwrap_or(0);
        Self {
            ranks,
            boarding_prefix: boarding_prefix.into(),
            boarding_priority,
            opening_sentinel: opening_sentinel.into(),
            closing_sentinel: closing_sentinel.into(),
            unranked: highest.saturating_add(1).min(u32::MAX - 1),
        }
    }

    pub fn key(&self, event_name: &str) -> OrderKey {
        if event_name == self.opening_sentinel {
            return OrderKey::OPENING;
        }
        if event_name == self.closing_sentinel {
            return OrderKey::CLOSING;
        }
        if let Some(rank) = self.ranks.get(event_name) {
            return OrderKey(*rank);
        }
        if self.is_boarding(event_name) {
            return OrderKey(self.boarding_priority);
        }
        OrderKey(self.unranked)
    }

    /// Name of the boarding event that precedes `terminal`.
    pub fn boarding_name(&self, terminal: &str) -> String {
        format!("{} - ({terminal})", self.boarding_prefix)
    }

    pub fn is_boarding(&self, event_name: &str) -> bool {
        event_name
            .strip_prefix(self.boarding_prefix.as_str())
            .is_some_and(|rest| rest.starts_with(" - (") && rest.ends_with(')'))
    }

    pub fn unranked_key(&self) -> OrderKey {
        OrderKey(self.unranked)
    }
}
