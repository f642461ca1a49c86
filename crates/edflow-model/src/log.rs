//! Resolved events grouped by visit.

use std::collections::{BTreeMap, BTreeSet};

use crate::event::{CanonicalEvent, VisitId};

/// Canonical events keyed by visit, each visit in `(time, order_key)` order.
///
/// Events sharing both time and order key fall back to name order and then
/// to insertion order, so iteration is always deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalLog {
    visits: BTreeMap<VisitId, Vec<CanonicalEvent>>,
}

impl CanonicalLog {
    pub fn new(events: impl IntoIterator<Item = CanonicalEvent>) -> Self {
        let mut visits: BTreeMap<VisitId, Vec<CanonicalEvent>> = BTreeMap::new();
        for event in events {
            visits.entry(event.visit_id.clone()).or_default().push(event);
        }
        for events in visits.values_mut() {
            sort_canonical(events);
        }
        Self { visits }
    }

    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    pub fn event_count(&self) -> usize {
        self.visits.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn visits(&self) -> impl Iterator<Item = (&VisitId, &[CanonicalEvent])> {
        self.visits
            .iter()
            .map(|(visit, events)| (visit, events.as_slice()))
    }

    pub fn visit(&self, visit_id: &VisitId) -> Option<&[CanonicalEvent]> {
        self.visits.get(visit_id).map(Vec::as_slice)
    }

    pub fn events(&self) -> impl Iterator<Item = &CanonicalEvent> {
        self.visits.values().flatten()
    }

    /// Copy of the log without the `excluded` visits.
    #[must_use]
    pub fn without_visits(&self, excluded: &BTreeSet<VisitId>) -> Self {
        Self {
            visits: self
                .visits
                .iter()
                .filter(|(visit, _)| !excluded.contains(*visit))
                .map(|(visit, events)| (visit.clone(), events.clone()))
                .collect(),
        }
    }
}

fn sort_canonical(events: &mut [CanonicalEvent]) {
    events.sort_by(|a, b| {
        a.sequence_key()
            .cmp(&b.sequence_key())
            .then_with(|| a.event_name.cmp(&b.event_name))
    });
}
