//! In-flight event log grouped by visit.

use std::collections::BTreeMap;

use edflow_model::{EventRecord, VisitId};

use crate::context::TransformContext;

/// Events keyed by visit, each visit kept in sequence order.
///
/// Visits never hold an empty event list; a visit whose last event is
/// removed disappears from the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    visits: BTreeMap<VisitId, Vec<EventRecord>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups `records` by visit and sorts each visit.
    pub fn from_records(
        records: impl IntoIterator<Item = EventRecord>,
        context: &TransformContext<'_>,
    ) -> Self {
        let mut visits: BTreeMap<VisitId, Vec<EventRecord>> = BTreeMap::new();
        for record in records {
            visits
                .entry(record.visit_id.clone())
                .or_default()
                .push(record);
        }
        for events in visits.values_mut() {
            context.sort_visit(events);
        }
        Self { visits }
    }

    /// Wraps an already-sorted visit map, discarding empty visits.
    pub fn from_visits(mut visits: BTreeMap<VisitId, Vec<EventRecord>>) -> Self {
        visits.retain(|_, events| !events.is_empty());
        Self { visits }
    }

    pub fn into_visits(self) -> BTreeMap<VisitId, Vec<EventRecord>> {
        self.visits
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

    pub fn visits(&self) -> impl Iterator<Item = (&VisitId, &[EventRecord])> {
        self.visits
            .iter()
            .map(|(visit, events)| (visit, events.as_slice()))
    }

    pub fn visit(&self, visit_id: &VisitId) -> Option<&[EventRecord]> {
        self.visits.get(visit_id).map(Vec::as_slice)
    }

    pub fn records(&self) -> impl Iterator<Item = &EventRecord> {
        self.visits.values().flatten()
    }
}
