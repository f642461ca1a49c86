//! Event records at each stage of the pipeline.
//!
//! - [`RawEvent`]: one row of the source table, timestamps still text.
//! - [`EventRecord`]: a parsed event being cleaned and resolved.
//! - [`CanonicalEvent`]: a resolved event with location, pathway and order key.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::order::OrderKey;
use crate::process::ProcessId;

/// Identifier of one patient attendance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(String);

impl VisitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VisitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One recorded action as it appears in the source table.
///
/// Column names follow the source extract so rows can be read and written
/// with serde-aware CSV readers directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "VisitId")]
    pub visit_id: String,
    #[serde(rename = "EventName")]
    pub event_name: String,
    #[serde(rename = "EventTime")]
    pub event_time: String,
    #[serde(rename = "EventStaffId", default)]
    pub staff_id: Option<String>,
    #[serde(rename = "EventLocation", default)]
    pub location: Option<String>,
}

impl RawEvent {
    pub fn new(
        visit_id: impl Into<String>,
        event_name: impl Into<String>,
        event_time: impl Into<String>,
    ) -> Self {
        Self {
            visit_id: visit_id.into(),
            event_name: event_name.into(),
            event_time: event_time.into(),
            staff_id: None,
            location: None,
        }
    }

    #[must_use]
    pub fn with_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Admission outcome for a visit, from the admission status extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionStatus {
    pub visit_id: VisitId,
    pub outcome: String,
}

/// How an event came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    /// Present in the source data.
    #[default]
    Recorded,
    /// Synthesized Walk-In arrival.
    WalkIn,
    /// Synthesized post-decision boarding wait.
    Boarding,
    /// Synthesized visit-opening sentinel.
    OpeningSentinel,
    /// Synthesized visit-closing sentinel.
    ClosingSentinel,
}

impl EventOrigin {
    pub fn is_sentinel(self) -> bool {
        matches!(self, Self::OpeningSentinel | Self::ClosingSentinel)
    }
}

/// A parsed event moving through normalization and resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub visit_id: VisitId,
    pub event_name: String,
    pub event_time: NaiveDateTime,
    pub staff_id: Option<String>,
    pub location: Option<String>,
    pub origin: EventOrigin,
}

impl EventRecord {
    pub fn new(visit_id: VisitId, event_name: impl Into<String>, event_time: NaiveDateTime) -> Self {
        Self {
            visit_id,
            event_name: event_name.into(),
            event_time,
            staff_id: None,
            location: None,
            origin: EventOrigin::Recorded,
        }
    }

    /// Builds a synthesized event that shares this event's visit and location.
    pub fn synthesize(
        &self,
        event_name: impl Into<String>,
        event_time: NaiveDateTime,
        origin: EventOrigin,
    ) -> Self {
        Self {
            visit_id: self.visit_id.clone(),
            event_name: event_name.into(),
            event_time,
            staff_id: None,
            location: self.location.clone(),
            origin,
        }
    }

    #[must_use]
    pub fn with_staff(mut self, staff_id: impl Into<String>) -> Self {
        self.staff_id = Some(staff_id.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A resolved event, tagged with its pathway and tie-breaking order key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub visit_id: VisitId,
    pub event_name: String,
    pub event_time: NaiveDateTime,
    pub staff_id: Option<String>,
    pub location: String,
    pub pathway: String,
    pub order_key: OrderKey,
    pub origin: EventOrigin,
}

impl CanonicalEvent {
    /// The `(event_name, pathway)` process this event belongs to.
    pub fn process(&self) -> ProcessId {
        ProcessId::new(self.event_name.clone(), self.pathway.clone())
    }

    /// Sort key used for the per-visit total order.
    pub fn sequence_key(&self) -> (NaiveDateTime, OrderKey) {
        (self.event_time, self.order_key)
    }
}
