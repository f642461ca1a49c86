//! Loaders for the events extract and its collaborator extracts.
//!
//! Every loader maps its extract into [`RawEvent`] rows (or
//! [`AdmissionStatus`] rows) so the normalizer can merge them by union.

use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use edflow_model::{AdmissionStatus, RawEvent, VisitId};

use crate::error::Result;
use crate::table::{CsvTable, field, optional_field};

const VISIT_COLUMNS: &[&str] = &["VisitId", "VisitID", "AttendanceID"];

/// Load the main events extract.
///
/// Required columns: `VisitId`, `EventName`, `EventTime`. `EventStaffId` and
/// `EventLocation` are optional; blank cells become `None`.
pub fn load_events(path: &Path) -> Result<Vec<RawEvent>> {
    let table = CsvTable::read(path)?;
    let visit = table.require_column(VISIT_COLUMNS)?;
    let name = table.require_column(&["EventName"])?;
    let time = table.require_column(&["EventTime"])?;
    let staff = table.find_column(&["EventStaffId", "EventStaffID"]);
    let location = table.find_column(&["EventLocation"]);

    let events: Vec<RawEvent> = table
        .records()
        .iter()
        .map(|record| RawEvent {
            visit_id: field(record, visit).unwrap_or_default(),
            event_name: field(record, name).unwrap_or_default(),
            event_time: field(record, time).unwrap_or_default(),
            staff_id: optional_field(record, staff),
            location: optional_field(record, location),
        })
        .collect();
    info!(path = %path.display(), rows = events.len(), "loaded events extract");
    Ok(events)
}

/// Load the admission status extract (`AttendanceID`/`VisitId`, `Adm`).
pub fn load_admissions(path: &Path) -> Result<Vec<AdmissionStatus>> {
    let table = CsvTable::read(path)?;
    let visit = table.require_column(VISIT_COLUMNS)?;
    let outcome = table.require_column(&["Adm", "AdmissionOutcome"])?;

    let mut statuses = Vec::with_capacity(table.len());
    for record in table.records() {
        let (Some(visit_id), Some(outcome)) = (field(record, visit), field(record, outcome)) else {
            continue;
        };
        statuses.push(AdmissionStatus {
            visit_id: VisitId::new(visit_id),
            outcome,
        });
    }
    info!(path = %path.display(), rows = statuses.len(), "loaded admission status extract");
    Ok(statuses)
}

/// Load the observations extract (`VisitID`, `ChartDateTime`).
///
/// Every chart entry becomes one event named `event_name`, with no staff or
/// location recorded.
pub fn load_observations(path: &Path, event_name: &str) -> Result<Vec<RawEvent>> {
    let table = CsvTable::read(path)?;
    let visit = table.require_column(VISIT_COLUMNS)?;
    let time = table.require_column(&["ChartDateTime", "EventTime"])?;

    let events: Vec<RawEvent> = table
        .records()
        .iter()
        .map(|record| {
            RawEvent::new(
                field(record, visit).unwrap_or_default(),
                event_name,
                field(record, time).unwrap_or_default(),
            )
        })
        .collect();
    info!(path = %path.display(), rows = events.len(), "loaded observations extract");
    Ok(events)
}

/// Load the diagnostics request extract.
///
/// Columns `VisitID`, `Request DateTime`, `ItemMasterCategory`; the category
/// becomes the event name. Requests of one visit made within
/// `collapse_window` of the previous request collapse into the earlier one.
pub fn load_diagnostics(
    path: &Path,
    timestamp_format: &str,
    collapse_window: TimeDelta,
) -> Result<Vec<RawEvent>> {
    let table = CsvTable::read(path)?;
    let visit = table.require_column(VISIT_COLUMNS)?;
    let time = table.require_column(&["Request DateTime", "EventTime"])?;
    let category = table.require_column(&["ItemMasterCategory", "EventName"])?;

    let requests: Vec<RawEvent> = table
        .records()
        .iter()
        .map(|record| {
            RawEvent::new(
                field(record, visit).unwrap_or_default(),
                field(record, category).unwrap_or_default(),
                field(record, time).unwrap_or_default(),
            )
        })
        .collect();
    let total = requests.len();
    let collapsed = collapse_requests(requests, timestamp_format, collapse_window);
    info!(
        path = %path.display(),
        rows = total,
        kept = collapsed.len(),
        "loaded diagnostics extract"
    );
    Ok(collapsed)
}

/// Collapse bursts of requests per visit.
///
/// Within a visit, in time order, a request less than `window` after the
/// previous request is dropped. Requests with unparseable times are kept
/// untouched; the normalizer excludes them.
pub fn collapse_requests(
    requests: Vec<RawEvent>,
    timestamp_format: &str,
    window: TimeDelta,
) -> Vec<RawEvent> {
    let mut timed: Vec<(usize, NaiveDateTime, RawEvent)> = Vec::new();
    let mut untimed = Vec::new();
    for (index, request) in requests.into_iter().enumerate() {
        match NaiveDateTime::parse_from_str(&request.event_time, timestamp_format) {
            Ok(time) => timed.push((index, time, request)),
            Err(_) => untimed.push((index, request)),
        }
    }
    timed.sort_by(|a, b| {
        a.2.visit_id
            .cmp(&b.2.visit_id)
            .then(a.1.cmp(&b.1))
            .then(a.0.cmp(&b.0))
    });

    let mut kept: Vec<(usize, RawEvent)> = Vec::with_capacity(timed.len() + untimed.len());
    let mut previous: Option<(String, NaiveDateTime)> = None;
    let mut dropped = 0usize;
    for (index, time, request) in timed {
        let burst = previous
            .as_ref()
            .is_some_and(|(visit, at)| *visit == request.visit_id && time - *at < window);
        previous = Some((request.visit_id.clone(), time));
        if burst {
            dropped += 1;
        } else {
            kept.push((index, request));
        }
    }
    kept.extend(untimed);
    kept.sort_by_key(|(index, _)| *index);
    debug!(dropped, "collapsed diagnostic request bursts");
    kept.into_iter().map(|(_, request)| request).collect()
}
