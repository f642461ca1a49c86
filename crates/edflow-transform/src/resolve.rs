//! Location and pathway resolution.
//!
//! # Standard Step Order
//!
//! 1. **default_ambulance_location** - locate ambulance arrivals recorded without one
//! 2. **forward_fill_locations** - carry locations forward within a visit
//! 3. **exclusions** - drop blocklisted events, then visits with unusable locations
//! 4. **walk_in** - synthesize an arrival for visits without one
//! 5. **boarding** - collapse admission outcomes and synthesize the bed wait
//! 6. **sentinels** - opening and closing sentinels (optional)
//! 7. **last_location_override** - one location per visit (optional)
//!
//! Every step keeps visits in `(time, order_key)` order. [`tag_pathways`]
//! then maps locations to pathways and emits the canonical log.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use edflow_model::{
    CanonicalEvent, CanonicalLog, EventOrigin, EventRecord, OrderKey, StageReport, VisitId,
    redact_value,
};

use crate::context::TransformContext;
use crate::log::EventLog;
use crate::pipeline::{TransformPipeline, TransformStep};

/// Canonical log and stage reports produced by resolution.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub log: CanonicalLog,
    pub reports: Vec<StageReport>,
}

/// Runs the resolution steps and pathway tagging over a normalized log.
pub fn resolve(log: EventLog, context: &TransformContext<'_>) -> Resolved {
    let outcome = build_resolution_pipeline().execute(log, context);
    let mut reports = outcome.reports;
    let (canonical, report) = tag_pathways(outcome.log, context);
    reports.push(report);
    info!(
        visits = canonical.visit_count(),
        events = canonical.event_count(),
        "resolved locations and pathways"
    );
    Resolved {
        log: canonical,
        reports,
    }
}

/// Builds the resolution steps in their standard order.
pub fn build_resolution_pipeline() -> TransformPipeline {
    TransformPipeline::new()
        .add_step(Box::new(DefaultAmbulanceLocation))
        .add_step(Box::new(ForwardFillLocations))
        .add_step(Box::new(ExcludeEventsAndLocations))
        .add_step(Box::new(SynthesizeWalkIn))
        .add_step(Box::new(SynthesizeBoarding))
        .add_step(Box::new(InsertSentinels))
        .add_step(Box::new(OverrideLastLocation))
}

/// Gives ambulance arrivals without a location the configured default.
pub struct DefaultAmbulanceLocation;

impl TransformStep for DefaultAmbulanceLocation {
    fn step_name(&self) -> &'static str {
        "default_ambulance_location"
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let arrival = context.names().ambulance_arrival.as_str();
        let default = &context.config.default_ambulance_location;
        let mut visits = log.into_visits();
        for event in visits.values_mut().flatten() {
            if event.event_name == arrival && event.location.is_none() {
                event.location = Some(default.clone());
                report.relabel("default_location", 1);
            }
        }
        EventLog::from_visits(visits)
    }
}

/// Fills missing locations from the nearest earlier located event.
///
/// A visit with no location anywhere is dropped.
pub struct ForwardFillLocations;

impl TransformStep for ForwardFillLocations {
    fn step_name(&self) -> &'static str {
        "forward_fill_locations"
    }

    fn apply(
        &self,
        log: EventLog,
        _context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let mut visits = log.into_visits();
        visits.retain(|visit, events| {
            if events.iter().all(|event| event.location.is_none()) {
                debug!(visit = redact_value(visit.as_str()), "visit has no location");
                report.drop_visits("no_location", 1);
                return false;
            }
            let mut current: Option<String> = None;
            for event in events.iter_mut() {
                if let Some(location) = &event.location {
                    current = Some(location.clone());
                } else if current.is_some() {
                    event.location.clone_from(&current);
                    report.relabel("forward_filled", 1);
                }
            }
            true
        });
        EventLog::from_visits(visits)
    }
}

/// Drops blocklisted event names, then every visit that still has an event
/// at a blocklisted or missing location.
pub struct ExcludeEventsAndLocations;

impl TransformStep for ExcludeEventsAndLocations {
    fn step_name(&self) -> &'static str {
        "exclusions"
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let config = context.config;
        let mut visits = log.into_visits();
        visits.retain(|visit, events| {
            let before = events.len();
            events.retain(|event| !config.excluded_event_names.contains(&event.event_name));
            report.drop_events("excluded_event", before - events.len());
            if events.is_empty() {
                report.drop_visits("no_events", 1);
                return false;
            }
            let reason = events.iter().find_map(|event| match &event.location {
                None => Some("missing_location"),
                Some(location) if config.excluded_locations.contains(location) => {
                    Some("excluded_location")
                }
                Some(_) => None,
            });
            if let Some(reason) = reason {
                debug!(visit = redact_value(visit.as_str()), reason, "dropped visit");
                report.drop_visits(reason, 1);
                return false;
            }
            true
        });
        EventLog::from_visits(visits)
    }
}

/// Adds a Walk-In arrival at the earliest timestamp of visits that did not
/// start with an arrival.
pub struct SynthesizeWalkIn;

impl TransformStep for SynthesizeWalkIn {
    fn step_name(&self) -> &'static str {
        "walk_in"
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let names = context.names();
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            let Some(first) = events.first() else {
                continue;
            };
            let start = first.event_time;
            let arrived = events
                .iter()
                .take_while(|event| event.event_time == start)
                .any(|event| {
                    event.event_name == names.ambulance_arrival || event.event_name == names.walk_in
                });
            if arrived {
                continue;
            }
            let walk_in = first.synthesize(names.walk_in.clone(), start, EventOrigin::WalkIn);
            events.push(walk_in);
            context.sort_visit(events);
            report.synthesize("walk_in", 1);
        }
        EventLog::from_visits(visits)
    }
}

/// Collapses admission destinations, then adds a bed wait named after the
/// terminal event of every visit that did not end in discharge.
///
/// The wait takes the terminal event's time and location and sequences by
/// the boarding priority, so it precedes an admission at the same time.
pub struct SynthesizeBoarding;

impl TransformStep for SynthesizeBoarding {
    fn step_name(&self) -> &'static str {
        "boarding"
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let outcome_map = &context.config.admission_outcome_map;
        let discharge = context.names().discharge.as_str();
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            let mut collapsed = 0;
            for event in events.iter_mut() {
                if let Some(label) = outcome_map.get(&event.event_name)
                    && *label != event.event_name
                {
                    event.event_name.clone_from(label);
                    collapsed += 1;
                }
            }
            if collapsed > 0 {
                context.sort_visit(events);
                report.relabel("admission_outcome_collapsed", collapsed);
            }

            if events
                .iter()
                .any(|event| context.order.is_boarding(&event.event_name))
            {
                continue;
            }
            let Some(last) = events
                .iter()
                .rev()
                .find(|event| !event.origin.is_sentinel())
            else {
                continue;
            };
            if last.event_name == discharge {
                continue;
            }
            let name = context.order.boarding_name(&last.event_name);
            let boarding = last.synthesize(name, last.event_time, EventOrigin::Boarding);
            events.push(boarding);
            context.sort_visit(events);
            report.synthesize("boarding", 1);
        }
        EventLog::from_visits(visits)
    }
}

/// Brackets each visit with opening and closing sentinels.
///
/// The opening sentinel takes the first event's location, the closing
/// sentinel the last event's.
pub struct InsertSentinels;

impl TransformStep for InsertSentinels {
    fn step_name(&self) -> &'static str {
        "sentinels"
    }

    fn should_skip(&self, context: &TransformContext<'_>) -> bool {
        !context.config.include_sentinels
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let names = context.names();
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            if events.iter().any(|event| event.origin.is_sentinel()) {
                continue;
            }
            let (Some(first), Some(last)) = (events.first(), events.last()) else {
                continue;
            };
            let opening = first.synthesize(
                names.opening_sentinel.clone(),
                first.event_time,
                EventOrigin::OpeningSentinel,
            );
            let closing = last.synthesize(
                names.closing_sentinel.clone(),
                last.event_time,
                EventOrigin::ClosingSentinel,
            );
            events.insert(0, opening);
            events.push(closing);
            report.synthesize("sentinel", 2);
        }
        EventLog::from_visits(visits)
    }
}

/// Replaces every location of a visit with its final location.
pub struct OverrideLastLocation;

impl TransformStep for OverrideLastLocation {
    fn step_name(&self) -> &'static str {
        "last_location_override"
    }

    fn should_skip(&self, context: &TransformContext<'_>) -> bool {
        !context.config.last_location_override
    }

    fn apply(
        &self,
        log: EventLog,
        _context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            let Some(last) = events.last().and_then(|event| event.location.clone()) else {
                continue;
            };
            for event in events.iter_mut() {
                if event.location.as_deref() != Some(last.as_str()) {
                    event.location = Some(last.clone());
                    report.relabel("location_overridden", 1);
                }
            }
        }
        EventLog::from_visits(visits)
    }
}

/// Maps each location to its pathway and assigns order keys.
///
/// A visit touching a location missing from the pathway map is dropped
/// whole and counted under `unmapped_location`.
pub fn tag_pathways(log: EventLog, context: &TransformContext<'_>) -> (CanonicalLog, StageReport) {
    let mut report = StageReport::new("pathway_tagging");
    report.events_in = log.event_count();
    report.visits_in = log.visit_count();

    let mut unmapped: BTreeSet<String> = BTreeSet::new();
    let mut canonical = Vec::with_capacity(log.event_count());
    for (visit, events) in log.into_visits() {
        match canonical_visit(&visit, events, context) {
            Ok(events) => canonical.extend(events),
            Err(location) => {
                report.drop_visits("unmapped_location", 1);
                unmapped.insert(location);
            }
        }
    }
    if !unmapped.is_empty() {
        warn!(
            locations = ?unmapped,
            visits = report.total_dropped_visits(),
            "dropped visits at locations without a pathway"
        );
    }

    let log = CanonicalLog::new(canonical);
    report.events_out = log.event_count();
    report.visits_out = log.visit_count();
    (log, report)
}

fn canonical_visit(
    visit: &VisitId,
    events: Vec<EventRecord>,
    context: &TransformContext<'_>,
) -> Result<Vec<CanonicalEvent>, String> {
    events
        .into_iter()
        .map(|event| {
            let location = event.location.unwrap_or_default();
            let Some(pathway) = context.config.pathway_for(&location) else {
                return Err(location);
            };
            let order_key = match event.origin {
                EventOrigin::OpeningSentinel => OrderKey::OPENING,
                EventOrigin::ClosingSentinel => OrderKey::CLOSING,
                _ => context.order.key(&event.event_name),
            };
            Ok(CanonicalEvent {
                visit_id: visit.clone(),
                event_name: event.event_name,
                event_time: event.event_time,
                staff_id: event.staff_id,
                pathway: pathway.to_string(),
                location,
                order_key,
                origin: event.origin,
            })
        })
        .collect()
}
