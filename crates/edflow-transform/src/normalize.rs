//! Event log normalization.
//!
//! # Standard Step Order
//!
//! 1. **near_duplicates** - drop quick repeats of one event name
//! 2. **non_repeatable** - keep only the first occurrence of designated names
//! 3. **merge_collaborators** - union observation and diagnostic events
//! 4. **discharge_truncation** - drop everything after the first discharge
//! 5. **name_collisions** - resolve one act recorded under two labels
//! 6. **admission_relabel** - rename discharge to the admission outcome
//!
//! Raw rows go through [`parse_events`] first. Running the step pipeline on
//! its own output changes nothing.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDateTime;
use tracing::info;

use edflow_model::{
    AdmissionStatus, DuplicateGates, EventRecord, RawEvent, StageReport, VisitId,
};

use crate::context::TransformContext;
use crate::log::EventLog;
use crate::parse::parse_events;
use crate::pipeline::{PipelineOutcome, TransformPipeline, TransformStep};

/// Everything read from the extracts, already in the shared row shape.
#[derive(Debug, Clone, Default)]
pub struct SourceEvents {
    pub events: Vec<RawEvent>,
    pub admissions: Vec<AdmissionStatus>,
    pub observations: Vec<RawEvent>,
    pub diagnostics: Vec<RawEvent>,
}

impl SourceEvents {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }
}

/// Parses every source and runs the normalization steps.
///
/// Reports come back in execution order: one per parsed source, then one per
/// step.
pub fn normalize(sources: SourceEvents, context: &TransformContext<'_>) -> PipelineOutcome {
    let SourceEvents {
        events,
        admissions,
        observations,
        diagnostics,
    } = sources;

    let (records, events_report) = parse_events("parse_events", events, context);
    let mut reports = vec![events_report];
    let mut collaborators = Vec::new();
    for (stage, rows) in [
        ("parse_observations", observations),
        ("parse_diagnostics", diagnostics),
    ] {
        if rows.is_empty() {
            continue;
        }
        let (parsed, report) = parse_events(stage, rows, context);
        collaborators.extend(parsed);
        reports.push(report);
    }

    let log = EventLog::from_records(records, context);
    let outcome = build_normalization_pipeline(collaborators, &admissions).execute(log, context);
    reports.extend(outcome.reports);
    info!(
        visits = outcome.log.visit_count(),
        events = outcome.log.event_count(),
        "normalized event log"
    );
    PipelineOutcome {
        log: outcome.log,
        reports,
    }
}

/// Builds the normalization steps in their standard order.
pub fn build_normalization_pipeline(
    collaborators: Vec<EventRecord>,
    admissions: &[AdmissionStatus],
) -> TransformPipeline {
    TransformPipeline::new()
        .add_step(Box::new(SuppressNearDuplicates))
        .add_step(Box::new(SuppressRepeats))
        .add_step(Box::new(MergeCollaborators::new(collaborators)))
        .add_step(Box::new(TruncateAfterDischarge))
        .add_step(Box::new(ResolveNameCollisions))
        .add_step(Box::new(RelabelAdmissions::new(admissions)))
}

/// Drops a repeat of an event name that follows the previous occurrence of
/// that name by less than `repeat_time_threshold` minutes.
///
/// With a gate enabled, the gated field must be present on both events and
/// equal, otherwise the repeat is kept.
pub struct SuppressNearDuplicates;

impl TransformStep for SuppressNearDuplicates {
    fn step_name(&self) -> &'static str {
        "near_duplicates"
    }

    fn should_skip(&self, context: &TransformContext<'_>) -> bool {
        context.config.repeat_time_threshold <= 0.0
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let threshold = context.config.repeat_time_threshold;
        let gates = context.config.duplicate_suppression_gates;
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            let repeats = near_duplicate_mask(events, threshold, gates);
            let dropped = repeats.iter().filter(|&&repeat| repeat).count();
            let mut repeats = repeats.into_iter();
            events.retain(|_| !repeats.next().unwrap_or(false));
            report.drop_events("near_duplicate", dropped);
        }
        EventLog::from_visits(visits)
    }
}

/// Marks each event that repeats its name's previous occurrence, kept or not.
fn near_duplicate_mask(events: &[EventRecord], threshold: f64, gates: DuplicateGates) -> Vec<bool> {
    let mut previous: HashMap<&str, &EventRecord> = HashMap::new();
    events
        .iter()
        .map(|event| {
            previous
                .insert(event.event_name.as_str(), event)
                .is_some_and(|before| is_near_duplicate(before, event, threshold, gates))
        })
        .collect()
}

fn is_near_duplicate(
    previous: &EventRecord,
    current: &EventRecord,
    threshold_minutes: f64,
    gates: DuplicateGates,
) -> bool {
    let gap_minutes = (current.event_time - previous.event_time).num_seconds() as f64 / 60.0;
    gap_minutes < threshold_minutes
        && (!gates.staff || present_and_equal(&previous.staff_id, &current.staff_id))
        && (!gates.location || present_and_equal(&previous.location, &current.location))
}

fn present_and_equal(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Keeps only the earliest occurrence of each non-repeatable event name.
pub struct SuppressRepeats;

impl TransformStep for SuppressRepeats {
    fn step_name(&self) -> &'static str {
        "non_repeatable"
    }

    fn should_skip(&self, context: &TransformContext<'_>) -> bool {
        context.config.non_repeatable_event_names.is_empty()
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let names = &context.config.non_repeatable_event_names;
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            let before = events.len();
            let mut seen: HashSet<String> = HashSet::new();
            events.retain(|event| {
                !names.contains(&event.event_name) || seen.insert(event.event_name.clone())
            });
            report.drop_events("repeated", before - events.len());
        }
        EventLog::from_visits(visits)
    }
}

/// Unions collaborator events into the log.
///
/// A collaborator event identical to one already present is not added
/// again, so merging twice is the same as merging once.
#[derive(Debug, Clone, Default)]
pub struct MergeCollaborators {
    records: Vec<EventRecord>,
}

impl MergeCollaborators {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records }
    }
}

impl TransformStep for MergeCollaborators {
    fn step_name(&self) -> &'static str {
        "merge_collaborators"
    }

    fn should_skip(&self, _context: &TransformContext<'_>) -> bool {
        self.records.is_empty()
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let mut visits = log.into_visits();
        for record in &self.records {
            let events = visits.entry(record.visit_id.clone()).or_default();
            if events.contains(record) {
                report.drop_events("already_present", 1);
            } else {
                events.push(record.clone());
                report.synthesize("merged", 1);
            }
        }
        for events in visits.values_mut() {
            context.sort_visit(events);
        }
        EventLog::from_visits(visits)
    }
}

/// Drops every event sequenced after a visit's first discharge.
pub struct TruncateAfterDischarge;

impl TransformStep for TruncateAfterDischarge {
    fn step_name(&self) -> &'static str {
        "discharge_truncation"
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let discharge = context.names().discharge.as_str();
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            if let Some(position) = events.iter().position(|event| event.event_name == discharge) {
                report.drop_events("after_discharge", events.len() - position - 1);
                events.truncate(position + 1);
            }
        }
        EventLog::from_visits(visits)
    }
}

/// Removes the yielding label of a collision pair when the preferred label
/// shares its time, staff and location.
pub struct ResolveNameCollisions;

impl TransformStep for ResolveNameCollisions {
    fn step_name(&self) -> &'static str {
        "name_collisions"
    }

    fn should_skip(&self, context: &TransformContext<'_>) -> bool {
        context.config.name_collisions.is_empty()
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let mut visits = log.into_visits();
        for events in visits.values_mut() {
            for collision in &context.config.name_collisions {
                let preferred: Vec<(NaiveDateTime, Option<String>, Option<String>)> = events
                    .iter()
                    .filter(|event| event.event_name == collision.keep)
                    .map(|event| (event.event_time, event.staff_id.clone(), event.location.clone()))
                    .collect();
                if preferred.is_empty() {
                    continue;
                }
                let before = events.len();
                events.retain(|event| {
                    event.event_name != collision.drop
                        || !preferred.iter().any(|(time, staff, location)| {
                            *time == event.event_time
                                && *staff == event.staff_id
                                && *location == event.location
                        })
                });
                report.drop_events("name_collision", before - events.len());
            }
        }
        EventLog::from_visits(visits)
    }
}

/// Renames a visit's discharge event to its admission outcome.
///
/// Outcomes equal to the configured non-admitted value are ignored. When a
/// visit has several outcome rows the first one wins.
#[derive(Debug, Clone, Default)]
pub struct RelabelAdmissions {
    outcomes: BTreeMap<VisitId, String>,
}

impl RelabelAdmissions {
    pub fn new(statuses: &[AdmissionStatus]) -> Self {
        let mut outcomes = BTreeMap::new();
        for status in statuses {
            outcomes
                .entry(status.visit_id.clone())
                .or_insert_with(|| status.outcome.clone());
        }
        Self { outcomes }
    }
}

impl TransformStep for RelabelAdmissions {
    fn step_name(&self) -> &'static str {
        "admission_relabel"
    }

    fn should_skip(&self, _context: &TransformContext<'_>) -> bool {
        self.outcomes.is_empty()
    }

    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog {
        let discharge = context.names().discharge.as_str();
        let non_admitted = context.config.non_admitted_outcome.as_str();
        let mut visits = log.into_visits();
        for (visit, events) in &mut visits {
            let Some(outcome) = self.outcomes.get(visit) else {
                continue;
            };
            if outcome == non_admitted || outcome == discharge {
                continue;
            }
            let mut relabeled = 0;
            for event in events.iter_mut().filter(|event| event.event_name == discharge) {
                event.event_name.clone_from(outcome);
                relabeled += 1;
            }
            if relabeled > 0 {
                context.sort_visit(events);
                report.relabel("admission_outcome", relabeled);
            }
        }
        EventLog::from_visits(visits)
    }
}
