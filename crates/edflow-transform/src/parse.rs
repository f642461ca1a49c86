//! Raw row cleaning: exact duplicates, timestamp parsing and the cutoff date.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDateTime;
use tracing::trace;

use edflow_model::{EventOrigin, EventRecord, RawEvent, StageReport, VisitId, redact_value};

use crate::context::TransformContext;

/// Turns raw rows into parsed event records.
///
/// Exact duplicate rows are removed first, then rows with a blank visit or
/// event name, an unparseable timestamp, or a date before the cutoff. Every
/// drop is silent apart from the returned report.
pub fn parse_events(
    stage: &str,
    rows: Vec<RawEvent>,
    context: &TransformContext<'_>,
) -> (Vec<EventRecord>, StageReport) {
    let config = context.config;
    let mut report = StageReport::new(stage);
    report.events_in = rows.len();
    report.visits_in = distinct_visits(rows.iter().map(|row| row.visit_id.as_str()));

    let mut seen: HashSet<RawEvent> = HashSet::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen.insert(row.clone()) {
            report.drop_events("exact_duplicate", 1);
            continue;
        }
        if row.visit_id.is_empty() || row.event_name.is_empty() {
            report.drop_events("missing_identifier", 1);
            continue;
        }
        let Ok(event_time) = NaiveDateTime::parse_from_str(&row.event_time, &config.timestamp_format)
        else {
            trace!(
                visit = redact_value(&row.visit_id),
                time = %row.event_time,
                "unparseable event time"
            );
            report.drop_events("unparseable_time", 1);
            continue;
        };
        if event_time.date() < config.cutoff_date {
            report.drop_events("before_cutoff", 1);
            continue;
        }
        records.push(EventRecord {
            visit_id: VisitId::new(row.visit_id),
            event_name: row.event_name,
            event_time,
            staff_id: row.staff_id,
            location: row.location,
            origin: EventOrigin::Recorded,
        });
    }

    report.events_out = records.len();
    report.visits_out = distinct_visits(records.iter().map(|record| record.visit_id.as_str()));
    (records, report)
}

fn distinct_visits<'a>(ids: impl Iterator<Item = &'a str>) -> usize {
    ids.collect::<BTreeSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use edflow_model::PipelineConfig;

    use super::*;

    #[test]
    fn drops_are_counted_by_reason() {
        let config = PipelineConfig::default();
        let context = TransformContext::new(&config);
        let rows = vec![
            RawEvent::new("1", "Triaged", "01/05/2018 10:00"),
            RawEvent::new("1", "Triaged", "01/05/2018 10:00"),
            RawEvent::new("1", "Triaged", "2018-05-01 10:00"),
            RawEvent::new("2", "Triaged", "01/03/2018 10:00"),
            RawEvent::new("", "Triaged", "01/05/2018 10:00"),
        ];

        let (records, report) = parse_events("parse_events", rows, &context);

        assert_eq!(records.len(), 1);
        assert_eq!(report.dropped_events.get("exact_duplicate"), Some(&1));
        assert_eq!(report.dropped_events.get("unparseable_time"), Some(&1));
        assert_eq!(report.dropped_events.get("before_cutoff"), Some(&1));
        assert_eq!(report.dropped_events.get("missing_identifier"), Some(&1));
        assert_eq!(report.visits_out, 1);
    }

    #[test]
    fn cutoff_date_itself_is_kept() {
        let config = PipelineConfig::default();
        let context = TransformContext::new(&config);
        let rows = vec![RawEvent::new("1", "Triaged", "01/04/2018 00:00")];
        let (records, _) = parse_events("parse_events", rows, &context);
        assert_eq!(records.len(), 1);
    }
}
