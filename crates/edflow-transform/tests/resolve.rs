//! Tests for location and pathway resolution.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use edflow_model::{
    CanonicalEvent, CanonicalLog, EventOrigin, OrderKey, PipelineConfig, RawEvent, VisitId,
};
use edflow_transform::{
    SourceEvents, TransformContext, build_resolution_pipeline, normalize, resolve,
};

fn at(clock: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("01/05/2018 {clock}"), "%d/%m/%Y %H:%M")
        .expect("valid test time")
}

fn raw(visit: &str, name: &str, clock: &str, location: Option<&str>) -> RawEvent {
    let event = RawEvent::new(visit, name, format!("01/05/2018 {clock}"));
    match location {
        Some(location) => event.with_location(location),
        None => event,
    }
}

fn scenario_config() -> PipelineConfig {
    PipelineConfig {
        location_to_pathway_map: BTreeMap::from([
            ("A".to_string(), "Majors".to_string()),
            ("B".to_string(), "Minors".to_string()),
        ]),
        default_ambulance_location: "A".to_string(),
        ..PipelineConfig::default()
    }
}

fn pipeline(config: &PipelineConfig, events: Vec<RawEvent>) -> CanonicalLog {
    let context = TransformContext::new(config);
    let normalized = normalize(SourceEvents::new(events), &context);
    resolve(normalized.log, &context).log
}

fn visit<'a>(log: &'a CanonicalLog, id: &str) -> &'a [CanonicalEvent] {
    log.visit(&VisitId::from(id)).unwrap_or_default()
}

fn names(events: &[CanonicalEvent]) -> Vec<&str> {
    events.iter().map(|event| event.event_name.as_str()).collect()
}

#[test]
fn default_pipeline_has_standard_steps() {
    assert_eq!(
        build_resolution_pipeline().step_names(),
        vec![
            "default_ambulance_location",
            "forward_fill_locations",
            "exclusions",
            "walk_in",
            "boarding",
            "sentinels",
            "last_location_override",
        ]
    );
}

#[test]
fn scenario_arrivals_and_boarding_are_synthesized() {
    let config = scenario_config();
    let log = pipeline(
        &config,
        vec![
            raw("V1", "Ambulance Arrival", "10:00", Some("A")),
            raw("V1", "Triaged", "10:10", Some("A")),
            raw("V1", "Discharged", "11:00", Some("A")),
            raw("V2", "Booked In", "09:00", Some("B")),
            raw("V2", "Triaged", "09:30", Some("B")),
            raw("V2", "Admitted-Ward", "10:30", Some("B")),
        ],
    );

    let v1 = visit(&log, "V1");
    assert_eq!(names(v1), vec!["Ambulance Arrival", "Triaged", "Discharged"]);
    assert!(v1.iter().all(|event| event.pathway == "Majors"));

    let v2 = visit(&log, "V2");
    assert_eq!(
        names(v2),
        vec![
            "Walk-In",
            "Booked In",
            "Triaged",
            "Wait for Bed - (Admitted-Ward)",
            "Admitted-Ward",
        ]
    );
    assert_eq!(v2[0].event_time, at("09:00"));
    assert_eq!(v2[0].origin, EventOrigin::WalkIn);
    assert_eq!(v2[3].event_time, at("10:30"));
    assert_eq!(v2[3].origin, EventOrigin::Boarding);
    assert!(v2.iter().all(|event| event.location == "B" && event.pathway == "Minors"));
}

#[test]
fn ambulance_arrival_gets_default_location_and_fills_forward() {
    let config = scenario_config();
    let log = pipeline(
        &config,
        vec![
            raw("1", "Ambulance Arrival", "10:00", None),
            raw("1", "Triaged", "10:10", None),
            raw("1", "Discharged", "11:00", None),
        ],
    );

    let events = visit(&log, "1");
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|event| event.location == "A"));
}

#[test]
fn visit_without_any_location_is_dropped() {
    let config = scenario_config();
    let context = TransformContext::new(&config);
    let normalized = normalize(
        SourceEvents::new(vec![
            raw("1", "Booked In", "10:00", None),
            raw("1", "Discharged", "11:00", None),
        ]),
        &context,
    );

    let resolved = resolve(normalized.log, &context);

    assert!(resolved.log.is_empty());
    let fill = resolved
        .reports
        .iter()
        .find(|report| report.stage == "forward_fill_locations")
        .expect("forward fill report");
    assert_eq!(fill.dropped_visits.get("no_location"), Some(&1));
}

#[test]
fn leading_missing_location_drops_whole_visit() {
    let config = scenario_config();
    let log = pipeline(
        &config,
        vec![
            raw("1", "Booked In", "10:00", None),
            raw("1", "Triaged", "10:10", Some("B")),
            raw("2", "Booked In", "10:00", Some("B")),
        ],
    );

    assert_eq!(log.visit_count(), 1);
    assert!(log.visit(&VisitId::from("1")).is_none());
}

#[test]
fn blocklisted_location_drops_whole_visit() {
    let mut config = scenario_config();
    config.excluded_locations.insert("Paediatrics".to_string());
    let log = pipeline(
        &config,
        vec![
            raw("1", "Booked In", "10:00", Some("B")),
            raw("1", "Triaged", "10:10", Some("Paediatrics")),
            raw("1", "Discharged", "11:00", Some("B")),
            raw("2", "Booked In", "10:00", Some("B")),
            raw("2", "Nursing Assessment", "10:05", Some("B")),
            raw("2", "Discharged", "11:00", Some("B")),
        ],
    );

    assert!(log.visit(&VisitId::from("1")).is_none());
    assert_eq!(
        names(visit(&log, "2")),
        vec!["Walk-In", "Booked In", "Discharged"]
    );
}

#[test]
fn last_location_overrides_earlier_locations() {
    let config = scenario_config();
    let log = pipeline(
        &config,
        vec![
            raw("1", "Ambulance Arrival", "10:00", Some("A")),
            raw("1", "Triaged", "10:10", Some("B")),
            raw("1", "Discharged", "11:00", Some("B")),
        ],
    );
    assert!(visit(&log, "1").iter().all(|event| event.pathway == "Minors"));

    let config = PipelineConfig {
        last_location_override: false,
        ..scenario_config()
    };
    let log = pipeline(
        &config,
        vec![
            raw("1", "Ambulance Arrival", "10:00", Some("A")),
            raw("1", "Triaged", "10:10", Some("B")),
            raw("1", "Discharged", "11:00", Some("B")),
        ],
    );
    let pathways: Vec<&str> = visit(&log, "1")
        .iter()
        .map(|event| event.pathway.as_str())
        .collect();
    assert_eq!(pathways, vec!["Majors", "Minors", "Minors"]);
}

#[test]
fn sentinels_bracket_each_visit() {
    let config = PipelineConfig {
        include_sentinels: true,
        ..scenario_config()
    };
    let log = pipeline(
        &config,
        vec![
            raw("1", "Ambulance Arrival", "10:00", Some("A")),
            raw("1", "Discharged", "11:00", Some("A")),
        ],
    );

    let events = visit(&log, "1");
    assert_eq!(
        names(events),
        vec!["Spawn", "Ambulance Arrival", "Discharged", "Removed"]
    );
    assert_eq!(events[0].order_key, OrderKey::OPENING);
    assert_eq!(events[0].event_time, at("10:00"));
    assert_eq!(events[3].order_key, OrderKey::CLOSING);
    assert_eq!(events[3].event_time, at("11:00"));
    assert_eq!(events[3].location, "A");
}

#[test]
fn admission_outcome_map_collapses_before_boarding() {
    let config = PipelineConfig {
        admission_outcome_map: BTreeMap::from([(
            "Admitted - SDEC".to_string(),
            "Admitted".to_string(),
        )]),
        ..scenario_config()
    };
    let log = pipeline(
        &config,
        vec![
            raw("1", "Ambulance Arrival", "10:00", Some("A")),
            raw("1", "Decision to Admit", "10:30", Some("A")),
            raw("1", "Admitted - SDEC", "12:00", Some("A")),
        ],
    );

    assert_eq!(
        names(visit(&log, "1")),
        vec![
            "Ambulance Arrival",
            "Decision to Admit",
            "Wait for Bed - (Admitted)",
            "Admitted",
        ]
    );
}

#[test]
fn unmapped_location_drops_visit() {
    let config = scenario_config();
    let context = TransformContext::new(&config);
    let normalized = normalize(
        SourceEvents::new(vec![
            raw("1", "Ambulance Arrival", "10:00", Some("Z")),
            raw("1", "Discharged", "11:00", Some("Z")),
            raw("2", "Ambulance Arrival", "10:00", Some("A")),
            raw("2", "Discharged", "11:00", Some("A")),
        ]),
        &context,
    );

    let resolved = resolve(normalized.log, &context);

    assert_eq!(resolved.log.visit_count(), 1);
    let tagging = resolved.reports.last().expect("tagging report");
    assert_eq!(tagging.stage, "pathway_tagging");
    assert_eq!(tagging.dropped_visits.get("unmapped_location"), Some(&1));
}
