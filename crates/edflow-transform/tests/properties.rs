//! Property tests for normalization and resolution.

use edflow_model::{DuplicateGates, PipelineConfig, RawEvent};
use edflow_transform::{
    SourceEvents, TransformContext, build_normalization_pipeline, normalize, resolve,
};
use proptest::prelude::*;

/// Names with distinct order keys, so only synthesized events can tie.
const NAMES: &[&str] = &[
    "Booked In",
    "Triaged",
    "Clerked",
    "Imaging",
    "Laboratory",
    "Specialty Reviewed",
    "Decision to Admit",
];

const LOCATIONS: &[&str] = &["Majors Cubicles", "Minors", "Resus"];

fn raw_event() -> impl Strategy<Value = RawEvent> {
    (
        0..4u8,
        0..NAMES.len(),
        0..240u32,
        proptest::option::of(0..3u8),
        proptest::option::of(0..LOCATIONS.len()),
    )
        .prop_map(|(visit, name, minute, staff, location)| {
            let time = format!("01/05/2018 {:02}:{:02}", 8 + minute / 60, minute % 60);
            let mut event = RawEvent::new(visit.to_string(), NAMES[name], time);
            event.staff_id = staff.map(|staff| staff.to_string());
            event.location = location.map(|index| LOCATIONS[index].to_string());
            event
        })
}

fn discharge() -> impl Strategy<Value = Option<(u8, u32)>> {
    proptest::option::of((0..4u8, 0..240u32))
}

fn events_with_discharge(
    mut events: Vec<RawEvent>,
    discharge: Option<(u8, u32)>,
) -> Vec<RawEvent> {
    if let Some((visit, minute)) = discharge {
        let time = format!("01/05/2018 {:02}:{:02}", 8 + minute / 60, minute % 60);
        events.push(RawEvent::new(visit.to_string(), "Discharged", time).with_location("Minors"));
    }
    events
}

proptest! {
    #[test]
    fn prop_normalization_is_idempotent(
        events in proptest::collection::vec(raw_event(), 0..40),
        discharge in discharge(),
        staff_gate in any::<bool>(),
        location_gate in any::<bool>(),
    ) {
        let config = PipelineConfig {
            duplicate_suppression_gates: DuplicateGates {
                staff: staff_gate,
                location: location_gate,
            },
            ..PipelineConfig::default()
        };
        let context = TransformContext::new(&config);
        let first = normalize(
            SourceEvents::new(events_with_discharge(events, discharge)),
            &context,
        );

        let second = build_normalization_pipeline(Vec::new(), &[])
            .execute(first.log.clone(), &context);

        prop_assert_eq!(&second.log, &first.log);
    }

    #[test]
    fn prop_resolved_visits_are_strictly_ordered(
        events in proptest::collection::vec(raw_event(), 0..40),
        discharge in discharge(),
        include_sentinels in any::<bool>(),
    ) {
        let config = PipelineConfig {
            include_sentinels,
            ..PipelineConfig::default()
        };
        let context = TransformContext::new(&config);
        let normalized = normalize(
            SourceEvents::new(events_with_discharge(events, discharge)),
            &context,
        );

        let resolved = resolve(normalized.log, &context);

        for (_, events) in resolved.log.visits() {
            for pair in events.windows(2) {
                prop_assert!(pair[0].sequence_key() < pair[1].sequence_key());
            }
            let discharges = events
                .iter()
                .filter(|event| event.event_name == "Discharged")
                .count();
            prop_assert!(discharges <= 1);
            if discharges == 1 {
                let last = events
                    .iter()
                    .rev()
                    .find(|event| !event.origin.is_sentinel())
                    .map(|event| event.event_name.as_str());
                prop_assert_eq!(last, Some("Discharged"));
            }
        }
    }
}
