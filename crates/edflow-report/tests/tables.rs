//! Snapshot tests for output tables.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use edflow_graph::{TransitionGraph, prune_edges, run_analysis};
use edflow_model::{
    AnalysisConfig, CanonicalEvent, CanonicalLog, EventNames, EventOrigin, OrderKey,
    PipelineConfig, ProcessId, TransitionEdge, VisitId,
};
use edflow_report::{
    PATHWAY_FILE, RECURRENCE_FILE, RECURRENCE_TRIGGERS_FILE, SUMMARY_FILE, WAIT_IN_PLACE_FILE,
    analysis_dir_name, event_rows, pathway_rows, render_csv, write_analysis_outputs,
};

fn majors(name: &str) -> ProcessId {
    ProcessId::new(name, "Majors")
}

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 5, 1)
        .and_then(|date| date.and_hms_opt(10, 0, 0))
        .expect("valid date")
}

fn visit(id: &str, names: &[&str]) -> Vec<CanonicalEvent> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| CanonicalEvent {
            visit_id: VisitId::from(id),
            event_name: (*name).to_string(),
            event_time: start() + TimeDelta::minutes(10 * index as i64),
            staff_id: None,
            location: "Majors Cubicles".to_string(),
            pathway: "Majors".to_string(),
            order_key: OrderKey(index as u32 + 1),
            origin: EventOrigin::Recorded,
        })
        .collect()
}

#[test]
fn pathway_table_lists_dead_ends_without_percentage() {
    let graph = TransitionGraph::from_edges([
        TransitionEdge::observed(majors("X"), majors("A"), 5, 10).expect("edge"),
        TransitionEdge::observed(majors("X"), majors("B"), 3, 10).expect("edge"),
        TransitionEdge::observed(majors("X"), majors("C"), 2, 10).expect("edge"),
        TransitionEdge::observed(majors("Y"), majors("C"), 1, 10).expect("edge"),
        TransitionEdge::observed(majors("Y"), majors("D"), 9, 10).expect("edge"),
    ]);
    let mut pruned = prune_edges(&graph, 25.0).graph;
    pruned.mark_dead_end(majors("Z"));

    let rows = pathway_rows(&pruned, &EventNames::default());
    let csv = render_csv(
        &[
            "From Process",
            "To Process",
            "(Consequent Priority)",
            "Percentage",
            "Notes",
        ],
        &rows,
    )
    .expect("render csv");

    insta::assert_snapshot!(csv.trim_end(), @r"
    From Process,To Process,(Consequent Priority),Percentage,Notes
    X (Majors),A (Majors),,62.5,
    X (Majors),B (Majors),,37.5,
    Y (Majors),D (Majors),,100,
    Z (Majors),,,,No outgoing transitions
    ");
}

#[test]
fn opening_sentinel_edges_are_left_out() {
    let graph = TransitionGraph::from_edges([
        TransitionEdge::configured(majors("Spawn"), majors("Walk-In"), 100.0),
        TransitionEdge::configured(majors("Walk-In"), majors("Triaged"), 100.0),
    ]);

    let rows = pathway_rows(&graph, &EventNames::default());

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].from, "Walk-In (Majors)");
}

#[test]
fn event_rows_link_next_process() {
    let log = CanonicalLog::new(visit("7", &["Walk-In", "Triaged", "Discharged"]));

    let rows = event_rows(&log, "%d/%m/%Y %H:%M");
    let csv = render_csv(
        &[
            "VisitId",
            "EventName",
            "EventTime",
            "EventStaffId",
            "EventLocation",
            "Pathway",
            "Process",
            "OrderKey",
            "Origin",
            "NextProcess",
        ],
        &rows,
    )
    .expect("render csv");

    insta::assert_snapshot!(csv.trim_end(), @r"
    VisitId,EventName,EventTime,EventStaffId,EventLocation,Pathway,Process,OrderKey,Origin,NextProcess
    7,Walk-In,01/05/2018 10:00,,Majors Cubicles,Majors,Walk-In (Majors),1,recorded,Triaged (Majors)
    7,Triaged,01/05/2018 10:10,,Majors Cubicles,Majors,Triaged (Majors),2,recorded,Discharged (Majors)
    7,Discharged,01/05/2018 10:20,,Majors Cubicles,Majors,Discharged (Majors),3,recorded,
    ");
}

#[test]
fn analysis_outputs_are_written_per_analysis() {
    let config = PipelineConfig::default();
    let log = CanonicalLog::new(
        visit("1", &["Walk-In", "Triaged", "Discharged"])
            .into_iter()
            .chain(visit("2", &["Walk-In", "Triaged", "Clerked", "Discharged"])),
    );
    let outcome =
        run_analysis(&log, &AnalysisConfig::unpruned("All / Majors"), &config).expect("analysis");
    let dir = tempfile::tempdir().expect("tempdir");

    let outputs = write_analysis_outputs(dir.path(), &outcome, &[], &config).expect("write");

    let analysis_dir = dir.path().join("All _ Majors");
    assert_eq!(analysis_dir_name("All / Majors"), "All _ Majors");
    assert_eq!(outputs.len(), 6);
    assert!(outputs.iter().all(|path| path.starts_with(&analysis_dir)));

    let triggers =
        fs::read_to_string(analysis_dir.join(RECURRENCE_TRIGGERS_FILE)).expect("triggers");
    insta::assert_snapshot!(triggers.trim_end(), @r"
    Trigger Process,Recurrent Process,Probability,Notes
    Triaged 60 min Obs (Majors),Obs 60 min (Majors),100,Triggered from Triaged (Majors)
    Triaged 30 min Obs (Majors),Obs 30 min (Majors),100,Triggered from Triaged (Majors)
    ");

    let parameters = fs::read_to_string(analysis_dir.join(RECURRENCE_FILE)).expect("parameters");
    insta::assert_snapshot!(parameters.trim_end(), @r"
    Recurrent Process,Mean,Std,Min,Max
    Obs 60 min (Majors),60,6,5,
    Obs 30 min (Majors),30,3,5,
    ");

    let pathway = fs::read_to_string(analysis_dir.join(PATHWAY_FILE)).expect("pathway");
    assert!(pathway.contains("Triaged (Majors),Triaged 60 min Obs (Majors),,85,Recurrence kickoff"));
    assert!(pathway.contains("Triaged 30 min Obs (Majors),Discharged (Majors),,50,"));

    let wait = fs::read_to_string(analysis_dir.join(WAIT_IN_PLACE_FILE)).expect("wait");
    assert!(wait.lines().any(|line| line == "Obs 60 min (Majors)"));

    let summary: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(analysis_dir.join(SUMMARY_FILE)).expect("summary"),
    )
    .expect("summary json");
    assert_eq!(summary["analysis"]["analysis"], "All / Majors");
    assert_eq!(summary["analysis"]["visits"], 2);
}
