//! End-to-end runs over small extracts.

use std::fs;
use std::path::Path;

use edflow_cli::pipeline::{RunInputs, load_config, render_config, run_pipeline};
use edflow_report::{EVENTS_FILE, PATHWAY_FILE};

const EVENTS: &str = "\
VisitId,EventName,EventTime,EventStaffId,EventLocation
V1,Ambulance Arrival,01/05/2018 10:00,,
V1,Triaged,01/05/2018 10:10,S1,
V1,Triaged,01/05/2018 10:12,S1,
V1,Discharged,01/05/2018 11:00,S1,
V2,Walk-In,01/05/2018 09:00,,Majors Cubicles
V2,Triaged,01/05/2018 09:20,S2,Majors Cubicles
V2,Discharged,01/05/2018 12:00,S2,Majors Cubicles
V3,Triaged,01/03/2018 09:20,S2,Majors Cubicles
";

const ADMISSIONS: &str = "\
AttendanceID,Adm
V1,Non-Admitted
V2,Admitted - MAU
";

const CONFIG: &str = "recurrence_rules = []\n";

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn inputs(dir: &Path, dry_run: bool) -> RunInputs {
    RunInputs {
        events: write(dir, "events.csv", EVENTS),
        admissions: Some(write(dir, "admissions.csv", ADMISSIONS)),
        observations: None,
        diagnostics: None,
        output_dir: dir.join("output"),
        dry_run,
    }
}

#[test]
fn run_writes_pathway_for_admitted_and_discharged_visits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = write(dir.path(), "edflow.toml", CONFIG);
    let config = load_config(Some(&config_path)).expect("config");

    let result = run_pipeline(&inputs(dir.path(), false), &config).expect("run");

    assert_eq!(result.visits, 2);
    assert_eq!(result.events, 7);
    assert_eq!(result.analyses.len(), 1);
    assert_eq!(result.analyses[0].outputs.len(), 6);
    let parse = &result.stages[0];
    assert_eq!(parse.dropped_events.get("before_cutoff"), Some(&1));

    let analysis_dir = dir.path().join("output").join("All");
    let pathway = fs::read_to_string(analysis_dir.join(PATHWAY_FILE)).expect("pathway");
    assert!(pathway.contains("Triaged (Majors),Discharged (Majors),,50,"));
    assert!(pathway.contains("Triaged (Majors),Wait for Bed - (Admitted - MAU) (Majors),,50,"));
    assert!(pathway.contains("Wait for Bed - (Admitted - MAU) (Majors),Admitted - MAU (Majors),,100,"));

    let events = fs::read_to_string(analysis_dir.join(EVENTS_FILE)).expect("events");
    assert!(events.contains("V1,Ambulance Arrival,01/05/2018 10:00,,Ambulance,Majors"));
    assert_eq!(events.lines().count(), 8);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_config(None).expect("defaults");

    let result = run_pipeline(&inputs(dir.path(), true), &config).expect("run");

    assert!(result.dry_run);
    assert!(result.analyses.iter().all(|analysis| analysis.outputs.is_empty()));
    assert!(!dir.path().join("output").exists());
}

#[test]
fn run_with_every_visit_excluded_is_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let events = write(
        dir.path(),
        "old.csv",
        "VisitId,EventName,EventTime,EventStaffId,EventLocation\n\
         V9,Triaged,01/03/2018 09:20,S2,Majors Cubicles\n",
    );
    let run = RunInputs {
        events,
        admissions: None,
        observations: None,
        diagnostics: None,
        output_dir: dir.path().join("output"),
        dry_run: true,
    };

    let result = run_pipeline(&run, &load_config(None).expect("defaults")).expect("run");

    assert_eq!(result.visits, 0);
    assert!(result.is_empty());
}

#[test]
fn missing_events_file_is_reported_with_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut run = inputs(dir.path(), true);
    run.events = dir.path().join("absent.csv");

    let error = run_pipeline(&run, &load_config(None).expect("defaults")).expect_err("missing");

    assert!(format!("{error:#}").contains("absent.csv"));
}

#[test]
fn invalid_config_is_rejected_before_reading_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write(
        dir.path(),
        "bad.toml",
        "[[analyses]]\nname = \"Edge\"\npruning_mode = \"edge\"\n",
    );

    let error = load_config(Some(&path)).expect_err("threshold required");

    assert!(format!("{error:#}").contains("bad.toml"));
}

#[test]
fn effective_config_round_trips_through_toml() {
    let config = load_config(None).expect("defaults");

    let rendered = render_config(&config).expect("render");

    assert!(rendered.contains("timestamp_format = \"%d/%m/%Y %H:%M\""));
    let path_free = edflow_model::PipelineConfig::from_toml_str(&rendered).expect("reparse");
    assert_eq!(path_free, config);
}
