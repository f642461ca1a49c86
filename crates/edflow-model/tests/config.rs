//! Tests for configuration parsing and validation.

use edflow_model::{ConfigError, PipelineConfig, ProcessId, Pruning, PruningMode};

#[test]
fn parses_structured_recurrence_rules() {
    let config = PipelineConfig::from_toml_str(
        r#"
        [[recurrence_rules]]
        trigger = { event = "Triaged", pathway = "Majors" }
        kickoff = { event = "Triaged 60 min Obs", pathway = "Majors" }
        probability = 70.0
        recurrent_process = "Obs 60 min (Majors)"

        [[recurrence_rules]]
        trigger = { event = "Triaged", pathway = "Majors" }
        kickoff = { event = "Triaged 15 min Obs", pathway = "Majors" }
        probability = 30.0
        recurrent_process = "Obs 15 min (Majors)"
        "#,
    )
    .expect("valid config");

    let grouped = config.recurrence_by_trigger();
    assert_eq!(grouped.len(), 1);
    let rules = &grouped[&ProcessId::new("Triaged", "Majors")];
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].kickoff.label(), "Triaged 60 min Obs (Majors)");
}

#[test]
fn rejects_recurrence_not_summing_to_100() {
    let error = PipelineConfig::from_toml_str(
        r#"
        [[recurrence_rules]]
        trigger = { event = "Triaged", pathway = "Resus" }
        kickoff = { event = "Triaged 60 min Obs", pathway = "Resus" }
        probability = 60.0
        recurrent_process = "Obs 60 min (Resus)"
        "#,
    )
    .expect_err("probabilities sum to 60");
    match error {
        ConfigError::RecurrenceTotal { trigger, total } => {
            assert_eq!(trigger, "Triaged (Resus)");
            assert!((total - 60.0).abs() < 1e-9);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_pruning_without_threshold() {
    let error = PipelineConfig::from_toml_str(
        r#"
        [[analyses]]
        name = "Visits Exclusion"
        pruning_mode = "visit"
        "#,
    )
    .expect_err("threshold missing");
    assert!(matches!(error, ConfigError::MissingThreshold { .. }));
}

#[test]
fn rejects_threshold_out_of_range() {
    let error = PipelineConfig::from_toml_str(
        r#"
        [[analyses]]
        name = "Removed transitions"
        pruning_mode = "edge"
        pruning_threshold = 120.0
        "#,
    )
    .expect_err("threshold above 100");
    assert!(matches!(error, ConfigError::Threshold { .. }));
}

#[test]
fn rejects_unmapped_default_ambulance_location() {
    let error = PipelineConfig::from_toml_str(
        r#"
        default_ambulance_location = "Ambulance Bay"
        "#,
    )
    .expect_err("location missing from map");
    assert!(matches!(error, ConfigError::UnmappedLocation { location } if location == "Ambulance Bay"));
}

#[test]
fn rejects_unknown_fields() {
    let error = PipelineConfig::from_toml_str("repeat_threshold = 5").expect_err("typo");
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[test]
fn rejects_bad_timestamp_format() {
    let error = PipelineConfig::from_toml_str(r#"timestamp_format = "%d/%m/%Y %Q""#)
        .expect_err("unknown specifier");
    assert!(matches!(error, ConfigError::TimestampFormat { .. }));
}

#[test]
fn analysis_pruning_is_resolved() {
    let config = PipelineConfig::from_toml_str(
        r#"
        cutoff_date = "2020-01-01"

        [[analyses]]
        name = "All"

        [[analyses]]
        name = "Removed transitions below 2%"
        pruning_mode = "edge"
        pruning_threshold = 2.0
        "#,
    )
    .expect("valid config");
    assert_eq!(config.analyses.len(), 2);
    assert_eq!(config.analyses[1].pruning_mode, PruningMode::Edge);
    assert_eq!(config.analyses[1].pruning().expect("pruning"), Pruning::Edge(2.0));
    assert_eq!(config.cutoff_date.to_string(), "2020-01-01");
}

#[test]
fn load_reports_path_on_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("edflow.toml");
    std::fs::write(&path, "include_sentinels = \"yes\"").expect("write config");
    let error = PipelineConfig::load(&path).expect_err("bad bool");
    assert!(error.to_string().contains("edflow.toml"));
}

#[test]
fn load_reads_valid_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("edflow.toml");
    std::fs::write(&path, "include_sentinels = true\nrepeat_time_threshold = 15.0\n")
        .expect("write config");
    let config = PipelineConfig::load(&path).expect("load");
    assert!(config.include_sentinels);
    assert!((config.repeat_time_threshold - 15.0).abs() < f64::EPSILON);
}
