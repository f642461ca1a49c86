//! Writing analysis outputs to disk.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use edflow_graph::AnalysisOutcome;
use edflow_model::{GraphSummary, PipelineConfig, StageReport};

use crate::tables::{
    event_rows, pathway_rows, recurrence_parameter_rows, recurrence_trigger_rows,
    wait_in_place_rows,
};

pub const EVENTS_FILE: &str = "Events Data.csv";
pub const PATHWAY_FILE: &str = "Pathway Definition.csv";
pub const RECURRENCE_TRIGGERS_FILE: &str = "Process Recurrence Triggers.csv";
pub const RECURRENCE_FILE: &str = "Process Recurrence.csv";
pub const WAIT_IN_PLACE_FILE: &str = "Process Wait in Place.csv";
pub const SUMMARY_FILE: &str = "Run Summary.json";

/// Contents of `Run Summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary<'a> {
    pub analysis: &'a GraphSummary,
    pub stages: &'a [StageReport],
}

/// Serializes `rows` as CSV with a header row.
///
/// Headers are written even when `rows` is empty.
pub fn write_csv<W: Write, T: Serialize>(writer: W, headers: &[&str], rows: &[T]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(headers).context("write csv header")?;
    for row in rows {
        csv.serialize(row).context("write csv row")?;
    }
    csv.flush().context("flush csv")?;
    Ok(())
}

/// Renders rows to a CSV string; used for previews and tests.
pub fn render_csv<T: Serialize>(headers: &[&str], rows: &[T]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, headers, rows)?;
    String::from_utf8(buffer).context("csv output is not utf-8")
}

fn write_csv_file<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, headers, rows).with_context(|| format!("write {}", path.display()))
}

/// Directory name for an analysis: path separators and other unsafe
/// characters become underscores.
pub fn analysis_dir_name(analysis: &str) -> String {
    let name: String = analysis
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if name.is_empty() || name.chars().all(|ch| ch == '.') {
        "analysis".to_string()
    } else {
        name
    }
}

/// Writes every table of one analysis under `output_dir/<analysis>/`.
///
/// Returns the written paths in a fixed order.
pub fn write_analysis_outputs(
    output_dir: &Path,
    outcome: &AnalysisOutcome,
    stages: &[StageReport],
    config: &PipelineConfig,
) -> Result<Vec<PathBuf>> {
    let dir = output_dir.join(analysis_dir_name(&outcome.name));
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

    let mut outputs = Vec::new();

    let path = dir.join(EVENTS_FILE);
    write_csv_file(
        &path,
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
        &event_rows(&outcome.log, &config.timestamp_format),
    )?;
    outputs.push(path);

    let path = dir.join(PATHWAY_FILE);
    write_csv_file(
        &path,
        &[
            "From Process",
            "To Process",
            "(Consequent Priority)",
            "Percentage",
            "Notes",
        ],
        &pathway_rows(&outcome.graph, &config.event_names),
    )?;
    outputs.push(path);

    let path = dir.join(RECURRENCE_TRIGGERS_FILE);
    write_csv_file(
        &path,
        &["Trigger Process", "Recurrent Process", "Probability", "Notes"],
        &recurrence_trigger_rows(&outcome.recurrence),
    )?;
    outputs.push(path);

    let path = dir.join(RECURRENCE_FILE);
    write_csv_file(
        &path,
        &["Recurrent Process", "Mean", "Std", "Min", "Max"],
        &recurrence_parameter_rows(&outcome.recurrence),
    )?;
    outputs.push(path);

    let path = dir.join(WAIT_IN_PLACE_FILE);
    write_csv_file(&path, &["Process"], &wait_in_place_rows(outcome))?;
    outputs.push(path);

    let path = dir.join(SUMMARY_FILE);
    let summary = RunSummary {
        analysis: &outcome.summary,
        stages,
    };
    let json = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
    std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
    outputs.push(path);

    info!(
        analysis = %outcome.name,
        dir = %dir.display(),
        files = outputs.len(),
        "wrote analysis outputs"
    );
    Ok(outputs)
}
