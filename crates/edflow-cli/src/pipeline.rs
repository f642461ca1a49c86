//! End-to-end run: ingest, normalize, resolve, analyse, write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use tracing::{info, info_span};

use edflow_graph::run_analysis;
use edflow_ingest::{load_admissions, load_diagnostics, load_events, load_observations};
use edflow_model::PipelineConfig;
use edflow_report::write_analysis_outputs;
use edflow_transform::{SourceEvents, TransformContext, normalize, resolve};

use crate::types::{AnalysisSummary, RunResult};

/// Input and output locations for one run.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub events: PathBuf,
    pub admissions: Option<PathBuf>,
    pub observations: Option<PathBuf>,
    pub diagnostics: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub dry_run: bool,
}

/// Loads and validates `path`, or returns the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => {
            PipelineConfig::load(path).with_context(|| format!("load config {}", path.display()))
        }
        None => {
            let config = PipelineConfig::default();
            config.validate().context("validate default config")?;
            Ok(config)
        }
    }
}

/// Renders the effective configuration as TOML.
pub fn render_config(config: &PipelineConfig) -> Result<String> {
    toml::to_string_pretty(config).context("serialize config")
}

fn collapse_window(minutes: f64) -> TimeDelta {
    TimeDelta::milliseconds((minutes * 60_000.0).round() as i64)
}

/// Reads the events extract and whichever collaborator extracts are given.
pub fn ingest(inputs: &RunInputs, config: &PipelineConfig) -> Result<SourceEvents> {
    let span = info_span!("ingest");
    let _guard = span.enter();

    let events = load_events(&inputs.events)
        .with_context(|| format!("load events {}", inputs.events.display()))?;
    let mut sources = SourceEvents::new(events);
    if let Some(path) = &inputs.admissions {
        sources.admissions = load_admissions(path)
            .with_context(|| format!("load admissions {}", path.display()))?;
    }
    if let Some(path) = &inputs.observations {
        sources.observations = load_observations(path, &config.event_names.observation)
            .with_context(|| format!("load observations {}", path.display()))?;
    }
    if let Some(path) = &inputs.diagnostics {
        sources.diagnostics = load_diagnostics(
            path,
            &config.timestamp_format,
            collapse_window(config.diagnostics_collapse_minutes),
        )
        .with_context(|| format!("load diagnostics {}", path.display()))?;
    }
    Ok(sources)
}

/// Runs every stage and every configured analysis.
///
/// Outputs are written under `inputs.output_dir` unless `inputs.dry_run`.
pub fn run_pipeline(inputs: &RunInputs, config: &PipelineConfig) -> Result<RunResult> {
    let started = Instant::now();
    let sources = ingest(inputs, config)?;
    let context = TransformContext::new(config);

    let normalized = {
        let span = info_span!("normalize");
        let _guard = span.enter();
        normalize(sources, &context)
    };
    let resolved = {
        let span = info_span!("resolve");
        let _guard = span.enter();
        resolve(normalized.log, &context)
    };
    let mut stages = normalized.reports;
    stages.extend(resolved.reports);
    let log = resolved.log;

    let mut analyses = Vec::with_capacity(config.analyses.len());
    for analysis in &config.analyses {
        let span = info_span!("analysis", name = %analysis.name);
        let _guard = span.enter();
        let outcome = run_analysis(&log, analysis, config)
            .with_context(|| format!("run analysis {}", analysis.name))?;
        let outputs = if inputs.dry_run {
            Vec::new()
        } else {
            let span = info_span!("report");
            let _guard = span.enter();
            write_analysis_outputs(&inputs.output_dir, &outcome, &stages, config)
                .with_context(|| format!("write outputs for {}", analysis.name))?
        };
        analyses.push(AnalysisSummary {
            summary: outcome.summary,
            outputs,
        });
    }

    info!(
        visits = log.visit_count(),
        events = log.event_count(),
        analyses = analyses.len(),
        dry_run = inputs.dry_run,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "run complete"
    );
    Ok(RunResult {
        output_dir: inputs.output_dir.clone(),
        dry_run: inputs.dry_run,
        visits: log.visit_count(),
        events: log.event_count(),
        stages,
        analyses,
    })
}
