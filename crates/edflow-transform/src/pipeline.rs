//! Ordered execution of transform steps.
//!
//! Each step implements [`TransformStep`], taking the event log by value and
//! returning the transformed log. The pipeline records a [`StageReport`] per
//! step, filling the in/out counts itself so steps only report what they
//! dropped, synthesized or relabeled.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = build_resolution_pipeline();
//! let outcome = pipeline.execute(log, &context);
//! ```

use tracing::debug;

use edflow_model::StageReport;

use crate::context::TransformContext;
use crate::log::EventLog;

/// A single transform over the event log.
pub trait TransformStep: Send + Sync {
    /// Name used in stage reports and logs.
    fn step_name(&self) -> &'static str;

    /// Whether this step should be skipped under the given configuration.
    ///
    /// Default implementation always runs the step.
    fn should_skip(&self, _context: &TransformContext<'_>) -> bool {
        false
    }

    /// Applies the step, recording drops and synthesized events in `report`.
    fn apply(
        &self,
        log: EventLog,
        context: &TransformContext<'_>,
        report: &mut StageReport,
    ) -> EventLog;
}

/// Event log and stage reports produced by a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub log: EventLog,
    pub reports: Vec<StageReport>,
}

/// An ordered pipeline of transform steps.
#[derive(Default)]
pub struct TransformPipeline {
    steps: Vec<Box<dyn TransformStep>>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the end of the pipeline.
    #[must_use]
    pub fn add_step(mut self, step: Box<dyn TransformStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Remove a step by name.
    #[must_use]
    pub fn remove_step(mut self, step_name: &str) -> Self {
        self.steps.retain(|step| step.step_name() != step_name);
        self
    }

    /// List step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.step_name()).collect()
    }

    /// Execute all steps in order. Skipped steps produce no report.
    pub fn execute(&self, mut log: EventLog, context: &TransformContext<'_>) -> PipelineOutcome {
        let mut reports = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            if step.should_skip(context) {
                debug!(step = step.step_name(), "skipped transform step");
                continue;
            }
            let mut report = StageReport::new(step.step_name());
            report.events_in = log.event_count();
            report.visits_in = log.visit_count();
            log = step.apply(log, context, &mut report);
            report.events_out = log.event_count();
            report.visits_out = log.visit_count();
            debug!(
                step = step.step_name(),
                events_in = report.events_in,
                events_out = report.events_out,
                visits_in = report.visits_in,
                visits_out = report.visits_out,
                "transform step finished"
            );
            reports.push(report);
        }
        PipelineOutcome { log, reports }
    }
}
