use std::path::PathBuf;

use edflow_model::{GraphSummary, StageReport};

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub visits: usize,
    pub events: usize,
    pub stages: Vec<StageReport>,
    pub analyses: Vec<AnalysisSummary>,
}

impl RunResult {
    /// True when cleaning and resolution left no visit to analyse.
    pub fn is_empty(&self) -> bool {
        self.visits == 0
    }
}

#[derive(Debug)]
pub struct AnalysisSummary {
    pub summary: GraphSummary,
    /// Empty on dry runs.
    pub outputs: Vec<PathBuf>,
}
