//! One configured analysis over a resolved log.

use std::collections::BTreeSet;

use tracing::info;

use edflow_model::{
    AnalysisConfig, CanonicalLog, GraphSummary, PipelineConfig, Pruning, RecurrenceRule, Result,
};

use crate::build::{Linkage, build_transitions};
use crate::graph::TransitionGraph;
use crate::prune::{prune_edges, visits_below};
use crate::recurrence::inject_recurrence;
use crate::wait::wait_in_place;

/// Everything one analysis produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub name: String,
    /// Population after visit-level exclusion.
    pub log: CanonicalLog,
    pub linkage: Linkage,
    /// Final graph after pruning and recurrence injection.
    pub graph: TransitionGraph,
    /// Recurrence rules that were spliced into the graph.
    pub recurrence: Vec<RecurrenceRule>,
    pub wait_in_place: BTreeSet<String>,
    pub summary: GraphSummary,
}

/// Builds, prunes and annotates the transition graph for `analysis`.
///
/// Visit-level pruning removes the offending visits and re-aggregates once.
/// Edge-level pruning renormalizes each origin. Recurrence injection runs on
/// the pruned graph.
pub fn run_analysis(
    log: &CanonicalLog,
    analysis: &AnalysisConfig,
    config: &PipelineConfig,
) -> Result<AnalysisOutcome> {
    let pruning = analysis.pruning()?;
    let (mut graph, mut linkage) = build_transitions(log);
    let mut population = log.clone();
    let mut excluded_visits = 0;
    let mut pruned_edges = 0;
    match pruning {
        Pruning::None => {}
        Pruning::Visit(threshold) => {
            let rare = visits_below(&graph, &linkage, threshold);
            if !rare.is_empty() {
                population = log.without_visits(&rare);
                (graph, linkage) = build_transitions(&population);
            }
            excluded_visits = rare.len();
        }
        Pruning::Edge(threshold) => {
            let pruned = prune_edges(&graph, threshold);
            pruned_edges = pruned.removed;
            graph = pruned.graph;
        }
    }

    let rules = config.recurrence_by_trigger();
    let injected = inject_recurrence(&graph, &rules);
    let wait = wait_in_place(
        &injected.graph,
        injected
            .applied
            .iter()
            .map(|rule| rule.recurrent_process.as_str()),
        &config.wait_in_place_pathways,
        &config.event_names,
    );

    let summary = GraphSummary {
        analysis: analysis.name.clone(),
        visits: population.visit_count(),
        events: population.event_count(),
        edges: injected.graph.edge_count(),
        excluded_visits,
        pruned_edges,
        injected_edges: injected.injected,
        dead_ends: injected.graph.dead_ends().map(ToString::to_string).collect(),
        ordering_ties: linkage.ties,
        wait_in_place: wait.len(),
    };
    info!(
        analysis = %summary.analysis,
        pruning = analysis.pruning_mode.as_str(),
        visits = summary.visits,
        edges = summary.edges,
        excluded_visits,
        pruned_edges,
        dead_ends = summary.dead_ends.len(),
        "built transition graph"
    );

    Ok(AnalysisOutcome {
        name: analysis.name.clone(),
        log: population,
        linkage,
        graph: injected.graph,
        recurrence: injected.applied,
        wait_in_place: wait,
        summary,
    })
}
