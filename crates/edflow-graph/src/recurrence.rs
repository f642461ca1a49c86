//! Splicing recurring processes into the graph.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use edflow_model::{Outgoing, ProcessId, RecurrenceRule, TransitionEdge};

use crate::graph::TransitionGraph;

/// Note attached to trigger to kickoff edges.
pub const KICKOFF_NOTE: &str = "Recurrence kickoff";

/// Result of recurrence injection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectedGraph {
    pub graph: TransitionGraph,
    /// Rules whose trigger had outgoing edges and was rewritten.
    pub applied: Vec<RecurrenceRule>,
    /// Edges added, counting both kickoff and re-pointed edges.
    pub injected: usize,
}

/// Routes each trigger through its kickoff processes.
///
/// For a trigger with rules, its outgoing edges are replaced by one edge per
/// rule to the kickoff at the rule's probability, and each kickoff receives a
/// copy of the trigger's original edges with the same destinations and
/// percentages. Triggers without outgoing edges, and triggers whose kickoff
/// already has outgoing edges of its own, are left unchanged.
pub fn inject_recurrence(
    graph: &TransitionGraph,
    rules_by_trigger: &BTreeMap<ProcessId, Vec<&RecurrenceRule>>,
) -> InjectedGraph {
    let mut injected = InjectedGraph {
        graph: graph.clone(),
        ..InjectedGraph::default()
    };
    for (trigger, rules) in rules_by_trigger {
        if !matches!(graph.outgoing(trigger), Outgoing::Edges(_)) {
            debug!(trigger = %trigger, "recurrence trigger has no outgoing edges");
            continue;
        }
        if let Some(rule) = rules
            .iter()
            .find(|rule| matches!(graph.outgoing(&rule.kickoff), Outgoing::Edges(_)))
        {
            warn!(
                trigger = %trigger,
                kickoff = %rule.kickoff,
                "kickoff process already has outgoing edges; recurrence not applied"
            );
            continue;
        }

        let original = injected.graph.remove_outgoing(trigger);
        for rule in rules {
            injected.graph.insert(
                TransitionEdge::configured(trigger.clone(), rule.kickoff.clone(), rule.probability)
                    .with_note(KICKOFF_NOTE),
            );
            injected.injected += 1;
            for edge in &original {
                injected.graph.insert(TransitionEdge {
                    from: rule.kickoff.clone(),
                    ..edge.clone()
                });
                injected.injected += 1;
            }
            injected.applied.push((*rule).clone());
        }
    }
    injected
}
