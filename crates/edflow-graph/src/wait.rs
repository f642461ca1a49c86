//! Wait-in-place classification.

use std::collections::BTreeSet;

use edflow_model::EventNames;

use crate::graph::TransitionGraph;

/// Process names containing any of `fragments`.
///
/// Candidates are the labels of every graph node except the opening and
/// closing sentinels, plus the given recurrent process names. The graph
/// itself is not changed.
pub fn wait_in_place<'a>(
    graph: &TransitionGraph,
    recurrent_processes: impl IntoIterator<Item = &'a str>,
    fragments: &[String],
    names: &EventNames,
) -> BTreeSet<String> {
    graph
        .nodes()
        .into_iter()
        .filter(|node| {
            node.event_name != names.opening_sentinel && node.event_name != names.closing_sentinel
        })
        .map(ToString::to_string)
        .chain(recurrent_processes.into_iter().map(str::to_string))
        .filter(|name| fragments.iter().any(|fragment| name.contains(fragment.as_str())))
        .collect()
}
