use crate::analysis::components::sequence_components;
use crate::analysis::footprint::FootprintMatrix;
use crate::analysis::reachability::ReachabilityMatrix;
use crate::dfg::dfg_struct::DirectlyFollowsGraph;
use crate::event_log::event_log_struct::DfgNode;
use crate::mining::cut_validation::loop_validation;
use crate::mining::repeating_pattern::requires_tau_loop;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The four structural cuts, one per process-tree operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CutType {
    /// Exclusive choice between the two parts
    ExclusiveChoice,
    /// The first part strictly precedes the second
    Sequence,
    /// Both parts interleave freely
    Parallel,
    /// The first part is the do part, the second the redo part
    Loop,
}

impl fmt::Display for CutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutType::ExclusiveChoice => write!(f, "exclusive-choice"),
            CutType::Sequence => write!(f, "sequence"),
            CutType::Parallel => write!(f, "parallel"),
            CutType::Loop => write!(f, "loop"),
        }
    }
}

///
/// The outcome of asking whether a cut of some type exists at all.
///
/// When `possible`, `partitions` carries a candidate two-way split of the
/// node set; `reason` explains the verdict either way.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutSearch {
    /// Whether a cut of the requested type exists
    pub possible: bool,
    /// Human-readable explanation of the verdict
    pub reason: String,
    /// A candidate partition, present iff `possible`
    pub partitions: Option<(HashSet<DfgNode>, HashSet<DfgNode>)>,
}

impl CutSearch {
    fn found<S: Into<String>>(
        reason: S,
        first: HashSet<DfgNode>,
        second: HashSet<DfgNode>,
    ) -> Self {
        Self {
            possible: true,
            reason: reason.into(),
            partitions: Some((first, second)),
        }
    }

    fn not_possible<S: Into<String>>(reason: S) -> Self {
        Self {
            possible: false,
            reason: reason.into(),
            partitions: None,
        }
    }
}

/// Split a component list into its first component and the union of the rest.
fn first_versus_rest(components: &[Vec<DfgNode>]) -> (HashSet<DfgNode>, HashSet<DfgNode>) {
    let first: HashSet<DfgNode> = components[0].iter().cloned().collect();
    let rest: HashSet<DfgNode> = components[1..].iter().flatten().cloned().collect();
    (first, rest)
}

///
/// An exclusive-choice cut exists iff the footprint matrix decomposes into
/// more than one weakly connected component.
///
pub fn is_xor_possible(dfg: &DirectlyFollowsGraph) -> CutSearch {
    let components = FootprintMatrix::from_dfg(dfg).weakly_connected_components();
    if components.len() > 1 {
        let (first, rest) = first_versus_rest(&components);
        CutSearch::found(
            format!("{} weakly connected components found", components.len()),
            first,
            rest,
        )
    } else {
        CutSearch::not_possible("the graph forms a single weakly connected component")
    }
}

///
/// A sequence cut exists iff merging mutually reachable and pairwise
/// unreachable nodes leaves more than one component; the candidate partition
/// separates the reachability-first component from the rest.
///
pub fn is_sequence_possible(dfg: &DirectlyFollowsGraph) -> CutSearch {
    let reachability = ReachabilityMatrix::from_dfg(dfg);
    let components = sequence_components(&reachability);
    if components.len() > 1 {
        let (first, rest) = first_versus_rest(&components);
        CutSearch::found(
            format!("{} sequentially ordered components found", components.len()),
            first,
            rest,
        )
    } else {
        CutSearch::not_possible("all nodes collapse into a single sequence component")
    }
}

///
/// A parallel cut exists iff the inverted footprint decomposes into at least
/// two components and every node still has a play-to-stop path inside its
/// own component.
///
pub fn is_parallel_possible(dfg: &DirectlyFollowsGraph) -> CutSearch {
    let components = FootprintMatrix::from_dfg(dfg)
        .invert()
        .weakly_connected_components();
    if components.len() < 2 {
        return CutSearch::not_possible(
            "the inverted footprint forms a single weakly connected component",
        );
    }
    for component in &components {
        let allowed: HashSet<DfgNode> = component.iter().cloned().collect();
        for node in component {
            if !dfg.exists_full_path_over_node(node, &allowed) {
                return CutSearch::not_possible(format!(
                    "{node} has no play-to-stop path inside its own partition"
                ));
            }
        }
    }
    let (first, rest) = first_versus_rest(&components);
    CutSearch::found(
        format!("{} concurrent components found", components.len()),
        first,
        rest,
    )
}

///
/// A loop cut exists iff stripping the arcs into play-nodes and out of
/// stop-nodes detaches at least one component that (a) only connects to the
/// rest via stop-node exits and play-node returns and (b) passes
/// [`loop_validation`] as the redo part. Candidates failing either check are
/// folded back into the do part rather than discarded.
///
pub fn is_loop_possible(dfg: &DirectlyFollowsGraph) -> CutSearch {
    let stripped = FootprintMatrix::loop_stripped(dfg);
    let components = stripped.weakly_connected_components();
    let play_nodes = dfg.play_nodes();
    let stop_nodes = dfg.stop_nodes();

    let touches_boundary = |component: &Vec<DfgNode>| {
        component
            .iter()
            .any(|n| play_nodes.contains(n) || stop_nodes.contains(n))
    };
    let candidates: Vec<HashSet<DfgNode>> = components
        .iter()
        .filter(|c| !touches_boundary(c))
        .map(|c| c.iter().cloned().collect())
        .collect();
    if candidates.is_empty() {
        return CutSearch::not_possible(
            "every component touches a play or stop node; no redo candidate remains",
        );
    }

    let mut redo_nodes: HashSet<DfgNode> = HashSet::new();
    for candidate in candidates {
        if !redo_candidate_boundary_ok(dfg, &candidate, &play_nodes, &stop_nodes) {
            debug!(
                "loop candidate {{{}}} folded back: irregular boundary arcs",
                candidate.iter().sorted().join(", ")
            );
            continue;
        }
        let do_part: HashSet<DfgNode> = dfg.nodes.difference(&candidate).cloned().collect();
        match loop_validation(dfg, &do_part, &candidate) {
            Ok(()) => {
                redo_nodes.extend(candidate);
            }
            Err(reason) => {
                debug!(
                    "loop candidate {{{}}} folded back: {reason}",
                    candidate.iter().sorted().join(", ")
                );
            }
        }
    }

    if redo_nodes.is_empty() {
        return CutSearch::not_possible("no redo candidate passed the loop validation");
    }
    let do_part: HashSet<DfgNode> = dfg.nodes.difference(&redo_nodes).cloned().collect();
    CutSearch::found("a redo part detached from the do body", do_part, redo_nodes)
}

///
/// Arcs between a redo candidate and the rest of the graph may only leave
/// from a stop node into the candidate or return from the candidate onto a
/// play node.
///
fn redo_candidate_boundary_ok(
    dfg: &DirectlyFollowsGraph,
    candidate: &HashSet<DfgNode>,
    play_nodes: &HashSet<DfgNode>,
    stop_nodes: &HashSet<DfgNode>,
) -> bool {
    dfg.arcs().iter().all(|(from, to)| {
        let leaves_candidate = candidate.contains(from) && !candidate.contains(to);
        let enters_candidate = !candidate.contains(from) && candidate.contains(to);
        if leaves_candidate {
            play_nodes.contains(to)
        } else if enters_candidate {
            stop_nodes.contains(from)
        } else {
            true
        }
    })
}

///
/// The verdict of the fallthrough check: either the graph is a base case,
/// needs a tau loop, admits a structural cut, or is a genuine fallthrough.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallthroughCheck {
    /// A single node walked exactly as `play -> node -> stop`
    BaseCase(DfgNode),
    /// A single node with extra arcs (a self-loop); a length-1 loop cut applies
    SingleNodeLoop(DfgNode),
    /// The log exclusively repeats one pattern; reduce with a tau loop
    TauLoop,
    /// A structural cut of `cut_type` exists with the given candidate partition
    CutFound {
        /// The cut that was found
        cut_type: CutType,
        /// Candidate first partition (do part for a loop, earlier part for a sequence)
        first: HashSet<DfgNode>,
        /// Candidate second partition
        second: HashSet<DfgNode>,
    },
    /// No structural cut applies; a fallback reduction strategy is needed
    Fallthrough,
}

///
/// Decide whether `dfg` is reducible without a fallback strategy.
///
/// Checks, in order: the single-node base cases, the exclusively-repeated
/// pattern short-circuit, then the four cuts in the canonical
/// exclusive-choice -> sequence -> parallel -> loop precedence. The first
/// check that succeeds wins; only when all fail is the graph declared a
/// fallthrough.
///
pub fn check_for_fallthrough(dfg: &DirectlyFollowsGraph) -> FallthroughCheck {
    if dfg.nodes.len() == 1 {
        let node = dfg.nodes.iter().next().cloned().expect("one node");
        // play -> node and node -> stop always exist; anything beyond those
        // two arcs is a self-loop, which a length-1 loop cut absorbs.
        return if dfg.arcs().len() == 2 {
            FallthroughCheck::BaseCase(node)
        } else {
            FallthroughCheck::SingleNodeLoop(node)
        };
    }

    if requires_tau_loop(&dfg.event_log.without_empty_trace_placeholders()) {
        return FallthroughCheck::TauLoop;
    }

    let checks: [(CutType, fn(&DirectlyFollowsGraph) -> CutSearch); 4] = [
        (CutType::ExclusiveChoice, is_xor_possible),
        (CutType::Sequence, is_sequence_possible),
        (CutType::Parallel, is_parallel_possible),
        (CutType::Loop, is_loop_possible),
    ];
    for (cut_type, check) in checks {
        let search = check(dfg);
        if search.possible {
            debug!("{cut_type} cut possible: {}", search.reason);
            if let Some((first, second)) = search.partitions {
                return FallthroughCheck::CutFound {
                    cut_type,
                    first,
                    second,
                };
            }
        }
    }
    FallthroughCheck::Fallthrough
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::event_log_struct::EventLog;

    fn activity_set(names: &[&str]) -> HashSet<DfgNode> {
        names.iter().map(|a| DfgNode::activity(*a)).collect()
    }

    fn dfg_for(traces: &[&[&str]]) -> DirectlyFollowsGraph {
        DirectlyFollowsGraph::from_event_log(&EventLog::from_activity_traces(traces))
    }

    #[test]
    fn xor_possible_on_disconnected_components() {
        let search = is_xor_possible(&dfg_for(&[&["A", "B"], &["C", "D"]]));
        assert!(search.possible);
        let (first, second) = search.partitions.unwrap();
        assert_eq!(first, activity_set(&["A", "B"]));
        assert_eq!(second, activity_set(&["C", "D"]));
    }

    #[test]
    fn xor_impossible_on_shared_activities() {
        let search = is_xor_possible(&dfg_for(&[&["A", "B", "C"], &["B", "C", "D"]]));
        assert!(!search.possible);
    }

    #[test]
    fn sequence_possible_on_ordered_chain() {
        let search = is_sequence_possible(&dfg_for(&[&["A", "B", "C"], &["B", "C"]]));
        assert!(search.possible, "{}", search.reason);
        let (first, second) = search.partitions.unwrap();
        // The earliest component comes first; everything later is pooled.
        assert_eq!(first, activity_set(&["A"]));
        assert_eq!(second, activity_set(&["B", "C"]));
    }

    #[test]
    fn sequence_impossible_on_full_cycle() {
        let search = is_sequence_possible(&dfg_for(&[&["A", "B", "A"]]));
        assert!(!search.possible);
    }

    #[test]
    fn parallel_possible_on_interleaved_activities() {
        let search = is_parallel_possible(&dfg_for(&[&["A", "B"], &["B", "A"]]));
        assert!(search.possible, "{}", search.reason);
        let (first, second) = search.partitions.unwrap();
        assert_eq!(first, activity_set(&["A"]));
        assert_eq!(second, activity_set(&["B"]));
    }

    #[test]
    fn parallel_impossible_without_backward_arc() {
        let search = is_parallel_possible(&dfg_for(&[&["A", "B"]]));
        assert!(!search.possible);
    }

    #[test]
    fn loop_possible_on_repeating_do_body() {
        let search = is_loop_possible(&dfg_for(&[
            &["A", "B", "C"],
            &["A", "B", "C", "D", "A", "B", "C"],
        ]));
        assert!(search.possible, "{}", search.reason);
        let (first, second) = search.partitions.unwrap();
        assert_eq!(first, activity_set(&["A", "B", "C"]));
        assert_eq!(second, activity_set(&["D"]));
    }

    #[test]
    fn loop_impossible_when_redo_touches_play() {
        // D also starts traces, so it cannot be a pure redo part.
        let search = is_loop_possible(&dfg_for(&[&["A", "B"], &["D", "A", "B"]]));
        assert!(!search.possible);
    }

    #[test]
    fn single_node_without_self_loop_is_a_base_case() {
        let check = check_for_fallthrough(&dfg_for(&[&["A"], &["A"]]));
        assert_eq!(check, FallthroughCheck::BaseCase(DfgNode::activity("A")));
    }

    #[test]
    fn single_node_with_self_loop_is_a_short_loop() {
        let check = check_for_fallthrough(&dfg_for(&[&["A"], &["A", "A"]]));
        assert_eq!(
            check,
            FallthroughCheck::SingleNodeLoop(DfgNode::activity("A"))
        );
    }

    #[test]
    fn repeated_pattern_short_circuits_to_tau_loop() {
        let check = check_for_fallthrough(&dfg_for(&[&["A", "B"], &["A", "B", "A", "B"]]));
        assert_eq!(check, FallthroughCheck::TauLoop);
    }

    #[test]
    fn cut_checks_run_in_precedence_order() {
        // Disconnected and ordered: the exclusive choice wins over the sequence.
        let check = check_for_fallthrough(&dfg_for(&[&["A", "B"], &["C", "D"]]));
        match check {
            FallthroughCheck::CutFound { cut_type, .. } => {
                assert_eq!(cut_type, CutType::ExclusiveChoice)
            }
            other => panic!("expected a cut, got {other:?}"),
        }

        let check = check_for_fallthrough(&dfg_for(&[&["A", "B", "C"], &["A", "C"]]));
        match check {
            FallthroughCheck::CutFound { cut_type, .. } => {
                assert_eq!(cut_type, CutType::Sequence)
            }
            other => panic!("expected a cut, got {other:?}"),
        }
    }

    #[test]
    fn irreducible_graph_is_a_fallthrough() {
        // A -> B -> C -> A is one big cycle entered at two points: no choice,
        // no ordering, no concurrency, and every node touches play or stop.
        let check = check_for_fallthrough(&dfg_for(&[&["A", "B", "C"], &["B", "C", "A"]]));
        assert_eq!(check, FallthroughCheck::Fallthrough);
    }
}
