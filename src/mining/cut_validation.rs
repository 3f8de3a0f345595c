use crate::dfg::dfg_struct::DirectlyFollowsGraph;
use crate::event_log::event_log_struct::{DfgNode, EventLog, Trace};
use crate::mining::cut_detection::CutType;
use crate::mining::repeating_pattern::requires_tau_loop;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

///
/// The outcome of validating a proposed two-way cut.
///
/// Failures are reported, never thrown: `accepted` discriminates the result
/// and `message` names the offending nodes or arcs so a caller can surface
/// them. On success `children` holds the two sub-graphs the cut produced.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the partition satisfies the requested cut
    pub accepted: bool,
    /// Human-readable verdict, naming the offending node pair on failure
    pub message: String,
    /// The two child graphs, present only on success
    pub children: Option<(DirectlyFollowsGraph, DirectlyFollowsGraph)>,
}

impl ValidationResult {
    /// A failed validation with the given reason.
    pub fn reject<S: Into<String>>(message: S) -> Self {
        Self {
            accepted: false,
            message: message.into(),
            children: None,
        }
    }

    /// A successful validation carrying the two child graphs.
    pub fn accept<S: Into<String>>(
        message: S,
        first: DirectlyFollowsGraph,
        second: DirectlyFollowsGraph,
    ) -> Self {
        Self {
            accepted: true,
            message: message.into(),
            children: Some((first, second)),
        }
    }
}

///
/// Validate a proposed two-way partition against `cut_type` and, on success,
/// split the graph into two children.
///
/// The split replays the event log per cut type, replaces empty result
/// traces with the `[EmptyTrace]` placeholder, and builds one child graph
/// per split log.
///
pub fn validate_and_split(
    dfg: &DirectlyFollowsGraph,
    first: &HashSet<DfgNode>,
    second: &HashSet<DfgNode>,
    cut_type: CutType,
) -> ValidationResult {
    let log = &dfg.event_log;
    if log.has_empty_trace_placeholder()
        && requires_tau_loop(&log.without_empty_trace_placeholders())
    {
        return ValidationResult::reject(
            "the event log combines an empty trace with an exclusively repeated pattern; \
             solve it with a tau loop instead of a structural cut",
        );
    }
    if let Err(message) = validate_partition(dfg, first, second, cut_type) {
        return ValidationResult::reject(message);
    }

    let (mut first_log, mut second_log) = split_event_log(dfg, first, second, cut_type);
    first_log.insert_empty_trace_placeholders();
    second_log.insert_empty_trace_placeholders();
    ValidationResult::accept(
        format!("{cut_type} cut applied"),
        DirectlyFollowsGraph::from_event_log(&first_log),
        DirectlyFollowsGraph::from_event_log(&second_log),
    )
}

///
/// Check a partition against the formal definition of `cut_type` without
/// splitting anything.
///
/// Both sets must be non-empty, disjoint, and together cover the node set
/// exactly before the cut-specific conditions are evaluated.
///
pub fn validate_partition(
    dfg: &DirectlyFollowsGraph,
    first: &HashSet<DfgNode>,
    second: &HashSet<DfgNode>,
    cut_type: CutType,
) -> Result<(), String> {
    if first.is_empty() || second.is_empty() {
        return Err("a node set is empty".into());
    }
    let union: HashSet<DfgNode> = first.union(second).cloned().collect();
    if !first.is_disjoint(second) || union != dfg.nodes {
        return Err("every node of the graph must appear in exactly one of the two node sets".into());
    }
    match cut_type {
        CutType::ExclusiveChoice => xor_validation(dfg, first, second),
        CutType::Sequence => sequence_validation(dfg, first, second),
        CutType::Parallel => parallel_validation(dfg, first, second),
        CutType::Loop => loop_validation(dfg, first, second),
    }
}

/// No arc may cross the partition boundary in either direction.
pub fn xor_validation(
    dfg: &DirectlyFollowsGraph,
    first: &HashSet<DfgNode>,
    second: &HashSet<DfgNode>,
) -> Result<(), String> {
    for a in first.iter().sorted() {
        for b in second.iter().sorted() {
            if dfg.has_arc(a, b) {
                return Err(format!("arc from {a} to {b} crosses the exclusive-choice boundary"));
            }
            if dfg.has_arc(b, a) {
                return Err(format!("arc from {b} to {a} crosses the exclusive-choice boundary"));
            }
        }
    }
    Ok(())
}

///
/// Every node of `first` must have a path to every node of `second`, and no
/// node of `second` may have a path back into `first`.
///
pub fn sequence_validation(
    dfg: &DirectlyFollowsGraph,
    first: &HashSet<DfgNode>,
    second: &HashSet<DfgNode>,
) -> Result<(), String> {
    for a in first.iter().sorted() {
        for b in second.iter().sorted() {
            let target = HashSet::from([b.clone()]);
            if !dfg.exists_path(&HashSet::from([a.clone()]), &target, None) {
                return Err(format!("no path from {a} to {b}"));
            }
        }
    }
    for b in second.iter().sorted() {
        for a in first.iter().sorted() {
            let target = HashSet::from([a.clone()]);
            if dfg.exists_path(&HashSet::from([b.clone()]), &target, None) {
                return Err(format!("path from {b} back to {a} violates the sequence ordering"));
            }
        }
    }
    Ok(())
}

///
/// Both sets must be fully bipartitely connected by direct arcs, and every
/// node must have a play-to-stop path inside its own set.
///
pub fn parallel_validation(
    dfg: &DirectlyFollowsGraph,
    first: &HashSet<DfgNode>,
    second: &HashSet<DfgNode>,
) -> Result<(), String> {
    for a in first.iter().sorted() {
        for b in second.iter().sorted() {
            if !dfg.has_arc(a, b) || !dfg.has_arc(b, a) {
                return Err(format!("activities {a} and {b} are not connected in both directions"));
            }
        }
    }
    for set in [first, second] {
        for node in set.iter().sorted() {
            if !dfg.exists_full_path_over_node(node, set) {
                return Err(format!("{node} has no play-to-stop path inside its own node set"));
            }
        }
    }
    Ok(())
}

///
/// Loop-cut discipline: the do part (`first`) must own every play and stop
/// node, every redo exit must re-enter the do part at each of its entry
/// nodes, and every do exit must reach stop as well as each redo entry.
///
pub fn loop_validation(
    dfg: &DirectlyFollowsGraph,
    first: &HashSet<DfgNode>,
    second: &HashSet<DfgNode>,
) -> Result<(), String> {
    for node in dfg.play_nodes().iter().sorted() {
        if !first.contains(node) {
            return Err(format!("arc from play to {node} enters the redo part"));
        }
    }
    for node in dfg.stop_nodes().iter().sorted() {
        if !first.contains(node) {
            return Err(format!("arc from {node} to stop leaves the redo part"));
        }
    }

    let first_play = nodes_entered_from_outside(dfg, first);
    let first_stop = nodes_exiting_outside(dfg, first);
    let second_play = nodes_entered_from_outside(dfg, second);
    let second_stop = nodes_exiting_outside(dfg, second);

    let mut redo_exits: Vec<DfgNode> = vec![DfgNode::Play];
    redo_exits.extend(second_stop.iter().cloned().sorted());
    for from in &redo_exits {
        for to in first_play.iter().sorted() {
            if !dfg.has_arc(from, to) {
                return Err(format!("missing arc from {from} to do-entry {to}"));
            }
        }
    }

    let mut do_exit_targets: Vec<DfgNode> = vec![DfgNode::Stop];
    do_exit_targets.extend(second_play.iter().cloned().sorted());
    for from in first_stop.iter().sorted() {
        for to in &do_exit_targets {
            if !dfg.has_arc(from, to) {
                return Err(format!("missing arc from do-exit {from} to {to}"));
            }
        }
    }
    Ok(())
}

/// The nodes of `set` with at least one predecessor outside `set`.
fn nodes_entered_from_outside(
    dfg: &DirectlyFollowsGraph,
    set: &HashSet<DfgNode>,
) -> HashSet<DfgNode> {
    set.iter()
        .filter(|node| {
            dfg.predecessors_of(node)
                .into_iter()
                .any(|p| !set.contains(p))
        })
        .cloned()
        .collect()
}

/// The nodes of `set` with at least one successor outside `set`.
fn nodes_exiting_outside(
    dfg: &DirectlyFollowsGraph,
    set: &HashSet<DfgNode>,
) -> HashSet<DfgNode> {
    set.iter()
        .filter(|node| {
            dfg.successors_of(node)
                .into_iter()
                .any(|s| !set.contains(s))
        })
        .cloned()
        .collect()
}

///
/// Replay every trace of `dfg.event_log` against the cut and distribute it
/// over two child logs.
///
/// - Exclusive choice: the whole trace goes to the log owning its first
///   activity.
/// - Sequence: the trace is cut at its first activity belonging to `second`;
///   prefix and suffix land in the respective logs (either side may come out
///   empty).
/// - Parallel: the trace is filtered once per set, preserving order.
/// - Loop: the trace is walked as a do/redo state machine; each contiguous
///   run is flushed to its log on a state switch, skipping runs already
///   present there.
///
pub fn split_event_log(
    dfg: &DirectlyFollowsGraph,
    first: &HashSet<DfgNode>,
    second: &HashSet<DfgNode>,
    cut_type: CutType,
) -> (EventLog, EventLog) {
    let mut first_log = EventLog::new();
    let mut second_log = EventLog::new();
    for trace in &dfg.event_log.traces {
        match cut_type {
            CutType::ExclusiveChoice => match trace.first() {
                Some(head) if first.contains(head) => first_log.traces.push(trace.clone()),
                Some(_) => second_log.traces.push(trace.clone()),
                // a raw empty trace carries no activity to route by
                None => {}
            },
            CutType::Sequence => {
                let cut_at = trace
                    .iter()
                    .position(|node| second.contains(node))
                    .unwrap_or(trace.len());
                first_log.traces.push(trace[..cut_at].to_vec());
                second_log.traces.push(trace[cut_at..].to_vec());
            }
            CutType::Parallel => {
                first_log
                    .traces
                    .push(trace.iter().filter(|n| first.contains(n)).cloned().collect());
                second_log
                    .traces
                    .push(trace.iter().filter(|n| second.contains(n)).cloned().collect());
            }
            CutType::Loop => {
                let mut in_do_part = true;
                let mut buffer: Trace = Vec::new();
                for node in trace {
                    let node_in_do = first.contains(node);
                    if node_in_do != in_do_part {
                        flush_loop_run(&mut buffer, in_do_part, &mut first_log, &mut second_log);
                        in_do_part = node_in_do;
                    }
                    buffer.push(node.clone());
                }
                flush_loop_run(&mut buffer, in_do_part, &mut first_log, &mut second_log);
            }
        }
    }
    (first_log, second_log)
}

fn flush_loop_run(
    buffer: &mut Trace,
    in_do_part: bool,
    first_log: &mut EventLog,
    second_log: &mut EventLog,
) {
    if buffer.is_empty() {
        return;
    }
    let run = std::mem::take(buffer);
    if in_do_part {
        first_log.push_trace_if_absent(run);
    } else {
        second_log.push_trace_if_absent(run);
    }
}

///
/// Orient an unordered pair of node sets for `cut_type`.
///
/// For a loop cut the set containing a play node becomes the do part; for a
/// sequence cut the set with a path into the other comes first. Exclusive
/// choice and parallel cuts are order-independent.
///
pub fn sort_node_sets(
    dfg: &DirectlyFollowsGraph,
    a: HashSet<DfgNode>,
    b: HashSet<DfgNode>,
    cut_type: CutType,
) -> (HashSet<DfgNode>, HashSet<DfgNode>) {
    match cut_type {
        CutType::Loop => {
            if dfg.play_nodes().iter().any(|node| a.contains(node)) {
                (a, b)
            } else {
                (b, a)
            }
        }
        CutType::Sequence => {
            let a_reaches_b = a.iter().any(|x| {
                b.iter().any(|y| {
                    dfg.exists_path(
                        &HashSet::from([x.clone()]),
                        &HashSet::from([y.clone()]),
                        None,
                    )
                })
            });
            if a_reaches_b {
                (a, b)
            } else {
                (b, a)
            }
        }
        CutType::ExclusiveChoice | CutType::Parallel => (a, b),
    }
}

/// [`sort_node_sets`] over plain node slices, for callers holding lists.
pub fn create_sorted_node_sets(
    dfg: &DirectlyFollowsGraph,
    a: &[DfgNode],
    b: &[DfgNode],
    cut_type: CutType,
) -> (HashSet<DfgNode>, HashSet<DfgNode>) {
    sort_node_sets(
        dfg,
        a.iter().cloned().collect(),
        b.iter().cloned().collect(),
        cut_type,
    )
}
