use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

///
/// A node identifier in a directly-follows graph or an event-log trace.
///
/// The virtual `Play`/`Stop` nodes bound every trace walk and never occur
/// inside [`Trace`]s or in [`DirectlyFollowsGraph::nodes`]. `EmptyTrace` is
/// the placeholder a raw empty trace turns into when it is propagated
/// through an event-log split: a plain empty sequence cannot carry node
/// identity, the placeholder can.
///
/// [`DirectlyFollowsGraph::nodes`]: crate::dfg::dfg_struct::DirectlyFollowsGraph
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DfgNode {
    /// Virtual source preceding the first activity of every trace
    Play,
    /// Virtual sink following the last activity of every trace
    Stop,
    /// Placeholder activity standing in for an empty trace
    EmptyTrace,
    /// A real activity, identified by its name
    Activity(String),
}

impl DfgNode {
    /// Create an [`DfgNode::Activity`] from anything string-like.
    pub fn activity<S: Into<String>>(name: S) -> Self {
        DfgNode::Activity(name.into())
    }

    /// `true` for the virtual `Play`/`Stop` boundary nodes.
    ///
    /// `EmptyTrace` is _not_ a boundary node: it occurs in traces and in the
    /// node set of a graph like any activity.
    pub fn is_play_or_stop(&self) -> bool {
        matches!(self, DfgNode::Play | DfgNode::Stop)
    }

    /// `true` for [`DfgNode::Activity`] nodes.
    pub fn is_activity(&self) -> bool {
        matches!(self, DfgNode::Activity(_))
    }
}

impl fmt::Display for DfgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DfgNode::Play => write!(f, "play"),
            DfgNode::Stop => write!(f, "stop"),
            DfgNode::EmptyTrace => write!(f, "empty_trace"),
            DfgNode::Activity(name) => write!(f, "{name}"),
        }
    }
}

/// A trace: one ordered walk of activities (or a single [`DfgNode::EmptyTrace`] placeholder).
pub type Trace = Vec<DfgNode>;

///
/// An event log as a plain sequence of activity traces.
///
/// This is the activity projection of a log: no timestamps, no attributes,
/// just ordered activity names. Ingestion from richer formats is up to the
/// caller.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    /// The traces of the event log, in insertion order
    pub traces: Vec<Trace>,
}

impl EventLog {
    /// Create an empty event log.
    pub fn new() -> Self {
        Self { traces: Vec::new() }
    }

    /// Build an event log from plain activity-name traces.
    pub fn from_activity_traces(traces: &[&[&str]]) -> Self {
        Self {
            traces: traces
                .iter()
                .map(|t| t.iter().map(|a| DfgNode::activity(*a)).collect())
                .collect(),
        }
    }

    /// Whether an identical trace is already present.
    pub fn contains_trace(&self, trace: &Trace) -> bool {
        self.traces.iter().any(|t| t == trace)
    }

    /// Append `trace` unless an identical trace is already present.
    ///
    /// Returns `true` if the trace was inserted.
    pub fn push_trace_if_absent(&mut self, trace: Trace) -> bool {
        if self.contains_trace(&trace) {
            return false;
        }
        self.traces.push(trace);
        true
    }

    /// Whether the log contains an `[EmptyTrace]` placeholder trace.
    pub fn has_empty_trace_placeholder(&self) -> bool {
        self.traces.iter().any(|t| t == &[DfgNode::EmptyTrace])
    }

    /// The log without `[EmptyTrace]` placeholder traces.
    pub fn without_empty_trace_placeholders(&self) -> EventLog {
        EventLog {
            traces: self
                .traces
                .iter()
                .filter(|t| *t != &[DfgNode::EmptyTrace])
                .cloned()
                .collect(),
        }
    }

    /// Replace every raw empty trace with the `[EmptyTrace]` placeholder.
    ///
    /// Applied to split results before a child graph is built, so that the
    /// skip behavior survives as a `play -> empty_trace -> stop` walk.
    pub fn insert_empty_trace_placeholders(&mut self) {
        for trace in &mut self.traces {
            if trace.is_empty() {
                trace.push(DfgNode::EmptyTrace);
            }
        }
    }

    /// The set of distinct nodes occurring in any trace.
    pub fn activities(&self) -> HashSet<DfgNode> {
        self.traces.iter().flatten().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_trace_if_absent_deduplicates() {
        let mut log = EventLog::new();
        assert!(log.push_trace_if_absent(vec![DfgNode::activity("A"), DfgNode::activity("B")]));
        assert!(!log.push_trace_if_absent(vec![DfgNode::activity("A"), DfgNode::activity("B")]));
        assert!(log.push_trace_if_absent(vec![DfgNode::activity("A")]));
        assert_eq!(log.traces.len(), 2);
    }

    #[test]
    fn empty_trace_placeholder_round_trip() {
        let mut log = EventLog {
            traces: vec![vec![DfgNode::activity("A")], vec![]],
        };
        assert!(!log.has_empty_trace_placeholder());
        log.insert_empty_trace_placeholders();
        assert!(log.has_empty_trace_placeholder());
        let stripped = log.without_empty_trace_placeholders();
        assert_eq!(stripped.traces, vec![vec![DfgNode::activity("A")]]);
    }

    #[test]
    fn display_uses_reserved_names() {
        assert_eq!(DfgNode::Play.to_string(), "play");
        assert_eq!(DfgNode::Stop.to_string(), "stop");
        assert_eq!(DfgNode::EmptyTrace.to_string(), "empty_trace");
        assert_eq!(DfgNode::activity("Check stock").to_string(), "Check stock");
    }
}
