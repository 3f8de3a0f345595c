use crate::dfg::dfg_struct::DirectlyFollowsGraph;
use crate::event_log::event_log_struct::DfgNode;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::HashMap;

///
/// Boolean reachability over the activity nodes of a directly-follows graph.
///
/// `reaches(a, b)` is `true` iff `b` can be reached from `a` via one or more
/// direct-follows arcs. The diagonal is only set where a node lies on a
/// cycle. Computed as the transitive closure of the direct-arc matrix with
/// the Floyd-Warshall triple loop, O(|V|^3).
///
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReachabilityMatrix {
    activities: Vec<DfgNode>,
    #[serde_as(as = "Vec<(_, _)>")]
    index: HashMap<DfgNode, usize>,
    reachable: Vec<Vec<bool>>,
}

impl ReachabilityMatrix {
    /// Compute the reachability matrix over `dfg.sorted_nodes()`.
    pub fn from_dfg(dfg: &DirectlyFollowsGraph) -> Self {
        let activities = dfg.sorted_nodes();
        let n = activities.len();
        let mut reachable = vec![vec![false; n]; n];
        for (i, from) in activities.iter().enumerate() {
            for (j, to) in activities.iter().enumerate() {
                reachable[i][j] = dfg.has_arc(from, to);
            }
        }
        for k in 0..n {
            for i in 0..n {
                if !reachable[i][k] {
                    continue;
                }
                for j in 0..n {
                    if reachable[k][j] {
                        reachable[i][j] = true;
                    }
                }
            }
        }
        let index = activities
            .iter()
            .enumerate()
            .map(|(i, node)| (node.clone(), i))
            .collect();
        Self {
            activities,
            index,
            reachable,
        }
    }

    /// The sorted activity list this matrix is laid out over.
    pub fn activities(&self) -> &[DfgNode] {
        &self.activities
    }

    /// Whether `to` is reachable from `from`. Unknown nodes reach nothing.
    pub fn reaches(&self, from: &DfgNode, to: &DfgNode) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&i), Some(&j)) => self.reachable[i][j],
            _ => false,
        }
    }

    /// Whether `a` and `b` reach each other.
    pub fn mutually_reachable(&self, a: &DfgNode, b: &DfgNode) -> bool {
        self.reaches(a, b) && self.reaches(b, a)
    }

    /// Index-based lookup for algorithms already working in matrix layout.
    pub fn reaches_index(&self, from: usize, to: usize) -> bool {
        self.reachable[from][to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::event_log_struct::EventLog;

    #[test]
    fn transitive_closure_of_a_chain() {
        let log = EventLog::from_activity_traces(&[&["A", "B", "C"]]);
        let matrix = ReachabilityMatrix::from_dfg(&DirectlyFollowsGraph::from_event_log(&log));

        let (a, b, c) = (
            DfgNode::activity("A"),
            DfgNode::activity("B"),
            DfgNode::activity("C"),
        );
        assert!(matrix.reaches(&a, &b));
        assert!(matrix.reaches(&a, &c));
        assert!(matrix.reaches(&b, &c));
        assert!(!matrix.reaches(&c, &a));
        assert!(!matrix.reaches(&a, &a));
    }

    #[test]
    fn cycles_make_nodes_mutually_reachable() {
        let log = EventLog::from_activity_traces(&[&["A", "B", "A"]]);
        let matrix = ReachabilityMatrix::from_dfg(&DirectlyFollowsGraph::from_event_log(&log));

        let (a, b) = (DfgNode::activity("A"), DfgNode::activity("B"));
        assert!(matrix.mutually_reachable(&a, &b));
        assert!(matrix.reaches(&a, &a));
    }
}
