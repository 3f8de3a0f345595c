use crate::dfg::dfg_struct::DirectlyFollowsGraph;
use crate::event_log::event_log_struct::DfgNode;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::HashMap;

/// The four-symbol directly-follows relation between an ordered activity pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DfRelation {
    /// An arc `a -> b` exists, but not `b -> a`
    Follows,
    /// An arc `b -> a` exists, but not `a -> b`
    Precedes,
    /// Arcs exist in both directions
    Parallel,
    /// No arc in either direction
    Unrelated,
}

impl DfRelation {
    fn classify(forward: bool, backward: bool) -> Self {
        match (forward, backward) {
            (true, true) => DfRelation::Parallel,
            (true, false) => DfRelation::Follows,
            (false, true) => DfRelation::Precedes,
            (false, false) => DfRelation::Unrelated,
        }
    }

    /// The element-wise inverse: swap `Follows`/`Precedes`, swap
    /// `Parallel`/`Unrelated`.
    pub fn inverse(self) -> Self {
        match self {
            DfRelation::Follows => DfRelation::Precedes,
            DfRelation::Precedes => DfRelation::Follows,
            DfRelation::Parallel => DfRelation::Unrelated,
            DfRelation::Unrelated => DfRelation::Parallel,
        }
    }
}

///
/// The footprint matrix of a directly-follows graph: a [`DfRelation`] for
/// every ordered activity pair, laid out over the sorted activity list.
///
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintMatrix {
    activities: Vec<DfgNode>,
    #[serde_as(as = "Vec<(_, _)>")]
    relations: HashMap<(DfgNode, DfgNode), DfRelation>,
}

impl FootprintMatrix {
    /// Classify every ordered activity pair of `dfg` by its direct arcs.
    pub fn from_dfg(dfg: &DirectlyFollowsGraph) -> Self {
        Self::from_arc_predicate(dfg.sorted_nodes(), |a, b| dfg.has_arc(a, b))
    }

    ///
    /// The footprint with redo arcs isolated: arcs into play-nodes and arcs
    /// out of stop-nodes are masked before classification.
    ///
    /// Stripping those arcs disconnects the loop-back paths from the main
    /// do-body, so the weakly connected components of this matrix separate
    /// redo candidates for the loop cut.
    ///
    pub fn loop_stripped(dfg: &DirectlyFollowsGraph) -> Self {
        let play_nodes = dfg.play_nodes();
        let stop_nodes = dfg.stop_nodes();
        Self::from_arc_predicate(dfg.sorted_nodes(), |a, b| {
            dfg.has_arc(a, b) && !play_nodes.contains(b) && !stop_nodes.contains(a)
        })
    }

    fn from_arc_predicate<F>(activities: Vec<DfgNode>, has_arc: F) -> Self
    where
        F: Fn(&DfgNode, &DfgNode) -> bool,
    {
        let mut relations = HashMap::with_capacity(activities.len() * activities.len());
        for a in &activities {
            for b in &activities {
                relations.insert(
                    (a.clone(), b.clone()),
                    DfRelation::classify(has_arc(a, b), has_arc(b, a)),
                );
            }
        }
        Self {
            activities,
            relations,
        }
    }

    /// The sorted activity list this matrix is laid out over.
    pub fn activities(&self) -> &[DfgNode] {
        &self.activities
    }

    /// The relation of the ordered pair `(a, b)`; unknown pairs are `Unrelated`.
    pub fn relation(&self, a: &DfgNode, b: &DfgNode) -> DfRelation {
        self.relations
            .get(&(a.clone(), b.clone()))
            .copied()
            .unwrap_or(DfRelation::Unrelated)
    }

    /// The element-wise inverse matrix, used for parallel-cut detection.
    pub fn invert(&self) -> Self {
        Self {
            activities: self.activities.clone(),
            relations: self
                .relations
                .iter()
                .map(|(pair, relation)| (pair.clone(), relation.inverse()))
                .collect(),
        }
    }

    ///
    /// The weakly connected components of the matrix.
    ///
    /// Any non-`Unrelated` cell counts as an undirected edge. Components are
    /// discovered in sorted-node order, so membership is deterministic for a
    /// given activity list; each component is returned sorted.
    ///
    pub fn weakly_connected_components(&self) -> Vec<Vec<DfgNode>> {
        let n = self.activities.len();
        let mut visited = vec![false; n];
        let mut components = Vec::new();
        for start in 0..n {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            let mut stack = vec![start];
            let mut component = Vec::new();
            while let Some(i) = stack.pop() {
                component.push(self.activities[i].clone());
                for j in 0..n {
                    if i == j || visited[j] {
                        continue;
                    }
                    let relation =
                        self.relation(&self.activities[i], &self.activities[j]);
                    if relation != DfRelation::Unrelated {
                        visited[j] = true;
                        stack.push(j);
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components
    }
}
