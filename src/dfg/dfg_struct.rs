use crate::event_log::event_log_struct::{DfgNode, EventLog, Trace};
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::{HashMap, HashSet};
use std::iter;

///
/// A directly-follows graph over the activities of an [`EventLog`].
///
/// An arc `a -> b` means some trace contains `b` immediately after `a`. Every
/// trace walk is bounded by the virtual [`DfgNode::Play`] and [`DfgNode::Stop`]
/// nodes, so the graph also records which activities start and end traces.
///
/// `predecessors` and `arcs` are derived views of `successors`: they are
/// regenerated through [`rebuild_predecessors`](Self::rebuild_predecessors)
/// and [`rebuild_arcs`](Self::rebuild_arcs) and never edited directly. After
/// mutating `successors` (e.g. via [`add_arc`](Self::add_arc)) both rebuild
/// steps must be invoked before the graph is queried again.
///
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectlyFollowsGraph {
    /// Directed adjacency, keyed by node (including `Play` and `Stop`)
    #[serde_as(as = "Vec<(_, _)>")]
    pub successors: HashMap<DfgNode, HashSet<DfgNode>>,
    /// Inverse of `successors`; regenerated, never hand-edited
    #[serde_as(as = "Vec<(_, _)>")]
    predecessors: HashMap<DfgNode, HashSet<DfgNode>>,
    /// All activity nodes, excluding `Play` and `Stop`
    pub nodes: HashSet<DfgNode>,
    /// Flattened, sorted view of `successors`
    arcs: Vec<(DfgNode, DfgNode)>,
    /// The traces this graph was built from
    pub event_log: EventLog,
}

impl DirectlyFollowsGraph {
    ///
    /// Build a directly-follows graph from an event log.
    ///
    /// For every trace, an arc is added from `Play` to the first activity,
    /// between each consecutive activity pair, and from the last activity to
    /// `Stop`. Raw empty traces contribute no arcs; callers that need to keep
    /// the skip behavior of an empty trace replace it with the
    /// `[DfgNode::EmptyTrace]` placeholder first.
    ///
    pub fn from_event_log(log: &EventLog) -> Self {
        let relations: HashSet<(DfgNode, DfgNode)> = log
            .traces
            .par_iter()
            .flat_map_iter(|t| Self::trace_relations(t))
            .collect();

        let mut dfg = Self {
            successors: HashMap::new(),
            predecessors: HashMap::new(),
            nodes: HashSet::new(),
            arcs: Vec::new(),
            event_log: log.clone(),
        };
        for (from, to) in relations {
            dfg.add_arc(from, to);
        }
        dfg.rebuild_predecessors();
        dfg.rebuild_arcs();
        dfg
    }

    /// The directly-follows pairs of a single `Play`/`Stop`-bounded trace walk.
    fn trace_relations(trace: &Trace) -> Vec<(DfgNode, DfgNode)> {
        if trace.is_empty() {
            return Vec::new();
        }
        iter::once(DfgNode::Play)
            .chain(trace.iter().cloned())
            .chain(iter::once(DfgNode::Stop))
            .tuple_windows()
            .collect()
    }

    ///
    /// Insert an arc into `successors`, registering both endpoints.
    ///
    /// The derived `predecessors` and `arcs` views are stale afterwards;
    /// invoke [`rebuild_predecessors`](Self::rebuild_predecessors) and
    /// [`rebuild_arcs`](Self::rebuild_arcs) once all mutations are done.
    ///
    pub fn add_arc(&mut self, from: DfgNode, to: DfgNode) {
        if !from.is_play_or_stop() {
            self.nodes.insert(from.clone());
        }
        if !to.is_play_or_stop() {
            self.nodes.insert(to.clone());
        }
        self.successors.entry(to.clone()).or_default();
        self.successors.entry(from).or_default().insert(to);
    }

    /// Regenerate `predecessors` as the exact inverse of `successors`.
    pub fn rebuild_predecessors(&mut self) {
        let mut predecessors: HashMap<DfgNode, HashSet<DfgNode>> = self
            .successors
            .keys()
            .map(|node| (node.clone(), HashSet::new()))
            .collect();
        for (source, targets) in &self.successors {
            for target in targets {
                predecessors
                    .entry(target.clone())
                    .or_default()
                    .insert(source.clone());
            }
        }
        self.predecessors = predecessors;
    }

    /// Regenerate the flattened `arcs` list from `successors`, sorted.
    pub fn rebuild_arcs(&mut self) {
        self.arcs = self
            .successors
            .iter()
            .flat_map(|(source, targets)| {
                targets
                    .iter()
                    .map(move |target| (source.clone(), target.clone()))
            })
            .sorted()
            .collect();
    }

    /// Whether the arc `from -> to` exists.
    pub fn has_arc(&self, from: &DfgNode, to: &DfgNode) -> bool {
        self.successors
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    /// The direct successors of a node.
    pub fn successors_of(&self, node: &DfgNode) -> HashSet<&DfgNode> {
        self.successors
            .get(node)
            .map(|targets| targets.iter().collect())
            .unwrap_or_default()
    }

    /// The direct predecessors of a node.
    pub fn predecessors_of(&self, node: &DfgNode) -> HashSet<&DfgNode> {
        self.predecessors
            .get(node)
            .map(|sources| sources.iter().collect())
            .unwrap_or_default()
    }

    /// The activities every trace can start with: the successors of `Play`.
    pub fn play_nodes(&self) -> HashSet<DfgNode> {
        self.successors_of(&DfgNode::Play)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The activities every trace can end with: the predecessors of `Stop`.
    pub fn stop_nodes(&self) -> HashSet<DfgNode> {
        self.predecessors_of(&DfgNode::Stop)
            .into_iter()
            .cloned()
            .collect()
    }

    /// All arcs leaving `node`, in sorted order.
    pub fn arcs_of_source(&self, node: &DfgNode) -> Vec<&(DfgNode, DfgNode)> {
        self.arcs.iter().filter(|(from, _)| from == node).collect()
    }

    /// The flattened arc list, sorted.
    pub fn arcs(&self) -> &[(DfgNode, DfgNode)] {
        &self.arcs
    }

    /// The activity nodes in sorted order, for deterministic matrix layouts.
    pub fn sorted_nodes(&self) -> Vec<DfgNode> {
        self.nodes.iter().cloned().sorted().collect()
    }

    ///
    /// Whether **every** node of `from_set` has a directed path to some node
    /// of `to_set`.
    ///
    /// When `allowed` is given, the walk is confined to those nodes; a target
    /// may always be stepped onto even when it is not listed. A single source
    /// without a path makes the whole call `false`. Nodes found to have a
    /// path are memoized across sources, so walks sharing a suffix are not
    /// re-explored.
    ///
    pub fn exists_path(
        &self,
        from_set: &HashSet<DfgNode>,
        to_set: &HashSet<DfgNode>,
        allowed: Option<&HashSet<DfgNode>>,
    ) -> bool {
        let mut known_reaching: HashSet<DfgNode> = HashSet::new();
        from_set.iter().sorted().all(|source| {
            let mut visited = HashSet::new();
            self.path_search(source, to_set, allowed, &mut visited, &mut known_reaching)
        })
    }

    fn path_search(
        &self,
        current: &DfgNode,
        to_set: &HashSet<DfgNode>,
        allowed: Option<&HashSet<DfgNode>>,
        visited: &mut HashSet<DfgNode>,
        known_reaching: &mut HashSet<DfgNode>,
    ) -> bool {
        if to_set.contains(current) || known_reaching.contains(current) {
            known_reaching.insert(current.clone());
            return true;
        }
        visited.insert(current.clone());
        for next in self.successors_of(current).into_iter().sorted() {
            if visited.contains(next) {
                continue;
            }
            if let Some(allowed) = allowed {
                if !allowed.contains(next) && !to_set.contains(next) {
                    continue;
                }
            }
            if self.path_search(next, to_set, allowed, visited, known_reaching) {
                known_reaching.insert(current.clone());
                return true;
            }
        }
        false
    }

    ///
    /// Whether `node` lies on a complete `Play -> node -> Stop` walk that
    /// never leaves `allowed`.
    ///
    /// Used by the parallel and loop cuts, where every activity must have a
    /// play-to-stop path inside its own partition.
    ///
    pub fn exists_full_path_over_node(&self, node: &DfgNode, allowed: &HashSet<DfgNode>) -> bool {
        let mut allowed_with_play = allowed.clone();
        allowed_with_play.insert(DfgNode::Play);
        let from_play = HashSet::from([DfgNode::Play]);
        let to_node = HashSet::from([node.clone()]);
        if !self.exists_path(&from_play, &to_node, Some(&allowed_with_play)) {
            return false;
        }
        let from_node = HashSet::from([node.clone()]);
        let to_stop = HashSet::from([DfgNode::Stop]);
        self.exists_path(&from_node, &to_stop, Some(allowed))
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self).unwrap()
    }
}
