use crate::analysis::reachability::ReachabilityMatrix;
use crate::event_log::event_log_struct::DfgNode;
use petgraph::unionfind::UnionFind;
use std::cmp::Ordering;

///
/// The components the sequence cut partitions a graph into.
///
/// Two merge passes over a disjoint-set structure, both in sorted-node index
/// order:
///
/// 1. mutually reachable nodes merge (the strongly-connected parts that can
///    never be ordered against each other),
/// 2. components with no reachability in either direction merge (behavior
///    that is skippable relative to each other cannot be sequenced apart).
///
/// Merging only ever adds reachability between components, so a single pass
/// over the ordered pairs reaches the fixpoint. The result is returned
/// ordered by reachability: every earlier component reaches every later one.
///
pub fn sequence_components(reachability: &ReachabilityMatrix) -> Vec<Vec<DfgNode>> {
    let activities = reachability.activities();
    let n = activities.len();
    let mut sets: UnionFind<usize> = UnionFind::new(n);

    for i in 0..n {
        for j in (i + 1)..n {
            if reachability.reaches_index(i, j) && reachability.reaches_index(j, i) {
                sets.union(i, j);
            }
        }
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if sets.equiv(i, j) {
                continue;
            }
            let members_i = members_of(&sets, n, i);
            let members_j = members_of(&sets, n, j);
            if !component_reaches(reachability, &members_i, &members_j)
                && !component_reaches(reachability, &members_j, &members_i)
            {
                sets.union(i, j);
            }
        }
    }

    let mut components = collect_components(&sets, activities);
    components.sort_by(|a, b| compare_by_reachability(reachability, a, b));
    components
}

/// Whether any member of `from` reaches any member of `to`.
fn component_reaches(reachability: &ReachabilityMatrix, from: &[usize], to: &[usize]) -> bool {
    from.iter()
        .any(|&i| to.iter().any(|&j| reachability.reaches_index(i, j)))
}

fn members_of(sets: &UnionFind<usize>, n: usize, representative: usize) -> Vec<usize> {
    (0..n).filter(|&i| sets.equiv(i, representative)).collect()
}

/// The current partition as sorted node lists, ordered by smallest member index.
fn collect_components(sets: &UnionFind<usize>, activities: &[DfgNode]) -> Vec<Vec<DfgNode>> {
    let mut components: Vec<Vec<DfgNode>> = Vec::new();
    let mut component_of_root: Vec<Option<usize>> = vec![None; activities.len()];
    for (i, node) in activities.iter().enumerate() {
        let root = sets.find(i);
        match component_of_root[root] {
            Some(index) => components[index].push(node.clone()),
            None => {
                component_of_root[root] = Some(components.len());
                components.push(vec![node.clone()]);
            }
        }
    }
    for component in &mut components {
        component.sort();
    }
    components
}

///
/// Order two components by reachability: the one reaching the other comes
/// first. After [`sequence_components`] merging, distinct components are
/// comparable in exactly one direction.
///
fn compare_by_reachability(
    reachability: &ReachabilityMatrix,
    a: &[DfgNode],
    b: &[DfgNode],
) -> Ordering {
    let a_reaches_b = a
        .iter()
        .any(|x| b.iter().any(|y| reachability.reaches(x, y)));
    let b_reaches_a = b
        .iter()
        .any(|x| a.iter().any(|y| reachability.reaches(x, y)));
    match (a_reaches_b, b_reaches_a) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfg::dfg_struct::DirectlyFollowsGraph;
    use crate::event_log::event_log_struct::EventLog;

    fn acts(names: &[&str]) -> Vec<DfgNode> {
        names.iter().map(|a| DfgNode::activity(*a)).collect()
    }

    fn matrix_for(traces: &[&[&str]]) -> ReachabilityMatrix {
        let log = EventLog::from_activity_traces(traces);
        ReachabilityMatrix::from_dfg(&DirectlyFollowsGraph::from_event_log(&log))
    }

    #[test]
    fn chain_splits_into_singleton_components() {
        let components = sequence_components(&matrix_for(&[&["A", "B", "C"]]));
        assert_eq!(
            components,
            vec![acts(&["A"]), acts(&["B"]), acts(&["C"])]
        );
    }

    #[test]
    fn cycle_members_merge_into_one_component() {
        // B and C form a loop between A and D.
        let components =
            sequence_components(&matrix_for(&[&["A", "B", "C", "D"], &["A", "B", "C", "B", "C", "D"]]));
        assert_eq!(
            components,
            vec![acts(&["A"]), acts(&["B", "C"]), acts(&["D"])]
        );
    }

    #[test]
    fn unordered_branches_merge() {
        // B and C are exclusive alternatives; neither reaches the other, so
        // they cannot be sequenced apart.
        let components = sequence_components(&matrix_for(&[&["A", "B", "D"], &["A", "C", "D"]]));
        assert_eq!(
            components,
            vec![acts(&["A"]), acts(&["B", "C"]), acts(&["D"])]
        );
    }

    #[test]
    fn fully_cyclic_graph_keeps_one_component() {
        let components = sequence_components(&matrix_for(&[&["A", "B", "A"]]));
        assert_eq!(components, vec![acts(&["A", "B"])]);
    }
}
