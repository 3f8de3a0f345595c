use crate::dfg::dfg_struct::DirectlyFollowsGraph;
use crate::event_log::event_log_struct::{DfgNode, EventLog};
use crate::mining::cut_detection::{check_for_fallthrough, CutType, FallthroughCheck};
use crate::mining::cut_validation::validate_and_split;
use crate::mining::repeating_pattern::exclusive_pattern;
use crate::process_tree::process_tree_struct::{ProcessTree, TreeNode};
use itertools::Itertools;
use log::debug;

///
/// Discover a [`ProcessTree`] from an event log.
///
/// The cut engine itself never recurses; this driver re-invokes it on every
/// child graph a successful cut produces, and falls back to the tau-loop or
/// flower reduction when no structural cut applies. Each recursion step works
/// on an owned sub-log, so a caller wanting step-wise or parallel mining can
/// reuse the same building blocks directly.
///
pub fn discover_process_tree(log: &EventLog) -> ProcessTree {
    ProcessTree::new(discover_node(log))
}

fn discover_node(log: &EventLog) -> TreeNode {
    let real_behavior = EventLog {
        traces: log
            .traces
            .iter()
            .filter(|t| !t.is_empty() && *t != &[DfgNode::EmptyTrace])
            .cloned()
            .collect(),
    };
    let can_be_skipped = real_behavior.traces.len() < log.traces.len();
    if real_behavior.traces.is_empty() {
        return TreeNode::new_leaf(None);
    }
    // An empty trace is an optional branch: the rest of the behavior hangs
    // under an exclusive choice against a silent step.
    if can_be_skipped {
        debug!("peeling optional branch off {} traces", log.traces.len());
        let mut choice = TreeNode::new_operator(CutType::ExclusiveChoice);
        choice.add_child(TreeNode::new_leaf(None));
        choice.add_child(discover_node(&real_behavior));
        return choice;
    }

    let dfg = DirectlyFollowsGraph::from_event_log(log);
    match check_for_fallthrough(&dfg) {
        FallthroughCheck::BaseCase(node) => leaf_for(&node),
        FallthroughCheck::SingleNodeLoop(node) => {
            let mut repetition = TreeNode::new_operator(CutType::Loop);
            repetition.add_child(leaf_for(&node));
            repetition.add_child(TreeNode::new_leaf(None));
            repetition
        }
        FallthroughCheck::TauLoop => {
            let pattern = exclusive_pattern(&dfg.event_log.without_empty_trace_placeholders())
                .expect("tau loop verdicts imply a pattern");
            debug!(
                "tau loop over pattern [{}]",
                pattern.iter().join(", ")
            );
            let body_log = EventLog {
                traces: vec![pattern],
            };
            let mut repetition = TreeNode::new_operator(CutType::Loop);
            repetition.add_child(discover_node(&body_log));
            repetition.add_child(TreeNode::new_leaf(None));
            repetition
        }
        FallthroughCheck::CutFound {
            cut_type,
            first,
            second,
        } => {
            let result = validate_and_split(&dfg, &first, &second, cut_type);
            match result.children {
                Some((first_child, second_child)) => {
                    debug!(
                        "{cut_type} cut into {} + {} nodes",
                        first_child.nodes.len(),
                        second_child.nodes.len()
                    );
                    let mut operator = TreeNode::new_operator(cut_type);
                    operator.add_child(discover_node(&first_child.event_log));
                    operator.add_child(discover_node(&second_child.event_log));
                    operator
                }
                // The detector proposed a partition its own validation refuses;
                // fall back rather than loop forever on the same graph.
                None => {
                    debug!("proposed {cut_type} cut rejected: {}", result.message);
                    flower_model(&dfg)
                }
            }
        }
        FallthroughCheck::Fallthrough => flower_model(&dfg),
    }
}

///
/// The flower model: a loop around a silent do step whose redo part offers
/// every activity as an exclusive choice. Accepts any interleaving of the
/// activities, the weakest model that still fits the log.
///
fn flower_model(dfg: &DirectlyFollowsGraph) -> TreeNode {
    debug!("falling back to a flower model over {} nodes", dfg.nodes.len());
    let mut redo = TreeNode::new_operator(CutType::ExclusiveChoice);
    for node in dfg.sorted_nodes() {
        redo.add_child(leaf_for(&node));
    }
    let mut flower = TreeNode::new_operator(CutType::Loop);
    flower.add_child(TreeNode::new_leaf(None));
    flower.add_child(redo);
    flower
}

fn leaf_for(node: &DfgNode) -> TreeNode {
    match node {
        DfgNode::Activity(name) => TreeNode::new_leaf(Some(name.clone())),
        // placeholders and boundary nodes reduce to silent steps
        _ => TreeNode::new_leaf(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process_tree::process_tree_struct::{Leaf, LeafLabel, Operator};

    fn operator(node: &TreeNode) -> &Operator {
        match node {
            TreeNode::Operator(op) => op,
            TreeNode::Leaf(_) => panic!("expected an operator, got a leaf"),
        }
    }

    fn leaf(node: &TreeNode) -> &Leaf {
        match node {
            TreeNode::Leaf(leaf) => leaf,
            TreeNode::Operator(_) => panic!("expected a leaf, got an operator"),
        }
    }

    fn activity_label(name: &str) -> LeafLabel {
        LeafLabel::Activity(name.into())
    }

    #[test]
    fn single_activity_mines_to_a_leaf() {
        let tree = discover_process_tree(&EventLog::from_activity_traces(&[&["A"]]));
        assert_eq!(leaf(&tree.root).label, activity_label("A"));
    }

    #[test]
    fn chain_mines_to_nested_sequences() {
        let tree = discover_process_tree(&EventLog::from_activity_traces(&[&["A", "B", "C"]]));
        assert!(tree.is_valid());

        let root = operator(&tree.root);
        assert_eq!(root.operator_type, CutType::Sequence);
        assert_eq!(leaf(&root.children[0]).label, activity_label("A"));
        let tail = operator(&root.children[1]);
        assert_eq!(tail.operator_type, CutType::Sequence);
        assert_eq!(leaf(&tail.children[0]).label, activity_label("B"));
        assert_eq!(leaf(&tail.children[1]).label, activity_label("C"));
    }

    #[test]
    fn alternatives_mine_to_an_exclusive_choice() {
        let tree = discover_process_tree(&EventLog::from_activity_traces(&[&["A"], &["B"]]));
        let root = operator(&tree.root);
        assert_eq!(root.operator_type, CutType::ExclusiveChoice);
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn self_repeating_activity_mines_to_a_loop() {
        let tree =
            discover_process_tree(&EventLog::from_activity_traces(&[&["A"], &["A", "A"]]));
        let root = operator(&tree.root);
        assert_eq!(root.operator_type, CutType::Loop);
        assert_eq!(leaf(&root.children[0]).label, activity_label("A"));
        assert_eq!(leaf(&root.children[1]).label, LeafLabel::Tau);
    }

    #[test]
    fn repeated_pattern_mines_to_a_tau_loop_over_the_pattern() {
        let tree = discover_process_tree(&EventLog::from_activity_traces(&[
            &["A", "B"],
            &["A", "B", "A", "B"],
        ]));
        assert!(tree.is_valid());

        let root = operator(&tree.root);
        assert_eq!(root.operator_type, CutType::Loop);
        let body = operator(&root.children[0]);
        assert_eq!(body.operator_type, CutType::Sequence);
        assert_eq!(leaf(&root.children[1]).label, LeafLabel::Tau);
    }

    #[test]
    fn empty_trace_becomes_an_optional_branch() {
        let log = EventLog {
            traces: vec![
                vec![DfgNode::activity("A"), DfgNode::activity("B")],
                vec![],
            ],
        };
        let tree = discover_process_tree(&log);
        let root = operator(&tree.root);
        assert_eq!(root.operator_type, CutType::ExclusiveChoice);
        assert_eq!(leaf(&root.children[0]).label, LeafLabel::Tau);
        let body = operator(&root.children[1]);
        assert_eq!(body.operator_type, CutType::Sequence);
    }

    #[test]
    fn end_to_end_scenario_builds_a_valid_tree() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tree = discover_process_tree(&EventLog::from_activity_traces(&[
            &["A", "B", "C"],
            &["A", "B", "C", "D", "B", "C"],
            &["E", "F"],
            &["G", "H", "I", "K"],
            &["G", "H", "J", "K"],
            &["L", "M", "N"],
            &["L", "M", "O"],
        ]));
        assert!(tree.is_valid());

        // Every activity of the log survives as a leaf exactly once.
        let mut labels: Vec<&LeafLabel> =
            tree.find_all_leaves().iter().map(|l| &l.label).collect();
        labels.retain(|l| **l != LeafLabel::Tau);
        assert_eq!(labels.len(), 15);
        for name in [
            "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O",
        ] {
            assert!(
                labels.contains(&&activity_label(name)),
                "missing leaf for {name}"
            );
        }
    }

    #[test]
    fn irreducible_log_falls_back_to_a_flower_model() {
        let tree = discover_process_tree(&EventLog::from_activity_traces(&[
            &["A", "B", "C"],
            &["B", "C", "A"],
        ]));
        let root = operator(&tree.root);
        assert_eq!(root.operator_type, CutType::Loop);
        assert_eq!(leaf(&root.children[0]).label, LeafLabel::Tau);
        let redo = operator(&root.children[1]);
        assert_eq!(redo.operator_type, CutType::ExclusiveChoice);
        assert_eq!(redo.children.len(), 3);
    }
}
