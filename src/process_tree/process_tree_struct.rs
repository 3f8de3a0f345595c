use crate::mining::cut_detection::CutType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

///
/// Leaf label in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub enum LeafLabel {
    /// Non-silent activity leaf
    Activity(String),
    /// Silent activity leaf
    Tau,
}

///
/// Node in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Operator node of a process tree
    Operator(Operator),
    /// Leaf node of a process tree
    Leaf(Leaf),
}

impl TreeNode {
    ///
    /// Returns the identifier of a node in a process tree
    ///
    pub fn get_uuid(&self) -> &Uuid {
        match self {
            TreeNode::Operator(op) => &op.uuid,
            TreeNode::Leaf(leaf) => &leaf.uuid,
        }
    }

    ///
    /// Creates a new [`TreeNode::Operator`] with the given [`CutType`]
    ///
    pub fn new_operator(operator_type: CutType) -> Self {
        TreeNode::Operator(Operator::new(operator_type))
    }

    ///
    /// Creates a new non-silent or silent leaf [`TreeNode`]
    ///
    pub fn new_leaf(leaf_label: Option<String>) -> Self {
        TreeNode::Leaf(Leaf::new(leaf_label))
    }

    ///
    /// Adds a node as child if the node is an operator node
    ///
    /// Pushing a child onto a leaf is a programming error and panics.
    ///
    pub fn add_child(&mut self, child: TreeNode) {
        match self {
            TreeNode::Operator(op) => op.children.push(child),
            TreeNode::Leaf(_) => panic!("Cannot add child to a leaf"),
        }
    }

    ///
    /// Returns `true` if a loop operator has at least two children or if all
    /// other operators have at least one child.
    ///
    pub fn check_children_valid(&self) -> bool {
        match self {
            TreeNode::Operator(op) => match op.operator_type {
                CutType::Loop => op.children.len() >= 2,
                _ => !op.children.is_empty(),
            },
            TreeNode::Leaf(_) => true,
        }
    }

    fn subtree_valid(&self) -> bool {
        if !self.check_children_valid() {
            return false;
        }
        match self {
            TreeNode::Operator(op) => op.children.iter().all(TreeNode::subtree_valid),
            TreeNode::Leaf(_) => true,
        }
    }
}

///
/// A process tree with a [`TreeNode`] as root
///
/// One operator per structural cut; leaves are activities or silent (tau)
/// steps.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTree {
    /// The root of the process tree
    pub root: TreeNode,
}

impl ProcessTree {
    ///
    /// Initializes the process tree with the given node as root
    ///
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    ///
    /// Returns `true` if every operator in the tree has the right number of
    /// children.
    ///
    pub fn is_valid(&self) -> bool {
        self.root.subtree_valid()
    }

    ///
    /// Returns all descendant [`Leaf`] nodes, left to right
    ///
    pub fn find_all_leaves(&self) -> Vec<&Leaf> {
        let mut result: Vec<&Leaf> = Vec::new();

        let mut curr_operators: Vec<&Operator> = Vec::new();
        match &self.root {
            TreeNode::Operator(op) => curr_operators.push(op),
            TreeNode::Leaf(leaf) => result.push(leaf),
        };

        let mut next_operators = Vec::new();
        while !curr_operators.is_empty() {
            curr_operators.iter().for_each(|op| {
                op.children.iter().for_each(|child| match child {
                    TreeNode::Operator(op) => next_operators.push(op),
                    TreeNode::Leaf(leaf) => result.push(leaf),
                })
            });
            curr_operators = next_operators;
            next_operators = Vec::new();
        }

        result
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self).unwrap()
    }
}

///
/// An operator node in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// The node ID
    pub uuid: Uuid,
    /// The [`CutType`] this operator stands for
    pub operator_type: CutType,
    /// The children nodes of the operator node
    pub children: Vec<TreeNode>,
}

impl Operator {
    ///
    /// A constructor that initializes with the given [`CutType`] and
    /// otherwise a fresh [`Uuid`] and an empty list of children
    ///
    pub fn new(operator_type: CutType) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            operator_type,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
///
/// A leaf in a process tree
///
pub struct Leaf {
    /// The identifier of the leaf
    pub uuid: Uuid,
    /// The silent or non-silent activity label [`LeafLabel`]
    pub label: LeafLabel,
}

impl Leaf {
    ///
    /// Creates a new [`Leaf`] either by using a given label or making it
    /// silent if a label is missing
    ///
    pub fn new(leaf_label: Option<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            label: match leaf_label {
                Some(label) => LeafLabel::Activity(label),
                None => LeafLabel::Tau,
            },
        }
    }
}
