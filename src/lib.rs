#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

///
/// Event logs as plain activity-sequence traces
///
pub mod event_log {
    /// [`EventLog`] struct and the [`DfgNode`] node identifier
    pub mod event_log_struct;

    #[doc(inline)]
    pub use event_log_struct::{DfgNode, EventLog, Trace};
}

///
/// Directly-follows graph
///
pub mod dfg {
    /// [`DirectlyFollowsGraph`] struct
    pub mod dfg_struct;

    #[doc(inline)]
    pub use dfg_struct::DirectlyFollowsGraph;
}

///
/// Pure graph analysis over a directly-follows graph
///
pub mod analysis {
    /// Component merging for the sequence cut
    pub mod components;
    /// Footprint matrix and weakly connected components
    pub mod footprint;
    /// Reachability matrix (transitive closure)
    pub mod reachability;
}

///
/// Cut detection, cut validation, and recursive discovery
///
pub mod mining {
    /// Cut possibility checks and the fallthrough state machine
    pub mod cut_detection;
    /// Cut validation and event-log splitting
    pub mod cut_validation;
    /// Recursive process-tree discovery driver
    pub mod discovery;
    /// Exclusively-repeated pattern detection
    pub mod repeating_pattern;
}

///
/// Process trees
///
pub mod process_tree {
    /// [`ProcessTree`] struct
    pub mod process_tree_struct;

    #[doc(inline)]
    pub use process_tree_struct::ProcessTree;
}

#[doc(inline)]
pub use dfg::dfg_struct::DirectlyFollowsGraph;

#[doc(inline)]
pub use event_log::event_log_struct::DfgNode;

#[doc(inline)]
pub use event_log::event_log_struct::EventLog;

#[doc(inline)]
pub use mining::cut_detection::check_for_fallthrough;

#[doc(inline)]
pub use mining::cut_detection::CutType;

#[doc(inline)]
pub use mining::cut_detection::FallthroughCheck;

#[doc(inline)]
pub use mining::cut_validation::validate_and_split;

#[doc(inline)]
pub use mining::cut_validation::ValidationResult;

#[doc(inline)]
pub use mining::discovery::discover_process_tree;

#[doc(inline)]
pub use process_tree::process_tree_struct::ProcessTree;
