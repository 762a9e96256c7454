use crate::NodeId;

/// Errors raised by tree mutation and traversal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// A walk went deeper than the configured limit.
    #[error("document is too complex: nesting exceeds {max_depth} levels")]
    TooComplex {
        /// The configured limit.
        max_depth: usize,
    },
    /// The node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// The expected parent.
        parent: NodeId,
        /// The node that was looked up.
        child: NodeId,
    },
    /// The id does not name a node in this tree.
    #[error("node {0} does not exist")]
    InvalidNode(NodeId),
    /// The insertion would make a node its own ancestor.
    #[error("inserting the node would create a cycle")]
    HierarchyCycle,
}
