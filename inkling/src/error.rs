//! Error types.

use crate::NodeKey;

/// A reconcile pass hit a structural violation and stopped. Host state after
/// this error is unspecified.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The keyed children diff found an inconsistent child list.
    #[error("children of {parent:?}: {source}")]
    Diff {
        parent: NodeKey,
        #[source]
        source: keyway::DiffError<NodeKey, core::convert::Infallible>,
    },

    /// A child list names a key that is not in its node map.
    #[error("node {key:?} is referenced but missing from the {revision} node map")]
    MissingNode { key: NodeKey, revision: Revision },

    /// No behavior is registered for a node type.
    #[error("no behavior registered for node type {node_type:?} (node {key:?})")]
    UnknownNodeType { key: NodeKey, node_type: String },

    /// A reconciled key has no host element.
    #[error("node {key:?} has no registered host element")]
    UnregisteredKey { key: NodeKey },

    /// The root container cannot be swapped out.
    #[error("the root node {key:?} cannot be replaced")]
    CannotReplaceRoot { key: NodeKey },
}

/// Which side of a pass a lookup failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    Previous,
    Next,
}

impl core::fmt::Display for Revision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Revision::Previous => "previous",
            Revision::Next => "next",
        })
    }
}

/// An existing selection does not satisfy its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("selection point {key:?} is not a text node")]
    NotATextNode { key: NodeKey },

    #[error("selection point {key:?} is missing from the node map")]
    MissingNode { key: NodeKey },
}
