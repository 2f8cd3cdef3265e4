use thiserror::Error;

/// Malformed input rejected by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("{role} node `{id}` is not in the hierarchy")]
    MissingNode { role: &'static str, id: String },

    #[error("node `{id}` is given more than one role")]
    DuplicateRole { id: String },

    #[error("branch root `{branch}` is not adjacent to root `{root}`")]
    BranchNotAdjacent { branch: String, root: String },

    #[error("hierarchy is disconnected: `{node}` is unreachable from `{from}`")]
    Disconnected { node: String, from: String },

    #[error("hierarchy contains a cycle")]
    NotATree,
}
