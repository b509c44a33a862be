use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Unknown node index: {0}")]
    UnknownIndex(u32),

    /// `dep` and `children` disagree. Only reachable through a bug in the
    /// builder or in `prune`.
    #[error("Index consistency violated: {0}")]
    IndexConsistency(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
