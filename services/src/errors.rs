use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkspaceError>;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("push rejected: {0}")]
    PushRejected(String),

    #[error("merge conflict while reverting {0}")]
    RevertConflict(String),

    #[error("HEAD has no parent commit to revert against")]
    NothingToRevert,
}
