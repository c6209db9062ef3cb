pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("invalid target `{0}` (expected host[:port][/path])")]
    InvalidTarget(String),

    #[error("worker count must be a positive integer")]
    InvalidWorkers,

    #[error("requests per worker must be a positive integer")]
    InvalidRequests,
}
