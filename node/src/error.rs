use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("voting error: {0}")]
    Voting(#[from] rondo_voting::VotingError),

    #[error("federation error: {0}")]
    Federation(#[from] rondo_federation::FederationError),

    #[error("idle-kicker error: {0}")]
    Kicker(#[from] rondo_kicker::KickerError),

    #[error("store error: {0}")]
    Store(#[from] rondo_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rondo_store_fs::FsError> for NodeError {
    fn from(e: rondo_store_fs::FsError) -> Self {
        NodeError::Store(e.into())
    }
}
