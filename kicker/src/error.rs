use thiserror::Error;

#[derive(Debug, Error)]
pub enum KickerError {
    #[error("store error: {0}")]
    Store(#[from] rondo_store::StoreError),

    #[error("voting error: {0}")]
    Voting(#[from] rondo_voting::VotingError),
}
