use thiserror::Error;

#[derive(Debug, Error)]
pub enum FederationError {
    #[error("store error: {0}")]
    Store(#[from] rondo_store::StoreError),

    #[error("duplicate member in genesis roster: {0}")]
    DuplicateGenesisMember(String),
}
