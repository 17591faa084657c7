use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted store: {0}")]
    Corruption(String),
}

impl From<FsError> for rondo_store::StoreError {
    fn from(e: FsError) -> Self {
        match e {
            FsError::Serialization(s) => rondo_store::StoreError::Serialization(s),
            FsError::Corruption(s) => rondo_store::StoreError::Corruption(s),
            other => rondo_store::StoreError::Backend(other.to_string()),
        }
    }
}
