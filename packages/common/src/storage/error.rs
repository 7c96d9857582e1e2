use super::hash::ContentHash;

/// Failures raised by a [`BlobStore`](super::BlobStore).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No blob is stored under the given hash.
    #[error("blob {0} is not stored")]
    NotFound(ContentHash),

    /// The payload grew past the store's configured limit while being written.
    #[error("blob exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    /// A hash string could not be parsed.
    #[error("malformed content hash: {0}")]
    InvalidHash(String),

    #[error("blob store I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
