use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;
use super::hash::ContentHash;

/// Boxed async byte source, used both for uploads and for streamed reads.
///
/// Uploads may borrow from the request they are read from; readers handed
/// out by [`BlobStore::open`] are `'static`.
pub type BoxReader<'a> = Box<dyn AsyncRead + Unpin + Send + 'a>;

/// Outcome of a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredBlob {
    pub hash: ContentHash,
    pub size: u64,
    /// `false` when identical bytes were already stored.
    pub created: bool,
}

/// Content-addressed storage for binary payloads.
///
/// Writing identical bytes twice yields the same hash and keeps a single copy.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Consume `reader` to the end and persist it.
    async fn put_stream(&self, reader: BoxReader<'_>) -> Result<StoredBlob, StorageError>;

    /// Open a stored blob for sequential reading.
    async fn open(&self, hash: &ContentHash) -> Result<BoxReader<'static>, StorageError>;

    async fn contains(&self, hash: &ContentHash) -> Result<bool, StorageError>;

    /// Delete a blob. Removing an absent blob is not an error.
    async fn remove(&self, hash: &ContentHash) -> Result<(), StorageError>;
}
