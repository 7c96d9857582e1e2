use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use super::error::StorageError;
use super::hash::ContentHash;
use super::traits::{BlobStore, BoxReader, StoredBlob};

const COPY_BUF: usize = 64 * 1024;

/// Blob store on the local filesystem.
///
/// Layout: `{root}/{shard}/{leaf}` where `shard` is the first hash byte in hex.
/// Writes land in `{root}/.incoming` first and are renamed into place, so a
/// reader never observes a partially written blob.
pub struct FilesystemBlobStore {
    root: PathBuf,
    max_size: u64,
}

impl FilesystemBlobStore {
    pub async fn open_dir(root: impl Into<PathBuf>, max_size: u64) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(root.join(".incoming")).await?;
        Ok(Self { root, max_size })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(hash.shard()).join(hash.leaf())
    }

    fn incoming_path(&self) -> PathBuf {
        self.root
            .join(".incoming")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Copy `reader` into `dest`, hashing as it goes.
    async fn spool(&self, mut reader: BoxReader<'_>, dest: &Path) -> Result<StoredBlob, StorageError> {
        let mut file = fs::File::create(dest).await?;
        let mut hasher = Sha256::new();
        let mut size: u64 = 0;
        let mut buf = vec![0u8; COPY_BUF];

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            size += n as u64;
            if size > self.max_size {
                return Err(StorageError::TooLarge {
                    limit: self.max_size,
                });
            }
            hasher.update(&buf[..n]);
            file.write_all(&buf[..n]).await?;
        }
        file.flush().await?;

        Ok(StoredBlob {
            hash: ContentHash::from_digest(hasher),
            size,
            created: true,
        })
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put_stream(&self, reader: BoxReader<'_>) -> Result<StoredBlob, StorageError> {
        let incoming = self.incoming_path();

        let mut stored = match self.spool(reader, &incoming).await {
            Ok(stored) => stored,
            Err(e) => {
                let _ = fs::remove_file(&incoming).await;
                return Err(e);
            }
        };

        if self.contains(&stored.hash).await? {
            debug!(hash = %stored.hash, "blob already stored, dropping duplicate");
            let _ = fs::remove_file(&incoming).await;
            stored.created = false;
            return Ok(stored);
        }

        let target = self.blob_path(&stored.hash);

        if let Some(shard) = target.parent() {
            fs::create_dir_all(shard).await?;
        }
        if let Err(e) = fs::rename(&incoming, &target).await {
            let _ = fs::remove_file(&incoming).await;
            return Err(e.into());
        }

        Ok(stored)
    }

    async fn open(&self, hash: &ContentHash) -> Result<BoxReader<'static>, StorageError> {
        match fs::File::open(self.blob_path(hash)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(*hash)),
            Err(e) => Err(e.into()),
        }
    }

    async fn contains(&self, hash: &ContentHash) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.blob_path(hash)).await?)
    }

    async fn remove(&self, hash: &ContentHash) -> Result<(), StorageError> {
        match fs::remove_file(self.blob_path(hash)).await {
            Ok(()) => {
                debug!(%hash, "blob removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
