//! Remote store abstraction trait
//!
//! This module defines the `RemoteStore` trait that all storage backends
//! implement, and the error taxonomy shared across them.
//!
//! Upload failures are just as explicit as any other failure here; the
//! asymmetry described in the lifecycle layer (skip a failed upload, surface
//! a failed delete) is a caller policy, not a property of the backend.

use async_trait::async_trait;
use courtside_core::StorageBackend;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Directory operation failed: {0}")]
    DirFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Rename failed: {0}")]
    RenameFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("URL is not under the configured base: {0}")]
    ForeignUrl(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Remote store abstraction
///
/// Implemented by the FTP client and by the local-filesystem backend used in
/// development and tests. All operations address objects either by a relative
/// path below the store root (uploads) or by the public URL a previous upload
/// produced (everything else).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload a local file to `relative_path` and return its public URL.
    ///
    /// Missing remote directories along the path are created on demand.
    async fn upload(&self, local_path: &Path, relative_path: &str) -> StorageResult<String>;

    /// Download the object at `public_url` into `local_path`.
    ///
    /// The local parent directory is created if absent. The URL must be under
    /// the configured public base.
    async fn download(&self, public_url: &str, local_path: &Path) -> StorageResult<()>;

    /// Remove the single object at `public_url`.
    ///
    /// Deleting an object that is already gone is an error the caller sees.
    async fn delete(&self, public_url: &str) -> StorageResult<()>;

    /// Rename the object at `public_url` within its directory.
    ///
    /// Any directory component in `new_base_name` is discarded; renames never
    /// cross directories. Returns the new public URL.
    async fn rename(&self, public_url: &str, new_base_name: &str) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
