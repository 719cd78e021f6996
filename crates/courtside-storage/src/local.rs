//! Local filesystem store implementation
//!
//! Mirrors the FTP-backed store on a local directory tree. Used for
//! development and tests; the addressing contract (relative path below the
//! root, public URL under the configured base) is identical.

use async_trait::async_trait;
use courtside_core::StorageBackend;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;

use crate::paths::PathTranslator;
use crate::traits::{RemoteStore, StorageError, StorageResult};

#[derive(Clone)]
pub struct LocalRemoteStore {
    base_path: PathBuf,
    translator: PathTranslator,
}

impl LocalRemoteStore {
    /// # Arguments
    /// * `base_path` - Root directory for stored objects
    /// * `base_url` - Public URL prefix the objects are served under
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalRemoteStore {
            base_path,
            translator: PathTranslator::new(base_url),
        })
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    /// Convert a relative store path to a filesystem path, rejecting keys
    /// that could escape the store root.
    fn rel_to_path(&self, rel: &str) -> StorageResult<PathBuf> {
        if rel.contains("..") || rel.starts_with('/') || rel.is_empty() {
            return Err(StorageError::InvalidKey(rel.to_string()));
        }
        Ok(self.base_path.join(rel))
    }

    async fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for LocalRemoteStore {
    async fn upload(&self, local_path: &Path, relative_path: &str) -> StorageResult<String> {
        let rel = PathTranslator::normalize(relative_path);
        let path = self.rel_to_path(&rel)?;
        let start = Instant::now();

        Self::ensure_parent_dir(&path).await?;

        let size = fs::copy(local_path, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!("copy to {}: {}", path.display(), e))
        })?;

        tracing::info!(
            key = %rel,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "local store upload successful"
        );

        Ok(self.translator.to_public_url(&rel))
    }

    async fn download(&self, public_url: &str, local_path: &Path) -> StorageResult<()> {
        let rel = self.translator.to_relative_path(public_url)?;
        let path = self.rel_to_path(&rel)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(rel));
        }

        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(&path, local_path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("copy to {}: {}", local_path.display(), e))
        })?;

        tracing::info!(key = %rel, "local store download successful");
        Ok(())
    }

    async fn delete(&self, public_url: &str) -> StorageResult<()> {
        let rel = self.translator.to_relative_path(public_url)?;
        let path = self.rel_to_path(&rel)?;

        // The object must exist: deleting an already-gone object is an error
        // the caller has to see.
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(rel));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::DeleteFailed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(key = %rel, "local store delete successful");
        Ok(())
    }

    async fn rename(&self, public_url: &str, new_base_name: &str) -> StorageResult<String> {
        let rel = self.translator.to_relative_path(public_url)?;
        let path = self.rel_to_path(&rel)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(rel));
        }

        let name = PathTranslator::basename_only(new_base_name);
        let new_rel = match rel.rfind('/') {
            Some(idx) => format!("{}/{}", &rel[..idx], name),
            None => name.to_string(),
        };
        let new_path = self.rel_to_path(&new_rel)?;

        fs::rename(&path, &new_path)
            .await
            .map_err(|e| StorageError::RenameFailed(format!("{}: {}", rel, e)))?;

        tracing::info!(from = %rel, to = %new_rel, "local store rename successful");
        Ok(self.translator.to_public_url(&new_rel))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
