//! Local staging area.
//!
//! Scoped scratch files used as transfer buffers between upload sources and
//! the remote store (and back, for probing and duplication). Names are
//! collision-resistant without coordination, so concurrent operations never
//! contend on a local path. Callers must release every staged file on every
//! exit path; release is best-effort and idempotent.

use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

use crate::paths::PathTranslator;
use crate::traits::StorageResult;

/// Where a staged file belongs: tenant, owning entity and logical role
/// (e.g. `banner`, `video/beginner`).
#[derive(Clone, Debug)]
pub struct StagingScope {
    pub tenant: String,
    pub entity_id: i64,
    pub role: String,
}

impl StagingScope {
    pub fn new(tenant: impl Into<String>, entity_id: i64, role: impl Into<String>) -> Self {
        StagingScope {
            tenant: tenant.into(),
            entity_id,
            role: role.into(),
        }
    }

    fn as_path(&self) -> PathBuf {
        PathBuf::from(&self.tenant)
            .join(self.entity_id.to_string())
            .join(&self.role)
    }
}

/// A reserved (and possibly written) scratch file.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Scoped creation and guaranteed-best-effort cleanup of local temp files.
#[derive(Clone, Debug)]
pub struct LocalStagingArea {
    root: PathBuf,
}

impl LocalStagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStagingArea { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{unix_millis}_{random}{original extension}` — unique without any
    /// cross-process coordination.
    fn unique_name(original_name: &str) -> String {
        let base = PathTranslator::basename_only(original_name);
        let ext = base.rfind('.').map(|idx| &base[idx..]).unwrap_or("");
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let salt: u32 = rand::rng().random_range(0..1_000_000_000);
        format!("{}_{}{}", millis, salt, ext)
    }

    async fn reserve_in(&self, dir: PathBuf, original_name: &str) -> StorageResult<StagedFile> {
        fs::create_dir_all(&dir).await?;
        Ok(StagedFile {
            path: dir.join(Self::unique_name(original_name)),
        })
    }

    /// Allocate a unique path under the scope without writing anything.
    /// Used as a download target.
    pub async fn reserve(
        &self,
        scope: &StagingScope,
        original_name: &str,
    ) -> StorageResult<StagedFile> {
        self.reserve_in(self.root.join(scope.as_path()), original_name)
            .await
    }

    /// Allocate a unique path in the shared scratch directory.
    pub async fn scratch(&self, original_name: &str) -> StorageResult<StagedFile> {
        self.reserve_in(self.root.join("scratch"), original_name).await
    }

    /// Stage content under the scope, creating the directory tree.
    pub async fn stage_bytes(
        &self,
        scope: &StagingScope,
        original_name: &str,
        data: &[u8],
    ) -> StorageResult<StagedFile> {
        let staged = self.reserve(scope, original_name).await?;
        fs::write(&staged.path, data).await?;
        Ok(staged)
    }

    /// Remove the staged file. Best-effort: failures are logged, not
    /// escalated, and releasing an already-removed file is a no-op.
    pub async fn release(&self, staged: &StagedFile) {
        match fs::remove_file(&staged.path).await {
            Ok(()) => {
                tracing::debug!(path = %staged.path.display(), "staged file released");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %staged.path.display(),
                    error = %e,
                    "failed to remove staged file"
                );
            }
        }
    }
}
