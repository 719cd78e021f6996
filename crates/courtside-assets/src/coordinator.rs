//! Asset lifecycle coordination.
//!
//! Sequences record creation/duplication with file attachment so a remote
//! store failure never leaves a record pointing at a nonexistent asset. The
//! record is created first (its id anchors the remote paths), per-file work
//! fans out concurrently, and the collected URLs land in a single update
//! after the whole batch has settled. One file failing degrades that one
//! field to unset; the batch and the record survive.

use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use courtside_storage::{LocalStagingArea, PathTranslator, RemoteStore, StagingScope};

use crate::records::{EntityRecords, FieldMap, RecordError};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// One uploaded file to attach: logical role plus content.
pub struct AttachFile {
    pub role: String,
    pub original_name: String,
    pub data: Vec<u8>,
}

/// An existing asset on the source entity of a duplication.
pub struct SourceAsset {
    pub role: String,
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct AttachedAsset {
    pub role: String,
    pub public_url: String,
}

/// What a batch produced: the record id, the attached URLs, and the roles
/// whose file was skipped.
#[derive(Debug)]
pub struct BatchOutcome {
    pub entity_id: i64,
    pub attached: Vec<AttachedAsset>,
    pub failed_roles: Vec<String>,
}

pub struct AssetLifecycleCoordinator {
    store: Arc<dyn RemoteStore>,
    staging: LocalStagingArea,
    records: Arc<dyn EntityRecords>,
    /// Lowercase extensions without dot; empty allows everything.
    allowed_extensions: Vec<String>,
}

impl AssetLifecycleCoordinator {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        staging: LocalStagingArea,
        records: Arc<dyn EntityRecords>,
    ) -> Self {
        AssetLifecycleCoordinator {
            store,
            staging,
            records,
            allowed_extensions: Vec::new(),
        }
    }

    pub fn with_allowed_extensions(mut self, extensions: Vec<String>) -> Self {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Extension checks run ahead of the upload loop: a bad file rejects the
    /// whole batch before anything touches the remote store.
    fn validate_batch(&self, files: &[AttachFile]) -> Result<(), LifecycleError> {
        if self.allowed_extensions.is_empty() {
            return Ok(());
        }
        for file in files {
            let name = PathTranslator::basename_only(&file.original_name);
            let ext = name
                .rfind('.')
                .map(|idx| name[idx + 1..].to_lowercase())
                .unwrap_or_default();
            if !self.allowed_extensions.contains(&ext) {
                return Err(LifecycleError::Validation(format!(
                    "extension not allowed: {}",
                    file.original_name
                )));
            }
        }
        Ok(())
    }

    /// Create-then-attach: create the record with no asset fields, fan out
    /// the uploads, then record every collected URL in one update.
    pub async fn create_with_assets(
        &self,
        tenant: &str,
        entity: &str,
        fields: FieldMap,
        files: Vec<AttachFile>,
    ) -> Result<BatchOutcome, LifecycleError> {
        self.validate_batch(&files)?;

        let entity_id = self.records.create(entity, fields).await?;
        tracing::info!(entity = %entity, entity_id, files = files.len(), "attaching asset batch");

        let uploads = files
            .into_iter()
            .map(|file| self.attach_one(tenant, entity_id, file));
        // Barrier: the single update below must only run once every per-file
        // operation has settled.
        let results = join_all(uploads).await;

        self.finish_batch(entity, entity_id, results).await
    }

    /// Duplicate-then-reclone: create the duplicate record, clone each source
    /// asset by value under the new id, then record the new URLs once.
    ///
    /// The duplicate owns independent remote copies; deleting or renaming its
    /// assets never affects the source entity's.
    pub async fn duplicate_with_assets(
        &self,
        tenant: &str,
        entity: &str,
        fields: FieldMap,
        sources: Vec<SourceAsset>,
    ) -> Result<BatchOutcome, LifecycleError> {
        let entity_id = self.records.create(entity, fields).await?;
        tracing::info!(entity = %entity, entity_id, assets = sources.len(), "cloning asset batch onto duplicate");

        let clones = sources
            .into_iter()
            .map(|source| self.clone_one(tenant, entity_id, source));
        let results = join_all(clones).await;

        self.finish_batch(entity, entity_id, results).await
    }

    async fn attach_one(
        &self,
        tenant: &str,
        entity_id: i64,
        file: AttachFile,
    ) -> (String, Option<String>) {
        let scope = StagingScope::new(tenant, entity_id, &file.role);
        let staged = match self
            .staging
            .stage_bytes(&scope, &file.original_name, &file.data)
            .await
        {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(role = %file.role, error = %e, "failed to stage file, leaving field unset");
                return (file.role, None);
            }
        };

        let name = PathTranslator::basename_only(&file.original_name);
        let rel = format!("{}/{}/{}/{}", tenant, entity_id, file.role, name);

        let url = match self.store.upload(staged.path(), &rel).await {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(role = %file.role, error = %e, "asset upload failed, leaving field unset");
                None
            }
        };

        self.staging.release(&staged).await;
        (file.role, url)
    }

    async fn clone_one(
        &self,
        tenant: &str,
        entity_id: i64,
        source: SourceAsset,
    ) -> (String, Option<String>) {
        let name = PathTranslator::basename_only(&source.public_url).to_string();
        let scope = StagingScope::new(tenant, entity_id, &source.role);
        let staged = match self.staging.reserve(&scope, &name).await {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(role = %source.role, error = %e, "failed to reserve scratch file, leaving field unset");
                return (source.role, None);
            }
        };

        let url = match self.store.download(&source.public_url, staged.path()).await {
            Ok(()) => {
                let rel = format!("{}/{}/{}/{}", tenant, entity_id, source.role, name);
                match self.store.upload(staged.path(), &rel).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        tracing::warn!(role = %source.role, error = %e, "asset re-upload failed, leaving field unset");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    role = %source.role,
                    url = %source.public_url,
                    error = %e,
                    "source asset download failed, leaving field unset"
                );
                None
            }
        };

        self.staging.release(&staged).await;
        (source.role, url)
    }

    async fn finish_batch(
        &self,
        entity: &str,
        entity_id: i64,
        results: Vec<(String, Option<String>)>,
    ) -> Result<BatchOutcome, LifecycleError> {
        let mut attached = Vec::new();
        let mut failed_roles = Vec::new();
        let mut fields = FieldMap::new();

        for (role, url) in results {
            match url {
                Some(public_url) => {
                    fields.insert(role.clone(), Value::String(public_url.clone()));
                    attached.push(AttachedAsset { role, public_url });
                }
                None => failed_roles.push(role),
            }
        }

        // Single update for the whole batch; readers never observe a record
        // whose uploads succeeded remotely but were not recorded.
        if !fields.is_empty() {
            self.records.update(entity, entity_id, fields).await?;
        }

        if !failed_roles.is_empty() {
            tracing::warn!(
                entity = %entity,
                entity_id,
                failed = failed_roles.len(),
                "batch completed with missing assets"
            );
        }

        Ok(BatchOutcome {
            entity_id,
            attached,
            failed_roles,
        })
    }
}
