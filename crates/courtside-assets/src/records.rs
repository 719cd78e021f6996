//! Persistence collaborator boundary.
//!
//! The coordinator does not know the schema; it only asks an opaque
//! collaborator to create a record (which must yield a stable id, since the
//! id is embedded in remote paths) and to update it once per batch.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Field name → value map handed across the persistence boundary.
pub type FieldMap = Map<String, Value>;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record rejected: {0}")]
    Rejected(String),

    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Opaque create/update operations over domain records.
#[async_trait]
pub trait EntityRecords: Send + Sync {
    /// Create a record of the given entity kind and return its id.
    async fn create(&self, entity: &str, fields: FieldMap) -> Result<i64, RecordError>;

    /// Update the record with the given fields.
    async fn update(&self, entity: &str, id: i64, fields: FieldMap) -> Result<(), RecordError>;
}
