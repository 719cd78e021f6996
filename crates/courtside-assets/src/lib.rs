//! Courtside Assets Library
//!
//! Lifecycle orchestration for entity-owned media: attach uploaded files to
//! a freshly created record, and clone a source entity's assets onto a
//! duplicate, with a single persistence update per batch and per-file
//! failure isolation.

pub mod coordinator;
pub mod records;

// Re-export commonly used types
pub use coordinator::{
    AssetLifecycleCoordinator, AttachFile, AttachedAsset, BatchOutcome, LifecycleError,
    SourceAsset,
};
pub use records::{EntityRecords, FieldMap, RecordError};
