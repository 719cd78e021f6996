//! Courtside Core Library
//!
//! This crate provides the configuration and shared types used by the
//! Courtside media storage components.

pub mod config;
pub mod constants;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError, RemoteStoreConfig};
pub use storage_types::StorageBackend;
