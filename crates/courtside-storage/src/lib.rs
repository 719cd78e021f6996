//! Courtside Storage Library
//!
//! Remote asset storage for the coaching platform: an FTP-backed object
//! store client, URL/path translation, a scoped local staging area and a
//! local-filesystem backend for development and tests.
//!
//! # Relative paths and public URLs
//!
//! Every stored object lives at a POSIX-style relative path below the store
//! root, e.g. `admin/7/music/x.mp3`, and is reachable at
//! `{PUBLIC_URL_BASE}/{relative_path}`. The translation between the two is
//! centralized in [`PathTranslator`]; a URL that is not under the configured
//! base is rejected loudly instead of producing a malformed remote path.

pub mod client;
pub mod factory;
pub mod ftp;
pub mod local;
pub mod paths;
pub mod staging;
pub mod traits;
pub mod transport;

// Re-export commonly used types
pub use client::RemoteStoreClient;
pub use courtside_core::StorageBackend;
pub use factory::create_store;
pub use local::LocalRemoteStore;
pub use paths::PathTranslator;
pub use staging::{LocalStagingArea, StagedFile, StagingScope};
pub use traits::{RemoteStore, StorageError, StorageResult};
pub use transport::{CappedProvider, ConnectionProvider, RemoteTransport};
