//! Wire transport and connection strategy seams.
//!
//! `RemoteTransport` is one live session against the remote store; the
//! client drives it with protocol primitives and closes it on every exit
//! path. `ConnectionProvider` decides where sessions come from: the default
//! FTP provider opens a fresh session per call, and [`CappedProvider`] bounds
//! how many sessions exist at once, since FTP servers limit simultaneous
//! connections per credential.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::traits::{StorageError, StorageResult};

/// A single live session against the remote store.
///
/// The remote protocol has no recursive-mkdir primitive, so directory
/// creation is exposed one segment at a time and the client walks the chain
/// itself (`cwd`, and on failure `mkdir` then `cwd`).
#[async_trait]
pub trait RemoteTransport: Send {
    /// Change into a directory relative to the current one.
    async fn cwd(&mut self, dir: &str) -> StorageResult<()>;

    /// Create a directory relative to the current one.
    async fn mkdir(&mut self, dir: &str) -> StorageResult<()>;

    /// Store `data` under `name` in the current directory.
    async fn put(&mut self, name: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Retrieve the object at `path` (relative to the session root).
    async fn retr(&mut self, path: &str) -> StorageResult<Vec<u8>>;

    /// Remove the object at `path`.
    async fn rm(&mut self, path: &str) -> StorageResult<()>;

    /// Rename `from` to `to` (both relative to the session root).
    async fn rename(&mut self, from: &str, to: &str) -> StorageResult<()>;

    /// Close the session. Safe to call more than once.
    async fn quit(&mut self) -> StorageResult<()>;
}

/// Source of remote sessions.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn acquire(&self) -> StorageResult<Box<dyn RemoteTransport>>;
}

/// Bounds concurrent sessions from an inner provider with a semaphore.
///
/// The permit is tied to the returned transport and released when the
/// transport is dropped, so a leaked session still gives its slot back.
pub struct CappedProvider {
    inner: Arc<dyn ConnectionProvider>,
    permits: Arc<Semaphore>,
}

impl CappedProvider {
    pub fn new(inner: Arc<dyn ConnectionProvider>, max_sessions: usize) -> Self {
        CappedProvider {
            inner,
            permits: Arc::new(Semaphore::new(max_sessions)),
        }
    }
}

#[async_trait]
impl ConnectionProvider for CappedProvider {
    async fn acquire(&self) -> StorageResult<Box<dyn RemoteTransport>> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StorageError::Config("session limiter closed".to_string()))?;
        let inner = self.inner.acquire().await?;
        Ok(Box::new(LeasedTransport {
            inner,
            _permit: permit,
        }))
    }
}

/// A transport holding a semaphore permit for its lifetime.
struct LeasedTransport {
    inner: Box<dyn RemoteTransport>,
    _permit: OwnedSemaphorePermit,
}

#[async_trait]
impl RemoteTransport for LeasedTransport {
    async fn cwd(&mut self, dir: &str) -> StorageResult<()> {
        self.inner.cwd(dir).await
    }

    async fn mkdir(&mut self, dir: &str) -> StorageResult<()> {
        self.inner.mkdir(dir).await
    }

    async fn put(&mut self, name: &str, data: Vec<u8>) -> StorageResult<()> {
        self.inner.put(name, data).await
    }

    async fn retr(&mut self, path: &str) -> StorageResult<Vec<u8>> {
        self.inner.retr(path).await
    }

    async fn rm(&mut self, path: &str) -> StorageResult<()> {
        self.inner.rm(path).await
    }

    async fn rename(&mut self, from: &str, to: &str) -> StorageResult<()> {
        self.inner.rename(from, to).await
    }

    async fn quit(&mut self) -> StorageResult<()> {
        self.inner.quit().await
    }
}
