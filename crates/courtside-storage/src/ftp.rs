//! FTP transport backed by suppaftp.
//!
//! suppaftp's client is synchronous, so every protocol call runs on the
//! blocking pool via `spawn_blocking`; the session object is moved into the
//! blocking task and back out, which keeps async callers from ever parking a
//! worker thread on network I/O.

use async_trait::async_trait;
use std::io::Cursor;

use suppaftp::native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, NativeTlsConnector, NativeTlsFtpStream, Status};

use courtside_core::RemoteStoreConfig;

use crate::traits::{StorageError, StorageResult};
use crate::transport::{ConnectionProvider, RemoteTransport};

/// Plain or explicit-FTPS session. Both variants expose the same protocol
/// surface, so the methods below just dispatch.
enum FtpSession {
    Plain(FtpStream),
    Secure(NativeTlsFtpStream),
}

impl FtpSession {
    fn cwd(&mut self, dir: &str) -> Result<(), FtpError> {
        match self {
            FtpSession::Plain(s) => s.cwd(dir),
            FtpSession::Secure(s) => s.cwd(dir),
        }
    }

    fn mkdir(&mut self, dir: &str) -> Result<(), FtpError> {
        match self {
            FtpSession::Plain(s) => s.mkdir(dir),
            FtpSession::Secure(s) => s.mkdir(dir),
        }
    }

    fn put(&mut self, name: &str, data: Vec<u8>) -> Result<(), FtpError> {
        let mut reader = Cursor::new(data);
        match self {
            FtpSession::Plain(s) => s.put_file(name, &mut reader).map(|_| ()),
            FtpSession::Secure(s) => s.put_file(name, &mut reader).map(|_| ()),
        }
    }

    fn retr(&mut self, path: &str) -> Result<Vec<u8>, FtpError> {
        match self {
            FtpSession::Plain(s) => s.retr_as_buffer(path).map(|buf| buf.into_inner()),
            FtpSession::Secure(s) => s.retr_as_buffer(path).map(|buf| buf.into_inner()),
        }
    }

    fn rm(&mut self, path: &str) -> Result<(), FtpError> {
        match self {
            FtpSession::Plain(s) => s.rm(path),
            FtpSession::Secure(s) => s.rm(path),
        }
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), FtpError> {
        match self {
            FtpSession::Plain(s) => s.rename(from, to),
            FtpSession::Secure(s) => s.rename(from, to),
        }
    }

    fn quit(&mut self) -> Result<(), FtpError> {
        match self {
            FtpSession::Plain(s) => s.quit(),
            FtpSession::Secure(s) => s.quit(),
        }
    }
}

/// One FTP session, driven from async code.
pub struct FtpTransport {
    session: Option<FtpSession>,
}

impl FtpTransport {
    /// Run one blocking protocol call, moving the session through the
    /// blocking task and back.
    async fn with_session<T, F>(&mut self, op: F) -> StorageResult<Result<T, FtpError>>
    where
        T: Send + 'static,
        F: FnOnce(&mut FtpSession) -> Result<T, FtpError> + Send + 'static,
    {
        let mut session = self
            .session
            .take()
            .ok_or_else(|| StorageError::Config("remote session already closed".to_string()))?;

        let (session, result) = tokio::task::spawn_blocking(move || {
            let result = op(&mut session);
            (session, result)
        })
        .await
        .map_err(|e| StorageError::Config(format!("blocking task failed: {}", e)))?;

        self.session = Some(session);
        Ok(result)
    }
}

/// Map 550 (file unavailable) to `NotFound`, everything else through `wrap`.
fn not_found_or(err: FtpError, key: &str, wrap: fn(String) -> StorageError) -> StorageError {
    match err {
        FtpError::UnexpectedResponse(ref response)
            if response.status == Status::FileUnavailable =>
        {
            StorageError::NotFound(key.to_string())
        }
        other => wrap(other.to_string()),
    }
}

#[async_trait]
impl RemoteTransport for FtpTransport {
    async fn cwd(&mut self, dir: &str) -> StorageResult<()> {
        let dir_owned = dir.to_string();
        self.with_session(move |s| s.cwd(&dir_owned))
            .await?
            .map_err(|e| StorageError::DirFailed(format!("cwd {}: {}", dir, e)))
    }

    async fn mkdir(&mut self, dir: &str) -> StorageResult<()> {
        let dir_owned = dir.to_string();
        self.with_session(move |s| s.mkdir(&dir_owned))
            .await?
            .map_err(|e| StorageError::DirFailed(format!("mkdir {}: {}", dir, e)))
    }

    async fn put(&mut self, name: &str, data: Vec<u8>) -> StorageResult<()> {
        let name_owned = name.to_string();
        self.with_session(move |s| s.put(&name_owned, data))
            .await?
            .map_err(|e| StorageError::UploadFailed(format!("{}: {}", name, e)))
    }

    async fn retr(&mut self, path: &str) -> StorageResult<Vec<u8>> {
        let path_owned = path.to_string();
        self.with_session(move |s| s.retr(&path_owned))
            .await?
            .map_err(|e| not_found_or(e, path, StorageError::DownloadFailed))
    }

    async fn rm(&mut self, path: &str) -> StorageResult<()> {
        let path_owned = path.to_string();
        self.with_session(move |s| s.rm(&path_owned))
            .await?
            .map_err(|e| not_found_or(e, path, StorageError::DeleteFailed))
    }

    async fn rename(&mut self, from: &str, to: &str) -> StorageResult<()> {
        let from_owned = from.to_string();
        let to_owned = to.to_string();
        self.with_session(move |s| s.rename(&from_owned, &to_owned))
            .await?
            .map_err(|e| not_found_or(e, from, StorageError::RenameFailed))
    }

    async fn quit(&mut self) -> StorageResult<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        tokio::task::spawn_blocking(move || session.quit())
            .await
            .map_err(|e| StorageError::Config(format!("blocking task failed: {}", e)))?
            .map_err(|e| StorageError::ConnectFailed(format!("quit: {}", e)))
    }
}

/// Fresh-session-per-call provider, matching the simplest-correct strategy.
///
/// Wrap it in a [`crate::transport::CappedProvider`] to bound concurrency.
pub struct FtpConnectionProvider {
    config: RemoteStoreConfig,
}

impl FtpConnectionProvider {
    pub fn new(config: RemoteStoreConfig) -> StorageResult<Self> {
        config
            .validate()
            .map_err(|e| StorageError::Config(e.to_string()))?;
        Ok(FtpConnectionProvider { config })
    }
}

#[async_trait]
impl ConnectionProvider for FtpConnectionProvider {
    async fn acquire(&self) -> StorageResult<Box<dyn RemoteTransport>> {
        let config = self.config.clone();
        let session = tokio::task::spawn_blocking(move || connect_session(&config))
            .await
            .map_err(|e| StorageError::Config(format!("blocking task failed: {}", e)))??;

        tracing::debug!(host = %self.config.host, secure = self.config.secure, "remote session opened");
        Ok(Box::new(FtpTransport {
            session: Some(session),
        }))
    }
}

fn connect_session(config: &RemoteStoreConfig) -> StorageResult<FtpSession> {
    if config.secure {
        let stream = NativeTlsFtpStream::connect(config.addr())
            .map_err(|e| StorageError::ConnectFailed(e.to_string()))?;
        let connector = TlsConnector::new()
            .map_err(|e| StorageError::ConnectFailed(format!("TLS init: {}", e)))?;
        let mut stream = stream
            .into_secure(NativeTlsConnector::from(connector), &config.host)
            .map_err(|e| StorageError::ConnectFailed(format!("TLS handshake: {}", e)))?;
        stream
            .login(&config.user, &config.password)
            .map_err(|e| StorageError::AuthFailed(e.to_string()))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| StorageError::ConnectFailed(e.to_string()))?;
        Ok(FtpSession::Secure(stream))
    } else {
        let mut stream = FtpStream::connect(config.addr())
            .map_err(|e| StorageError::ConnectFailed(e.to_string()))?;
        stream
            .login(&config.user, &config.password)
            .map_err(|e| StorageError::AuthFailed(e.to_string()))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| StorageError::ConnectFailed(e.to_string()))?;
        Ok(FtpSession::Plain(stream))
    }
}
