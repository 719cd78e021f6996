//! Remote store client.
//!
//! Drives one transport session per logical operation: acquire, navigate,
//! transfer, and close on every exit path. The directory-on-demand walk
//! lives here because the wire protocol has no recursive mkdir.

use async_trait::async_trait;
use courtside_core::StorageBackend;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::paths::PathTranslator;
use crate::traits::{RemoteStore, StorageError, StorageResult};
use crate::transport::{ConnectionProvider, RemoteTransport};

/// FTP-backed implementation of [`RemoteStore`].
pub struct RemoteStoreClient {
    provider: Arc<dyn ConnectionProvider>,
    translator: PathTranslator,
}

impl RemoteStoreClient {
    pub fn new(provider: Arc<dyn ConnectionProvider>, translator: PathTranslator) -> Self {
        RemoteStoreClient {
            provider,
            translator,
        }
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }
}

/// Split a normalized relative path into (directory chain, basename).
fn split_rel(rel: &str) -> (&str, &str) {
    match rel.rfind('/') {
        Some(idx) => (&rel[..idx], &rel[idx + 1..]),
        None => ("", rel),
    }
}

/// Walk the directory chain, creating missing segments on demand.
///
/// For each segment: try to change into it; when that fails the directory is
/// assumed absent, so create it and change into it. A concurrent session may
/// create the segment between the failed cwd and the mkdir (the server then
/// answers mkdir with 550), so the mkdir result is ignored and the second
/// cwd decides. Idempotent when the chain already exists (no mkdir is issued
/// for present directories).
pub(crate) async fn ensure_remote_dir(
    session: &mut dyn RemoteTransport,
    dir: &str,
) -> StorageResult<()> {
    for segment in dir.split('/').filter(|s| !s.is_empty()) {
        if session.cwd(segment).await.is_ok() {
            continue;
        }
        let _ = session.mkdir(segment).await;
        session.cwd(segment).await?;
    }
    Ok(())
}

/// Close the session, logging instead of masking the operation's result.
async fn close_session(session: &mut dyn RemoteTransport) {
    if let Err(e) = session.quit().await {
        tracing::warn!(error = %e, "failed to close remote session");
    }
}

async fn upload_on(
    session: &mut dyn RemoteTransport,
    rel: &str,
    data: Vec<u8>,
) -> StorageResult<()> {
    let (dir, name) = split_rel(rel);
    if name.is_empty() {
        return Err(StorageError::InvalidKey(rel.to_string()));
    }
    ensure_remote_dir(session, dir).await?;
    session.put(name, data).await
}

#[async_trait]
impl RemoteStore for RemoteStoreClient {
    async fn upload(&self, local_path: &Path, relative_path: &str) -> StorageResult<String> {
        let rel = PathTranslator::normalize(relative_path);
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            StorageError::UploadFailed(format!("read {}: {}", local_path.display(), e))
        })?;
        let size = data.len();
        let start = Instant::now();

        let mut session = self.provider.acquire().await?;
        let result = upload_on(session.as_mut(), &rel, data).await;
        close_session(session.as_mut()).await;
        result?;

        tracing::info!(
            key = %rel,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "remote upload successful"
        );

        Ok(self.translator.to_public_url(&rel))
    }

    async fn download(&self, public_url: &str, local_path: &Path) -> StorageResult<()> {
        let rel = self.translator.to_relative_path(public_url)?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let start = Instant::now();

        let mut session = self.provider.acquire().await?;
        let result = session.retr(&rel).await;
        close_session(session.as_mut()).await;
        let data = result?;

        tokio::fs::write(local_path, &data).await.map_err(|e| {
            StorageError::DownloadFailed(format!("write {}: {}", local_path.display(), e))
        })?;

        tracing::info!(
            key = %rel,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "remote download successful"
        );

        Ok(())
    }

    async fn delete(&self, public_url: &str) -> StorageResult<()> {
        let rel = self.translator.to_relative_path(public_url)?;
        let start = Instant::now();

        let mut session = self.provider.acquire().await?;
        let result = session.rm(&rel).await;
        close_session(session.as_mut()).await;
        result?;

        tracing::info!(
            key = %rel,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "remote delete successful"
        );

        Ok(())
    }

    async fn rename(&self, public_url: &str, new_base_name: &str) -> StorageResult<String> {
        let rel = self.translator.to_relative_path(public_url)?;
        let (dir, _) = split_rel(&rel);

        // Callers occasionally pass a full path; only the basename is honored
        // and the object stays in its directory.
        let name = PathTranslator::basename_only(new_base_name);
        let new_rel = if dir.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", dir, name)
        };

        let mut session = self.provider.acquire().await?;
        let result = session.rename(&rel, &new_rel).await;
        close_session(session.as_mut()).await;
        result?;

        tracing::info!(from = %rel, to = %new_rel, "remote rename successful");

        Ok(self.translator.to_public_url(&new_rel))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Ftp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Shared state of the fake remote: directories, objects, and the
    /// sequence of protocol calls every session issued.
    #[derive(Default)]
    struct FakeRemote {
        dirs: HashSet<String>,
        files: HashMap<String, Vec<u8>>,
        ops: Vec<String>,
        fail_put: bool,
        /// Directories another session creates right after a cwd into them
        /// fails, simulating a concurrent creator winning the race.
        appear_after_cwd: HashSet<String>,
    }

    #[derive(Clone)]
    struct FakeProvider {
        state: Arc<Mutex<FakeRemote>>,
    }

    impl FakeProvider {
        fn new() -> Self {
            FakeProvider {
                state: Arc::new(Mutex::new(FakeRemote::default())),
            }
        }

        fn ops(&self) -> Vec<String> {
            self.state.lock().unwrap().ops.clone()
        }

        fn seed_dir(&self, dir: &str) {
            let mut state = self.state.lock().unwrap();
            let mut acc = String::new();
            for segment in dir.split('/').filter(|s| !s.is_empty()) {
                if !acc.is_empty() {
                    acc.push('/');
                }
                acc.push_str(segment);
                state.dirs.insert(acc.clone());
            }
        }

        fn seed_file(&self, path: &str, data: &[u8]) {
            self.seed_dir(super::split_rel(path).0);
            self.state
                .lock()
                .unwrap()
                .files
                .insert(path.to_string(), data.to_vec());
        }

        fn has_file(&self, path: &str) -> bool {
            self.state.lock().unwrap().files.contains_key(path)
        }
    }

    struct FakeTransport {
        state: Arc<Mutex<FakeRemote>>,
        cwd: Vec<String>,
    }

    impl FakeTransport {
        fn resolve(&self, path: &str) -> String {
            if self.cwd.is_empty() {
                path.to_string()
            } else {
                format!("{}/{}", self.cwd.join("/"), path)
            }
        }
    }

    #[async_trait]
    impl ConnectionProvider for FakeProvider {
        async fn acquire(&self) -> StorageResult<Box<dyn RemoteTransport>> {
            Ok(Box::new(FakeTransport {
                state: self.state.clone(),
                cwd: Vec::new(),
            }))
        }
    }

    #[async_trait]
    impl RemoteTransport for FakeTransport {
        async fn cwd(&mut self, dir: &str) -> StorageResult<()> {
            let target = self.resolve(dir);
            let mut state = self.state.lock().unwrap();
            state.ops.push(format!("cwd {}", dir));
            if state.dirs.contains(&target) {
                drop(state);
                self.cwd.push(dir.to_string());
                Ok(())
            } else {
                if state.appear_after_cwd.remove(&target) {
                    state.dirs.insert(target.clone());
                }
                Err(StorageError::DirFailed(target))
            }
        }

        async fn mkdir(&mut self, dir: &str) -> StorageResult<()> {
            let target = self.resolve(dir);
            let mut state = self.state.lock().unwrap();
            state.ops.push(format!("mkd {}", dir));
            // Real servers answer MKD on an existing directory with 550.
            if state.dirs.contains(&target) {
                return Err(StorageError::DirFailed(format!("550 {} exists", target)));
            }
            state.dirs.insert(target);
            Ok(())
        }

        async fn put(&mut self, name: &str, data: Vec<u8>) -> StorageResult<()> {
            let target = self.resolve(name);
            let mut state = self.state.lock().unwrap();
            state.ops.push(format!("put {}", name));
            if state.fail_put {
                return Err(StorageError::UploadFailed(target));
            }
            state.files.insert(target, data);
            Ok(())
        }

        async fn retr(&mut self, path: &str) -> StorageResult<Vec<u8>> {
            let target = self.resolve(path);
            let mut state = self.state.lock().unwrap();
            state.ops.push(format!("retr {}", path));
            state
                .files
                .get(&target)
                .cloned()
                .ok_or(StorageError::NotFound(target))
        }

        async fn rm(&mut self, path: &str) -> StorageResult<()> {
            let target = self.resolve(path);
            let mut state = self.state.lock().unwrap();
            state.ops.push(format!("dele {}", path));
            state
                .files
                .remove(&target)
                .map(|_| ())
                .ok_or(StorageError::NotFound(target))
        }

        async fn rename(&mut self, from: &str, to: &str) -> StorageResult<()> {
            let from_target = self.resolve(from);
            let to_target = self.resolve(to);
            let mut state = self.state.lock().unwrap();
            state.ops.push(format!("rnfr {} rnto {}", from, to));
            let data = state
                .files
                .remove(&from_target)
                .ok_or(StorageError::NotFound(from_target))?;
            state.files.insert(to_target, data);
            Ok(())
        }

        async fn quit(&mut self) -> StorageResult<()> {
            self.state.lock().unwrap().ops.push("quit".to_string());
            Ok(())
        }
    }

    fn client(provider: &FakeProvider) -> RemoteStoreClient {
        RemoteStoreClient::new(
            Arc::new(provider.clone()),
            PathTranslator::new("https://store.example/files"),
        )
    }

    async fn write_temp(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, data).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_creates_missing_directories() {
        let provider = FakeProvider::new();
        let store = client(&provider);
        let tmp = tempfile::tempdir().unwrap();
        let local = write_temp(&tmp, "x.mp3", b"audio").await;

        let url = store.upload(&local, "admin/7/music/x.mp3").await.unwrap();
        assert_eq!(url, "https://store.example/files/admin/7/music/x.mp3");
        assert!(provider.has_file("admin/7/music/x.mp3"));

        // Each absent segment produced a failed cwd, a mkd, then a cwd.
        let ops = provider.ops();
        assert_eq!(
            ops,
            vec![
                "cwd admin", "mkd admin", "cwd admin", "cwd 7", "mkd 7", "cwd 7", "cwd music",
                "mkd music", "cwd music", "put x.mp3", "quit",
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_survives_concurrent_directory_creation() {
        let provider = FakeProvider::new();
        provider
            .state
            .lock()
            .unwrap()
            .appear_after_cwd
            .insert("admin".to_string());
        let store = client(&provider);
        let tmp = tempfile::tempdir().unwrap();
        let local = write_temp(&tmp, "banner.png", b"png").await;

        // Another session creates `admin` between the failed cwd and the
        // mkdir; the mkdir's 550 must not fail the upload.
        let url = store.upload(&local, "admin/banner.png").await.unwrap();
        assert_eq!(url, "https://store.example/files/admin/banner.png");
        assert!(provider.has_file("admin/banner.png"));

        let ops = provider.ops();
        assert_eq!(
            ops,
            vec![
                "cwd admin",
                "mkd admin",
                "cwd admin",
                "put banner.png",
                "quit",
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_existing_directories_walk_is_idempotent() {
        let provider = FakeProvider::new();
        provider.seed_dir("admin/7/music");
        let store = client(&provider);
        let tmp = tempfile::tempdir().unwrap();
        let local = write_temp(&tmp, "y.mp3", b"audio").await;

        store.upload(&local, "admin/7/music/y.mp3").await.unwrap();

        let ops = provider.ops();
        assert!(ops.iter().all(|op| !op.starts_with("mkd")));
    }

    #[tokio::test]
    async fn test_session_closed_when_transfer_fails() {
        let provider = FakeProvider::new();
        provider.state.lock().unwrap().fail_put = true;
        let store = client(&provider);
        let tmp = tempfile::tempdir().unwrap();
        let local = write_temp(&tmp, "x.bin", b"data").await;

        let result = store.upload(&local, "a/x.bin").await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert_eq!(provider.ops().last().map(String::as_str), Some("quit"));
    }

    #[tokio::test]
    async fn test_rename_stays_in_directory() {
        let provider = FakeProvider::new();
        provider.seed_file("admin/7/music/old.mp3", b"audio");
        let store = client(&provider);

        let url = store
            .rename(
                "https://store.example/files/admin/7/music/old.mp3",
                "somewhere/else/new.mp3",
            )
            .await
            .unwrap();

        // Directory component of the new name is discarded.
        assert_eq!(url, "https://store.example/files/admin/7/music/new.mp3");
        assert!(provider.has_file("admin/7/music/new.mp3"));
        assert!(!provider.has_file("admin/7/music/old.mp3"));
    }

    #[tokio::test]
    async fn test_delete_missing_object_propagates() {
        let provider = FakeProvider::new();
        let store = client(&provider);

        let result = store
            .delete("https://store.example/files/admin/7/gone.mp3")
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_download_foreign_url_rejected_before_connecting() {
        let provider = FakeProvider::new();
        let store = client(&provider);
        let tmp = tempfile::tempdir().unwrap();

        let result = store
            .download(
                "https://elsewhere.example/a.mp3",
                &tmp.path().join("a.mp3"),
            )
            .await;
        assert!(matches!(result, Err(StorageError::ForeignUrl(_))));
        assert!(provider.ops().is_empty());
    }

    #[tokio::test]
    async fn test_download_roundtrip() {
        let provider = FakeProvider::new();
        provider.seed_file("admin/7/cv/resume.pdf", b"pdf-bytes");
        let store = client(&provider);
        let tmp = tempfile::tempdir().unwrap();
        let local = tmp.path().join("nested/resume.pdf");

        store
            .download(
                "https://store.example/files/admin/7/cv/resume.pdf",
                &local,
            )
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&local).await.unwrap(), b"pdf-bytes");
    }
}
