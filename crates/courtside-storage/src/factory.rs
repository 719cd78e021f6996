//! Storage backend factory.

use courtside_core::{AppConfig, StorageBackend};
use std::sync::Arc;

use crate::client::RemoteStoreClient;
use crate::ftp::FtpConnectionProvider;
use crate::local::LocalRemoteStore;
use crate::paths::PathTranslator;
use crate::traits::{RemoteStore, StorageError, StorageResult};
use crate::transport::{CappedProvider, ConnectionProvider};

/// Create a storage backend based on configuration
pub async fn create_store(config: &AppConfig) -> StorageResult<Arc<dyn RemoteStore>> {
    match config.storage_backend {
        StorageBackend::Ftp => {
            let remote = config.remote.clone();
            remote
                .validate()
                .map_err(|e| StorageError::Config(e.to_string()))?;

            let translator = PathTranslator::new(&remote.public_url_base);
            let per_call: Arc<dyn ConnectionProvider> =
                Arc::new(FtpConnectionProvider::new(remote)?);
            let provider: Arc<dyn ConnectionProvider> = if config.max_remote_sessions > 0 {
                Arc::new(CappedProvider::new(per_call, config.max_remote_sessions))
            } else {
                per_call
            };

            Ok(Arc::new(RemoteStoreClient::new(provider, translator)))
        }

        StorageBackend::Local => {
            let base_path = config.local_store_path.clone().ok_or_else(|| {
                StorageError::Config("LOCAL_STORE_PATH not configured".to_string())
            })?;
            let base_url = config.local_store_base_url.clone().ok_or_else(|| {
                StorageError::Config("LOCAL_STORE_BASE_URL not configured".to_string())
            })?;

            let store = LocalRemoteStore::new(base_path, base_url).await?;
            Ok(Arc::new(store))
        }
    }
}
