//! Configuration module
//!
//! Environment-driven configuration for the remote store, the staging area
//! and the media probe. Credentials for the remote store are validated up
//! front: a missing host, user or password is a fatal configuration error
//! raised before any storage operation is attempted.

use std::env;
use std::path::PathBuf;

use crate::constants::DEFAULT_FTP_PORT;
use crate::storage_types::StorageBackend;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Connection settings for the FTP-backed remote store.
#[derive(Clone, Debug)]
pub struct RemoteStoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Use explicit FTPS for the control and data channels.
    pub secure: bool,
    /// Absolute URL prefix under which every stored object is reachable.
    pub public_url_base: String,
}

impl RemoteStoreConfig {
    /// Socket address of the remote store control channel.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Missing("FTP_HOST"));
        }
        if self.user.is_empty() {
            return Err(ConfigError::Missing("FTP_USER"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Missing("FTP_PASSWORD"));
        }
        if self.public_url_base.is_empty() {
            return Err(ConfigError::Missing("PUBLIC_URL_BASE"));
        }
        Ok(())
    }
}

/// Application configuration for the asset storage components.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_backend: StorageBackend,
    pub remote: RemoteStoreConfig,
    // Local backend settings (development and tests)
    pub local_store_path: Option<String>,
    pub local_store_base_url: Option<String>,
    /// Root of the local scratch tree used as an upload/download buffer.
    pub staging_root: PathBuf,
    pub ffprobe_path: String,
    /// Upper bound on concurrent remote sessions. 0 disables the cap.
    pub max_remote_sessions: usize,
    /// Allowed upload extensions (lowercase, no dot). Empty allows everything.
    pub allowed_extensions: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw
                .parse::<StorageBackend>()
                .map_err(|_| ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: raw,
                })?,
            Err(_) => StorageBackend::Ftp,
        };

        let port = match env::var("FTP_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "FTP_PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_FTP_PORT,
        };

        let remote = RemoteStoreConfig {
            host: env::var("FTP_HOST").unwrap_or_default(),
            port,
            user: env::var("FTP_USER").unwrap_or_default(),
            password: env::var("FTP_PASSWORD").unwrap_or_default(),
            secure: parse_bool(env::var("FTP_SECURE").ok().as_deref()),
            public_url_base: env::var("PUBLIC_URL_BASE").unwrap_or_default(),
        };

        let staging_root = env::var("STAGING_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("courtside-staging"));

        let max_remote_sessions = match env::var("MAX_REMOTE_SESSIONS") {
            Ok(raw) => raw.parse::<usize>().map_err(|_| ConfigError::Invalid {
                key: "MAX_REMOTE_SESSIONS",
                value: raw,
            })?,
            Err(_) => 4,
        };

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .map(|raw| {
                raw.split(',')
                    .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let config = AppConfig {
            storage_backend,
            remote,
            local_store_path: env::var("LOCAL_STORE_PATH").ok(),
            local_store_base_url: env::var("LOCAL_STORE_BASE_URL").ok(),
            staging_root,
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            max_remote_sessions,
            allowed_extensions,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the selected backend has the settings it needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_backend == StorageBackend::Ftp {
            self.remote.validate()?;
        }
        Ok(())
    }
}

fn parse_bool(raw: Option<&str>) -> bool {
    matches!(raw, Some("1") | Some("true") | Some("TRUE") | Some("yes"))
}
