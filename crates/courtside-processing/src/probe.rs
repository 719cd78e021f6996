//! Media probe - duration extraction for remote assets
//!
//! Downloads an asset into a scratch file, reads its container duration with
//! ffprobe (demux only, no decode) and cleans up on every path. Duration is
//! advisory metadata: every failure collapses to `0`, never an error, so a
//! broken video cannot fail the caller's primary operation.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use courtside_core::AppConfig;
use courtside_storage::{LocalStagingArea, PathTranslator, RemoteStore};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probes remote assets for derived metadata.
///
/// Each call uses its own scratch file and its own child process; instances
/// are safe to share across concurrent workers.
pub struct MediaProbe {
    store: Arc<dyn RemoteStore>,
    staging: LocalStagingArea,
    ffprobe_path: String,
}

impl MediaProbe {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        staging: LocalStagingArea,
        ffprobe_path: impl Into<String>,
    ) -> Self {
        MediaProbe {
            store,
            staging,
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub fn from_config(store: Arc<dyn RemoteStore>, config: &AppConfig) -> Self {
        Self::new(
            store,
            LocalStagingArea::new(config.staging_root.clone()),
            config.ffprobe_path.clone(),
        )
    }

    /// Container duration of the asset at `public_url`, in whole seconds.
    ///
    /// Returns `0` for anything that is not a probe-able HTTP(S) URL, for
    /// download failures and for probe failures. Many entities carry optional
    /// media fields, so non-URL input is rejected cheaply before any I/O.
    pub async fn probe_duration(&self, public_url: &str) -> u64 {
        if !public_url.starts_with("http") {
            return 0;
        }

        let name = PathTranslator::basename_only(public_url);
        let staged = match self.staging.scratch(name).await {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(url = %public_url, error = %e, "failed to reserve scratch file");
                return 0;
            }
        };

        let seconds = match self.store.download(public_url, staged.path()).await {
            Ok(()) => match self.duration_from_file(staged.path()).await {
                Ok(seconds) => seconds,
                Err(e) => {
                    tracing::debug!(url = %public_url, error = %e, "probe failed, defaulting to zero");
                    0.0
                }
            },
            Err(e) => {
                tracing::debug!(url = %public_url, error = %e, "download for probe failed, defaulting to zero");
                0.0
            }
        };

        // Scratch file removed regardless of outcome.
        self.staging.release(&staged).await;

        seconds.round() as u64
    }

    async fn duration_from_file(&self, path: &Path) -> Result<f64> {
        let output = tokio::process::Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-show_format", "-of", "json"])
            .arg(path)
            .output()
            .await
            .map_err(|e| anyhow!("failed to run ffprobe: {}", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("ffprobe failed: {}", stderr));
        }

        let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| anyhow!("failed to parse ffprobe output: {}", e))?;

        parsed
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| anyhow!("no duration in container metadata"))
    }
}
