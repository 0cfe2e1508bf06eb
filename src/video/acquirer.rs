//! Staged video acquisition.
//!
//! Each acquisition gets its own staging directory, created fresh and never
//! shared, so concurrent pipeline runs cannot collide on a temporary path.
//! The staging directory is released on every exit path: explicitly via
//! [`StagingArea::close`], or by `Drop` if the pipeline unwinds early.

use crate::error::{BlikkError, Result};
use crate::video::downloader::{Downloader, FormatStrategy};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{info, instrument, warn};

/// Default bound on the merge-capability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// An isolated temporary directory owned by exactly one acquisition.
///
/// Deleted exactly once: either explicitly through [`close`](Self::close),
/// which reports failures, or implicitly on drop as a backstop against
/// abnormal exits. Never points at caller-owned files.
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a fresh staging directory under `parent`.
    pub fn create(parent: &Path) -> Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = TempDir::with_prefix_in("blikk-staging-", parent)?;
        Ok(Self { dir })
    }

    /// The staging directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the staging directory, consuming the guard.
    ///
    /// Failure here is reportable but must not undo an otherwise-successful
    /// pipeline result; callers record it as a warning.
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

/// A video staged for analysis.
#[derive(Debug)]
pub struct AcquiredVideo {
    /// Owning guard for the staging directory.
    pub staging: StagingArea,
    /// Absolute path of the staged video file.
    pub path: PathBuf,
    /// Source title.
    pub title: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// Probe for an external merge capability (ffmpeg) with a bounded timeout.
///
/// This is the only bounded timeout in the pipeline; downloads and model
/// calls run to completion or failure.
pub async fn probe_merge_support(timeout: Duration) -> bool {
    // kill_on_drop so a timed-out probe does not leave ffmpeg running.
    let probe = Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true)
        .status();

    match tokio::time::timeout(timeout, probe).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(_)) => false,
        Err(_) => {
            warn!("ffmpeg probe timed out after {:?}", timeout);
            false
        }
    }
}

/// Acquires remote videos into isolated staging areas.
pub struct VideoAcquirer {
    downloader: Arc<dyn Downloader>,
    staging_parent: PathBuf,
    probe_timeout: Duration,
}

impl VideoAcquirer {
    /// Create an acquirer that stages downloads under `staging_parent`.
    pub fn new(
        downloader: Arc<dyn Downloader>,
        staging_parent: &Path,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            downloader,
            staging_parent: staging_parent.to_path_buf(),
            probe_timeout,
        }
    }

    /// Download a remote video into a fresh staging area.
    ///
    /// The format strategy is chosen from merge capability: with a merge
    /// tool available, the best separate streams are fetched and merged;
    /// without one, only pre-merged single-file formats are requested. On
    /// downloader failure the staging area is removed immediately and the
    /// error carries the downloader's message.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn acquire(&self, url: &str) -> Result<AcquiredVideo> {
        let staging = StagingArea::create(&self.staging_parent)?;

        let strategy = if probe_merge_support(self.probe_timeout).await {
            FormatStrategy::MergedBest
        } else {
            info!("No merge tool detected; restricting to pre-merged formats");
            FormatStrategy::PremergedOnly
        };

        let downloaded = match self
            .downloader
            .download(url, staging.path(), strategy)
            .await
        {
            Ok(d) => d,
            Err(e) => {
                // Tear down the staging area before reporting the failure.
                if let Err(close_err) = staging.close() {
                    warn!("Failed to remove staging area: {}", close_err);
                }
                return Err(BlikkError::Download(format!(
                    "Failed to download video: {e}"
                )));
            }
        };

        let size_bytes = std::fs::metadata(&downloaded.path)?.len();
        info!(
            "Acquired '{}' ({} bytes) into {:?}",
            downloaded.title,
            size_bytes,
            staging.path()
        );

        Ok(AcquiredVideo {
            staging,
            path: downloaded.path,
            title: downloaded.title,
            size_bytes,
        })
    }
}
