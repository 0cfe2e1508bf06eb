//! Video download via yt-dlp.
//!
//! The [`Downloader`] trait is the seam between the acquisition pipeline and
//! the actual network retrieval, so tests can substitute a mock.

use crate::error::{BlikkError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// File extensions yt-dlp may leave behind for a video download.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "m4v", "avi"];

/// Download-format strategy, chosen from merge capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatStrategy {
    /// Best video + best audio streams, merged after download. Requires an
    /// external merge tool (ffmpeg).
    MergedBest,
    /// Pre-merged single-file formats only. Possibly lower quality, but
    /// guaranteed single-file output without a merge step.
    PremergedOnly,
}

impl FormatStrategy {
    /// The yt-dlp format selector for this strategy.
    pub fn selector(&self) -> &'static str {
        match self {
            FormatStrategy::MergedBest => {
                "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best"
            }
            FormatStrategy::PremergedOnly => {
                "best[ext=mp4][vcodec^=avc]/best[ext=mp4]/bestvideo[ext=mp4]+bestaudio[ext=m4a]/best"
            }
        }
    }
}

impl std::fmt::Display for FormatStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatStrategy::MergedBest => write!(f, "merged_best"),
            FormatStrategy::PremergedOnly => write!(f, "premerged_only"),
        }
    }
}

/// A successfully retrieved video file.
#[derive(Debug, Clone)]
pub struct DownloadedVideo {
    /// Absolute path of the downloaded file inside the output directory.
    pub path: PathBuf,
    /// Source title, as reported by the remote service.
    pub title: String,
}

/// Network retrieval collaborator.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` into `output_dir` using the given format strategy.
    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        strategy: FormatStrategy,
    ) -> Result<DownloadedVideo>;
}

/// Downloader backed by the yt-dlp command-line tool.
pub struct YtDlpDownloader;

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(
        &self,
        url: &str,
        output_dir: &Path,
        strategy: FormatStrategy,
    ) -> Result<DownloadedVideo> {
        info!("Downloading video from {} ({})", url, strategy);

        let template = output_dir.join("%(title)s.%(ext)s");

        let result = Command::new("yt-dlp")
            .arg("--format").arg(strategy.selector())
            .arg("--merge-output-format").arg("mp4")
            .arg("--output").arg(template.to_str().unwrap_or_default())
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BlikkError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(BlikkError::Download(format!(
                    "yt-dlp execution failed: {e}"
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BlikkError::Download(format!("yt-dlp failed: {stderr}")));
        }

        let path = find_video_file(output_dir)?;
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();

        debug!("Downloaded {:?}", path);

        Ok(DownloadedVideo { path, title })
    }
}

/// Locate the downloaded video in the output directory.
///
/// The directory is a fresh staging area holding only this download, so the
/// single video file in it is ours. yt-dlp may leave partial `.part` files
/// behind on interrupted merges; those are never matched.
fn find_video_file(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| BlikkError::Download(format!("Cannot read staging directory: {e}")))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| BlikkError::Download("Video file not found after download".into()))
}
