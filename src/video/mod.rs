//! Video acquisition for Blikk.
//!
//! Downloads remote videos into isolated staging directories and owns the
//! staging lifecycle.

mod acquirer;
mod downloader;

pub use acquirer::{AcquiredVideo, StagingArea, VideoAcquirer, probe_merge_support};
pub use downloader::{DownloadedVideo, Downloader, FormatStrategy, YtDlpDownloader};
