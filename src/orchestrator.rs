//! Video analysis pipeline for Blikk.
//!
//! Sequences source classification, acquisition, model analysis, and
//! cleanup. The staging area created for a remote source is released on
//! every exit path; a caller-supplied local file is never touched.

use crate::analysis::{AnalysisMode, AnalysisText, VertexAnalyzer, VideoAnalyzer};
use crate::config::{AnalysisPrompts, Settings};
use crate::error::{BlikkError, Result};
use crate::sandbox::PathSandbox;
use crate::video::{StagingArea, VideoAcquirer, YtDlpDownloader};
use crate::video_source::{SourceResolver, SourceType};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the video analysis pipeline.
pub struct VideoPipeline {
    resolver: SourceResolver,
    acquirer: VideoAcquirer,
    analyzer: Arc<dyn VideoAnalyzer>,
    prompts: AnalysisPrompts,
    sandbox: PathSandbox,
}

/// Result of a completed analysis.
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// The identifier the caller supplied.
    pub source: String,
    /// How the source was classified.
    pub source_type: SourceType,
    /// Video size in megabytes, rounded to two decimals.
    pub video_size_mb: f64,
    /// The analysis mode that was applied.
    pub mode: AnalysisMode,
    /// Model output and the prompt that produced it.
    pub analysis: AnalysisText,
    /// Source title, where the acquisition reported one.
    pub title: Option<String>,
    /// Non-fatal problems, e.g. a staging directory that could not be
    /// removed. Never flips a successful result to failure.
    pub warnings: Vec<String>,
}

impl VideoPipeline {
    /// Create a pipeline with the production downloader and analyzer.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = AnalysisPrompts::load(settings.prompts.custom_dir.as_deref())?;
        let downloader = Arc::new(YtDlpDownloader::new());
        let analyzer = Arc::new(VertexAnalyzer::new(settings.analyzer.clone()));
        Self::with_components(settings, prompts, downloader, analyzer)
    }

    /// Create a pipeline with custom collaborators.
    pub fn with_components(
        settings: &Settings,
        prompts: AnalysisPrompts,
        downloader: Arc<dyn crate::video::Downloader>,
        analyzer: Arc<dyn VideoAnalyzer>,
    ) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            resolver: SourceResolver::new(),
            acquirer: VideoAcquirer::new(
                downloader,
                &temp_dir,
                std::time::Duration::from_secs(settings.download.probe_timeout_seconds),
            ),
            analyzer,
            prompts,
            sandbox: PathSandbox::new(&settings.root_dir())?,
        })
    }

    /// Analyze a video from a remote URL or local file.
    ///
    /// Steps run strictly in order: classify, acquire (remote only),
    /// analyze, clean. Acquisition failures abort before analysis; analysis
    /// failures still run cleanup.
    #[instrument(skip(self, custom_prompt), fields(source = %source))]
    pub async fn analyze(
        &self,
        source: &str,
        explicit_type: Option<SourceType>,
        requested_mode: AnalysisMode,
        custom_prompt: Option<&str>,
    ) -> Result<AnalysisOutcome> {
        if source.trim().is_empty() {
            return Err(BlikkError::InvalidInput(
                "Video source must not be empty".into(),
            ));
        }

        let source_type = self.resolver.classify(source, explicit_type);
        info!("Source classified as {}", source_type);

        // Acquiring. Only a remote source creates a staging area, and this
        // invocation owns it exclusively from here on.
        let mut staging: Option<StagingArea> = None;
        let (video_path, title, size_bytes) = match source_type {
            SourceType::YouTube => {
                // On failure the acquirer has already removed its staging
                // area; nothing to clean here.
                let acquired = self.acquirer.acquire(source).await?;
                let path = acquired.path.clone();
                let title = acquired.title.clone();
                let size = acquired.size_bytes;
                staging = Some(acquired.staging);
                (path, Some(title), size)
            }
            SourceType::File => {
                let path = self.resolve_local(source)?;
                let size = std::fs::metadata(&path)?.len();
                (path, None, size)
            }
        };

        let mode = if custom_prompt.is_some() {
            AnalysisMode::Custom
        } else {
            requested_mode
        };
        let prompt = self.prompts.for_mode(mode, custom_prompt).to_string();

        // Analyzing. No early return between here and Cleaning: the result
        // is held so the staging area is released first.
        let analysis = self.run_analysis(&video_path, &prompt).await;

        // Cleaning. Runs exactly when this invocation created a staging
        // area, never against a caller-supplied file. Failure is a warning,
        // not a result change.
        let mut warnings = Vec::new();
        if let Some(staging) = staging.take() {
            let staging_path = staging.path().to_path_buf();
            if let Err(e) = staging.close() {
                warn!("Failed to remove staging area {:?}: {}", staging_path, e);
                warnings.push(format!("Could not clean up staging directory: {e}"));
            }
        }

        let full_analysis = analysis?;

        Ok(AnalysisOutcome {
            source: source.to_string(),
            source_type,
            video_size_mb: round_mb(size_bytes),
            mode,
            analysis: AnalysisText {
                full_analysis,
                model_used: self.analyzer.model().to_string(),
                prompt,
            },
            title,
            warnings,
        })
    }

    /// Resolve a local source to an on-disk video path.
    ///
    /// Relative paths resolve through the sandbox against the repository
    /// root; an absolute path is the caller's own and is accepted as-is.
    fn resolve_local(&self, source: &str) -> Result<PathBuf> {
        let path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            self.sandbox.resolve(source)?
        };

        if !path.exists() {
            return Err(BlikkError::NotFound(format!(
                "Video file not found: {}",
                source
            )));
        }
        if !path.is_file() {
            return Err(BlikkError::WrongType(format!("Not a file: {}", source)));
        }

        Ok(path)
    }

    async fn run_analysis(&self, video_path: &Path, prompt: &str) -> Result<String> {
        let bytes = tokio::fs::read(video_path).await?;
        info!("Analyzing video ({:.2} MB)", bytes.len() as f64 / (1024.0 * 1024.0));
        self.analyzer.analyze(&bytes, prompt).await
    }
}

fn round_mb(bytes: u64) -> f64 {
    let mb = bytes as f64 / (1024.0 * 1024.0);
    (mb * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::{DownloadedVideo, Downloader, FormatStrategy};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FakeDownloader;

    #[async_trait]
    impl Downloader for FakeDownloader {
        async fn download(
            &self,
            _url: &str,
            output_dir: &Path,
            _strategy: FormatStrategy,
        ) -> Result<DownloadedVideo> {
            let path = output_dir.join("Remote Clip.mp4");
            std::fs::write(&path, vec![0u8; 1024])?;
            Ok(DownloadedVideo {
                path,
                title: "Remote Clip".into(),
            })
        }
    }

    struct FailingDownloader;

    #[async_trait]
    impl Downloader for FailingDownloader {
        async fn download(
            &self,
            _url: &str,
            _output_dir: &Path,
            _strategy: FormatStrategy,
        ) -> Result<DownloadedVideo> {
            Err(BlikkError::Download("404 not found".into()))
        }
    }

    // Removes its own staging directory mid-download, leaving the output
    // file beside it, so the cleanup step has nothing left to remove.
    struct StagingLosingDownloader;

    #[async_trait]
    impl Downloader for StagingLosingDownloader {
        async fn download(
            &self,
            _url: &str,
            output_dir: &Path,
            _strategy: FormatStrategy,
        ) -> Result<DownloadedVideo> {
            let parent = output_dir.parent().expect("staging parent");
            let path = parent.join("Displaced Clip.mp4");
            std::fs::write(&path, vec![0u8; 256])?;
            std::fs::remove_dir_all(output_dir)?;
            Ok(DownloadedVideo {
                path,
                title: "Displaced Clip".into(),
            })
        }
    }

    struct FakeAnalyzer {
        fail: bool,
        prompts_seen: Mutex<Vec<String>>,
    }

    impl FakeAnalyzer {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                prompts_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VideoAnalyzer for FakeAnalyzer {
        async fn analyze(&self, _video: &[u8], prompt: &str) -> Result<String> {
            self.prompts_seen.lock().unwrap().push(prompt.to_string());
            if self.fail {
                Err(BlikkError::Analysis("model unavailable".into()))
            } else {
                Ok("the video shows a test pattern".into())
            }
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    struct Fixture {
        _root: TempDir,
        temp: TempDir,
        root_path: PathBuf,
    }

    fn pipeline(
        downloader: Arc<dyn Downloader>,
        analyzer: Arc<dyn VideoAnalyzer>,
    ) -> (Fixture, VideoPipeline) {
        let root = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();

        let mut settings = Settings::default();
        settings.general.root_dir = root.path().to_string_lossy().to_string();
        settings.general.temp_dir = temp.path().to_string_lossy().to_string();

        let pipeline = VideoPipeline::with_components(
            &settings,
            AnalysisPrompts::default(),
            downloader,
            analyzer,
        )
        .unwrap();

        let root_path = root.path().to_path_buf();
        (
            Fixture {
                _root: root,
                temp,
                root_path,
            },
            pipeline,
        )
    }

    fn staging_count(fixture: &Fixture) -> usize {
        std::fs::read_dir(fixture.temp.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_remote_analysis_succeeds_and_cleans_staging() {
        let (fixture, pipeline) = pipeline(
            Arc::new(FakeDownloader),
            Arc::new(FakeAnalyzer::new(false)),
        );

        let outcome = pipeline
            .analyze("https://youtube.com/watch?v=abc", None, AnalysisMode::Full, None)
            .await
            .unwrap();

        assert_eq!(outcome.source_type, SourceType::YouTube);
        assert_eq!(outcome.analysis.full_analysis, "the video shows a test pattern");
        assert_eq!(outcome.analysis.model_used, "fake-model");
        assert_eq!(outcome.title.as_deref(), Some("Remote Clip"));
        assert!(outcome.warnings.is_empty());
        assert_eq!(staging_count(&fixture), 0);
    }

    #[tokio::test]
    async fn test_remote_analysis_failure_still_cleans_staging() {
        let (fixture, pipeline) = pipeline(
            Arc::new(FakeDownloader),
            Arc::new(FakeAnalyzer::new(true)),
        );

        let result = pipeline
            .analyze("https://youtube.com/watch?v=abc", None, AnalysisMode::Full, None)
            .await;

        assert!(matches!(result, Err(BlikkError::Analysis(_))));
        assert_eq!(staging_count(&fixture), 0);
    }

    #[tokio::test]
    async fn test_failed_cleanup_is_warning_not_failure() {
        let (_fixture, pipeline) = pipeline(
            Arc::new(StagingLosingDownloader),
            Arc::new(FakeAnalyzer::new(false)),
        );

        let outcome = pipeline
            .analyze("https://youtube.com/watch?v=abc", None, AnalysisMode::Full, None)
            .await
            .unwrap();

        // Analysis succeeded; the unremovable staging area is a warning only.
        assert_eq!(outcome.analysis.full_analysis, "the video shows a test pattern");
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("staging"));
    }

    #[tokio::test]
    async fn test_download_failure_aborts_before_analysis() {
        let analyzer = Arc::new(FakeAnalyzer::new(false));
        let (fixture, pipeline) =
            pipeline(Arc::new(FailingDownloader), analyzer.clone());

        let result = pipeline
            .analyze("https://youtube.com/watch?v=abc", None, AnalysisMode::Full, None)
            .await;

        assert!(matches!(result, Err(BlikkError::Download(_))));
        assert!(analyzer.prompts_seen.lock().unwrap().is_empty());
        assert_eq!(staging_count(&fixture), 0);
    }

    #[tokio::test]
    async fn test_local_file_is_analyzed_in_place_and_never_deleted() {
        let (fixture, pipeline) = pipeline(
            Arc::new(FailingDownloader),
            Arc::new(FakeAnalyzer::new(false)),
        );
        let video = fixture.root_path.join("clip.mp4");
        std::fs::write(&video, vec![0u8; 2048]).unwrap();

        let outcome = pipeline
            .analyze("clip.mp4", None, AnalysisMode::Visual, None)
            .await
            .unwrap();

        assert_eq!(outcome.source_type, SourceType::File);
        assert_eq!(outcome.mode, AnalysisMode::Visual);
        assert!(video.exists());
    }

    #[tokio::test]
    async fn test_local_file_survives_analysis_failure() {
        let (fixture, pipeline) = pipeline(
            Arc::new(FailingDownloader),
            Arc::new(FakeAnalyzer::new(true)),
        );
        let video = fixture.root_path.join("clip.mp4");
        std::fs::write(&video, vec![0u8; 64]).unwrap();

        let result = pipeline
            .analyze("clip.mp4", None, AnalysisMode::Full, None)
            .await;

        assert!(result.is_err());
        assert!(video.exists());
    }

    #[tokio::test]
    async fn test_missing_local_file_is_not_found() {
        let (_fixture, pipeline) = pipeline(
            Arc::new(FailingDownloader),
            Arc::new(FakeAnalyzer::new(false)),
        );

        let result = pipeline
            .analyze("nope.mp4", None, AnalysisMode::Full, None)
            .await;

        assert!(matches!(result, Err(BlikkError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_relative_local_path_cannot_escape_root() {
        let (_fixture, pipeline) = pipeline(
            Arc::new(FailingDownloader),
            Arc::new(FakeAnalyzer::new(false)),
        );

        let result = pipeline
            .analyze("../outside.mp4", None, AnalysisMode::Full, None)
            .await;

        assert!(matches!(result, Err(BlikkError::AccessDenied(_))));
    }

    #[tokio::test]
    async fn test_empty_source_is_input_validation() {
        let (_fixture, pipeline) = pipeline(
            Arc::new(FailingDownloader),
            Arc::new(FakeAnalyzer::new(false)),
        );

        let result = pipeline.analyze("  ", None, AnalysisMode::Full, None).await;
        assert!(matches!(result, Err(BlikkError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_custom_prompt_switches_mode_and_passes_through() {
        let analyzer = Arc::new(FakeAnalyzer::new(false));
        let (fixture, pipeline) = pipeline(Arc::new(FailingDownloader), analyzer.clone());
        std::fs::write(fixture.root_path.join("clip.mp4"), b"v").unwrap();

        let outcome = pipeline
            .analyze(
                "clip.mp4",
                None,
                AnalysisMode::Full,
                Some("count the llamas"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.mode, AnalysisMode::Custom);
        assert_eq!(outcome.analysis.prompt, "count the llamas");
        assert_eq!(
            analyzer.prompts_seen.lock().unwrap().as_slice(),
            ["count the llamas"]
        );
    }

    #[tokio::test]
    async fn test_transcript_mode_uses_transcript_template() {
        let analyzer = Arc::new(FakeAnalyzer::new(false));
        let (fixture, pipeline) = pipeline(Arc::new(FailingDownloader), analyzer.clone());
        std::fs::write(fixture.root_path.join("clip.mp4"), b"v").unwrap();

        pipeline
            .analyze("clip.mp4", None, AnalysisMode::Transcript, None)
            .await
            .unwrap();

        let seen = analyzer.prompts_seen.lock().unwrap();
        assert!(seen[0].contains("word-for-word"));
    }

    #[tokio::test]
    async fn test_explicit_file_type_treats_url_as_path() {
        let (_fixture, pipeline) = pipeline(
            Arc::new(FailingDownloader),
            Arc::new(FakeAnalyzer::new(false)),
        );

        let result = pipeline
            .analyze(
                "https://youtube.com/watch?v=abc",
                Some(SourceType::File),
                AnalysisMode::Full,
                None,
            )
            .await;

        // Classified as a local path, which does not exist.
        assert!(matches!(
            result,
            Err(BlikkError::NotFound(_)) | Err(BlikkError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_round_mb() {
        assert_eq!(round_mb(0), 0.0);
        assert_eq!(round_mb(1024 * 1024), 1.0);
        assert_eq!(round_mb(1_572_864), 1.5);
        assert_eq!(round_mb(123_456), 0.12);
    }
}
