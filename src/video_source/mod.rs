//! Video source classification for Blikk.
//!
//! Decides whether a caller-supplied identifier names a remote video to
//! download or a local file to read in place.

use crate::error::{BlikkError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Type of video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    YouTube,
    File,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::YouTube => write!(f, "youtube"),
            SourceType::File => write!(f, "file"),
        }
    }
}

impl std::str::FromStr for SourceType {
    type Err = BlikkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "youtube" => Ok(SourceType::YouTube),
            "file" | "local" => Ok(SourceType::File),
            other => Err(BlikkError::InvalidInput(format!(
                "Unknown source type: {} (expected auto, youtube, or file)",
                other
            ))),
        }
    }
}

/// Parse the `source_type` tool argument. "auto" means classify from the
/// identifier itself.
pub fn parse_source_type(value: &str) -> Result<Option<SourceType>> {
    if value.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    value.parse().map(Some)
}

/// Classifies identifiers as remote or local sources.
pub struct SourceResolver {
    hosted_video_regex: Regex,
}

impl SourceResolver {
    pub fn new() -> Self {
        // Known video-hosting domains, with or without scheme and www
        let hosted_video_regex = Regex::new(
            r"(?x)
            ^(?:https?://)?
            (?:www\.)?
            (?:youtube\.com|youtu\.be)
            (?:/|$)
        ",
        )
        .expect("Invalid regex");

        Self { hosted_video_regex }
    }

    /// Classify an identifier as a remote or local source.
    ///
    /// An explicit type is trusted as-is. In auto mode, anything with an
    /// http(s) scheme or a known video-hosting domain is remote; everything
    /// else falls back to a local path. A malformed URL therefore surfaces
    /// later as a clear file-not-found rather than being silently misread
    /// as remote.
    pub fn classify(&self, identifier: &str, explicit: Option<SourceType>) -> SourceType {
        if let Some(kind) = explicit {
            return kind;
        }

        let trimmed = identifier.trim();

        if let Ok(url) = url::Url::parse(trimmed) {
            if matches!(url.scheme(), "http" | "https") {
                return SourceType::YouTube;
            }
        }

        if self.hosted_video_regex.is_match(trimmed) {
            return SourceType::YouTube;
        }

        SourceType::File
    }
}

impl Default for SourceResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_urls_as_remote() {
        let resolver = SourceResolver::new();
        assert_eq!(
            resolver.classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ", None),
            SourceType::YouTube
        );
        assert_eq!(
            resolver.classify("http://example.com/video.mp4", None),
            SourceType::YouTube
        );
        assert_eq!(
            resolver.classify("https://youtu.be/dQw4w9WgXcQ", None),
            SourceType::YouTube
        );
    }

    #[test]
    fn test_classify_known_hosts_without_scheme() {
        let resolver = SourceResolver::new();
        assert_eq!(
            resolver.classify("youtube.com/watch?v=dQw4w9WgXcQ", None),
            SourceType::YouTube
        );
        assert_eq!(
            resolver.classify("www.youtube.com/watch?v=dQw4w9WgXcQ", None),
            SourceType::YouTube
        );
        assert_eq!(resolver.classify("youtu.be/dQw4w9WgXcQ", None), SourceType::YouTube);
    }

    #[test]
    fn test_classify_paths_as_local() {
        let resolver = SourceResolver::new();
        assert_eq!(resolver.classify("videos/demo.mp4", None), SourceType::File);
        assert_eq!(resolver.classify("/tmp/clip.mp4", None), SourceType::File);
        assert_eq!(resolver.classify("demo.mp4", None), SourceType::File);
        // Shares a prefix with a video host but is not one
        assert_eq!(resolver.classify("youtube.commentary.mp4", None), SourceType::File);
    }

    #[test]
    fn test_malformed_url_defaults_to_local() {
        let resolver = SourceResolver::new();
        // A typo'd scheme is treated as a path and will fail as NotFound
        // later, not as a silent misclassification.
        assert_eq!(resolver.classify("htps:/youtube/watch", None), SourceType::File);
        assert_eq!(resolver.classify("", None), SourceType::File);
    }

    #[test]
    fn test_explicit_type_is_trusted() {
        let resolver = SourceResolver::new();
        assert_eq!(
            resolver.classify("anything-at-all", Some(SourceType::YouTube)),
            SourceType::YouTube
        );
        assert_eq!(
            resolver.classify("https://youtube.com/watch?v=x", Some(SourceType::File)),
            SourceType::File
        );
    }

    #[test]
    fn test_parse_source_type() {
        assert_eq!(parse_source_type("auto").unwrap(), None);
        assert_eq!(parse_source_type("AUTO").unwrap(), None);
        assert_eq!(
            parse_source_type("youtube").unwrap(),
            Some(SourceType::YouTube)
        );
        assert_eq!(parse_source_type("file").unwrap(), Some(SourceType::File));
        assert_eq!(parse_source_type("local").unwrap(), Some(SourceType::File));
        assert!(parse_source_type("carrier-pigeon").is_err());
    }
}
