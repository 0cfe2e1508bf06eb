//! Error types for Blikk.

use thiserror::Error;

/// Library-level error type for Blikk operations.
#[derive(Error, Debug)]
pub enum BlikkError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Wrong type: {0}")]
    WrongType(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration missing: {0}")]
    ConfigMissing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video download failed: {0}")]
    Download(String),

    #[error("Video analysis failed: {0}")]
    Analysis(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BlikkError {
    /// Stable error code reported in tool result envelopes.
    ///
    /// Every variant maps onto the closed taxonomy the agent sees. Transport
    /// and parse failures fold into the nearest operation-level code.
    pub fn code(&self) -> &'static str {
        match self {
            BlikkError::AccessDenied(_) => "access_denied",
            BlikkError::NotFound(_) => "not_found",
            BlikkError::WrongType(_) => "wrong_type",
            BlikkError::AlreadyExists(_) => "already_exists",
            BlikkError::Io(_) => "io_failure",
            BlikkError::ConfigMissing(_) | BlikkError::Config(_) => "config_missing",
            BlikkError::Download(_) | BlikkError::ToolNotFound(_) => "download_failure",
            BlikkError::Analysis(_) | BlikkError::Http(_) => "analysis_failure",
            BlikkError::InvalidInput(_) => "input_validation",
            BlikkError::Json(_) | BlikkError::TomlParse(_) => "io_failure",
        }
    }
}

/// Result type alias for Blikk operations.
pub type Result<T> = std::result::Result<T, BlikkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_cover_taxonomy() {
        assert_eq!(BlikkError::AccessDenied("x".into()).code(), "access_denied");
        assert_eq!(BlikkError::NotFound("x".into()).code(), "not_found");
        assert_eq!(BlikkError::WrongType("x".into()).code(), "wrong_type");
        assert_eq!(BlikkError::AlreadyExists("x".into()).code(), "already_exists");
        assert_eq!(BlikkError::ConfigMissing("x".into()).code(), "config_missing");
        assert_eq!(BlikkError::Download("x".into()).code(), "download_failure");
        assert_eq!(BlikkError::Analysis("x".into()).code(), "analysis_failure");
        assert_eq!(BlikkError::InvalidInput("x".into()).code(), "input_validation");
    }

    #[test]
    fn test_tool_not_found_maps_to_download_failure() {
        assert_eq!(
            BlikkError::ToolNotFound("yt-dlp".into()).code(),
            "download_failure"
        );
    }
}
