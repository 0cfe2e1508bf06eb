//! Multimodal video analysis for Blikk.
//!
//! The [`VideoAnalyzer`] trait is the seam to the external multimodal model;
//! [`VertexAnalyzer`] is the production implementation.

mod vertex;

pub use vertex::VertexAnalyzer;

use crate::error::{BlikkError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What kind of analysis the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Comprehensive analysis covering transcript and visuals.
    Full,
    /// Transcript-focused analysis.
    Transcript,
    /// Visual-only analysis, ignoring audio.
    Visual,
    /// Caller-supplied prompt passed through unchanged.
    Custom,
}

impl std::fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisMode::Full => write!(f, "full"),
            AnalysisMode::Transcript => write!(f, "transcript"),
            AnalysisMode::Visual => write!(f, "visual"),
            AnalysisMode::Custom => write!(f, "custom"),
        }
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = BlikkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "full" => Ok(AnalysisMode::Full),
            "transcript" => Ok(AnalysisMode::Transcript),
            "visual" => Ok(AnalysisMode::Visual),
            "custom" => Ok(AnalysisMode::Custom),
            other => Err(BlikkError::InvalidInput(format!(
                "Unknown analysis type: {} (expected full, transcript, or visual)",
                other
            ))),
        }
    }
}

/// Output of a model invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisText {
    /// Unstructured model output.
    pub full_analysis: String,
    /// Model identifier that produced the output.
    pub model_used: String,
    /// The prompt that was sent.
    pub prompt: String,
}

/// External multimodal analysis collaborator.
#[async_trait]
pub trait VideoAnalyzer: Send + Sync {
    /// Send video bytes and a prompt to the model, returning its text output.
    async fn analyze(&self, video: &[u8], prompt: &str) -> Result<String>;

    /// Identifier of the underlying model.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_mode_round_trip() {
        for (input, mode) in [
            ("full", AnalysisMode::Full),
            ("transcript", AnalysisMode::Transcript),
            ("visual", AnalysisMode::Visual),
            ("FULL", AnalysisMode::Full),
        ] {
            assert_eq!(input.parse::<AnalysisMode>().unwrap(), mode);
        }
        assert!("interpretive-dance".parse::<AnalysisMode>().is_err());
    }

    #[test]
    fn test_analysis_mode_display() {
        assert_eq!(AnalysisMode::Full.to_string(), "full");
        assert_eq!(AnalysisMode::Custom.to_string(), "custom");
    }
}
