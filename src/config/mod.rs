//! Configuration module for Blikk.
//!
//! Handles loading and managing application settings and analysis prompt
//! templates.

mod prompts;
mod settings;

pub use prompts::AnalysisPrompts;
pub use settings::{AnalyzerSettings, DownloadSettings, GeneralSettings, PromptSettings, Settings};
