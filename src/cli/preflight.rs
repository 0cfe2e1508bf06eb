//! Pre-flight checks before expensive operations.
//!
//! Validates that required external tools are available before starting
//! operations that would otherwise fail midway.

use crate::error::{BlikkError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Remote analysis requires the downloader and cloud CLI.
    AnalyzeRemote,
    /// Local analysis requires only the cloud CLI.
    AnalyzeLocal,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
/// The merge tool (ffmpeg) is deliberately not required here: the pipeline
/// probes for it at download time and falls back to pre-merged formats.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::AnalyzeRemote => {
            check_tool("yt-dlp")?;
            check_tool("gcloud")?;
        }
        Operation::AnalyzeLocal => {
            check_tool("gcloud")?;
        }
    }
    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg uses -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(BlikkError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(BlikkError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(BlikkError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
