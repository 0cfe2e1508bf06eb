//! CLI module for Blikk.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Blikk - Video Analysis
///
/// A CLI tool for analyzing video content from YouTube or local files,
/// with sandboxed file operations for saving and organizing the results.
/// The name "Blikk" comes from the Norwegian word for "gaze."
#[derive(Parser, Debug)]
#[command(name = "blikk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Blikk and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Analyze a video from a YouTube URL or local file
    Analyze {
        /// YouTube URL, or local video file path
        source: String,

        /// Source type (youtube, file, auto)
        #[arg(short = 't', long, default_value = "auto")]
        source_type: String,

        /// Analysis mode (full, transcript, visual)
        #[arg(short, long, default_value = "full")]
        mode: String,

        /// Custom analysis prompt (overrides --mode)
        #[arg(short, long)]
        prompt: Option<String>,

        /// Write the analysis to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Read a file from the repository
    Read {
        /// Path relative to the repository root
        path: String,
    },

    /// Write content to a file in the repository
    Write {
        /// Path relative to the repository root
        path: String,

        /// Content to write
        content: String,

        /// Fail instead of creating missing parent directories
        #[arg(long)]
        no_create_dirs: bool,
    },

    /// Delete a file from the repository
    Delete {
        /// Path relative to the repository root
        path: String,
    },

    /// List a directory in the repository
    Ls {
        /// Path relative to the repository root
        #[arg(default_value = ".")]
        path: String,

        /// Include hidden entries
        #[arg(short, long)]
        all: bool,

        /// Recurse into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Create a directory in the repository
    Mkdir {
        /// Path relative to the repository root
        path: String,
    },

    /// Show metadata for a file or directory
    Info {
        /// Path relative to the repository root
        path: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
