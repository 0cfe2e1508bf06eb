//! Blikk - Sandboxed File Access and Video Analysis for Agents
//!
//! A local-first CLI tool that exposes callable tools to LLM-driven agents.
//!
//! The name "Blikk" comes from the Norwegian/Scandinavian word for "gaze."
//!
//! # Overview
//!
//! Blikk provides two families of tools:
//! - Sandboxed file operations (read, write, delete, list, mkdir, stat) that
//!   can never escape a configured repository root
//! - A video analysis pipeline that downloads remote videos into an isolated
//!   staging directory, sends them to a multimodal model, and guarantees
//!   cleanup under every outcome
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and analysis prompt templates
//! - `sandbox` - Path resolution within the repository root
//! - `fs_tools` - Sandboxed file store operations
//! - `video_source` - Remote/local source classification
//! - `video` - Video download and staging lifecycle
//! - `analysis` - Multimodal video analysis
//! - `orchestrator` - Video pipeline coordination
//! - `agent` - Agent-facing tool boundary
//!
//! # Example
//!
//! ```rust,no_run
//! use blikk::config::Settings;
//! use blikk::fs_tools::FileStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let store = FileStore::new(&settings.root_dir())?;
//!
//!     let written = store.write("notes/todo.txt", "hello", true)?;
//!     println!("{} ({} bytes)", written.action, written.size_bytes);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs_tools;
pub mod orchestrator;
pub mod sandbox;
pub mod video;
pub mod video_source;

pub use error::{BlikkError, Result};
