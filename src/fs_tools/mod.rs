//! Sandboxed file store operations for Blikk.
//!
//! Every operation resolves its path through [`PathSandbox`] first and
//! returns a typed payload or a [`BlikkError`]; nothing here panics or lets
//! an unexpected fault escape to the tool boundary.

use crate::error::{BlikkError, Result};
use crate::sandbox::PathSandbox;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix marking hidden files and directories.
const HIDDEN_PREFIX: &str = ".";

/// Text encoding reported for read content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    Utf8,
    Binary,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "utf-8"),
            Encoding::Binary => write!(f, "binary"),
        }
    }
}

/// Result of a read operation.
#[derive(Debug, Clone, Serialize)]
pub struct ReadPayload {
    /// File content, or a binary marker when the bytes are not valid UTF-8.
    pub content: String,
    pub encoding: Encoding,
    pub size_bytes: u64,
    pub absolute_path: PathBuf,
}

/// Whether a write created a new file or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Created,
    Updated,
}

impl std::fmt::Display for WriteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteAction::Created => write!(f, "created"),
            WriteAction::Updated => write!(f, "updated"),
        }
    }
}

/// Result of a write operation.
#[derive(Debug, Clone, Serialize)]
pub struct WritePayload {
    pub size_bytes: u64,
    pub action: WriteAction,
    pub absolute_path: PathBuf,
}

/// Kind of directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::Other => write!(f, "other"),
        }
    }
}

/// A single entry in a directory listing.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes; present for files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Metadata reported by `stat`.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub exists: bool,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes; present for files only.
    pub size_bytes: Option<u64>,
    /// Modification time as Unix seconds.
    pub modified_timestamp: Option<i64>,
    /// Creation time as Unix seconds, where the platform reports one.
    pub created_timestamp: Option<i64>,
    /// File extension including the leading dot; files only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub absolute_path: PathBuf,
}

/// Sandboxed file operations rooted at the repository root.
///
/// Stateless per call: each operation reasons only about the single path it
/// touches, so concurrent calls never interfere.
#[derive(Debug, Clone)]
pub struct FileStore {
    sandbox: PathSandbox,
}

impl FileStore {
    /// Create a file store rooted at `root`.
    pub fn new(root: &Path) -> Result<Self> {
        Ok(Self {
            sandbox: PathSandbox::new(root)?,
        })
    }

    /// Build a file store around an existing sandbox.
    pub fn with_sandbox(sandbox: PathSandbox) -> Self {
        Self { sandbox }
    }

    /// The canonical repository root.
    pub fn root(&self) -> &Path {
        self.sandbox.root()
    }

    /// Read a file, attempting UTF-8 decoding first.
    ///
    /// Binary files are reported with a byte-count marker rather than raw
    /// bytes, matching what an agent can usefully consume.
    pub fn read(&self, path: &str) -> Result<ReadPayload> {
        let resolved = self.sandbox.resolve(path)?;

        if !resolved.exists() {
            return Err(BlikkError::NotFound(format!("File not found: {}", path)));
        }
        if !resolved.is_file() {
            return Err(BlikkError::WrongType(format!("Not a file: {}", path)));
        }

        let bytes = std::fs::read(&resolved)?;
        let size_bytes = bytes.len() as u64;

        let (content, encoding) = match String::from_utf8(bytes) {
            Ok(text) => (text, Encoding::Utf8),
            Err(_) => (
                format!("<binary file, {} bytes>", size_bytes),
                Encoding::Binary,
            ),
        };

        debug!("Read {} ({} bytes, {})", path, size_bytes, encoding);

        Ok(ReadPayload {
            content,
            encoding,
            size_bytes,
            absolute_path: resolved,
        })
    }

    /// Write UTF-8 content to a file.
    ///
    /// Missing parent directories are created when `create_dirs` is set;
    /// otherwise a missing parent is an IO failure with no side effect.
    pub fn write(&self, path: &str, content: &str, create_dirs: bool) -> Result<WritePayload> {
        let resolved = self.sandbox.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            if !parent.exists() {
                if create_dirs {
                    std::fs::create_dir_all(parent)?;
                } else {
                    return Err(BlikkError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("Parent directory does not exist: {}", path),
                    )));
                }
            }
        }

        let action = if resolved.exists() {
            WriteAction::Updated
        } else {
            WriteAction::Created
        };

        std::fs::write(&resolved, content)?;
        let size_bytes = std::fs::metadata(&resolved)?.len();

        debug!("{} {} ({} bytes)", action, path, size_bytes);

        Ok(WritePayload {
            size_bytes,
            action,
            absolute_path: resolved,
        })
    }

    /// Delete a regular file. Directories are not deletable.
    pub fn delete(&self, path: &str) -> Result<()> {
        let resolved = self.sandbox.resolve(path)?;

        if !resolved.exists() {
            return Err(BlikkError::NotFound(format!("File not found: {}", path)));
        }
        if !resolved.is_file() {
            return Err(BlikkError::WrongType(format!("Not a file: {}", path)));
        }

        std::fs::remove_file(&resolved)?;
        debug!("Deleted {}", path);
        Ok(())
    }

    /// List directory contents.
    ///
    /// Non-recursive listings return immediate children sorted by name.
    /// Recursive listings walk the subtree depth-first, applying the hidden
    /// filter independently at every level. Size read failures default to 0
    /// rather than aborting the listing.
    pub fn list(
        &self,
        path: &str,
        include_hidden: bool,
        recursive: bool,
    ) -> Result<Vec<DirectoryEntry>> {
        let resolved = self.sandbox.resolve(path)?;

        if !resolved.exists() {
            return Err(BlikkError::NotFound(format!(
                "Directory not found: {}",
                path
            )));
        }
        if !resolved.is_dir() {
            return Err(BlikkError::WrongType(format!("Not a directory: {}", path)));
        }

        let mut contents = Vec::new();
        self.collect_entries(&resolved, include_hidden, recursive, &mut contents)?;
        Ok(contents)
    }

    fn collect_entries(
        &self,
        dir: &Path,
        include_hidden: bool,
        recursive: bool,
        contents: &mut Vec<DirectoryEntry>,
    ) -> Result<()> {
        let mut children: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        children.sort();

        let mut subdirs = Vec::new();

        for child in children {
            let name = match child.file_name().and_then(|n| n.to_str()) {
                Some(n) => n.to_string(),
                None => continue,
            };

            if !include_hidden && name.starts_with(HIDDEN_PREFIX) {
                continue;
            }

            let rel_path = child
                .strip_prefix(self.root())
                .unwrap_or(&child)
                .to_string_lossy()
                .to_string();

            if child.is_dir() {
                contents.push(DirectoryEntry {
                    name,
                    path: rel_path,
                    kind: EntryKind::Directory,
                    size_bytes: None,
                });
                if recursive {
                    subdirs.push(child);
                }
            } else {
                let size = std::fs::metadata(&child).map(|m| m.len()).unwrap_or(0);
                contents.push(DirectoryEntry {
                    name,
                    path: rel_path,
                    kind: EntryKind::File,
                    size_bytes: Some(size),
                });
            }
        }

        for subdir in subdirs {
            if let Err(e) = self.collect_entries(&subdir, include_hidden, true, contents) {
                warn!("Skipping unreadable directory {:?}: {}", subdir, e);
            }
        }

        Ok(())
    }

    /// Create a directory, including any missing parents.
    ///
    /// Creation is not idempotent: an existing path is an error with no
    /// filesystem mutation.
    pub fn create_dir(&self, path: &str) -> Result<()> {
        let resolved = self.sandbox.resolve(path)?;

        if resolved.exists() {
            return Err(BlikkError::AlreadyExists(format!(
                "Path already exists: {}",
                path
            )));
        }

        std::fs::create_dir_all(&resolved)?;
        debug!("Created directory {}", path);
        Ok(())
    }

    /// Report metadata for a file or directory.
    pub fn stat(&self, path: &str) -> Result<FileInfo> {
        let resolved = self.sandbox.resolve(path)?;

        if !resolved.exists() {
            return Err(BlikkError::NotFound(format!("Path not found: {}", path)));
        }

        let metadata = std::fs::metadata(&resolved)?;
        let kind = if metadata.is_file() {
            EntryKind::File
        } else if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };

        let extension = if kind == EntryKind::File {
            Some(
                resolved
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default(),
            )
        } else {
            None
        };

        Ok(FileInfo {
            exists: true,
            kind,
            size_bytes: (kind == EntryKind::File).then(|| metadata.len()),
            modified_timestamp: metadata.modified().ok().map(unix_seconds),
            created_timestamp: metadata.created().ok().map(unix_seconds),
            extension,
            absolute_path: resolved,
        })
    }
}

fn unix_seconds(time: std::time::SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}
