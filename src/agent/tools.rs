//! Tool definitions and implementations for the agent boundary.

use crate::analysis::AnalysisMode;
use crate::error::{BlikkError, Result};
use crate::fs_tools::FileStore;
use crate::orchestrator::VideoPipeline;
use crate::video_source::parse_source_type;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Available tools for the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Read a file from the repository.
    ReadFile { path: String },

    /// Write content to a file in the repository.
    WriteFile {
        path: String,
        content: String,
        #[serde(default = "default_true")]
        create_dirs: bool,
    },

    /// Delete a file from the repository.
    DeleteFile { path: String },

    /// List contents of a repository directory.
    ListDirectory {
        #[serde(default = "default_dir")]
        path: String,
        #[serde(default)]
        include_hidden: bool,
        #[serde(default)]
        recursive: bool,
    },

    /// Create a new directory in the repository.
    CreateDirectory { path: String },

    /// Get metadata about a file or directory.
    GetFileInfo { path: String },

    /// Analyze video content from a URL or local file.
    AnalyzeVideo {
        source: String,
        #[serde(default = "default_auto")]
        source_type: String,
        #[serde(default = "default_full")]
        analysis_type: String,
        #[serde(default)]
        custom_prompt: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

fn default_dir() -> String {
    ".".to_string()
}

fn default_auto() -> String {
    "auto".to_string()
}

fn default_full() -> String {
    "full".to_string()
}

/// Tool execution context with access to the file store and video pipeline.
pub struct ToolContext {
    pub store: FileStore,
    pub pipeline: Arc<VideoPipeline>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(store: FileStore, pipeline: Arc<VideoPipeline>) -> Self {
        Self { store, pipeline }
    }

    /// Execute a tool call, returning a structured result envelope.
    ///
    /// The envelope always carries a `success` flag; failures add `error`
    /// and `error_code` instead of propagating.
    pub async fn execute(&self, tool: &ToolCall) -> Value {
        match tool {
            ToolCall::ReadFile { path } => envelope(self.read_file(path), path),
            ToolCall::WriteFile {
                path,
                content,
                create_dirs,
            } => envelope(self.write_file(path, content, *create_dirs), path),
            ToolCall::DeleteFile { path } => envelope(self.delete_file(path), path),
            ToolCall::ListDirectory {
                path,
                include_hidden,
                recursive,
            } => envelope(self.list_directory(path, *include_hidden, *recursive), path),
            ToolCall::CreateDirectory { path } => envelope(self.create_directory(path), path),
            ToolCall::GetFileInfo { path } => {
                let mut result = envelope(self.get_file_info(path), path);
                // A missing path is reported, not just failed.
                if result["error_code"] == "not_found" {
                    result["exists"] = json!(false);
                }
                result
            }
            ToolCall::AnalyzeVideo {
                source,
                source_type,
                analysis_type,
                custom_prompt,
            } => {
                let outcome = self
                    .analyze_video(source, source_type, analysis_type, custom_prompt.as_deref())
                    .await;
                let mut result = envelope(outcome, source);
                result["source"] = json!(source);
                result
            }
        }
    }

    fn read_file(&self, path: &str) -> Result<Value> {
        let read = self.store.read(path)?;
        Ok(json!({
            "content": read.content,
            "file_path": path,
            "absolute_path": read.absolute_path,
            "encoding": read.encoding.to_string(),
            "size_bytes": read.size_bytes,
            "message": format!("Successfully read file: {}", path),
        }))
    }

    fn write_file(&self, path: &str, content: &str, create_dirs: bool) -> Result<Value> {
        let written = self.store.write(path, content, create_dirs)?;
        Ok(json!({
            "file_path": path,
            "absolute_path": written.absolute_path,
            "size_bytes": written.size_bytes,
            "action": written.action.to_string(),
            "message": format!("{} file successfully: {}", capitalized(&written.action.to_string()), path),
        }))
    }

    fn delete_file(&self, path: &str) -> Result<Value> {
        self.store.delete(path)?;
        Ok(json!({
            "file_path": path,
            "message": format!("Successfully deleted file: {}", path),
        }))
    }

    fn list_directory(&self, path: &str, include_hidden: bool, recursive: bool) -> Result<Value> {
        let contents = self.store.list(path, include_hidden, recursive)?;
        let count = contents.len();
        Ok(json!({
            "directory": path,
            "contents": contents,
            "count": count,
            "message": format!("Successfully listed directory: {}", path),
        }))
    }

    fn create_directory(&self, path: &str) -> Result<Value> {
        self.store.create_dir(path)?;
        Ok(json!({
            "directory": path,
            "message": format!("Successfully created directory: {}", path),
        }))
    }

    fn get_file_info(&self, path: &str) -> Result<Value> {
        let info = self.store.stat(path)?;
        let mut value = serde_json::to_value(&info)?;
        value["path"] = json!(path);
        Ok(value)
    }

    async fn analyze_video(
        &self,
        source: &str,
        source_type: &str,
        analysis_type: &str,
        custom_prompt: Option<&str>,
    ) -> Result<Value> {
        let explicit = parse_source_type(source_type)?;
        let mode: AnalysisMode = analysis_type.parse()?;

        let outcome = self
            .pipeline
            .analyze(source, explicit, mode, custom_prompt)
            .await?;

        let mut result = json!({
            "source": outcome.source,
            "source_type": outcome.source_type,
            "video_size_mb": outcome.video_size_mb,
            "analysis_type": outcome.mode,
            "analysis": {
                "full_analysis": outcome.analysis.full_analysis,
                "model_used": outcome.analysis.model_used,
                "prompt": outcome.analysis.prompt,
            },
            "message": "Video analysis completed successfully",
        });
        if let Some(title) = outcome.title {
            result["title"] = json!(title);
        }
        if !outcome.warnings.is_empty() {
            result["warnings"] = json!(outcome.warnings);
        }
        Ok(result)
    }
}

/// Wrap an operation result in the success/failure envelope.
fn envelope(result: Result<Value>, path_or_source: &str) -> Value {
    match result {
        Ok(mut payload) => {
            payload["success"] = json!(true);
            payload
        }
        Err(e) => json!({
            "success": false,
            "error": e.to_string(),
            "error_code": e.code(),
            "path": path_or_source,
        }),
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Tool definition published to the agent framework.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Get definitions for all available tools.
pub fn tool_definitions() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "read_file".to_string(),
            description: "Read the contents of a file in the repository. \
                Returns the content with encoding info, or a byte-count marker for binary files."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to the file from repository root"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolSpec {
            name: "write_file".to_string(),
            description: "Write content to a file in the repository. \
                Creates parent directories by default."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to the file from repository root"
                    },
                    "content": {
                        "type": "string",
                        "description": "Content to write to the file"
                    },
                    "create_dirs": {
                        "type": "boolean",
                        "description": "Create parent directories if they don't exist",
                        "default": true
                    }
                },
                "required": ["path", "content"]
            }),
        },
        ToolSpec {
            name: "delete_file".to_string(),
            description: "Delete a file from the repository. Directories cannot be deleted."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to the file from repository root"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolSpec {
            name: "list_directory".to_string(),
            description: "List contents of a directory in the repository, optionally recursive."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to the directory from repository root",
                        "default": "."
                    },
                    "include_hidden": {
                        "type": "boolean",
                        "description": "Include hidden files/directories (starting with .)",
                        "default": false
                    },
                    "recursive": {
                        "type": "boolean",
                        "description": "List subdirectories recursively",
                        "default": false
                    }
                },
                "required": []
            }),
        },
        ToolSpec {
            name: "create_directory".to_string(),
            description: "Create a new directory in the repository, including missing parents. \
                Fails if the path already exists."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to the directory from repository root"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolSpec {
            name: "get_file_info".to_string(),
            description: "Get metadata about a file or directory (type, size, timestamps)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Relative path to the file/directory from repository root"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolSpec {
            name: "analyze_video".to_string(),
            description: "Analyze video content including transcript and visuals. \
                Accepts a YouTube URL or a local file path; remote videos are downloaded \
                to a temporary staging area that is always cleaned up."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "source": {
                        "type": "string",
                        "description": "YouTube URL or path to a local video file"
                    },
                    "source_type": {
                        "type": "string",
                        "enum": ["auto", "youtube", "file"],
                        "description": "How to interpret the source",
                        "default": "auto"
                    },
                    "analysis_type": {
                        "type": "string",
                        "enum": ["full", "transcript", "visual"],
                        "description": "Type of analysis to perform",
                        "default": "full"
                    },
                    "custom_prompt": {
                        "type": "string",
                        "description": "Custom analysis prompt for specific needs"
                    }
                },
                "required": ["source"]
            }),
        },
    ]
}

/// Parse a tool call from an agent framework's (name, JSON arguments) pair.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let mut args: Value = serde_json::from_str(arguments)
        .map_err(|e| BlikkError::InvalidInput(format!("Invalid tool arguments: {}", e)))?;

    if !args.is_object() {
        return Err(BlikkError::InvalidInput(
            "Tool arguments must be a JSON object".to_string(),
        ));
    }

    let known = tool_definitions().iter().any(|t| t.name == name);
    if !known {
        return Err(BlikkError::InvalidInput(format!("Unknown tool: {}", name)));
    }

    args["name"] = json!(name);
    serde_json::from_value(args)
        .map_err(|e| BlikkError::InvalidInput(format!("Invalid arguments for {}: {}", name, e)))
}
