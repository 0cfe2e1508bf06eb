//! Agent-facing tool boundary for Blikk.
//!
//! Exposes the file store and video pipeline as callable tools. Every tool
//! invocation returns a structured result envelope with a success flag; no
//! error ever escapes the boundary uncaught.

mod tools;

pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext, ToolSpec};
