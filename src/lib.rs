//! serpapi-mcp: an MCP server exposing SerpApi as a single `search` tool
//!
//! A tool call flows through four stages: the request builder validates the
//! caller's arguments, the retrying dispatcher runs them against SerpApi,
//! the classifier groups the payload into result categories and the
//! formatter renders a complete or compact view.

pub mod config;
pub mod engines;
pub mod error;
pub mod network;
pub mod query;
pub mod results;
pub mod search;
pub mod web;

pub use config::Settings;
pub use error::{ErrorKind, SearchError, ToolError};
pub use search::{Search, ToolOutput};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
