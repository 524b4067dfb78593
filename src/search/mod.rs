//! Search orchestration module
//!
//! Holds the request models and the executor that runs one tool invocation
//! through building, dispatch, classification and formatting.

mod executor;
mod models;

pub use executor::{Search, ToolContent, ToolOutput};
pub use models::*;
