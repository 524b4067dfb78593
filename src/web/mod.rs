//! Web server module
//!
//! Serves the `search` tool and the engine catalogue over MCP's JSON-RPC
//! HTTP transport.

mod handlers;
pub mod protocol;
mod routes;
mod state;

pub use handlers::{ENGINES_URI, SEARCH_TOOL};
pub use routes::create_router;
pub use state::AppState;
