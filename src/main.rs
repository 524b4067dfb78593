//! serpapi-mcp: MCP server for SerpApi search
//!
//! This is the main entry point for the application.

use anyhow::{bail, Result};
use serpapi_mcp::{
    config,
    engines::{builder, SchemaCatalogue},
    network::SerpApiClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("-h" | "--help") => {
            print_usage();
            Ok(())
        }
        Some("-V" | "--version") => {
            println!("serpapi-mcp {}", serpapi_mcp::VERSION);
            Ok(())
        }
        Some("build-engines") => {
            init_logging(false);
            build_engines(&args[1..])
        }
        Some(other) => {
            print_usage();
            bail!("unknown argument: {other}")
        }
        None => serve().await,
    }
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn serve() -> Result<()> {
    // Load configuration
    let settings = config::load()?;
    init_logging(settings.general.debug);
    let settings = config::init(settings)?;

    info!("Starting serpapi-mcp v{}", serpapi_mcp::VERSION);
    info!("Loaded configuration for instance: {}", settings.general.instance_name);
    if settings.serpapi.api_key.is_none() {
        info!("No default API key configured; callers must supply one");
    }

    // Initialize HTTP client
    let client = SerpApiClient::with_settings(&settings.outgoing, &settings.serpapi)?;
    info!("SerpApi client targeting {}", client.search_url());

    // Load engine catalogue
    let catalogue = SchemaCatalogue::load(&settings.engines.schema_dir)?;
    info!("Loaded {} engine schemas", catalogue.snapshot().len());

    // Create application state
    let state = AppState::new(settings.clone(), catalogue, Arc::new(client));

    // Create router
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `build-engines <props.json> [out_dir]`
fn build_engines(args: &[String]) -> Result<()> {
    let Some(props) = args.first() else {
        print_usage();
        bail!("build-engines needs the path to a parameter dump");
    };
    let out_dir = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("engines"));

    let count = builder::build_from_file(&PathBuf::from(props), &out_dir)?;
    println!("Wrote {} engine files to {}", count, out_dir.display());
    Ok(())
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
serpapi-mcp v{}
MCP server exposing SerpApi search

USAGE:
    serpapi-mcp                                  Start the MCP server
    serpapi-mcp build-engines <props.json> [dir] Build engine schema files

OPTIONS:
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    SERPAPI_API_KEY              Default SerpApi key
    SERPAPI_BASE_URL             SerpApi base URL
    SERPAPI_MCP_SETTINGS_PATH    Path to settings.yml
    SERPAPI_MCP_DEBUG            Enable debug logging (true/false)
    SERPAPI_MCP_PORT             Server port
    SERPAPI_MCP_BIND_ADDRESS     Bind address
    SERPAPI_MCP_ENGINES_DIR      Engine schema directory
    SERPAPI_MCP_DEFAULT_ENGINE   Engine used when none is given
    RUST_LOG                     Log filter
"#,
        serpapi_mcp::VERSION
    );
}
