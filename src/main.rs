//! websearch-rs server entry point

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use websearch_rs::{
    config,
    network::HttpClient,
    providers::ProviderLoader,
    web::{create_router, AppState},
    WebSearchService,
};

#[tokio::main]
async fn main() -> Result<()> {
    let Some(config_path) = parse_args()? else {
        return Ok(());
    };

    // Load configuration before logging so `general.debug` picks the level
    let settings = config::load(config_path.as_deref())?;

    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting websearch-rs v{}", websearch_rs::VERSION);
    info!("Loaded configuration for instance: {}", settings.general.instance_name);

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;

    // Load providers
    let registry = ProviderLoader::load(&settings, &client)?;
    match registry.default_provider() {
        Some(name) => info!("Default web search provider: {}", name),
        None => warn!("No default web search provider; contexts must select one"),
    }

    let service = WebSearchService::new(Arc::new(registry));
    let addr = SocketAddr::new(
        settings
            .server
            .bind_address
            .parse()
            .with_context(|| format!("invalid bind_address {}", settings.server.bind_address))?,
        settings.server.port,
    );

    let state = AppState::new(settings, service);
    let app = create_router(state);

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Parse command line arguments
///
/// Returns `None` when the invocation only printed help or the version.
fn parse_args() -> Result<Option<Option<PathBuf>>> {
    let mut config_path = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => bail!("{} requires a file path", arg),
            },
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("websearch-rs {}", websearch_rs::VERSION);
                return Ok(None);
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok(Some(config_path))
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
websearch-rs v{}
Web search providers with a deep search orchestrator

USAGE:
    websearch-rs [OPTIONS]

OPTIONS:
    -c, --config <FILE>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    WEBSEARCH_SETTINGS_PATH      Path to settings.yml
    WEBSEARCH_DEBUG              Enable debug logging (true/false)
    WEBSEARCH_PORT               Server port
    WEBSEARCH_BIND_ADDRESS       Bind address
    WEBSEARCH_DEFAULT_PROVIDER   Provider new contexts start with
    RUST_LOG                     Log filter, overrides WEBSEARCH_DEBUG
"#,
        websearch_rs::VERSION
    );
}
