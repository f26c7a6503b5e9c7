//! # Marcus - search gateway
//!
//! Entry point for the `marcus` binary.
//!
//! ## Settings
//!
//! Settings come from built-in defaults, an optional TOML file, `MARCUS_*`
//! environment variables and finally command line flags, each overriding the
//! previous.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use marcus_core::{FuzzyMode, QueryParams, SearchRequest, Settings, fuzzify};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            config,
            bind,
            es_url,
        } => {
            let mut settings = load_settings(config.as_deref())?;
            if let Some(bind) = bind {
                settings.server.bind_address = bind;
            }
            if let Some(es_url) = es_url {
                settings.elasticsearch.url = es_url;
            }
            info!("Marcus search gateway starting...");
            marcus_web::server::run_server(settings)
                .await
                .context("Search gateway failed")?;
        }
        Commands::Params { query, config } => {
            let settings = load_settings(config.as_deref())?;
            let request = SearchRequest::from_query_params(&QueryParams::parse(&query))
                .context("Invalid query parameters")?;
            let body = request
                .to_query_body(&settings.search)
                .context("Failed to build search body")?;
            let output = serde_json::json!({
                "indices": request.effective_indices(&settings.search),
                "params": request.echo(),
                "body": body,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Fuzzify { text, mode } => {
            let mode: FuzzyMode = mode.parse().context("Invalid fuzzify mode")?;
            println!("{}", fuzzify(&text, mode));
        }
    }

    Ok(())
}

/// Initialize tracing with an environment-configurable filter.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marcus_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Defaults, then the settings file, then `MARCUS_*` variables.
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings
        .apply_env()
        .context("Invalid MARCUS_* environment override")?;
    Ok(settings)
}
