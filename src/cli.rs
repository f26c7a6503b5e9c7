//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Marcus - search gateway for the University of Bergen Library collections
#[derive(Parser, Debug)]
#[command(name = "marcus")]
#[command(version)]
#[command(about = "Search gateway that turns UI query parameters into Elasticsearch requests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to bind, overrides settings and MARCUS_BIND_ADDRESS
        #[arg(short, long)]
        bind: Option<String>,

        /// Elasticsearch URL, overrides settings and MARCUS_ES_URL
        #[arg(long)]
        es_url: Option<String>,
    },

    /// Print the Elasticsearch body built for a query string
    Params {
        /// Query string as sent to /search, e.g. "q=bergen&filter=type%23Brev"
        query: String,

        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Append a wildcard or fuzzy operator to each token of a query
    Fuzzify {
        /// Free-text query
        text: String,

        /// Operator to append: '*' or '~'
        #[arg(short, long, default_value = "*")]
        mode: String,
    },
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "marcus",
            "serve",
            "--config",
            "marcus.toml",
            "--bind",
            "0.0.0.0:8080",
            "--es-url",
            "http://es:9200",
        ])
        .unwrap();
        match cli.command {
            Commands::Serve {
                config,
                bind,
                es_url,
            } => {
                assert_eq!(config, Some(PathBuf::from("marcus.toml")));
                assert_eq!(bind.as_deref(), Some("0.0.0.0:8080"));
                assert_eq!(es_url.as_deref(), Some("http://es:9200"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_fuzzify_defaults_to_wildcard() {
        let cli = Cli::try_parse_from(["marcus", "fuzzify", "hello world"]).unwrap();
        match cli.command {
            Commands::Fuzzify { text, mode } => {
                assert_eq!(text, "hello world");
                assert_eq!(mode, "*");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_params_requires_query() {
        assert!(Cli::try_parse_from(["marcus", "params"]).is_err());
    }
}
