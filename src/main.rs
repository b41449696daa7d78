//! rewrite-rules server and inspection CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!                         │                 REWRITE RULES                 │
//!                         │                                               │
//!     Client Request      │  ┌─────────┐    ┌──────────┐    ┌──────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│ routing  │───▶│ dispatch │  │
//!                         │  │ server  │    │ rewrite  │    │  access  │  │
//!                         │  └─────────┘    │  table   │    │ deferred │  │
//!                         │                 └──────────┘    └────┬─────┘  │
//!                         │                                      │        │
//!     Client Response     │  ┌──────────────────────────────┐    │        │
//!     ◀───────────────────┼──│ response: 403 / 302 / 301 /  │◀───┘        │
//!                         │  │ template / default output    │             │
//!                         │  └──────────────────────────────┘             │
//!                         │                                               │
//!                         │  config → rules registry (startup, read-only) │
//!                         └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use rewrite_rules::config::load_config;
use rewrite_rules::http::HttpServer;
use rewrite_rules::lifecycle::{registry_from_config, Shutdown};
use rewrite_rules::observability::{logging, metrics};
use rewrite_rules::routing::RewriteTable;

#[derive(Parser)]
#[command(name = "rewrite-rules")]
#[command(about = "Regex rewrite rules with access-gated dispatch", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "rewrite-rules.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests
    Serve,
    /// Print the compiled rewrite table in match order
    List,
    /// Show which rule a request path would hit
    Test {
        /// Request path, optionally with a query string
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init(Some(&config.observability.log_level));

    let registry = registry_from_config(&config);

    match cli.command {
        Commands::Serve => {
            tracing::info!(
                bind_address = %config.listener.bind_address,
                rules = registry.len(),
                request_timeout_secs = config.timeouts.request_secs,
                "Configuration loaded"
            );

            if config.observability.metrics_enabled {
                match config.observability.metrics_address.parse() {
                    Ok(addr) => metrics::init_metrics(addr),
                    Err(_) => tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    ),
                }
            }

            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            let shutdown = Shutdown::new();
            let server = HttpServer::new(config, registry);
            server.run(listener, shutdown.subscribe()).await?;

            tracing::info!("Shutdown complete");
        }
        Commands::List => {
            let table = RewriteTable::build(&registry, &config.query_vars.builtin);
            for rule in table.rules() {
                println!("{:<6} {}  =>  {}", rule.position(), rule.pattern(), rule.query().raw());
            }
        }
        Commands::Test { path } => {
            let table = RewriteTable::build(&registry, &config.query_vars.builtin);
            let (path, query) = match path.split_once('?') {
                Some((p, q)) => (p, Some(q)),
                None => (path.as_str(), None),
            };
            match table.match_request(path, query) {
                Some(m) => {
                    let rule = registry.rule_by_pattern(&m.pattern);
                    let report = serde_json::json!({
                        "matched_rule": m.pattern,
                        "query": m.query_vars,
                        "template": rule.and_then(|r| r.template.clone()),
                        "redirect": rule.is_some_and(|r| r.redirect.is_some()),
                        "access_check": rule.is_some_and(|r| r.access.is_some()),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                None => {
                    eprintln!("No rewrite rule matches {}", path);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
