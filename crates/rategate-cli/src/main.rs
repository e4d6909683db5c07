// crates/rategate-cli/src/main.rs
// ============================================================================
// Module: Rategate CLI Entry Point
// Description: Command dispatcher for the Rategate demo rate service.
// Purpose: Load configuration and datasets, then serve; fail fast otherwise.
// Dependencies: clap, rategate-core, rategate-server, thiserror, tokio
// ============================================================================

//! ## Overview
//! The Rategate CLI wires configuration, the dataset store, and the HTTP
//! transport together. Startup is fail-fast: a missing or malformed dataset
//! or an invalid configuration aborts with a nonzero exit code and the error
//! on stderr — there is no partial-startup mode.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rategate_core::DatasetError;
use rategate_core::DatasetStore;
use rategate_server::ConfigError;
use rategate_server::RategateConfig;
use rategate_server::ServeError;
use rategate_server::ServiceState;
use rategate_server::StderrAuditSink;
use rategate_server::serve;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// The fixed route table, one line per logical route.
const ROUTE_TABLE: [&str; 12] = [
    "GET  /cw1/json          rate lookup (JSON-backed)",
    "GET  /cw1/sqlite        rate lookup (engine-backed)",
    "GET  /spot              spot rate lookup",
    "GET  /team-rates        team request log",
    "GET  /escalation-rates  escalation request log",
    "GET  /scenarios         scenario listing",
    "GET  /carrier/login     login form",
    "POST /carrier/login     login submission",
    "GET  /carrier/logout    clear session",
    "GET  /carrier/search    search form (gated)",
    "GET  /carrier/results   results page (gated)",
    "OPTS *                  cross-origin preflight",
];

// ============================================================================
// SECTION: CLI Model
// ============================================================================

/// Rategate demo rate service.
#[derive(Debug, Parser)]
#[command(name = "rategate", version, about = "Filtered rate views and a gated carrier portal")]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the rate API and carrier portal.
    Serve(ServeArgs),
    /// Print the route table.
    Routes,
}

/// Arguments for the serve subcommand.
#[derive(Debug, Args)]
struct ServeArgs {
    /// Configuration file path (overrides the RATEGATE_CONFIG variable).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Listen port override.
    #[arg(long)]
    port: Option<u16>,
    /// Dataset directory override.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failures, each fatal to the invocation.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration failures.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Dataset load failures.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// Server failures.
    #[error(transparent)]
    Serve(#[from] ServeError),
    /// Runtime construction failures.
    #[error("runtime error: {0}")]
    Runtime(String),
    /// Output stream failures.
    #[error("output error: {0}")]
    Output(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let _ = writeln!(std::io::stderr(), "rategate: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected subcommand.
fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => serve_command(&args),
        Command::Routes => routes_command(),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Loads configuration and datasets, then serves until shutdown.
fn serve_command(args: &ServeArgs) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => RategateConfig::load_from(path)?,
        None => RategateConfig::load()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = &args.data_dir {
        config.data.dir.clone_from(dir);
    }
    config.validate()?;

    let datasets = DatasetStore::load(&config.data.dir)?;
    let state = ServiceState {
        config,
        datasets,
        audit: Arc::new(StderrAuditSink),
    };
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::Runtime(err.to_string()))?;
    runtime.block_on(serve(state))?;
    Ok(())
}

/// Prints the fixed route table.
fn routes_command() -> Result<(), CliError> {
    let mut out = std::io::stdout();
    for line in ROUTE_TABLE {
        writeln!(out, "{line}").map_err(|err| CliError::Output(err.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use clap::Parser;

    use super::Cli;
    use super::Command;
    use super::ROUTE_TABLE;

    #[test]
    fn serve_arguments_parse() {
        let cli = Cli::try_parse_from([
            "rategate",
            "serve",
            "--port",
            "8088",
            "--data-dir",
            "fixtures",
        ])
        .expect("parse should succeed");
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, Some(8088));
                assert_eq!(args.data_dir.as_deref().map(|p| p.to_string_lossy().into_owned()),
                    Some("fixtures".to_string()));
                assert!(args.config.is_none());
            }
            Command::Routes => panic!("unexpected subcommand"),
        }
    }

    #[test]
    fn routes_subcommand_parses() {
        let cli = Cli::try_parse_from(["rategate", "routes"]).expect("parse should succeed");
        assert!(matches!(cli.command, Command::Routes));
    }

    #[test]
    fn route_table_names_every_logical_route() {
        for needle in
            ["/cw1/json", "/cw1/sqlite", "/spot", "/team-rates", "/escalation-rates", "/scenarios"]
        {
            assert!(ROUTE_TABLE.iter().any(|line| line.contains(needle)), "missing {needle}");
        }
        assert_eq!(ROUTE_TABLE.iter().filter(|line| line.contains("/carrier/")).count(), 5);
    }
}
