//! Mend CLI - HTTP service for AI-assisted code improvement
//!
//! Usage:
//!   mend                        Start the server (same as `mend serve`)
//!   mend serve --port 9000      Start the server on another port
//!   mend config                 Print the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mend_core::MendConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "mend")]
#[command(author, version, about = "Clone, improve and commit code over HTTP")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./mend.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Directory holding repository checkouts
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Environment file with GITHUB_TOKEN / OPENAI_API_KEY (defaults to ./.env)
    #[arg(long, global = true, value_name = "FILE")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    /// Layer command-line flags over the loaded configuration
    fn apply_overrides(&self, mut config: MendConfig) -> MendConfig {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(base_dir) = &self.base_dir {
            config.workspace.base_dir = base_dir.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    load_env_file(cli.env_file.as_deref())?;

    let config = MendConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let config = cli.apply_overrides(config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve(config).await,
        Commands::Config => cmd_config(&config),
    }
}

/// Populate unset environment variables from a dotenv file.
///
/// An explicit file must exist; the default `.env` lookup is optional.
/// Variables already set in the environment win.
fn load_env_file(path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            info!("Loaded environment from {}", path.display());
        }
        None => match dotenvy::dotenv() {
            Ok(found) => info!("Loaded environment from {}", found.display()),
            Err(e) => debug!("No .env loaded: {}", e),
        },
    }
    Ok(())
}

async fn cmd_serve(config: MendConfig) -> Result<()> {
    info!(
        "Serving checkouts from {}",
        config.workspace.base_dir.display()
    );
    mend_server::run(config).await
}

fn cmd_config(config: &MendConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["mend"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["mend", "serve", "--port", "9100", "--base-dir", "/srv/repos"]);
        let config = cli.apply_overrides(MendConfig::default());
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.workspace.base_dir, PathBuf::from("/srv/repos"));
    }

    #[test]
    fn test_env_file_fills_unset_variables() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("mend.env");
        std::fs::write(
            &path,
            "MEND_TEST_DOTENV_TOKEN=from-file\nMEND_TEST_DOTENV_PRESET=from-file\n",
        )
        .unwrap();
        std::env::set_var("MEND_TEST_DOTENV_PRESET", "from-env");

        load_env_file(Some(&path)).unwrap();

        assert_eq!(std::env::var("MEND_TEST_DOTENV_TOKEN").unwrap(), "from-file");
        assert_eq!(std::env::var("MEND_TEST_DOTENV_PRESET").unwrap(), "from-env");
    }

    #[test]
    fn test_missing_explicit_env_file_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(load_env_file(Some(&temp.path().join("missing.env"))).is_err());
    }

    #[test]
    fn test_env_file_flag() {
        let cli = Cli::parse_from(["mend", "--env-file", "/etc/mend.env"]);
        assert_eq!(cli.env_file, Some(PathBuf::from("/etc/mend.env")));
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::parse_from(["mend", "-v", "config"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Config)));
    }
}
