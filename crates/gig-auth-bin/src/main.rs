//! gig-auth - inspect the auth layer from a terminal.

mod app;
mod host;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use gig_auth_config::{init_logging, Config, Paths};

/// gig-auth command-line interface.
#[derive(Parser)]
#[command(name = "gig-auth")]
#[command(about = "Inspect platform detection, health and configuration of the auth layer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for config and storage files. Defaults to ~/.gig-auth
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the capability profile selected for a simulated host
    Detect {
        #[arg(long, value_enum, default_value_t = HostKind::Web)]
        host: HostKind,
        /// Simulate an installed standalone web app
        #[arg(long)]
        standalone: bool,
    },
    /// Run every health probe once and print the snapshot as JSON
    Health {
        #[arg(long, value_enum, default_value_t = HostKind::Web)]
        host: HostKind,
        #[arg(long)]
        standalone: bool,
    },
    /// Sign in through a simulated mini-app host against the identity service
    Handshake {
        /// Identity token the host hands out. Omit to simulate a signed-out host user
        #[arg(long)]
        id_token: Option<String>,
        #[arg(long, default_value = "CLI user")]
        display_name: String,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HostKind {
    Web,
    MiniApp,
    Ios,
    Android,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let config = Config::load(&paths)?;

    init_logging(log_level(cli.log_level.as_deref(), &config));

    match cli.command {
        Commands::Detect { host, standalone } => {
            app::detect(config, host, standalone)?;
        }
        Commands::Health { host, standalone } => {
            app::health(config, paths, host, standalone).await?;
        }
        Commands::Handshake {
            id_token,
            display_name,
        } => {
            app::handshake(config, paths, id_token, display_name).await?;
        }
        Commands::Config => {
            app::show_config(&config)?;
        }
    }

    Ok(())
}

/// `--log-level` wins over the configured level.
fn log_level<'a>(flag: Option<&'a str>, config: &'a Config) -> &'a str {
    flag.unwrap_or(&config.log_level)
}
