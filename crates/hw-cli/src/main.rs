//! hostwarden CLI
//!
//! Single binary for all hostwarden operations:
//! - Scan server (HTTP API that runs scan jobs)
//! - Client commands (scan, status, report)
//! - Configuration management

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostwarden::client::ApiClient;
use hostwarden::commands::{self, ScanArgs};

#[derive(Parser)]
#[command(name = "hostwarden")]
#[command(author, version, about = "Agentless Linux host security assessment")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scan server URL (defaults to the configured bind address)
    #[arg(short, long, global = true, env = "HOSTWARDEN_SERVER")]
    server: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scan server in the foreground
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Submit a scan of the servers in a targets file
    Scan {
        /// TOML file with [[servers]] entries
        targets: PathBuf,
        /// Checks and tools to run (requires --no-auto)
        #[arg(short, long, value_delimiter = ',')]
        tests: Vec<String>,
        /// Web endpoint for nikto/nuclei (repeatable)
        #[arg(short, long = "url")]
        urls: Vec<String>,
        /// Subnet for zmap, e.g. 10.0.0.0/24
        #[arg(long)]
        subnet: Option<String>,
        /// Run only the listed tests instead of the full derived plan
        #[arg(long)]
        no_auto: bool,
        /// Return after submission instead of following the job
        #[arg(long)]
        no_wait: bool,
        /// Seconds between status polls
        #[arg(long, default_value_t = 2)]
        poll: u64,
    },

    /// Show the status and results of a job
    Status {
        /// Job identifier
        job_id: String,
    },

    /// Generate and download the HTML report of a finished job
    Report {
        /// Job identifier
        job_id: String,
        /// Directory to save the report in
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Commands::Serve { .. });
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) if serving => "info",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Serve { bind } => {
            let config = commands::load_config(config_path)?;
            commands::serve_command(config, bind).await?;
        }

        Commands::Scan {
            targets,
            tests,
            urls,
            subnet,
            no_auto,
            no_wait,
            poll,
        } => {
            let client = client(cli.server, config_path)?;
            let args = ScanArgs {
                targets,
                tests,
                urls,
                subnet,
                no_auto,
                no_wait,
            };
            commands::scan_command(&client, args, Duration::from_secs(poll.max(1)), cli.quiet)
                .await?;
        }

        Commands::Status { job_id } => {
            let client = client(cli.server, config_path)?;
            commands::status_command(&client, &job_id).await?;
        }

        Commands::Report { job_id, output } => {
            let client = client(cli.server, config_path)?;
            commands::report_command(&client, &job_id, &output).await?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(config_path)?,
            ConfigAction::Path => commands::config_path(config_path),
            ConfigAction::Init { force } => commands::config_init(config_path, force)?,
        },
    }

    Ok(())
}

fn client(server: Option<String>, config_path: Option<&PathBuf>) -> Result<ApiClient> {
    let url = match server {
        Some(url) => url,
        None => commands::load_config(config_path)?.server_url(),
    };
    tracing::debug!("Using scan server at {}", url);
    Ok(ApiClient::new(&url))
}
