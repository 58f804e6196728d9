//! # Ping Intelligence CLI
//!
//! Command-line interface for the SOV Fixer, Ping Data, Ping Vision, Ping
//! Radar and Ping Maps APIs.
//!
//! ```bash
//! pingintel -e staging sovfixer fix test_sov.xlsx -o xlsx
//! pingintel pingdata enhance -a "1 Main St, Austin TX" -s GG
//! pingintel --format json pingvision activity --page-size 20
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pingintel_domain::Environment;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{
    handle_pingdata_command, handle_pingmaps_command, handle_pingradar_command,
    handle_pingvision_command, handle_sovfixer_command, Context, OutputFormat, PingDataCommands,
    PingMapsCommands, PingRadarCommands, PingVisionCommands, SovFixerCommands,
};

#[derive(Parser, Debug)]
#[command(name = "pingintel")]
#[command(about = "Command-line interface for the Ping Intelligence APIs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment (prod, staging, dev, local, ...); selects the API host and
    /// credential serverspace
    #[arg(short, long, global = true)]
    environment: Option<Environment>,

    /// API base URL, overriding the environment's host
    #[arg(short = 'u', long, global = true)]
    api_url: Option<String>,

    /// Auth token, overriding environment variables and ~/.pingintel.ini
    #[arg(long, global = true)]
    auth_token: Option<String>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Settings file (default: ./pingintel.toml, ./pingintel.json,
    /// ~/.config/pingintel/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// SOV Fixer document parsing
    #[command(subcommand)]
    Sovfixer(SovFixerCommands),

    /// Ping Data location enhancement
    #[command(subcommand)]
    Pingdata(PingDataCommands),

    /// Ping Vision submissions
    #[command(subcommand)]
    Pingvision(PingVisionCommands),

    /// Ping Radar submissions
    #[command(subcommand)]
    Pingradar(PingRadarCommands),

    /// Ping Maps policy queries
    #[command(subcommand)]
    Pingmaps(PingMapsCommands),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = pingintel_infra::config::load_with(cli.config)?;
    debug!(?settings, "Loaded settings");

    let ctx = Context {
        settings,
        environment: cli.environment,
        api_url: cli.api_url,
        auth_token: cli.auth_token,
        format: cli.format,
    };

    match cli.command {
        Commands::Sovfixer(cmd) => handle_sovfixer_command(cmd, &ctx),
        Commands::Pingdata(cmd) => handle_pingdata_command(cmd, &ctx),
        Commands::Pingvision(cmd) => handle_pingvision_command(cmd, &ctx),
        Commands::Pingradar(cmd) => handle_pingradar_command(cmd, &ctx),
        Commands::Pingmaps(cmd) => handle_pingmaps_command(cmd, &ctx),
    }
}

fn main() -> ExitCode {
    // .env must be applied before settings and credentials read the environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
