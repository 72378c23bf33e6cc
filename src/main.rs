//! IP reputation scanner CLI.

use anyhow::Result;
use clap::Parser;
use ip_reputation_scan::report::LineSink;
use ip_reputation_scan::{Config, LogScanner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: ip-reputation-scan <logfile1> [logfile2 ...]";

#[derive(Parser, Debug)]
#[command(name = "ip-reputation-scan")]
#[command(about = "Scan log files for IPv4 addresses and block those with a bad reputation")]
#[command(version)]
struct Args {
    /// Log files to scan, in order
    #[arg(value_name = "LOGFILE")]
    files: Vec<PathBuf>,

    /// Path to configuration file (built-in defaults if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::example());
        return Ok(ExitCode::SUCCESS);
    }

    // Logs go to stderr; stdout carries only the report.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match args.config {
        Some(ref path) => {
            info!(config = %path.display(), "Loading configuration");
            Config::load(path)?
        }
        None => Config::default(),
    };

    if args.validate {
        info!("Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    if args.files.is_empty() {
        println!("{}", USAGE);
        return Ok(ExitCode::from(1));
    }

    let mut scanner = LogScanner::from_config(&config, LineSink::stdout())?;
    scanner.scan_paths(&args.files)?;

    Ok(ExitCode::SUCCESS)
}
