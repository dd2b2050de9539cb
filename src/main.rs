//! subwatch - replay subscription events against the topic manager
//!
//! Usage:
//!   subwatch [OPTIONS]
//!
//! Options:
//!   -c, --config <FILE>    Configuration file path
//!   -s, --script <FILE>    Event script (default: stdin)
//!   -l, --log-level        Log level (error, warn, info, debug, trace)
//!   -h, --help             Print help

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use subwatch::config::Config;
use subwatch::hooks::FnHooks;
use subwatch::manager::TopicManager;
use subwatch::replay;

/// Log level for CLI
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogLevel {
    /// Only errors
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace messages (very verbose)
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// subwatch - MQTT subscription tracking
#[derive(Parser, Debug)]
#[command(name = "subwatch")]
#[command(author = "Subwatch Contributors")]
#[command(version)]
#[command(about = "Replay subscribe/unsubscribe events against the topic manager")]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Event script to replay (reads stdin when omitted)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration file if specified, otherwise env overrides on defaults
    let file_config = match &args.config {
        Some(config_path) => Config::load(config_path),
        None => Config::from_env(),
    };
    let file_config = match file_config {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    // Setup logging - CLI overrides config (log.level defaults to info)
    let log_level = args.log_level.unwrap_or_else(|| {
        match file_config.log.level.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Warn,
        }
    });

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level.to_tracing_level())
        .with_target(false)
        .with_thread_ids(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(path) = &args.config {
        info!("Loaded configuration from {:?}", path);
    }

    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    let commands = replay::parse_script(&script)?;

    info!(
        "Replaying {} commands (cleanup interval={:?}, threshold={:?})",
        commands.len(),
        file_config.topics.cleanup_interval,
        file_config.topics.cleanup_threshold
    );

    let hooks = FnHooks::new(
        |filter: &str| info!("First subscriber: {}", filter),
        |filter: &str| info!("Last unsubscriber: {}", filter),
    );
    let manager = TopicManager::with_config(Arc::new(hooks), file_config.topics.clone());

    let mut stdout = std::io::stdout().lock();
    replay::run(&manager, &commands, &mut stdout).await?;

    manager.shutdown().await;
    Ok(())
}
