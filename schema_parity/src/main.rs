use anyhow::{Context, Result};
use clap::Parser;
use std::backtrace::Backtrace;
use std::panic::{self, UnwindSafe};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use schema_parity::config::{self, Config, LoggingConfig, DEFAULT_CONFIG_FILE};
use schema_parity::utils::logging::init_logging;
use schema_parity::ParityChecker;

/// Checks that sync rules, the client schema and the backend schema agree
#[derive(Parser, Debug)]
#[command(name = "schema_parity")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schema_parity.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that relative source and report paths are resolved against
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Sync-rule file
    #[arg(long)]
    sync_rules: Option<PathBuf>,

    /// Client-schema source file
    #[arg(long)]
    client_schema: Option<PathBuf>,

    /// Backend-schema source file
    #[arg(long)]
    backend_schema: Option<PathBuf>,

    /// Report destination
    #[arg(short = 'o', long)]
    report: Option<PathBuf>,

    /// Exit with status 2 when the report contains issues
    #[arg(long)]
    strict: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => config::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                config::load_from_file(DEFAULT_CONFIG_FILE)
                    .with_context(|| format!("loading {}", DEFAULT_CONFIG_FILE))?
            }
            None => Config::default(),
        };

        if let Some(dir) = &self.base_dir {
            config.sources.base_dir = dir.clone();
        }
        if let Some(path) = &self.sync_rules {
            config.sources.sync_rules = path.clone();
        }
        if let Some(path) = &self.client_schema {
            config.sources.client_schema = path.clone();
        }
        if let Some(path) = &self.backend_schema {
            config.sources.backend_schema = path.clone();
        }
        if let Some(path) = &self.report {
            config.report.path = path.clone();
        }
        config.report.strict |= self.strict;
        if self.verbose {
            let logging = config.logging.get_or_insert_with(LoggingConfig::default);
            logging.level = "debug".to_string();
        }

        Ok(config)
    }
}

/// Exit status of a completed run
fn run(cli: &Cli) -> Result<u8> {
    let config = cli.load_config()?;
    init_logging(&config.logging).context("initialising logging")?;

    let strict = config.report.strict;
    let checker = ParityChecker::new(config);
    let summary = checker
        .run(std::io::stdout().lock())
        .context("schema comparison failed")?;

    if strict && summary.fails_strict() {
        return Ok(2);
    }
    Ok(0)
}

/// Route panics through the logger with a captured backtrace
fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let backtrace = Backtrace::force_capture();
        tracing::error!(panic = %info, backtrace = %backtrace, "Internal fault");
        eprintln!("Internal error: {info}\n{backtrace}");
    }));
}

/// Run `f`, turning errors and panics into exit status 1
fn guarded(f: impl FnOnce() -> Result<u8> + UnwindSafe) -> u8 {
    match panic::catch_unwind(f) {
        Ok(Ok(code)) => code,
        Ok(Err(err)) => {
            tracing::error!(error = ?err, "Analysis failed");
            eprintln!("Analysis error: {:?}", err);
            1
        }
        Err(_) => 1,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_panic_hook();
    ExitCode::from(guarded(|| run(&cli)))
}
