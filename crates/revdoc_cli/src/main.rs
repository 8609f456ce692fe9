//! Walkthrough entry point.
//!
//! # Responsibility
//! - Open a store from command-line settings and run the CRUD walkthrough.
//! - Print the observed revisions for quick local sanity checks.

use chrono::Utc;
use clap::Parser;
use log::error;
use revdoc_core::{init_logging, run_walkthrough, StoreConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "revdoc", version, about)]
struct Args {
    /// Database name (a-z first, then a-z 0-9 _$()+-/).
    #[arg(long, default_value = revdoc_core::config::DEFAULT_DATABASE_NAME)]
    name: String,

    /// Directory for database files; in-memory when omitted.
    #[arg(long)]
    db_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, default_value = revdoc_core::default_log_level())]
    log_level: String,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl From<Args> for StoreConfig {
    fn from(args: Args) -> Self {
        Self {
            name: args.name,
            directory: args.db_dir,
            log_level: args.log_level,
            log_dir: args.log_dir,
        }
    }
}

fn main() -> ExitCode {
    let config = StoreConfig::from(Args::parse());

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("logging disabled: {err}");
        }
    }

    let store = match config.open_store() {
        Ok(store) => store,
        Err(err) => {
            error!("event=cli_open module=cli status=error error={err}");
            eprintln!("cannot open database `{}`: {err}", config.name);
            return ExitCode::FAILURE;
        }
    };

    let outcome = run_walkthrough(&store, Utc::now());
    let closed = store.close();

    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            eprintln!("walkthrough failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("document   {}", report.id);
    println!("created    {}", report.created);
    println!("retrieved  {}", report.retrieved.to_json());
    println!("updated    {}", report.updated);
    println!("deleted    {} (deletion status = {})", report.deleted, report.deletion_status);

    if let Err(err) = closed {
        eprintln!("cannot close database `{}`: {err}", config.name);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
