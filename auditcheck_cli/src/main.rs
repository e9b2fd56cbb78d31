mod html;
mod output;

use anyhow::{Context, Result};
use auditcheck_common::{load_config, AuditConfig, NormalizeOptions};
use auditcheck_core::Reconciler;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT_DIR: &str = "out";

#[derive(Parser, Debug)]
#[command(name = "auditcheck")]
#[command(author = "Auditcheck Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Reconcile two CSV/Excel files and output exceptions", long_about = None)]
struct Cli {
    /// Path to System A file (CSV/XLSX/XLS)
    #[arg(long = "a", value_name = "PATH")]
    a: PathBuf,

    /// Path to System B file (CSV/XLSX/XLS)
    #[arg(long = "b", value_name = "PATH")]
    b: PathBuf,

    /// Comma-separated key columns
    #[arg(long)]
    keys: String,

    /// Comma-separated columns to compare (default: all shared non-key)
    #[arg(long, default_value = "")]
    compare: String,

    /// Output folder
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Compare keys and values case-insensitively
    #[arg(long)]
    casefold: bool,

    /// Keep leading and trailing whitespace when comparing
    #[arg(long)]
    no_strip: bool,

    /// Skip writing report.html
    #[arg(long)]
    no_html: bool,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() {
    // Logs go to stderr so --json output stays clean on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    match run(cli) {
        Ok(out_dir) => {
            let message = format!("Reconciliation complete. See {}.", out_dir.display());
            if json {
                info!("{}", message);
            } else {
                println!("{}", message);
            }
        }
        Err(e) => {
            error!("Reconciliation failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf> {
    let loaded = load_config(false).context("Failed to load configuration")?;
    if loaded.exists {
        info!("Using config {}", loaded.path.display());
    }
    let config = loaded.config;

    let keys = split_list(&cli.keys);
    let compare = split_list(&cli.compare);
    let compare_cols = if compare.is_empty() { None } else { Some(compare) };
    let options = resolve_options(&config, cli.casefold, cli.no_strip);

    let result = Reconciler::new(keys)
        .with_compare_columns(compare_cols)
        .with_options(options)
        .reconcile_files(&cli.a, &cli.b)?;

    let out_dir = cli
        .out
        .or(config.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    output::write_outputs(&out_dir, &result)?;
    if config.html_report && !cli.no_html {
        html::write_report(&out_dir.join(html::REPORT_FILE), &cli.a, &cli.b, &result)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(result.summary())?);
    }

    Ok(out_dir)
}

/// Split a comma-separated column list, trimming entries and dropping blanks
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Config defaults, overridden by command-line flags
fn resolve_options(config: &AuditConfig, casefold: bool, no_strip: bool) -> NormalizeOptions {
    let mut options = config.normalize_options();
    if casefold {
        options.casefold = true;
    }
    if no_strip {
        options.strip = false;
    }
    options
}
