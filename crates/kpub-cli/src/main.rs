//! kpub - Publication database of an astronomical facility
//!
//! Finds candidate papers in NASA ADS, classifies them interactively by
//! mission and science, and produces lists, metrics and charts from the
//! resulting SQLite database.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kpub_core::{HttpConfig, ProgressContext, Verbosity};

mod cmd;
mod config;
mod review;

use config::Config;

#[derive(Parser)]
#[command(name = "kpub")]
#[command(about = "Publication database of an astronomical facility")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Location of the publication db (default: ~/.kpub.db)
    #[arg(short = 'f', long = "db", global = true)]
    db: Option<PathBuf>,

    /// Config file path (default: ./kpub.yaml, ./config.live.yaml or ~/.config/kpub/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum retry attempts for transient failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the publication list as Markdown (or save all lists)
    List(cmd::list::ListArgs),
    /// Interactively review a month of ADS search results
    Update(cmd::update::UpdateArgs),
    /// Add papers by ADS bibcode
    Add(cmd::add::AddArgs),
    /// Delete papers by ADS bibcode
    Delete(cmd::delete::DeleteArgs),
    /// Batch-import classified bibcodes from a CSV file
    Import(cmd::import::ImportArgs),
    /// Export the classifications as CSV
    Export,
    /// Write the per-paper spreadsheet (CSV)
    Spreadsheet(cmd::spreadsheet::SpreadsheetArgs),
    /// Write SVG charts
    Plot(cmd::plot::PlotArgs),
    /// Show publication metrics
    Metrics(cmd::metrics::MetricsArgs),
    /// Tabulate author affiliation types
    Affiliations(cmd::affiliations::AffiliationsArgs),
    /// Count instrument and archive mentions
    Words(cmd::words::WordsArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(ProgressContext::new());

    // TTY: quiet unless --debug, prompts and bars are the output
    // non-TTY: info, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    kpub_core::init_logging(Verbosity::from_flags(is_tty, cli.debug), multi);

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    // config file defaults, CLI overrides
    kpub_core::set_http_config(HttpConfig {
        timeout: std::time::Duration::from_secs(cli.timeout.unwrap_or(config.http.timeout)),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
    });

    let db_path = match cli.db {
        Some(path) => path,
        None => cmd::default_db_path()?,
    };

    if let Command::Config = cli.command {
        show_config(&config, &db_path);
        return Ok(());
    }

    let db = cmd::open_db(&db_path)?;
    match cli.command {
        Command::List(args) => cmd::list::run(args, &config, &db),
        Command::Update(args) => cmd::update::run(args, &config, &db),
        Command::Add(args) => cmd::add::run(args, &config, &db),
        Command::Delete(args) => cmd::delete::run(args, &db),
        Command::Import(args) => cmd::import::run(args, &config, &db, &progress),
        Command::Export => cmd::export::run(&db),
        Command::Spreadsheet(args) => cmd::spreadsheet::run(args, &db),
        Command::Plot(args) => cmd::plot::run(args, &config, &db),
        Command::Metrics(args) => cmd::metrics::run(args, &config, &db),
        Command::Affiliations(args) => cmd::affiliations::run(args, &config, &db),
        Command::Words(args) => cmd::words::run(args, &config, &db),
        Command::Config => Ok(()),
    }
}

fn show_config(config: &Config, db_path: &std::path::Path) {
    let list = |values: &[String]| {
        if values.is_empty() {
            "-".to_string()
        } else {
            values.join(", ")
        }
    };

    let mut table = cmd::styled_table(&["Setting", "Value"]);
    table.add_row(vec!["Database", &db_path.display().to_string()]);
    table.add_row(vec!["Facility", &config.facility()]);
    table.add_row(vec!["Missions", &list(&config.missions)]);
    table.add_row(vec!["Sciences", &list(&config.sciences)]);
    table.add_row(vec!["Instruments", &list(&config.instruments)]);
    table.add_row(vec!["Archive words", &list(&config.archive)]);
    table.add_row(vec![
        "Query terms",
        &format!(
            "{} acknowledgement, {} title/abstract",
            config.ads_query_terms_group_1.len(),
            config.ads_query_terms_group_2.len()
        ),
    ]);
    table.add_row(vec!["ADS base URL", &config.ads.base_url]);
    table.add_row(vec![
        "ADS token",
        if kpub_ads::resolve_token(&config.ads).is_ok() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec![
        "Affiliation rules",
        &format!(
            "{} (default: {}, positions: {})",
            config.affiliations.rules.len(),
            config.affiliations.default,
            config.affiliations.positions
        ),
    ]);
    table.add_row(vec!["Text fields", &list(&config.text_fields)]);
    table.add_row(vec!["First chart year", &config.year_begin.to_string()]);
    table.add_row(vec!["Timeout", &format!("{}s", config.http.timeout)]);
    table.add_row(vec!["Max retries", &config.http.max_retries.to_string()]);

    eprintln!("\n{table}");
}
