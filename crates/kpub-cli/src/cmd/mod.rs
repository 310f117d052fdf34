//! Subcommand implementations

pub mod add;
pub mod affiliations;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod metrics;
pub mod plot;
pub mod spreadsheet;
pub mod update;
pub mod words;

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use kpub_ads::AdsClient;
use kpub_store::{DEFAULT_DB_NAME, PublicationDb};

use crate::config::Config;

/// `~/.kpub.db`
pub fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().context("Cannot determine the home directory")?;
    Ok(dirs.home_dir().join(DEFAULT_DB_NAME))
}

pub fn open_db(path: &Path) -> Result<PublicationDb> {
    log::debug!("Opening {}", path.display());
    PublicationDb::open(path)
}

pub fn ads_client(config: &Config) -> Result<AdsClient> {
    AdsClient::new(config.ads.clone()).context("ADS access is not configured")
}

/// Table with the shared look and cyan headers.
pub fn styled_table<S: AsRef<str>>(headers: &[S]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.as_ref()).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

/// Write to stdout; a closed pipe (`kpub | head`) ends output quietly.
pub fn write_stdout(text: &str) -> Result<()> {
    let mut out = std::io::stdout().lock();
    match out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write to stdout"),
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
