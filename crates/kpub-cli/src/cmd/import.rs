//! `kpub import` - batch classification from a CSV file
//!
//! Each line is `bibcode,mission,science[,instruments,archive]`; the paper's
//! metadata is fetched from ADS, so a long file takes a while. Ctrl-C stops
//! after the current line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use kpub_core::{ProgressContext, StopSignal, fmt_num};
use kpub_store::{Classification, PublicationDb, parse_instruments};

use crate::cmd::ads_client;
use crate::config::Config;
use crate::review::ArticleSource;

const MAX_ATTEMPTS: usize = 5;
/// Pause after each successful lookup
const PAUSE: Duration = Duration::from_millis(100);

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file to ingest
    pub csvfile: PathBuf,
}

/// One parsed import line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    pub bibcode: String,
    pub classification: Classification,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Parse one CSV record; `None` for blank lines.
pub fn parse_line(record: &csv::StringRecord) -> Result<Option<ImportLine>> {
    let field = |i: usize| record.get(i).map(str::trim).unwrap_or_default();
    if record.iter().all(|f| f.trim().is_empty()) {
        return Ok(None);
    }
    let bibcode = field(0);
    anyhow::ensure!(
        record.len() >= 3 && !bibcode.is_empty() && !field(1).is_empty(),
        "expected bibcode,mission,science but got {:?}",
        record.iter().collect::<Vec<_>>().join(",")
    );
    let classification = Classification::new(field(1), field(2))
        .with_instruments(parse_instruments(field(3)))
        .with_archive(parse_flag(field(4)));
    Ok(Some(ImportLine {
        bibcode: bibcode.to_string(),
        classification,
    }))
}

fn read_lines(path: &Path) -> Result<Vec<ImportLine>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut lines = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: line {}", path.display(), idx + 1))?;
        match parse_line(&record) {
            Ok(Some(line)) => lines.push(line),
            Ok(None) => {}
            Err(e) => log::warn!("{}: line {} skipped: {e}", path.display(), idx + 1),
        }
    }
    Ok(lines)
}

/// Look up one bibcode and store every returned record with the line's
/// classification. Returns the number of new rows.
fn import_one<S: ArticleSource>(db: &PublicationDb, source: &S, line: &ImportLine) -> Result<usize> {
    if db.contains_bibcode(&line.bibcode)? {
        log::warn!("{} is already in the db.", line.bibcode);
        return Ok(0);
    }
    let mut added = 0;
    for article in source.get_by_bibcode(&line.bibcode)? {
        if db.contains(&article)? {
            log::warn!("{} is already in the db.", article.bibcode());
            continue;
        }
        if db.add(&article, &line.classification)? {
            added += 1;
        }
    }
    Ok(added)
}

/// Import every line, retrying failed lookups up to five times.
pub fn import_lines<S: ArticleSource>(
    db: &PublicationDb,
    source: &S,
    lines: &[ImportLine],
    progress: &ProgressContext,
    stop: &StopSignal,
    pause: Duration,
) -> ImportSummary {
    let pb = progress.items_bar("import", lines.len() as u64);
    let mut summary = ImportSummary::default();

    for line in lines {
        if stop.is_set() {
            log::warn!("Interrupted, stopping before {}", line.bibcode);
            summary.interrupted = true;
            break;
        }
        pb.set_message(line.bibcode.clone());

        let mut outcome = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match import_one(db, source, line) {
                Ok(n) => {
                    outcome = Some(n);
                    std::thread::sleep(pause);
                    break;
                }
                Err(e) => log::warn!("attempt #{attempt} for {}: error '{e:#}'", line.bibcode),
            }
        }
        match outcome {
            Some(0) => summary.skipped += 1,
            Some(n) => summary.added += n,
            None => {
                log::error!("Giving up on {} after {MAX_ATTEMPTS} attempts", line.bibcode);
                summary.failed += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    summary
}

pub fn run(args: ImportArgs, config: &Config, db: &PublicationDb, progress: &ProgressContext) -> Result<()> {
    let lines = read_lines(&args.csvfile)?;
    log::info!("Importing {} line(s) from {}", lines.len(), args.csvfile.display());
    let client = ads_client(config)?;
    let stop = StopSignal::install().context("Failed to install signal handler")?;

    let summary = import_lines(db, &client, &lines, progress, &stop, PAUSE);
    progress.println(format!(
        "Imported {} paper(s), {} already stored, {} failed",
        fmt_num(summary.added as u64),
        fmt_num(summary.skipped as u64),
        fmt_num(summary.failed as u64),
    ));
    if summary.interrupted {
        anyhow::bail!("Import interrupted");
    }
    Ok(())
}
