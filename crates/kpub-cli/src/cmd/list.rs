//! `kpub list` - Markdown publication lists and the overview page

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Args;
use kpub_report::{ListOptions, Overview, Reporter, capitalize};
use kpub_store::{Filter, PublicationDb};

use crate::cmd::write_stdout;
use crate::config::Config;

/// Papers in the overview's most-cited table
const MOST_CITED: usize = 20;
/// Papers needed to appear among the most active first authors
const MIN_FIRST_AUTHOR_PAPERS: usize = 6;
const OVERVIEW_NAME: &str = "publications.md";

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show a particular mission (default: all)
    #[arg(long)]
    pub mission: Option<String>,

    /// Only show a particular science (default: all)
    #[arg(long)]
    pub science: Option<String>,

    /// Group the papers by month rather than year
    #[arg(short, long)]
    pub month: bool,

    /// Write every list and the overview page instead of printing
    #[arg(short, long)]
    pub save: bool,

    /// Output directory for --save
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

pub fn run(args: ListArgs, config: &Config, db: &PublicationDb) -> Result<()> {
    let reporter = Reporter::new()?;
    if args.save {
        let now = chrono::Local::now().naive_local();
        let written = save_all(&reporter, db, config, &args.output, now)?;
        eprintln!("Wrote {} files to {}", written.len(), args.output.display());
        return Ok(());
    }

    let mut filter = Filter::all();
    if let Some(mission) = args.mission {
        filter = filter.mission(mission);
    }
    if let Some(science) = args.science {
        filter = filter.science(science);
    }
    let pubs = db.query(&filter)?;
    let title = format!("{} publications", config.facility()).trim().to_string();
    let options = ListOptions::new(title).by_month(args.month);
    write_stdout(&reporter.to_markdown(&pubs, &options)?)
}

/// Lists for all papers, each science and each mission (by year and by
/// month), then the overview page. Returns the written paths.
pub fn save_all(
    reporter: &Reporter,
    db: &PublicationDb,
    config: &Config,
    out_dir: &Path,
    now: NaiveDateTime,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let facility = config.facility();
    let mut written = Vec::new();

    for by_month in [true, false] {
        let (suffix, title_suffix) = if by_month {
            ("-by-month", " by month")
        } else {
            ("", "")
        };
        let mut save = |name: String, title: String, filter: Filter| -> Result<()> {
            let path = out_dir.join(name);
            let pubs = db.query(&filter)?;
            let options = ListOptions::new(title.trim()).by_month(by_month);
            reporter.save_markdown(&path, &pubs, &options)?;
            written.push(path);
            Ok(())
        };

        save(
            format!("kpub{suffix}.md"),
            format!("{facility} publications{title_suffix}"),
            Filter::all(),
        )?;
        for science in &config.sciences {
            save(
                format!("kpub-{science}{suffix}.md"),
                format!("{facility} {science} publications{title_suffix}"),
                Filter::all().science(science),
            )?;
        }
        for mission in &config.missions {
            save(
                format!("kpub-{mission}{suffix}.md"),
                format!("{} publications{title_suffix}", capitalize(mission)),
                Filter::all().mission(mission),
            )?;
        }
    }

    let metrics = db.get_metrics(&Filter::all(), &config.missions, &config.sciences)?;
    let most_cited = db.get_most_cited(&Filter::all(), MOST_CITED)?;
    let first_authors = db.get_most_active_first_authors(MIN_FIRST_AUTHOR_PAPERS)?;
    let overview = Overview {
        title: format!("{facility} publication metrics").trim().to_string(),
        metrics: &metrics,
        most_cited: &most_cited,
        most_active_first_authors: &first_authors,
        generated: now.format("%Y-%m-%d %H:%M").to_string(),
    };
    let path = out_dir.join(OVERVIEW_NAME);
    log::info!("Writing {}", path.display());
    std::fs::write(&path, reporter.overview(&overview)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    written.push(path);
    Ok(written)
}
