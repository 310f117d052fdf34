//! `kpub metrics` - publication metrics tables

use anyhow::Result;
use clap::Args;
use kpub_core::fmt_num;
use kpub_report::capitalize;
use kpub_store::{Filter, Metrics, PublicationDb, StoredPub};

use crate::cmd::styled_table;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Restrict to publication year(s); repeatable
    #[arg(long = "year")]
    pub years: Vec<i32>,

    /// Also list the N most cited and most read papers
    #[arg(long)]
    pub top: Option<usize>,

    /// Also list the N authors with the most papers
    #[arg(long)]
    pub authors: Option<usize>,
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Rows of the group table: all papers, then each mission.
pub fn group_rows(metrics: &Metrics) -> Vec<Vec<String>> {
    std::iter::once(("All".to_string(), &metrics.overall))
        .chain(metrics.missions.iter().map(|(m, g)| (capitalize(m), g)))
        .map(|(name, g)| {
            vec![
                name,
                fmt_num(g.publication_count),
                fmt_num(g.refereed_count),
                fmt_num(g.phd_count),
                fmt_num(g.citation_count),
                fmt_num(g.author_count),
                fmt_num(g.first_author_count),
                percent(g.fraction),
            ]
        })
        .collect()
}

fn paper_table(title: &str, pubs: &[StoredPub], count: impl Fn(&StoredPub) -> Option<u64>) -> String {
    let mut table = styled_table(&["#", "Bibcode", title, "Title"]);
    for (idx, p) in pubs.iter().enumerate() {
        table.add_row(vec![
            (idx + 1).to_string(),
            p.bibcode.clone(),
            count(p).map_or_else(String::new, fmt_num),
            p.article.title().to_string(),
        ]);
    }
    table.to_string()
}

pub fn run(args: MetricsArgs, config: &Config, db: &PublicationDb) -> Result<()> {
    let filter = if args.years.is_empty() {
        Filter::all()
    } else {
        Filter::all().years(args.years.clone())
    };
    let metrics = db.get_metrics(&filter, &config.missions, &config.sciences)?;

    let mut table = styled_table(&[
        "Group",
        "Publications",
        "Refereed",
        "PhD theses",
        "Citations",
        "Authors",
        "First authors",
        "Share",
    ]);
    for row in group_rows(&metrics) {
        table.add_row(row);
    }
    eprintln!("\n{table}");

    if !metrics.sciences.is_empty() {
        let mut table = styled_table(&["Science", "Publications", "Share"]);
        for (science, m) in &metrics.sciences {
            table.add_row(vec![capitalize(science), fmt_num(m.count), percent(m.fraction)]);
        }
        eprintln!("\n{table}");
    }

    if let Some(top) = args.top {
        let cited = db.get_most_cited(&filter, top)?;
        eprintln!("\n{}", paper_table("Citations", &cited, |p| p.article.citation_count()));
        let read = db.get_most_read(&filter, top)?;
        eprintln!("\n{}", paper_table("Reads", &read, |p| p.article.read_count()));
    }

    if let Some(top) = args.authors {
        let mut table = styled_table(&["Author", "Publications"]);
        for (name, n) in db.get_all_authors(top)? {
            table.add_row(vec![name, fmt_num(n as u64)]);
        }
        eprintln!("\n{table}");
    }
    Ok(())
}
