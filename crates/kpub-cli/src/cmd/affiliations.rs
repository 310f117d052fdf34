//! `kpub affiliations` - author affiliation types by year
//!
//! With `--legacy`, the rule set is checked against a hand-classified
//! spreadsheet (`BibCode`, `AUaff1`..`AUaff3` columns holding a leading
//! digit code) and every disagreement is printed.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kpub_ads::Article;
use kpub_core::fmt_num;
use kpub_match::{AffCounts, RuleSet, get_aff_counts_by_year};
use kpub_store::{Filter, PublicationDb};
use serde::Deserialize;

use crate::cmd::styled_table;
use crate::config::Config;

/// Author positions held by the legacy spreadsheet
const LEGACY_POSITIONS: usize = 3;

#[derive(Args, Debug)]
pub struct AffiliationsArgs {
    /// Number of leading author positions to tabulate (default: config)
    #[arg(long)]
    pub positions: Option<usize>,

    /// Compare against a legacy classification CSV instead
    #[arg(long)]
    pub legacy: Option<PathBuf>,
}

/// Rows of one position's table: year, one count per kind, unknown.
pub fn count_rows(counts: &AffCounts, kinds: &[&str]) -> Vec<Vec<String>> {
    let cell = |m: Option<&std::collections::BTreeMap<i32, usize>>, year: i32| {
        fmt_num(m.and_then(|m| m.get(&year)).copied().unwrap_or(0) as u64)
    };
    counts
        .years()
        .into_iter()
        .map(|year| {
            let mut row = vec![year.to_string()];
            row.extend(kinds.iter().map(|k| cell(counts.by_kind.get(*k), year)));
            row.push(cell(Some(&counts.unknown), year));
            row
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct LegacyRow {
    #[serde(rename = "BibCode", default)]
    bibcode: String,
    #[serde(rename = "AUaff1", default)]
    aff1: String,
    #[serde(rename = "AUaff2", default)]
    aff2: String,
    #[serde(rename = "AUaff3", default)]
    aff3: String,
}

/// A position where the rules and the legacy sheet disagree. Empty kinds
/// mean "no classification".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disagreement {
    pub bibcode: String,
    /// 1-based author position
    pub position: usize,
    pub computed: String,
    pub legacy: String,
    pub affiliation: String,
    pub legacy_raw: String,
}

/// Kind named by a legacy cell: its leading digit through the rule order.
fn legacy_kind<'r>(rules: &'r RuleSet, cell: &str) -> Option<&'r str> {
    let code = cell.trim().chars().next()?.to_digit(10)?;
    rules.kind_for_code(code as usize)
}

fn compare_article(rules: &RuleSet, article: &Article, row: &LegacyRow) -> Vec<Disagreement> {
    let affs = article.affiliations();
    let cells = [&row.aff1, &row.aff2, &row.aff3];
    let mut out = Vec::new();
    for (i, cell) in cells.iter().enumerate().take(LEGACY_POSITIONS) {
        let aff = affs.get(i).copied().unwrap_or_default();
        let computed = if i < affs.len() {
            rules.classify(aff).unwrap_or_default()
        } else {
            ""
        };
        let legacy = legacy_kind(rules, cell).unwrap_or_default();
        if computed != legacy {
            out.push(Disagreement {
                bibcode: article.bibcode().to_string(),
                position: i + 1,
                computed: computed.to_string(),
                legacy: legacy.to_string(),
                affiliation: aff.to_string(),
                legacy_raw: cell.trim().to_string(),
            });
        }
    }
    out
}

/// Compare every legacy row whose first cell carries a code and whose
/// bibcode is stored.
pub fn compare_legacy<R: Read>(reader: R, db: &PublicationDb, rules: &RuleSet) -> Result<Vec<Disagreement>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<LegacyRow>().enumerate() {
        let row = row.with_context(|| format!("Legacy CSV line {}", idx + 2))?;
        let bibcode = row.bibcode.trim();
        if bibcode.is_empty() || legacy_kind(rules, &row.aff1).is_none() {
            continue;
        }
        let Some(article) = db.get_metadata(bibcode)? else {
            log::debug!("{bibcode}: not in the db");
            continue;
        };
        out.extend(compare_article(rules, &article, &row));
    }
    Ok(out)
}

pub fn run(args: AffiliationsArgs, config: &Config, db: &PublicationDb) -> Result<()> {
    let rules = RuleSet::from_config(&config.affiliations).context("Invalid affiliations config")?;

    if let Some(path) = args.legacy {
        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let disagreements = compare_legacy(file, db, &rules)?;
        for d in &disagreements {
            println!(
                "{}\n\tAff{} {} != {}\n\t{}\n\t{}",
                d.bibcode, d.position, d.computed, d.legacy, d.affiliation, d.legacy_raw
            );
        }
        eprintln!("{} disagreement(s)", disagreements.len());
        return Ok(());
    }

    let articles: Vec<Article> = db
        .query(&Filter::all())?
        .into_iter()
        .map(|p| p.article)
        .collect();
    let kinds = rules.kinds();
    let positions = args.positions.unwrap_or(config.affiliations.positions);
    for position in 0..positions {
        let counts = get_aff_counts_by_year(&articles, &rules, position);
        let mut headers = vec!["Year".to_string()];
        headers.extend(kinds.iter().map(|k| k.to_string()));
        headers.push("unknown".to_string());
        let mut table = styled_table(&headers);
        for row in count_rows(&counts, &kinds) {
            table.add_row(row);
        }
        eprintln!("\nAuthor {}:\n{table}", position + 1);
    }
    Ok(())
}
