//! `kpub words` - instrument and archive mentions across stored papers

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use comfy_table::Table;
use kpub_ads::Article;
use kpub_core::fmt_num;
use kpub_match::{
    WordMatcher, get_word_match_counts_by_mission, get_word_match_counts_by_pub,
    get_word_match_counts_by_year,
};
use kpub_store::{Filter, PublicationDb};

use crate::cmd::styled_table;
use crate::config::Config;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    #[default]
    Year,
    Mission,
    /// One row per paper with its occurrence counts
    Pub,
}

#[derive(Args, Debug)]
pub struct WordsArgs {
    /// Article field to search; repeatable (default: config `text_fields`)
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Roll the counts up by
    #[arg(long, value_enum, default_value_t)]
    pub by: GroupBy,
}

/// `word -> column -> count` as a table with one row per word and one
/// column per key, missing cells as zero.
pub fn pivot<K: Ord + ToString + Clone>(counts: &BTreeMap<String, BTreeMap<K, usize>>, corner: &str) -> Table {
    let mut columns: Vec<K> = counts.values().flat_map(|m| m.keys().cloned()).collect();
    columns.sort();
    columns.dedup();

    let mut headers = vec![corner.to_string()];
    headers.extend(columns.iter().map(ToString::to_string));
    headers.push("Total".to_string());
    let mut table = styled_table(&headers);
    for (word, row) in counts {
        let mut cells = vec![word.clone()];
        cells.extend(
            columns
                .iter()
                .map(|c| fmt_num(row.get(c).copied().unwrap_or(0) as u64)),
        );
        cells.push(fmt_num(row.values().sum::<usize>() as u64));
        table.add_row(cells);
    }
    table
}

fn report(articles: &[Article], matcher: &WordMatcher, fields: &[String], by: GroupBy, label: &str) -> String {
    match by {
        GroupBy::Year => pivot(&get_word_match_counts_by_year(articles, matcher, fields), label).to_string(),
        GroupBy::Mission => {
            pivot(&get_word_match_counts_by_mission(articles, matcher, fields), label).to_string()
        }
        GroupBy::Pub => pivot(&get_word_match_counts_by_pub(articles, matcher, fields), "Bibcode").to_string(),
    }
}

pub fn run(args: WordsArgs, config: &Config, db: &PublicationDb) -> Result<()> {
    let fields = if args.fields.is_empty() {
        config.text_fields.clone()
    } else {
        args.fields
    };
    // records stored before classifications were embedded lack the mission
    let articles: Vec<Article> = db
        .query(&Filter::all())?
        .into_iter()
        .map(|p| {
            let mut article = p.article;
            article.set_classification(&p.mission, &p.science);
            article
        })
        .collect();
    log::info!("Counting words in {} paper(s) over {fields:?}", articles.len());

    for (label, words) in [("Instrument", &config.instruments), ("Archive", &config.archive)] {
        if words.is_empty() {
            log::warn!("No {} words configured", label.to_lowercase());
            continue;
        }
        let matcher = WordMatcher::new(words).with_context(|| format!("Invalid {label} words"))?;
        eprintln!("\n{}", report(&articles, &matcher, &fields, args.by, label));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pivot_fills_gaps_and_totals() {
        let mut counts: BTreeMap<String, BTreeMap<i32, usize>> = BTreeMap::new();
        counts.entry("HIRES".into()).or_default().insert(2020, 3);
        counts.entry("HIRES".into()).or_default().insert(2022, 1);
        counts.entry("NIRC2".into()).or_default().insert(2021, 2);
        let table = pivot(&counts, "Instrument");

        let header: Vec<String> = table
            .header()
            .unwrap()
            .cell_iter()
            .map(|c| c.content())
            .collect();
        assert_eq!(header, vec!["Instrument", "2020", "2021", "2022", "Total"]);

        let rendered = table.to_string();
        let hires = rendered.lines().find(|l| l.contains("HIRES")).unwrap();
        let cells: Vec<&str> = hires
            .split('│')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        assert_eq!(cells, vec!["HIRES", "3", "0", "1", "4"]);
    }

    #[test]
    fn report_by_pub_uses_bibcodes() {
        let article = Article::from_value(serde_json::json!({
            "bibcode": "2020ApJ...1A",
            "year": "2020",
            "abstract": "HIRES and HIRES again",
        }))
        .unwrap();
        let matcher = WordMatcher::new(&["HIRES"]).unwrap();
        let out = report(&[article], &matcher, &["abstract".to_string()], GroupBy::Pub, "Instrument");
        assert!(out.contains("Bibcode"));
        assert!(out.contains("2020ApJ...1A"));
    }
}
