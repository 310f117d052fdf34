//! Flat CSV export of the classified papers

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use kpub_store::{StoredPub, UNRELATED};
use serde::Serialize;

/// Default output file name.
pub const SPREADSHEET_NAME: &str = "kpub-publications.csv";

/// One spreadsheet line. List fields are joined with `; `.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadsheetRow {
    pub bibcode: String,
    pub year: String,
    pub date: String,
    pub mission: String,
    pub science: String,
    pub refereed: &'static str,
    pub citation_count: Option<u64>,
    pub citations_per_year: f64,
    pub read_count: Option<u64>,
    pub first_author_norm: String,
    pub title: String,
    pub keyword_norm: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub co_author_norm: String,
    pub affiliations: String,
    pub instruments: String,
    pub archive: bool,
}

/// ADS pubdate (`YYYY-MM-DD`, month and day may be `00`) as a date, with
/// unknown parts set to the first month / day.
pub fn parse_pubdate(date: &str) -> Option<NaiveDate> {
    let mut parts = date.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next().map_or(Ok(0), str::parse).ok()?;
    let day: u32 = parts.next().map_or(Ok(0), str::parse).ok()?;
    NaiveDate::from_ymd_opt(year, month.max(1), day.max(1))
}

/// Citations divided by age in years (365 days), rounded to two decimals.
/// Zero when the count, the date or the age is missing.
pub fn citations_per_year(citations: Option<u64>, published: Option<NaiveDate>, today: NaiveDate) -> f64 {
    let (Some(citations), Some(published)) = (citations, published) else {
        return 0.0;
    };
    let age_days = (today - published).num_days();
    if age_days == 0 {
        return 0.0;
    }
    let rate = citations as f64 / (age_days as f64 / 365.0);
    (rate * 100.0).round() / 100.0
}

fn refereed_label(p: &StoredPub) -> &'static str {
    if p.article.is_refereed() {
        "REFEREED"
    } else if p.article.is_not_refereed() {
        "NOT REFEREED"
    } else {
        ""
    }
}

impl SpreadsheetRow {
    pub fn new(p: &StoredPub, today: NaiveDate) -> Self {
        let article = &p.article;
        let citation_count = article.citation_count();
        Self {
            bibcode: p.bibcode.clone(),
            year: p.year.clone(),
            date: p.date.clone(),
            mission: p.mission.clone(),
            science: p.science.clone(),
            refereed: refereed_label(p),
            citation_count,
            citations_per_year: citations_per_year(citation_count, parse_pubdate(&p.date), today),
            read_count: article.read_count(),
            first_author_norm: article.first_author_norm().unwrap_or_default().to_string(),
            title: article.title().to_string(),
            keyword_norm: article.keyword_norm().join("; "),
            abstract_text: article.abstract_text().unwrap_or_default().to_string(),
            co_author_norm: article.author_norm().join("; "),
            affiliations: article.affiliations().join("; "),
            instruments: p.instruments.join(", "),
            archive: p.archive,
        }
    }
}

/// Write a header plus one row per paper, ordered by bibcode. Papers marked
/// `unrelated` are left out. Returns the number of rows.
pub fn write_spreadsheet<W: Write>(writer: W, pubs: &[StoredPub], today: NaiveDate) -> Result<usize> {
    let mut rows: Vec<SpreadsheetRow> = pubs
        .iter()
        .filter(|p| p.mission != UNRELATED)
        .map(|p| SpreadsheetRow::new(p, today))
        .collect();
    rows.sort_by(|a, b| a.bibcode.cmp(&b.bibcode));

    let mut csv = csv::Writer::from_writer(writer);
    for row in &rows {
        csv.serialize(row).context("Failed to write spreadsheet row")?;
    }
    csv.flush().context("Failed to flush spreadsheet")?;
    Ok(rows.len())
}

pub fn save_spreadsheet(path: &Path, pubs: &[StoredPub], today: NaiveDate) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    log::info!("Writing {}", path.display());
    write_spreadsheet(file, pubs, today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpub_ads::Article;
    use serde_json::{Value, json};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stored(bibcode: &str, mission: &str, date: &str, raw: Value) -> StoredPub {
        let mut raw = raw;
        raw["bibcode"] = json!(bibcode);
        StoredPub {
            bibcode: bibcode.into(),
            year: date[..4].into(),
            month: date[..7].into(),
            date: date.into(),
            mission: mission.into(),
            science: "planets".into(),
            instruments: vec!["HIRES".into(), "KPF".into()],
            archive: true,
            article: Article::from_value(raw).unwrap(),
        }
    }

    #[test]
    fn pubdate_with_zero_parts() {
        assert_eq!(parse_pubdate("2019-04-00"), Some(date(2019, 4, 1)));
        assert_eq!(parse_pubdate("2019-00-00"), Some(date(2019, 1, 1)));
        assert_eq!(parse_pubdate("2019-04-17"), Some(date(2019, 4, 17)));
        assert_eq!(parse_pubdate("2019"), Some(date(2019, 1, 1)));
        assert_eq!(parse_pubdate("garbage"), None);
    }

    #[test]
    fn citation_rate() {
        let today = date(2021, 1, 1);
        // 366 days old
        assert_eq!(citations_per_year(Some(10), Some(date(2020, 1, 1)), today), 9.97);
        assert_eq!(citations_per_year(None, Some(date(2020, 1, 1)), today), 0.0);
        assert_eq!(citations_per_year(Some(3), Some(today), today), 0.0);
        assert_eq!(citations_per_year(Some(3), None, today), 0.0);
    }

    #[test]
    fn rows_sorted_and_unrelated_excluded() {
        let pubs = vec![
            stored("2020B", "keck", "2020-01-00", json!({"property": ["REFEREED"], "citation_count": 5})),
            stored("2020A", "keck", "2020-01-00", json!({"property": ["NOT REFEREED"]})),
            stored("2020C", "unrelated", "2020-01-00", json!({})),
        ];
        let mut out = Vec::new();
        let n = write_spreadsheet(&mut out, &pubs, date(2021, 1, 1)).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("bibcode,year,date,mission,science,refereed,citation_count"));
        assert!(lines[0].ends_with("affiliations,instruments,archive"));
        assert!(lines[1].starts_with("2020A,2020,2020-01-00,keck,planets,NOT REFEREED,,0.0,"));
        assert!(lines[2].starts_with("2020B,2020,2020-01-00,keck,planets,REFEREED,5,"));
        assert!(lines[2].contains("\"HIRES, KPF\",true"));
    }

    #[test]
    fn null_property_has_empty_refereed_column() {
        let p = stored("X", "keck", "2020-00-00", json!({"property": null, "title": ["T"]}));
        let row = SpreadsheetRow::new(&p, date(2021, 1, 1));
        assert_eq!(row.refereed, "");
        assert_eq!(row.title, "T");
    }
}
