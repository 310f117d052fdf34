//! Row types of the `pubs` table

use kpub_ads::Article;
use rusqlite::Row;
use rusqlite::types::ValueRef;
use serde::Serialize;

/// Mission value that permanently marks a paper as reviewed and rejected.
pub const UNRELATED: &str = "unrelated";

/// User-assigned tags for one paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub mission: String,
    pub science: String,
    pub instruments: Vec<String>,
    /// Paper used archival data
    pub archive: bool,
}

impl Classification {
    pub fn new(mission: impl Into<String>, science: impl Into<String>) -> Self {
        Self {
            mission: mission.into(),
            science: science.into(),
            ..Default::default()
        }
    }

    pub fn with_instruments(mut self, instruments: Vec<String>) -> Self {
        self.instruments = instruments;
        self
    }

    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    pub fn instruments_column(&self) -> String {
        self.instruments.join(",")
    }
}

/// Split a stored instrument list (`,`, `;` or `/` separated).
pub fn parse_instruments(column: &str) -> Vec<String> {
    column
        .split([',', ';', '/'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Read an untyped column as text. Older databases hold years as integers
/// and nulls in the added columns.
pub(crate) fn text_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    })
}

pub(crate) fn bool_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => false,
        ValueRef::Integer(i) => i != 0,
        ValueRef::Real(f) => f != 0.0,
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            matches!(t, b"1" | b"true" | b"True" | b"yes")
        }
    })
}

/// A stored paper: classification columns plus the parsed raw record.
#[derive(Debug, Clone, Serialize)]
pub struct StoredPub {
    pub bibcode: String,
    pub year: String,
    pub month: String,
    pub date: String,
    pub mission: String,
    pub science: String,
    pub instruments: Vec<String>,
    pub archive: bool,
    #[serde(skip)]
    pub article: Article,
}

impl StoredPub {
    /// Columns in the order expected by [`StoredPub::from_row`].
    pub(crate) const COLUMNS: &'static str =
        "bibcode, year, month, date, mission, science, instruments, archive, metrics";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let bibcode = text_column(row, 0)?;
        let json = text_column(row, 8)?;
        let article = Article::from_json(&json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(Self {
            bibcode,
            year: text_column(row, 1)?,
            month: text_column(row, 2)?,
            date: text_column(row, 3)?,
            mission: text_column(row, 4)?,
            science: text_column(row, 5)?,
            instruments: parse_instruments(&text_column(row, 6)?),
            archive: bool_column(row, 7)?,
            article,
        })
    }

    pub fn year_number(&self) -> Option<i32> {
        self.year.trim().parse().ok()
    }

    pub fn has_instrument(&self, instrument: &str) -> bool {
        self.instruments
            .iter()
            .any(|i| i.eq_ignore_ascii_case(instrument))
    }
}

/// Classification columns only, for CSV export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRow {
    pub bibcode: String,
    pub mission: String,
    pub science: String,
    pub instruments: String,
    pub archive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruments_split_on_separators() {
        assert_eq!(
            parse_instruments("HIRES, NIRSPEC;OSIRIS / LRIS"),
            vec!["HIRES", "NIRSPEC", "OSIRIS", "LRIS"]
        );
        assert!(parse_instruments("").is_empty());
        assert!(parse_instruments(" , ").is_empty());
    }

    #[test]
    fn classification_builder() {
        let c = Classification::new("keck", "planets")
            .with_instruments(vec!["HIRES".into(), "KPF".into()])
            .with_archive(true);
        assert_eq!(c.instruments_column(), "HIRES,KPF");
        assert!(c.archive);
    }
}
