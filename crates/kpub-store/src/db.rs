//! SQLite publication database

use std::path::Path;

use anyhow::{Context, Result};
use kpub_ads::Article;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params, params_from_iter};

use crate::filter::Filter;
use crate::record::{Classification, ClassificationRow, StoredPub, text_column, bool_column};

/// File name of the default database in the home directory.
pub const DEFAULT_DB_NAME: &str = ".kpub.db";

/// Columns are untyped on purpose: databases written by earlier versions
/// store years as text and must keep loading.
const CREATE_TABLE: &str = "CREATE TABLE pubs(
    id UNIQUE,
    bibcode UNIQUE,
    year,
    month,
    date,
    mission,
    science,
    metrics,
    instruments,
    archive)";

/// Columns added after the first schema; added on open when missing.
const ADDED_COLUMNS: &[&str] = &["instruments", "archive"];

/// Wrapper around the SQLite connection holding the `pubs` table.
pub struct PublicationDb {
    con: Connection,
}

impl PublicationDb {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let con = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        log::debug!("Opened database {}", path.display());
        Self::init(con)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().context("Failed to open in-memory database")?)
    }

    fn init(con: Connection) -> Result<Self> {
        let db = Self { con };
        let exists: i64 = db.con.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='pubs'",
            [],
            |row| row.get(0),
        )?;
        if exists == 0 {
            db.con
                .execute_batch(CREATE_TABLE)
                .context("Failed to create pubs table")?;
            log::info!("Created pubs table");
        } else {
            db.migrate()?;
        }
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let mut stmt = self.con.prepare("PRAGMA table_info(pubs)")?;
        let existing: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<_>>()?;
        for column in ADDED_COLUMNS {
            if !existing.iter().any(|c| c == column) {
                log::info!("Adding column {column} to pubs table");
                self.con
                    .execute_batch(&format!("ALTER TABLE pubs ADD COLUMN {column}"))
                    .with_context(|| format!("Failed to add column {column}"))?;
            }
        }
        Ok(())
    }

    /// Insert a classified article. Returns `false` when it was already stored.
    pub fn add(&self, article: &Article, classification: &Classification) -> Result<bool> {
        log::debug!("Ingesting {}", article.bibcode());
        let mut article = article.clone();
        article.set_classification(&classification.mission, &classification.science);
        article.set_tags(&classification.instruments, classification.archive);

        let result = self.con.execute(
            "INSERT INTO pubs (id, bibcode, year, month, date, mission, science, metrics, instruments, archive)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                article.id(),
                article.bibcode(),
                article.year(),
                article.month(),
                article.pubdate(),
                classification.mission,
                classification.science,
                article.to_json(),
                classification.instruments_column(),
                i64::from(classification.archive),
            ],
        );
        match result {
            Ok(n) => {
                log::info!("Inserted {n} row(s).");
                Ok(true)
            }
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                log::warn!("{} was already ingested.", article.bibcode());
                Ok(false)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to insert {}", article.bibcode())),
        }
    }

    /// Whether a paper with the same ADS id or bibcode is stored.
    pub fn contains(&self, article: &Article) -> Result<bool> {
        let count: i64 = self.con.query_row(
            "SELECT COUNT(*) FROM pubs WHERE id = ?1 OR bibcode = ?2",
            params![article.id(), article.bibcode()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn contains_bibcode(&self, bibcode: &str) -> Result<bool> {
        let count: i64 = self.con.query_row(
            "SELECT COUNT(*) FROM pubs WHERE bibcode = ?1",
            [bibcode],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_by_bibcode(&self, bibcode: &str) -> Result<usize> {
        let n = self
            .con
            .execute("DELETE FROM pubs WHERE bibcode = ?1", [bibcode])
            .with_context(|| format!("Failed to delete {bibcode}"))?;
        log::info!("Deleted {n} row(s).");
        Ok(n)
    }

    /// Papers matching the filter, newest first.
    pub fn query(&self, filter: &Filter) -> Result<Vec<StoredPub>> {
        let (clause, values) = filter.to_sql();
        let sql = format!(
            "SELECT {} FROM pubs WHERE {clause} ORDER BY date DESC, bibcode ASC",
            StoredPub::COLUMNS
        );
        let mut stmt = self.con.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), StoredPub::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read publications")?;
        Ok(rows.into_iter().filter(|p| filter.keeps(p)).collect())
    }

    /// Raw stored record of one paper.
    pub fn get_metadata(&self, bibcode: &str) -> Result<Option<Article>> {
        let json: Option<String> = self
            .con
            .query_row(
                "SELECT metrics FROM pubs WHERE bibcode = ?1",
                [bibcode],
                |row| text_column(row, 0),
            )
            .optional()?;
        json.map(|j| {
            Article::from_json(&j).with_context(|| format!("Corrupt metadata for {bibcode}"))
        })
        .transpose()
    }

    /// Every classification (including `unrelated`) ordered by bibcode.
    pub fn all_classifications(&self) -> Result<Vec<ClassificationRow>> {
        let mut stmt = self.con.prepare(
            "SELECT bibcode, mission, science, instruments, archive FROM pubs ORDER BY bibcode",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ClassificationRow {
                    bibcode: text_column(row, 0)?,
                    mission: text_column(row, 1)?,
                    science: text_column(row, 2)?,
                    instruments: text_column(row, 3)?,
                    archive: bool_column(row, 4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_by_science(&self, science: &str) -> Result<u64> {
        let n: i64 = self.con.query_row(
            "SELECT COUNT(*) FROM pubs WHERE science = ?1",
            [science],
            |row| row.get(0),
        )?;
        Ok(n.max(0) as u64)
    }

    /// Total rows, `unrelated` included.
    pub fn len(&self) -> Result<u64> {
        let n: i64 = self
            .con
            .query_row("SELECT COUNT(*) FROM pubs", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn article(id: &str, bibcode: &str, pubdate: &str) -> Article {
        Article::from_value(json!({
            "id": id,
            "bibcode": bibcode,
            "pubdate": pubdate,
            "year": &pubdate[..4],
            "title": ["T"],
            "property": ["REFEREED"],
            "citation_count": 3,
        }))
        .unwrap()
    }

    #[test]
    fn add_and_contains() {
        let db = PublicationDb::open_in_memory().unwrap();
        let a = article("1", "2020ApJ...1A", "2020-05-00");
        assert!(!db.contains(&a).unwrap());
        assert!(db.add(&a, &Classification::new("keck", "planets")).unwrap());
        assert!(db.contains(&a).unwrap());
        assert!(db.contains_bibcode("2020ApJ...1A").unwrap());
    }

    #[test]
    fn duplicate_add_is_reported_not_error() {
        let db = PublicationDb::open_in_memory().unwrap();
        let a = article("1", "2020ApJ...1A", "2020-05-00");
        assert!(db.add(&a, &Classification::new("keck", "")).unwrap());
        assert!(!db.add(&a, &Classification::new("keck", "")).unwrap());
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn contains_matches_on_id_alone() {
        let db = PublicationDb::open_in_memory().unwrap();
        db.add(&article("7", "2020ApJ...1A", "2020-05-00"), &Classification::new("keck", ""))
            .unwrap();
        assert!(db.contains(&article("7", "2020arXiv...X", "2020-05-00")).unwrap());
    }

    #[test]
    fn query_excludes_unrelated_and_orders_by_date() {
        let db = PublicationDb::open_in_memory().unwrap();
        db.add(&article("1", "A", "2019-02-00"), &Classification::new("keck", "")).unwrap();
        db.add(&article("2", "B", "2021-07-00"), &Classification::new("keck", "")).unwrap();
        db.add(&article("3", "C", "2020-01-00"), &Classification::new("unrelated", "")).unwrap();

        let rows = db.query(&Filter::all()).unwrap();
        let bibcodes: Vec<_> = rows.iter().map(|r| r.bibcode.as_str()).collect();
        assert_eq!(bibcodes, vec!["B", "A"]);

        let unrelated = db.query(&Filter::all().mission("unrelated")).unwrap();
        assert_eq!(unrelated.len(), 1);
    }

    #[test]
    fn query_by_years_and_science() {
        let db = PublicationDb::open_in_memory().unwrap();
        db.add(&article("1", "A", "2019-02-00"), &Classification::new("keck", "planets")).unwrap();
        db.add(&article("2", "B", "2020-07-00"), &Classification::new("keck", "galaxies")).unwrap();
        db.add(&article("3", "C", "2021-01-00"), &Classification::new("keck", "planets")).unwrap();

        assert_eq!(db.query(&Filter::all().year(2020)).unwrap().len(), 1);
        assert_eq!(db.query(&Filter::all().years(vec![2019, 2021])).unwrap().len(), 2);
        assert_eq!(db.query(&Filter::all().science("planets")).unwrap().len(), 2);
        assert_eq!(db.count_by_science("galaxies").unwrap(), 1);
    }

    #[test]
    fn query_by_instrument() {
        let db = PublicationDb::open_in_memory().unwrap();
        let c = Classification::new("keck", "").with_instruments(vec!["HIRES".into(), "NIRC2".into()]);
        db.add(&article("1", "A", "2019-02-00"), &c).unwrap();
        db.add(&article("2", "B", "2019-03-00"), &Classification::new("keck", "")).unwrap();

        let rows = db.query(&Filter::all().instrument("nirc2")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].instruments, vec!["HIRES", "NIRC2"]);
    }

    #[test]
    fn classification_is_written_into_metadata() {
        let db = PublicationDb::open_in_memory().unwrap();
        let c = Classification::new("keck", "planets").with_archive(true);
        db.add(&article("1", "A", "2019-02-00"), &c).unwrap();

        let meta = db.get_metadata("A").unwrap().unwrap();
        assert_eq!(meta.mission(), "keck");
        assert_eq!(meta.science(), "planets");
        assert!(db.get_metadata("missing").unwrap().is_none());

        let rows = db.all_classifications().unwrap();
        assert!(rows[0].archive);
    }

    #[test]
    fn delete_removes_row() {
        let db = PublicationDb::open_in_memory().unwrap();
        db.add(&article("1", "A", "2019-02-00"), &Classification::new("keck", "")).unwrap();
        assert_eq!(db.delete_by_bibcode("A").unwrap(), 1);
        assert_eq!(db.delete_by_bibcode("A").unwrap(), 0);
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn reopen_file_keeps_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kpub.db");
        {
            let db = PublicationDb::open(&path).unwrap();
            db.add(&article("1", "A", "2019-02-00"), &Classification::new("keck", "")).unwrap();
        }
        let db = PublicationDb::open(&path).unwrap();
        assert_eq!(db.len().unwrap(), 1);
    }

    #[test]
    fn legacy_schema_gains_new_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let con = Connection::open(&path).unwrap();
            con.execute_batch(
                "CREATE TABLE pubs(id UNIQUE, bibcode UNIQUE, year, month, date, mission, science, metrics);
                 INSERT INTO pubs VALUES ('1', 'A', 2018, '2018-04', '2018-04-00', 'keck', '',
                    '{\"bibcode\": \"A\", \"year\": \"2018\"}');",
            )
            .unwrap();
        }
        let db = PublicationDb::open(&path).unwrap();
        let rows = db.query(&Filter::all().year(2018)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, "2018");
        assert!(rows[0].instruments.is_empty());
        assert!(!rows[0].archive);
    }
}
