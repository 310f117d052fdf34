//! `kpub export` - classifications as CSV on stdout

use std::io::Write;

use anyhow::{Context, Result};
use kpub_store::{PublicationDb, parse_instruments};

use crate::cmd::write_stdout;

/// One line per paper, `unrelated` included, ordered by bibcode:
/// `bibcode,mission,science,instruments,archive`. Instruments are `;`
/// separated; `kpub import` reads the same layout back.
pub fn write_export<W: Write>(writer: W, db: &PublicationDb) -> Result<usize> {
    let rows = db.all_classifications()?;
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for row in &rows {
        let instruments = parse_instruments(&row.instruments).join(";");
        let archive = if row.archive { "1" } else { "0" };
        out.write_record([
            row.bibcode.as_str(),
            row.mission.as_str(),
            row.science.as_str(),
            instruments.as_str(),
            archive,
        ])?;
    }
    out.flush().context("Failed to write CSV")?;
    Ok(rows.len())
}

pub fn run(db: &PublicationDb) -> Result<()> {
    let mut buf = Vec::new();
    let n = write_export(&mut buf, db)?;
    log::info!("Exported {n} row(s)");
    write_stdout(&String::from_utf8_lossy(&buf))
}
