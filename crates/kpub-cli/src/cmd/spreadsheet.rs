//! `kpub spreadsheet` - per-paper CSV for spreadsheet tools

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use kpub_report::{SPREADSHEET_NAME, save_spreadsheet};
use kpub_store::{Filter, PublicationDb};

use crate::cmd::today;

#[derive(Args, Debug)]
pub struct SpreadsheetArgs {
    /// Output file
    #[arg(short, long, default_value = SPREADSHEET_NAME)]
    pub output: PathBuf,
}

pub fn run(args: SpreadsheetArgs, db: &PublicationDb) -> Result<()> {
    let pubs = db.query(&Filter::all())?;
    let n = save_spreadsheet(&args.output, &pubs, today())?;
    eprintln!("Wrote {n} row(s) to {}", args.output.display());
    Ok(())
}
