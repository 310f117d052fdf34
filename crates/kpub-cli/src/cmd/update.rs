//! `kpub update` - interactive review of a month's ADS hits

use anyhow::{Result, ensure};
use clap::Args;
use kpub_ads::is_valid_month;
use kpub_store::PublicationDb;

use crate::cmd::{ads_client, today};
use crate::config::Config;
use crate::review::{LinePrompter, Reviewer};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Month to query, e.g. 2015-06 (default: current month)
    pub month: Option<String>,
}

pub fn run(args: UpdateArgs, config: &Config, db: &PublicationDb) -> Result<()> {
    let month = args
        .month
        .unwrap_or_else(|| today().format("%Y-%m").to_string());
    ensure!(is_valid_month(&month), "Invalid month '{month}', expected YYYY-MM");

    let client = ads_client(config)?;
    let mut reviewer = Reviewer::new(db, config, LinePrompter::new()?)?;
    let summary = reviewer.update(&client, &month)?;
    eprintln!(
        "Reviewed {} paper(s) for {month}: {} stored, {} filtered out",
        summary.shown, summary.stored, summary.filtered
    );
    Ok(())
}
