//! `kpub plot` - SVG charts of the database

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use kpub_report::{PlotOptions, plot_all};
use kpub_store::PublicationDb;

use crate::cmd::today;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// First year shown (default: `year_begin` from the config)
    #[arg(long)]
    pub first_year: Option<i32>,
}

pub fn run(args: PlotArgs, config: &Config, db: &PublicationDb) -> Result<()> {
    let options = PlotOptions {
        missions: config.missions.clone(),
        sciences: config.sciences.clone(),
        instruments: config.instruments.clone(),
        first_year: args.first_year.unwrap_or(config.year_begin),
        today: today(),
    };
    for path in plot_all(db, &options, &args.output)? {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
