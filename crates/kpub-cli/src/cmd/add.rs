//! `kpub add` - fetch papers by bibcode and classify them

use anyhow::Result;
use clap::Args;
use kpub_store::PublicationDb;

use crate::cmd::ads_client;
use crate::config::Config;
use crate::review::{ArticleSource, LinePrompter, Outcome, Prompter, Reviewer};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// ADS bibcode(s) identifying the publication
    #[arg(required = true)]
    pub bibcodes: Vec<String>,
}

pub fn run(args: AddArgs, config: &Config, db: &PublicationDb) -> Result<()> {
    let client = ads_client(config)?;
    let mut reviewer = Reviewer::new(db, config, LinePrompter::new()?)?;
    let stored = add_bibcodes(&mut reviewer, db, &client, &args.bibcodes)?;
    eprintln!("Stored {stored} paper(s)");
    Ok(())
}

/// Classify every paper ADS returns for the bibcodes. Returns the number
/// stored.
pub fn add_bibcodes<P: Prompter, S: ArticleSource>(
    reviewer: &mut Reviewer<'_, P>,
    db: &PublicationDb,
    source: &S,
    bibcodes: &[String],
) -> Result<usize> {
    let mut stored = 0;
    for bibcode in bibcodes {
        for article in source.get_by_bibcode(bibcode)? {
            // data products are sometimes tagged NONARTICLE
            if article.properties().contains(&"NONARTICLE") {
                log::warn!("{} is not an article.", article.bibcode());
            }
            if db.contains(&article)? {
                log::warn!("{} is already in the db.", article.bibcode());
                continue;
            }
            let status = format!("Adding {}\n", article.bibcode());
            if let Outcome::Stored(_) = reviewer.add_interactively(&article, &status)? {
                stored += 1;
            }
        }
    }
    Ok(stored)
}
