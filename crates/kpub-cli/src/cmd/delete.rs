//! `kpub delete` - remove papers by bibcode

use anyhow::Result;
use clap::Args;
use kpub_store::PublicationDb;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// ADS bibcode(s) identifying the publication
    #[arg(required = true)]
    pub bibcodes: Vec<String>,
}

pub fn run(args: DeleteArgs, db: &PublicationDb) -> Result<()> {
    let mut deleted = 0;
    for bibcode in &args.bibcodes {
        let n = db.delete_by_bibcode(bibcode)?;
        if n == 0 {
            log::warn!("{bibcode} is not in the db.");
        }
        deleted += n;
    }
    eprintln!("Deleted {deleted} row(s)");
    Ok(())
}
