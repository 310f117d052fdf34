//! kpub store - SQLite publication database and metric rollups
//!
//! One `pubs` table holds the classification of every reviewed paper next
//! to the raw ADS record. Aggregations scan the stored records.

pub mod annual;
pub mod db;
pub mod filter;
pub mod metrics;
pub mod record;

pub use annual::{AnnualCounts, GrowthPoint, annual_counts, author_growth, cumulative_counts};
pub use db::{DEFAULT_DB_NAME, PublicationDb};
pub use filter::Filter;
pub use metrics::{
    GroupMetrics, Metrics, ScienceMetrics, author_ranking, compute_metrics, first_author_ranking,
};
pub use record::{Classification, ClassificationRow, StoredPub, UNRELATED, parse_instruments};
