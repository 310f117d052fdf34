//! kpub match - rule-based text classification and match tallies
//!
//! Affiliation strings are classified against an ordered rule set (first
//! matching category wins); instrument and archive words are counted across
//! article text and rolled up per publication, year or mission.

pub mod counts;
pub mod highlight;
pub mod pattern;
pub mod rules;

pub use counts::{
    AffCounts, WordMatcher, get_aff_counts_by_year, get_word_match_counts_by_mission,
    get_word_match_counts_by_pub, get_word_match_counts_by_year,
};
pub use highlight::Highlighter;
pub use pattern::{Pattern, RuleError};
pub use rules::{AffRule, AffiliationConfig, RuleSet};
