//! Word-mention and affiliation tallies over article collections.
//!
//! Every tally is a plain count keyed by ordered maps, so the result does
//! not depend on the order the articles are scanned in.

use std::collections::BTreeMap;

use kpub_ads::Article;

use crate::pattern::{Pattern, RuleError};
use crate::rules::RuleSet;

/// Text fields searched when the caller does not choose any.
pub const DEFAULT_FIELDS: &[&str] = &["title", "abstract", "ack", "keyword"];

/// Named patterns counted in article text (instrument names, archive
/// mentions). Same case rule as affiliation patterns.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    words: Vec<Pattern>,
}

impl WordMatcher {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Result<Self, RuleError> {
        let words = words
            .iter()
            .map(|w| Pattern::new(w.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { words })
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(Pattern::text)
    }

    /// Occurrences of each word in `text`; words with no match are omitted.
    pub fn counts(&self, text: &str) -> BTreeMap<String, usize> {
        self.words
            .iter()
            .filter_map(|p| {
                let n = p.count(text);
                (n > 0).then(|| (p.text().to_string(), n))
            })
            .collect()
    }

    /// Words mentioned at least once, in declared order.
    pub fn mentioned(&self, text: &str) -> Vec<&str> {
        self.words
            .iter()
            .filter(|p| p.is_match(text))
            .map(Pattern::text)
            .collect()
    }
}

/// Concatenated text of the given fields (missing fields skipped).
pub fn article_text<S: AsRef<str>>(article: &Article, fields: &[S]) -> String {
    fields
        .iter()
        .filter_map(|f| article.text_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per bibcode, occurrences of each word across `fields`. Articles with no
/// mention are left out.
pub fn get_word_match_counts_by_pub<S: AsRef<str>>(
    articles: &[Article],
    matcher: &WordMatcher,
    fields: &[S],
) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut out = BTreeMap::new();
    for article in articles {
        let counts = matcher.counts(&article_text(article, fields));
        if !counts.is_empty() {
            out.insert(article.bibcode().to_string(), counts);
        }
    }
    out
}

/// `word -> year -> publications mentioning the word`. Articles without a
/// parseable year are skipped.
pub fn get_word_match_counts_by_year<S: AsRef<str>>(
    articles: &[Article],
    matcher: &WordMatcher,
    fields: &[S],
) -> BTreeMap<String, BTreeMap<i32, usize>> {
    let mut out: BTreeMap<String, BTreeMap<i32, usize>> = BTreeMap::new();
    for article in articles {
        let Some(year) = article.year_number() else {
            log::debug!("{}: no year, skipped in word counts", article.bibcode());
            continue;
        };
        let text = article_text(article, fields);
        for word in matcher.mentioned(&text) {
            *out.entry(word.to_string())
                .or_default()
                .entry(year)
                .or_default() += 1;
        }
    }
    out
}

/// `word -> mission -> publications mentioning the word`.
pub fn get_word_match_counts_by_mission<S: AsRef<str>>(
    articles: &[Article],
    matcher: &WordMatcher,
    fields: &[S],
) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut out: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for article in articles {
        let text = article_text(article, fields);
        for word in matcher.mentioned(&text) {
            *out.entry(word.to_string())
                .or_default()
                .entry(article.mission().to_string())
                .or_default() += 1;
        }
    }
    out
}

/// Affiliation categories per year for one author position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffCounts {
    /// `category -> year -> papers`
    pub by_kind: BTreeMap<String, BTreeMap<i32, usize>>,
    /// Papers whose author at this position has no usable affiliation
    pub unknown: BTreeMap<i32, usize>,
}

impl AffCounts {
    /// Total papers of a category over all years.
    pub fn total(&self, kind: &str) -> usize {
        self.by_kind.get(kind).map_or(0, |years| years.values().sum())
    }

    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .by_kind
            .values()
            .flat_map(|m| m.keys().copied())
            .chain(self.unknown.keys().copied())
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

/// Tally the affiliation category of the author at `position` (0 = first
/// author) per publication year.
pub fn get_aff_counts_by_year(articles: &[Article], rules: &RuleSet, position: usize) -> AffCounts {
    let mut counts = AffCounts::default();
    for article in articles {
        let Some(year) = article.year_number() else {
            continue;
        };
        let affs = article.affiliations();
        match affs.get(position).and_then(|aff| rules.classify(aff)) {
            Some(kind) => {
                *counts
                    .by_kind
                    .entry(kind.to_string())
                    .or_default()
                    .entry(year)
                    .or_default() += 1;
            }
            None => *counts.unknown.entry(year).or_default() += 1,
        }
    }
    counts
}
