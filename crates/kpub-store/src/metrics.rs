//! Publication statistics and rankings

use std::cmp::Reverse;
use std::collections::BTreeMap;

use anyhow::Result;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::db::PublicationDb;
use crate::filter::Filter;
use crate::record::StoredPub;

/// Counts for one group of papers (all papers, or one mission).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupMetrics {
    pub publication_count: u64,
    pub refereed_count: u64,
    pub citation_count: u64,
    pub phd_count: u64,
    pub author_count: u64,
    pub first_author_count: u64,
    /// Share of all publications; 1.0 for the overall group
    pub fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScienceMetrics {
    pub count: u64,
    pub fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub overall: GroupMetrics,
    pub missions: BTreeMap<String, GroupMetrics>,
    pub sciences: BTreeMap<String, ScienceMetrics>,
}

impl Metrics {
    pub fn mission(&self, mission: &str) -> Option<&GroupMetrics> {
        self.missions.get(mission)
    }

    pub fn science(&self, science: &str) -> Option<&ScienceMetrics> {
        self.sciences.get(science)
    }
}

#[derive(Default)]
struct Tally<'a> {
    metrics: GroupMetrics,
    authors: FxHashSet<&'a str>,
    first_authors: FxHashSet<&'a str>,
}

impl<'a> Tally<'a> {
    fn add(&mut self, p: &'a StoredPub) {
        let m = &mut self.metrics;
        m.publication_count += 1;
        if p.article.is_phd_thesis() {
            m.phd_count += 1;
        }
        if p.article.is_refereed() {
            m.refereed_count += 1;
        }
        m.citation_count += p.article.citation_count().unwrap_or(0);
        self.authors.extend(p.article.author_norm());
        self.first_authors.extend(p.article.first_author_norm());
    }

    fn finish(mut self, total: u64) -> GroupMetrics {
        self.metrics.author_count = self.authors.len() as u64;
        self.metrics.first_author_count = self.first_authors.len() as u64;
        self.metrics.fraction = fraction(self.metrics.publication_count, total);
        self.metrics
    }
}

fn fraction(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Aggregate counts over `pubs`. Configured missions and sciences are always
/// present (zero when unused); other missions appear when papers carry them.
pub fn compute_metrics<M, S>(pubs: &[StoredPub], missions: &[M], sciences: &[S]) -> Metrics
where
    M: AsRef<str>,
    S: AsRef<str>,
{
    let mut overall = Tally::default();
    let mut per_mission: BTreeMap<&str, Tally<'_>> = missions
        .iter()
        .map(|m| (m.as_ref(), Tally::default()))
        .collect();
    let mut science_counts: BTreeMap<&str, u64> =
        sciences.iter().map(|s| (s.as_ref(), 0)).collect();

    for p in pubs {
        if p.article.citation_count().is_none() {
            log::warn!("{}: no citation_count", p.bibcode);
        }
        overall.add(p);
        per_mission.entry(p.mission.as_str()).or_default().add(p);
        if let Some(n) = science_counts.get_mut(p.science.as_str()) {
            *n += 1;
        }
    }

    let total = overall.metrics.publication_count;
    let mut overall = overall.finish(total);
    overall.fraction = if total == 0 { 0.0 } else { 1.0 };

    Metrics {
        overall,
        missions: per_mission
            .into_iter()
            .map(|(m, t)| (m.to_string(), t.finish(total)))
            .collect(),
        sciences: science_counts
            .into_iter()
            .map(|(s, count)| {
                let metrics = ScienceMetrics {
                    count,
                    fraction: fraction(count, total),
                };
                (s.to_string(), metrics)
            })
            .collect(),
    }
}

/// Top `top` papers by a count, descending, ties by bibcode.
fn top_by(mut pubs: Vec<StoredPub>, top: usize, key: impl Fn(&StoredPub) -> u64) -> Vec<StoredPub> {
    pubs.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.bibcode.cmp(&b.bibcode)));
    pubs.truncate(top);
    pubs
}

/// Names ordered by count descending, then name.
fn ranked(counts: FxHashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect();
    ranked.sort_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));
    ranked
}

pub fn first_author_ranking(pubs: &[StoredPub], min_papers: usize) -> Vec<(String, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for name in pubs.iter().filter_map(|p| p.article.first_author_norm()) {
        *counts.entry(name).or_default() += 1;
    }
    let mut ranked = ranked(counts);
    ranked.retain(|(_, n)| *n >= min_papers);
    ranked
}

pub fn author_ranking(pubs: &[StoredPub], top: usize) -> Vec<(String, usize)> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for name in pubs.iter().flat_map(|p| p.article.author_norm()) {
        *counts.entry(name).or_default() += 1;
    }
    let mut ranked = ranked(counts);
    ranked.truncate(top);
    ranked
}

impl PublicationDb {
    pub fn get_metrics<M, S>(&self, filter: &Filter, missions: &[M], sciences: &[S]) -> Result<Metrics>
    where
        M: AsRef<str>,
        S: AsRef<str>,
    {
        Ok(compute_metrics(&self.query(filter)?, missions, sciences))
    }

    pub fn get_most_cited(&self, filter: &Filter, top: usize) -> Result<Vec<StoredPub>> {
        Ok(top_by(self.query(filter)?, top, |p| {
            p.article.citation_count().unwrap_or(0)
        }))
    }

    pub fn get_most_read(&self, filter: &Filter, top: usize) -> Result<Vec<StoredPub>> {
        Ok(top_by(self.query(filter)?, top, |p| {
            p.article.read_count().unwrap_or(0)
        }))
    }

    /// First authors with at least `min_papers` first-author papers.
    pub fn get_most_active_first_authors(&self, min_papers: usize) -> Result<Vec<(String, usize)>> {
        Ok(first_author_ranking(&self.query(&Filter::all())?, min_papers))
    }

    /// The `top` most frequent authors at any position.
    pub fn get_all_authors(&self, top: usize) -> Result<Vec<(String, usize)>> {
        Ok(author_ranking(&self.query(&Filter::all())?, top))
    }
}
