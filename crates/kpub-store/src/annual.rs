//! Per-year publication rollups

use std::collections::BTreeMap;

use anyhow::Result;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::db::PublicationDb;
use crate::filter::Filter;
use crate::record::StoredPub;

/// Publications per year for each configured mission, plus their sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnualCounts {
    /// In configured mission order
    pub per_mission: Vec<(String, BTreeMap<i32, u64>)>,
    pub total: BTreeMap<i32, u64>,
}

impl AnnualCounts {
    pub fn years(&self) -> Vec<i32> {
        self.total.keys().copied().collect()
    }

    pub fn mission(&self, mission: &str) -> Option<&BTreeMap<i32, u64>> {
        self.per_mission
            .iter()
            .find(|(m, _)| m == mission)
            .map(|(_, counts)| counts)
    }

    fn zeroed<M: AsRef<str>>(missions: &[M], year_begin: i32, year_end: i32) -> Self {
        let zeros: BTreeMap<i32, u64> = (year_begin..=year_end).map(|y| (y, 0)).collect();
        Self {
            per_mission: missions
                .iter()
                .map(|m| (m.as_ref().to_string(), zeros.clone()))
                .collect(),
            total: zeros,
        }
    }

    fn sum_total(&mut self) {
        for (year, total) in self.total.iter_mut() {
            *total = self
                .per_mission
                .iter()
                .map(|(_, counts)| counts.get(year).copied().unwrap_or(0))
                .sum();
        }
    }
}

/// Count papers per mission and year inside `[year_begin, year_end]`.
/// Papers of unconfigured missions or out-of-range years are ignored.
pub fn annual_counts<M: AsRef<str>>(
    pubs: &[StoredPub],
    missions: &[M],
    year_begin: i32,
    year_end: i32,
) -> AnnualCounts {
    let mut counts = AnnualCounts::zeroed(missions, year_begin, year_end);
    for p in pubs {
        let Some(year) = p.year_number() else {
            continue;
        };
        let slot = counts
            .per_mission
            .iter_mut()
            .find(|(m, _)| *m == p.mission)
            .and_then(|(_, years)| years.get_mut(&year));
        if let Some(n) = slot {
            *n += 1;
        }
    }
    counts.sum_total();
    counts
}

/// Running totals: each year holds every paper up to and including it,
/// papers before `year_begin` included.
pub fn cumulative_counts<M: AsRef<str>>(
    pubs: &[StoredPub],
    missions: &[M],
    year_begin: i32,
    year_end: i32,
) -> AnnualCounts {
    let mut counts = AnnualCounts::zeroed(missions, year_begin, year_end);
    for p in pubs {
        let Some(year) = p.year_number() else {
            continue;
        };
        if let Some((_, years)) = counts.per_mission.iter_mut().find(|(m, _)| *m == p.mission) {
            for (_, n) in years.range_mut(year..) {
                *n += 1;
            }
        }
    }
    counts.sum_total();
    counts
}

/// Cumulative counts at the end of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthPoint {
    pub year: i32,
    pub publications: u64,
    pub authors: u64,
    pub first_authors: u64,
}

/// Cumulative publications, unique authors and unique first authors for
/// every year from `first_year - 1` to `last_year`. Papers before the
/// starting year are not counted.
pub fn author_growth(pubs: &[StoredPub], first_year: i32, last_year: i32) -> Vec<GrowthPoint> {
    let start = first_year - 1;
    let mut by_year: BTreeMap<i32, Vec<&StoredPub>> = BTreeMap::new();
    for p in pubs {
        if let Some(year) = p.year_number().filter(|y| (start..=last_year).contains(y)) {
            by_year.entry(year).or_default().push(p);
        }
    }

    let mut publications = 0u64;
    let mut authors: FxHashSet<&str> = FxHashSet::default();
    let mut first_authors: FxHashSet<&str> = FxHashSet::default();
    let mut points = Vec::new();
    for year in start..=last_year {
        for p in by_year.get(&year).into_iter().flatten() {
            publications += 1;
            authors.extend(p.article.author_norm());
            first_authors.extend(p.article.first_author_norm());
        }
        points.push(GrowthPoint {
            year,
            publications,
            authors: authors.len() as u64,
            first_authors: first_authors.len() as u64,
        });
    }
    points
}

impl PublicationDb {
    /// Per-mission publications per year; `instrument` restricts to papers
    /// tagged with that instrument.
    pub fn get_annual_publication_count<M: AsRef<str>>(
        &self,
        missions: &[M],
        year_begin: i32,
        year_end: i32,
        instrument: Option<&str>,
    ) -> Result<AnnualCounts> {
        let mut filter = Filter::all();
        filter.instrument = instrument.map(String::from);
        Ok(annual_counts(&self.query(&filter)?, missions, year_begin, year_end))
    }

    pub fn get_annual_publication_count_cumulative<M: AsRef<str>>(
        &self,
        missions: &[M],
        year_begin: i32,
        year_end: i32,
    ) -> Result<AnnualCounts> {
        Ok(cumulative_counts(&self.query(&Filter::all())?, missions, year_begin, year_end))
    }

    pub fn get_author_growth(&self, first_year: i32, last_year: i32) -> Result<Vec<GrowthPoint>> {
        Ok(author_growth(&self.query(&Filter::all())?, first_year, last_year))
    }
}
