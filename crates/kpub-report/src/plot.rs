//! Writes the full chart set for a database

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use kpub_store::PublicationDb;

use crate::chart::{
    Series, extrapolate, fraction_of_year_passed, line_chart, pie_chart, publication_rate_chart,
};

/// What to chart and from when.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub missions: Vec<String>,
    pub sciences: Vec<String>,
    pub instruments: Vec<String>,
    pub first_year: i32,
    /// Date the current-year extrapolation is computed for
    pub today: NaiveDate,
}

fn write_svg(dir: &Path, name: &str, svg: String) -> Result<PathBuf> {
    let path = dir.join(name);
    log::info!("Writing {}", path.display());
    std::fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Render every chart into `out_dir` and return the written paths:
/// publication rate (with and without extrapolation, and per mission when
/// there are several), science pie chart, author growth and publications
/// per instrument.
pub fn plot_all(db: &PublicationDb, options: &PlotOptions, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let current_year = options.today.year();
    let mut written = Vec::new();

    let counts = db.get_annual_publication_count(&options.missions, options.first_year, current_year, None)?;
    let current_total = counts.total.get(&current_year).copied().unwrap_or(0);
    let expected = extrapolate(current_total, fraction_of_year_passed(options.today));
    written.push(write_svg(
        out_dir,
        "kpub-publication-rate.svg",
        publication_rate_chart(&counts, Some((current_year, expected))),
    )?);
    written.push(write_svg(
        out_dir,
        "kpub-publication-rate-no-extrapolation.svg",
        publication_rate_chart(&counts, None),
    )?);
    if options.missions.len() > 1 {
        for mission in &options.missions {
            let single = db.get_annual_publication_count(
                std::slice::from_ref(mission),
                options.first_year,
                current_year,
                None,
            )?;
            let total = single.total.get(&current_year).copied().unwrap_or(0);
            let expected = extrapolate(total, fraction_of_year_passed(options.today));
            written.push(write_svg(
                out_dir,
                &format!("kpub-publication-rate-{mission}.svg"),
                publication_rate_chart(&single, Some((current_year, expected))),
            )?);
        }
    }

    if !options.sciences.is_empty() {
        let slices = options
            .sciences
            .iter()
            .map(|s| Ok((s.clone(), db.count_by_science(s)?)))
            .collect::<Result<Vec<_>>>()?;
        written.push(write_svg(out_dir, "kpub-piechart.svg", pie_chart(&slices))?);
    }

    let growth = db.get_author_growth(options.first_year, current_year)?;
    let series = [
        Series::new(
            "Publications",
            growth.iter().map(|g| (g.year, g.publications as f64)).collect(),
        ),
        Series::new(
            "Unique authors",
            growth.iter().map(|g| (g.year, g.authors as f64)).collect(),
        ),
        Series::new(
            "Unique first authors",
            growth.iter().map(|g| (g.year, g.first_authors as f64)).collect(),
        ),
    ];
    written.push(write_svg(
        out_dir,
        "kpub-author-count.svg",
        line_chart("Cumulative count", &series),
    )?);

    if !options.instruments.is_empty() {
        // the current year is incomplete
        let last_year = current_year - 1;
        let mut series = Vec::with_capacity(options.instruments.len());
        for instrument in &options.instruments {
            let counts = db.get_annual_publication_count(
                &options.missions,
                options.first_year,
                last_year,
                Some(instrument.as_str()),
            )?;
            let points = counts.total.iter().map(|(y, n)| (*y, *n as f64)).collect();
            series.push(Series::new(instrument.clone(), points));
        }
        written.push(write_svg(
            out_dir,
            "kpub-publications-by-instrument.svg",
            line_chart("Publications per year", &series),
        )?);
    }

    Ok(written)
}
