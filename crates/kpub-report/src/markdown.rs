//! Markdown publication lists and the overview page

use std::path::Path;

use anyhow::{Context, Result};
use handlebars::Handlebars;
use kpub_store::{Metrics, StoredPub};
use serde::Serialize;

const LIST_TEMPLATE: &str = include_str!("templates/list.md.hbs");
const OVERVIEW_TEMPLATE: &str = include_str!("templates/overview.md.hbs");

/// Authors listed before "et al."
const MAX_AUTHORS: usize = 3;

/// Uppercase the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Year (`"2019"`) or month (`"2019-04"`) a paper is listed under. ADS uses
/// month `00` for unknown months; those are listed under January.
pub fn group_label(p: &StoredPub, by_month: bool) -> String {
    let raw = if by_month { &p.month } else { &p.year };
    match raw.strip_suffix("-00") {
        Some(prefix) => format!("{prefix}-01"),
        None => raw.clone(),
    }
}

fn format_authors(authors: &[&str]) -> String {
    if authors.len() > MAX_AUTHORS {
        format!("{} et al.", authors[..MAX_AUTHORS].join("; "))
    } else {
        authors.join("; ")
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    number: usize,
    title: &'a str,
    url: String,
    authors: String,
    pub_name: Option<&'a str>,
    year: &'a str,
    refereed: bool,
    citation_count: u64,
}

impl<'a> EntryView<'a> {
    fn new(number: usize, p: &'a StoredPub) -> Self {
        Self {
            number,
            title: p.article.title(),
            url: p.article.url(),
            authors: format_authors(&p.article.authors()),
            pub_name: p.article.pub_name(),
            year: &p.year,
            refereed: p.article.is_refereed(),
            citation_count: p.article.citation_count().unwrap_or(0),
        }
    }
}

#[derive(Serialize)]
struct GroupView<'a> {
    label: String,
    articles: Vec<EntryView<'a>>,
}

#[derive(Serialize)]
struct ListView<'a> {
    title: &'a str,
    save_as: Option<&'a str>,
    count: usize,
    groups: Vec<GroupView<'a>>,
}

/// Options of one Markdown list.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub title: String,
    pub group_by_month: bool,
    /// Name of the rendered page, written to the front matter
    pub save_as: Option<String>,
}

impl ListOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn by_month(mut self, group_by_month: bool) -> Self {
        self.group_by_month = group_by_month;
        self
    }
}

/// Inputs of the overview page.
pub struct Overview<'a> {
    pub title: String,
    pub metrics: &'a Metrics,
    pub most_cited: &'a [StoredPub],
    pub most_active_first_authors: &'a [(String, usize)],
    /// Generation timestamp, already formatted
    pub generated: String,
}

#[derive(Serialize)]
struct MissionRow {
    name: String,
    publication_count: u64,
    refereed_count: u64,
    citation_count: u64,
    author_count: u64,
    share: String,
}

#[derive(Serialize)]
struct ScienceRow {
    name: String,
    count: u64,
    share: String,
}

#[derive(Serialize)]
struct AuthorRow<'a> {
    name: &'a str,
    count: usize,
}

#[derive(Serialize)]
struct OverviewView<'a> {
    title: &'a str,
    generated: &'a str,
    overall: &'a kpub_store::GroupMetrics,
    missions: Vec<MissionRow>,
    sciences: Vec<ScienceRow>,
    most_cited: Vec<EntryView<'a>>,
    first_authors: Vec<AuthorRow<'a>>,
}

fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Renders the embedded handlebars templates. Output is Markdown, so HTML
/// escaping is disabled.
pub struct Reporter {
    handlebars: Handlebars<'static>,
}

impl Reporter {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string("list", LIST_TEMPLATE)
            .context("Invalid list template")?;
        handlebars
            .register_template_string("overview", OVERVIEW_TEMPLATE)
            .context("Invalid overview template")?;
        Ok(Self { handlebars })
    }

    /// Markdown list of `pubs`, grouped by year or month in the order the
    /// groups first appear.
    pub fn to_markdown(&self, pubs: &[StoredPub], options: &ListOptions) -> Result<String> {
        let mut groups: Vec<GroupView<'_>> = Vec::new();
        for p in pubs {
            let label = group_label(p, options.group_by_month);
            let idx = match groups.iter().position(|g| g.label == label) {
                Some(idx) => idx,
                None => {
                    groups.push(GroupView {
                        label,
                        articles: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[idx];
            let number = group.articles.len() + 1;
            group.articles.push(EntryView::new(number, p));
        }

        let view = ListView {
            title: &options.title,
            save_as: options.save_as.as_deref(),
            count: pubs.len(),
            groups,
        };
        self.handlebars
            .render("list", &view)
            .with_context(|| format!("Failed to render list {:?}", options.title))
    }

    /// Write the list to `path`; the front matter names the matching
    /// `.html` page.
    pub fn save_markdown(&self, path: &Path, pubs: &[StoredPub], options: &ListOptions) -> Result<()> {
        let mut options = options.clone();
        options.save_as = Some(path.with_extension("html").to_string_lossy().into_owned());
        let markdown = self.to_markdown(pubs, &options)?;
        log::info!("Writing {}", path.display());
        std::fs::write(path, markdown)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn overview(&self, overview: &Overview<'_>) -> Result<String> {
        let metrics = overview.metrics;
        let view = OverviewView {
            title: &overview.title,
            generated: &overview.generated,
            overall: &metrics.overall,
            missions: metrics
                .missions
                .iter()
                .map(|(name, m)| MissionRow {
                    name: capitalize(name),
                    publication_count: m.publication_count,
                    refereed_count: m.refereed_count,
                    citation_count: m.citation_count,
                    author_count: m.author_count,
                    share: percent(m.fraction),
                })
                .collect(),
            sciences: metrics
                .sciences
                .iter()
                .map(|(name, s)| ScienceRow {
                    name: capitalize(name),
                    count: s.count,
                    share: percent(s.fraction),
                })
                .collect(),
            most_cited: overview
                .most_cited
                .iter()
                .enumerate()
                .map(|(i, p)| EntryView::new(i + 1, p))
                .collect(),
            first_authors: overview
                .most_active_first_authors
                .iter()
                .map(|(name, count)| AuthorRow { name, count: *count })
                .collect(),
        };
        self.handlebars
            .render("overview", &view)
            .context("Failed to render overview")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpub_ads::Article;
    use kpub_store::compute_metrics;
    use serde_json::json;

    fn stored(bibcode: &str, year: &str, month: &str, title: &str, authors: &[&str]) -> StoredPub {
        StoredPub {
            bibcode: bibcode.into(),
            year: year.into(),
            month: month.into(),
            date: format!("{month}-00"),
            mission: "keck".into(),
            science: "planets".into(),
            instruments: vec![],
            archive: false,
            article: Article::from_value(json!({
                "bibcode": bibcode,
                "title": [title],
                "author": authors,
                "author_norm": authors,
                "first_author_norm": authors.first(),
                "pub": "The Astrophysical Journal",
                "property": null,
                "citation_count": 4,
            }))
            .unwrap(),
        }
    }

    fn pubs() -> Vec<StoredPub> {
        vec![
            stored("2020B", "2020", "2020-03", "Planets & <stars>", &["Smith, J.", "Doe, A."]),
            stored("2020A", "2020", "2020-00", "Second", &["A", "B", "C", "D"]),
            stored("2019A", "2019", "2019-11", "Older", &["Lee, K."]),
        ]
    }

    #[test]
    fn capitalize_first_letter() {
        assert_eq!(capitalize("keck"), "Keck");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éso"), "Éso");
    }

    #[test]
    fn month_zero_groups_under_january() {
        let p = &pubs()[1];
        assert_eq!(group_label(p, true), "2020-01");
        assert_eq!(group_label(p, false), "2020");
    }

    #[test]
    fn list_groups_by_year_in_query_order() {
        let r = Reporter::new().unwrap();
        let md = r.to_markdown(&pubs(), &ListOptions::new("Keck publications")).unwrap();
        let y2020 = md.find("## 2020").unwrap();
        let y2019 = md.find("## 2019").unwrap();
        assert!(y2020 < y2019);
        assert!(md.contains("# Keck publications"));
        assert!(md.contains("3 publications."));
        assert!(md.contains("https://ui.adsabs.harvard.edu/abs/2020B"));
        assert!(md.contains("A; B; C et al."));
        assert!(md.contains("*The Astrophysical Journal*"));
        assert!(md.contains("cited 4 times"));
    }

    #[test]
    fn list_is_not_html_escaped() {
        let r = Reporter::new().unwrap();
        let md = r.to_markdown(&pubs(), &ListOptions::new("T")).unwrap();
        assert!(md.contains("Planets & <stars>"));
    }

    #[test]
    fn list_groups_by_month() {
        let r = Reporter::new().unwrap();
        let md = r
            .to_markdown(&pubs(), &ListOptions::new("T").by_month(true))
            .unwrap();
        assert!(md.contains("## 2020-03"));
        assert!(md.contains("## 2020-01"));
        assert!(md.contains("## 2019-11"));
    }

    #[test]
    fn save_markdown_writes_front_matter() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kpub.md");
        let r = Reporter::new().unwrap();
        r.save_markdown(&path, &pubs(), &ListOptions::new("T")).unwrap();
        let md = std::fs::read_to_string(&path).unwrap();
        assert!(md.contains("save_as: "));
        assert!(md.contains("kpub.html"));
    }

    #[test]
    fn overview_page() {
        let pubs = pubs();
        let metrics = compute_metrics(&pubs, &["keck"], &["planets"]);
        let authors = vec![("Smith, J".to_string(), 7)];
        let r = Reporter::new().unwrap();
        let md = r
            .overview(&Overview {
                title: "Keck publications".into(),
                metrics: &metrics,
                most_cited: &pubs[..2],
                most_active_first_authors: &authors,
                generated: "2024-05-01 12:00".into(),
            })
            .unwrap();
        assert!(md.contains("| Publications | 3 |"));
        assert!(md.contains("| Keck | 3 |"));
        assert!(md.contains("100.0%"));
        assert!(md.contains("| Planets | 3 | 100.0% |"));
        assert!(md.contains("* Smith, J: 7 publications"));
        assert!(md.contains("2024-05-01 12:00"));
    }
}
