//! Interactive classification of candidate papers

use anyhow::{Context, Result, bail};
use kpub_ads::{AdsClient, Article, monthly_query};
use kpub_core::ApiError;
use kpub_match::counts::article_text;
use kpub_match::{Highlighter, WordMatcher};
use kpub_report::capitalize;
use kpub_store::{Classification, PublicationDb, UNRELATED};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::config::Config;

/// Where review input comes from and output goes to.
pub trait Prompter {
    /// One line of input, `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
    fn show(&mut self, text: &str);
    fn clear_screen(&mut self) {}
}

/// Terminal prompter backed by rustyline.
pub struct LinePrompter {
    editor: DefaultEditor,
}

impl LinePrompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to initialize terminal input")?;
        Ok(Self { editor })
    }
}

impl Prompter for LinePrompter {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => bail!("Review interrupted"),
            Err(e) => Err(e).context("Failed to read input"),
        }
    }

    fn show(&mut self, text: &str) {
        println!("{text}");
    }

    fn clear_screen(&mut self) {
        print!("\x1b[2J");
    }
}

/// Search backend of the review loop.
pub trait ArticleSource {
    fn search(&self, query: &str) -> Result<Vec<Article>, ApiError>;
    fn get_by_bibcode(&self, bibcode: &str) -> Result<Vec<Article>, ApiError>;
}

impl ArticleSource for AdsClient {
    fn search(&self, query: &str) -> Result<Vec<Article>, ApiError> {
        AdsClient::search(self, query)
    }

    fn get_by_bibcode(&self, bibcode: &str) -> Result<Vec<Article>, ApiError> {
        AdsClient::get_by_bibcode(self, bibcode)
    }
}

/// Title, abstract and bibliographic details with configured words
/// highlighted.
pub fn display_abstract(article: &Article, highlighter: &Highlighter) -> String {
    let title = article.title();
    let underline = "-".repeat(title.chars().count());
    format!(
        "{}\n{underline}\n{}\n\nAuthors: {}\nDate: {}\nStatus: [{}]\nURL: {}\n",
        highlighter.highlight(title),
        highlighter.highlight(article.abstract_text().unwrap_or_default()),
        article.authors().join(", "),
        article.pubdate(),
        article.properties().join(", "),
        article.url(),
    )
}

/// Ask for one of `values` by number. `[0]` is `unrelated` when
/// `add_unrelated` is set. Empty or unknown answers return an empty string,
/// as does an empty `values` list (without prompting).
pub fn prompt_grouping<P: Prompter, S: AsRef<str>>(
    prompter: &mut P,
    values: &[S],
    label: &str,
    add_unrelated: bool,
) -> Result<String> {
    if values.is_empty() {
        return Ok(String::new());
    }

    let mut choices: Vec<(String, &str)> = Vec::with_capacity(values.len() + 1);
    if add_unrelated {
        choices.push(("0".to_string(), UNRELATED));
    }
    for (idx, value) in values.iter().enumerate() {
        choices.push(((idx + 1).to_string(), value.as_ref()));
    }

    let mut prompt = format!("=> Select {label}: ");
    for (key, value) in &choices {
        prompt.push_str(&format!(" [{key}] {} ", capitalize(value)));
    }
    prompt.push_str(" or [] skip? ");

    let answer = prompter.read_line(&prompt)?.unwrap_or_default();
    let answer = answer.trim();
    Ok(choices
        .iter()
        .find(|(key, _)| key == answer)
        .map(|(_, value)| value.to_string())
        .unwrap_or_default())
}

/// Ask for any number of instruments as comma separated numbers or names.
/// An empty answer accepts `detected`; `-` selects none.
pub fn prompt_instruments<P: Prompter, S: AsRef<str>>(
    prompter: &mut P,
    instruments: &[S],
    detected: &[&str],
) -> Result<Vec<String>> {
    if instruments.is_empty() {
        return Ok(Vec::new());
    }

    let mut prompt = String::from("=> Select Instruments (comma separated): ");
    for (idx, name) in instruments.iter().enumerate() {
        prompt.push_str(&format!(" [{}] {} ", idx + 1, name.as_ref()));
    }
    if detected.is_empty() {
        prompt.push_str(" or [-] none? ");
    } else {
        prompt.push_str(&format!(" [] {} or [-] none? ", detected.join(", ")));
    }

    let answer = prompter.read_line(&prompt)?.unwrap_or_default();
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(detected.iter().map(|s| s.to_string()).collect());
    }
    if answer == "-" {
        return Ok(Vec::new());
    }

    let mut selected: Vec<String> = Vec::new();
    for token in answer.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let by_number = token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| instruments.get(i));
        let by_name = instruments
            .iter()
            .find(|name| name.as_ref().eq_ignore_ascii_case(token));
        match by_number.or(by_name) {
            Some(name) if !selected.iter().any(|s| s == name.as_ref()) => {
                selected.push(name.as_ref().to_string());
            }
            Some(_) => {}
            None => log::warn!("Unknown instrument {token:?} ignored"),
        }
    }
    Ok(selected)
}

/// Group-2 hits worth showing: abstract present, not yet stored, refereed
/// or an arXiv preprint, not a proposal or COSPAR abstract.
pub fn is_group2_candidate(article: &Article, db: &PublicationDb) -> Result<bool> {
    if article.abstract_text().is_none() {
        return Ok(false);
    }
    if db.contains(article)? {
        return Ok(false);
    }
    let venue_is_arxiv = article
        .pub_name()
        .is_none_or(|p| p.eq_ignore_ascii_case("arxiv e-prints"));
    if article.is_not_refereed() && !venue_is_arxiv {
        return Ok(false);
    }
    let bibcode = article.bibcode();
    Ok(!(bibcode.contains(".prop.") || bibcode.contains("cosp..")))
}

/// What happened to one reviewed paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    AlreadyStored,
    Skipped,
    Stored(Classification),
}

/// Totals of one `update` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub shown: usize,
    pub stored: usize,
    pub filtered: usize,
}

/// Review session over one database.
pub struct Reviewer<'a, P> {
    db: &'a PublicationDb,
    config: &'a Config,
    highlighter: Highlighter,
    instruments: WordMatcher,
    archive: WordMatcher,
    prompter: P,
}

impl<'a, P: Prompter> Reviewer<'a, P> {
    pub fn new(db: &'a PublicationDb, config: &'a Config, prompter: P) -> Result<Self> {
        Ok(Self {
            db,
            config,
            highlighter: Highlighter::new(&config.colors).context("Invalid colors config")?,
            instruments: WordMatcher::new(&config.instruments).context("Invalid instruments config")?,
            archive: WordMatcher::new(&config.archive).context("Invalid archive config")?,
            prompter,
        })
    }

    /// Show the paper and ask for its classification. An empty mission
    /// answer skips the paper without storing it.
    pub fn add_interactively(&mut self, article: &Article, status: &str) -> Result<Outcome> {
        if self.db.contains(article)? {
            log::info!("{} is already in the database -- skipping.", article.bibcode());
            return Ok(Outcome::AlreadyStored);
        }

        self.prompter.clear_screen();
        self.prompter.show(status);
        self.prompter.show(&display_abstract(article, &self.highlighter));

        let config = self.config;
        let mission = prompt_grouping(&mut self.prompter, &config.missions, "Mission", true)?;
        if mission.is_empty() {
            return Ok(Outcome::Skipped);
        }

        let mut classification = Classification::new(mission, "");
        if classification.mission != UNRELATED {
            classification.science =
                prompt_grouping(&mut self.prompter, &config.sciences, "Science", false)?;

            let text = article_text(article, &config.text_fields);
            let detected = self.instruments.mentioned(&text);
            classification.instruments =
                prompt_instruments(&mut self.prompter, &config.instruments, &detected)?;
            classification.archive = !self.archive.mentioned(&text).is_empty();
        }

        self.db.add(article, &classification)?;
        Ok(Outcome::Stored(classification))
    }

    /// Review the month's search hits: first every acknowledgement match,
    /// then the filtered title/abstract matches.
    pub fn update<S: ArticleSource>(&mut self, source: &S, month: &str) -> Result<UpdateSummary> {
        let config = self.config;
        let mut summary = UpdateSummary::default();

        let group1 = &config.ads_query_terms_group_1;
        if group1.is_empty() {
            log::warn!("No ads_query_terms_group_1 configured, skipping acknowledgement search");
        } else {
            log::info!("Querying ADS for acknowledgements (month={month}).");
            let articles = source.search(&monthly_query(group1, month))?;
            let n = articles.len();
            for (idx, article) in articles.iter().enumerate() {
                let status = format!(
                    "GROUP 1: Showing article {} out of {n} that matches in acknowledgements.\n",
                    idx + 1
                );
                self.record(&mut summary, article, &status)?;
            }
        }

        let group2 = &config.ads_query_terms_group_2;
        if group2.is_empty() {
            log::warn!("No ads_query_terms_group_2 configured, skipping title/abstract search");
        } else {
            log::info!("Querying ADS for titles and abstracts (month={month}).");
            let articles = source.search(&monthly_query(group2, month))?;
            let n = articles.len();
            for (idx, article) in articles.iter().enumerate() {
                if !is_group2_candidate(article, self.db)? {
                    summary.filtered += 1;
                    continue;
                }
                let status = format!("GROUP 2: Showing article {} out of {n}.\n", idx + 1);
                self.record(&mut summary, article, &status)?;
            }
        }

        log::info!("Finished reviewing all articles for {month}.");
        Ok(summary)
    }

    fn record(&mut self, summary: &mut UpdateSummary, article: &Article, status: &str) -> Result<()> {
        match self.add_interactively(article, status)? {
            Outcome::AlreadyStored => {}
            Outcome::Skipped => summary.shown += 1,
            Outcome::Stored(_) => {
                summary.shown += 1;
                summary.stored += 1;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn into_prompter(self) -> P {
        self.prompter
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{BTreeMap, VecDeque};

    use super::*;

    /// Replays canned answers and records everything shown.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        pub prompts: Vec<String>,
        pub output: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.answers.pop_front())
        }

        fn show(&mut self, text: &str) {
            self.output.push(text.to_string());
        }
    }

    /// Serves fixed results per query and per bibcode.
    #[derive(Default)]
    pub struct FakeSource {
        pub results: BTreeMap<String, Vec<Article>>,
        pub by_bibcode: BTreeMap<String, Vec<Article>>,
    }

    impl ArticleSource for FakeSource {
        fn search(&self, query: &str) -> Result<Vec<Article>, ApiError> {
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }

        fn get_by_bibcode(&self, bibcode: &str) -> Result<Vec<Article>, ApiError> {
            self.by_bibcode
                .get(bibcode)
                .cloned()
                .ok_or_else(|| ApiError::Http {
                    status: Some(503),
                    message: "unavailable".into(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeSource, ScriptedPrompter};
    use super::*;
    use kpub_store::Filter;
    use serde_json::{Value, json};

    fn article(bibcode: &str, extra: Value) -> Article {
        let mut raw = json!({
            "id": bibcode,
            "bibcode": bibcode,
            "title": ["HIRES spectra of a Keck target"],
            "abstract": "We used HIRES and data from the Keck Observatory Archive.",
            "author": ["Smith, J.", "Doe, A."],
            "pubdate": "2024-03-00",
            "year": "2024",
            "property": ["REFEREED", "ARTICLE"],
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut raw, extra) {
            base.extend(extra);
        }
        Article::from_value(raw).unwrap()
    }

    fn config() -> Config {
        Config {
            missions: vec!["keck".into(), "koa".into()],
            sciences: vec!["planets".into(), "galaxies".into()],
            instruments: vec!["HIRES".into(), "NIRSPEC".into()],
            archive: vec!["Keck Observatory Archive".into()],
            colors: [("keck".to_string(), "RED".to_string())].into_iter().collect(),
            ads_query_terms_group_1: vec!["ack:\"Keck\"".into()],
            ads_query_terms_group_2: vec!["abs:\"Keck\"".into()],
            ..Config::default()
        }
    }

    #[test]
    fn grouping_menu_and_answers() {
        let values = ["keck", "koa"];
        let mut p = ScriptedPrompter::new(&["2", "0", "", "9"]);
        assert_eq!(prompt_grouping(&mut p, &values, "Mission", true).unwrap(), "koa");
        assert_eq!(prompt_grouping(&mut p, &values, "Mission", true).unwrap(), "unrelated");
        assert_eq!(prompt_grouping(&mut p, &values, "Mission", true).unwrap(), "");
        assert_eq!(prompt_grouping(&mut p, &values, "Mission", true).unwrap(), "");
        assert_eq!(
            p.prompts[0],
            "=> Select Mission:  [0] Unrelated  [1] Keck  [2] Koa  or [] skip? "
        );
    }

    #[test]
    fn grouping_without_values_does_not_prompt() {
        let mut p = ScriptedPrompter::new(&["1"]);
        let none: [&str; 0] = [];
        assert_eq!(prompt_grouping(&mut p, &none, "Science", false).unwrap(), "");
        assert!(p.prompts.is_empty());
    }

    #[test]
    fn grouping_without_unrelated_rejects_zero() {
        let mut p = ScriptedPrompter::new(&["0"]);
        assert_eq!(prompt_grouping(&mut p, &["planets"], "Science", false).unwrap(), "");
    }

    #[test]
    fn instruments_default_numbers_and_names() {
        let instruments = ["HIRES", "NIRSPEC", "KPF"];
        let mut p = ScriptedPrompter::new(&["", "3, 1", "nirspec,bogus,2", "-"]);
        assert_eq!(prompt_instruments(&mut p, &instruments, &["HIRES"]).unwrap(), vec!["HIRES"]);
        assert_eq!(prompt_instruments(&mut p, &instruments, &[]).unwrap(), vec!["KPF", "HIRES"]);
        assert_eq!(prompt_instruments(&mut p, &instruments, &[]).unwrap(), vec!["NIRSPEC"]);
        assert!(prompt_instruments(&mut p, &instruments, &["HIRES"]).unwrap().is_empty());
    }

    #[test]
    fn abstract_display() {
        let h = Highlighter::new(&config().colors).unwrap();
        let text = display_abstract(&article("2024A", json!({})), &h);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("\x1b[4;31mKeck\x1b[0m"));
        assert_eq!(lines[1], "-".repeat("HIRES spectra of a Keck target".len()));
        assert!(text.contains("Authors: Smith, J., Doe, A."));
        assert!(text.contains("Date: 2024-03-00"));
        assert!(text.contains("Status: [REFEREED, ARTICLE]"));
        assert!(text.contains("URL: https://ui.adsabs.harvard.edu/abs/2024A"));
    }

    #[test]
    fn add_interactively_stores_classification() {
        let db = PublicationDb::open_in_memory().unwrap();
        let config = config();
        let mut reviewer = Reviewer::new(&db, &config, ScriptedPrompter::new(&["1", "2", ""])).unwrap();
        let outcome = reviewer.add_interactively(&article("2024A", json!({})), "status").unwrap();

        let expected = Classification::new("keck", "galaxies")
            .with_instruments(vec!["HIRES".into()])
            .with_archive(true);
        assert_eq!(outcome, Outcome::Stored(expected));
        let stored = db.query(&Filter::all()).unwrap();
        assert_eq!(stored[0].science, "galaxies");
        assert_eq!(stored[0].instruments, vec!["HIRES"]);
        assert!(stored[0].archive);

        let prompter = reviewer.into_prompter();
        assert_eq!(prompter.output[0], "status");
    }

    #[test]
    fn unrelated_skips_science_and_instruments() {
        let db = PublicationDb::open_in_memory().unwrap();
        let config = config();
        let mut reviewer = Reviewer::new(&db, &config, ScriptedPrompter::new(&["0"])).unwrap();
        let outcome = reviewer.add_interactively(&article("2024A", json!({})), "").unwrap();
        assert_eq!(outcome, Outcome::Stored(Classification::new("unrelated", "")));
        assert_eq!(reviewer.into_prompter().prompts.len(), 1);
        assert_eq!(db.query(&Filter::all().mission("unrelated")).unwrap().len(), 1);
    }

    #[test]
    fn empty_mission_answer_skips() {
        let db = PublicationDb::open_in_memory().unwrap();
        let config = config();
        let mut reviewer = Reviewer::new(&db, &config, ScriptedPrompter::new(&[""])).unwrap();
        let a = article("2024A", json!({}));
        assert_eq!(reviewer.add_interactively(&a, "").unwrap(), Outcome::Skipped);
        assert!(!db.contains(&a).unwrap());
    }

    #[test]
    fn stored_paper_is_not_shown_again() {
        let db = PublicationDb::open_in_memory().unwrap();
        let a = article("2024A", json!({}));
        db.add(&a, &Classification::new("keck", "")).unwrap();
        let config = config();
        let mut reviewer = Reviewer::new(&db, &config, ScriptedPrompter::new(&[])).unwrap();
        assert_eq!(reviewer.add_interactively(&a, "").unwrap(), Outcome::AlreadyStored);
        assert!(reviewer.into_prompter().output.is_empty());
    }

    #[test]
    fn group2_filters() {
        let db = PublicationDb::open_in_memory().unwrap();
        let ok = article("2024ApJ...1A", json!({}));
        assert!(is_group2_candidate(&ok, &db).unwrap());

        let no_abstract = article("2024ApJ...2A", json!({"abstract": null}));
        assert!(!is_group2_candidate(&no_abstract, &db).unwrap());

        let unrefereed = article("2024AAS...3A", json!({"property": ["NOT REFEREED"], "pub": "AAS Meeting"}));
        assert!(!is_group2_candidate(&unrefereed, &db).unwrap());

        let preprint = article("2024arXiv...4A", json!({"property": ["NOT REFEREED"], "pub": "arXiv e-prints"}));
        assert!(is_group2_candidate(&preprint, &db).unwrap());

        let no_venue = article("2024xxx...5A", json!({"property": ["NOT REFEREED"]}));
        assert!(is_group2_candidate(&no_venue, &db).unwrap());

        let proposal = article("2024jwst.prop.6A", json!({}));
        assert!(!is_group2_candidate(&proposal, &db).unwrap());
        let cospar = article("2024cosp...45..7A", json!({}));
        assert!(!is_group2_candidate(&cospar, &db).unwrap());

        db.add(&ok, &Classification::new("keck", "")).unwrap();
        assert!(!is_group2_candidate(&ok, &db).unwrap());
    }

    #[test]
    fn update_reviews_both_groups() {
        let db = PublicationDb::open_in_memory().unwrap();
        let config = config();
        let mut source = FakeSource::default();
        source.results.insert(
            monthly_query(&config.ads_query_terms_group_1, "2024-03"),
            vec![article("2024G1", json!({"abstract": null}))],
        );
        source.results.insert(
            monthly_query(&config.ads_query_terms_group_2, "2024-03"),
            vec![
                article("2024G1", json!({})),
                article("2024G2", json!({})),
                article("2024jwst.prop.1", json!({})),
            ],
        );

        // G1: keck / planets / no instruments; G2: skip
        let prompter = ScriptedPrompter::new(&["1", "1", "-", ""]);
        let mut reviewer = Reviewer::new(&db, &config, prompter).unwrap();
        let summary = reviewer.update(&source, "2024-03").unwrap();

        assert_eq!(
            summary,
            UpdateSummary {
                shown: 2,
                stored: 1,
                filtered: 2,
            }
        );
        let stored = db.query(&Filter::all()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].bibcode, "2024G1");
        assert!(stored[0].instruments.is_empty());
    }
}
