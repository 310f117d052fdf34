//! ADS document wrapper
//!
//! The raw JSON object is kept intact (it is stored verbatim in the
//! database); typed accessors read the fields the tools care about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One ADS search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Article {
    raw: Map<String, Value>,
}

impl Article {
    /// Wrap a JSON value; `None` unless it is an object with a bibcode.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(raw) if raw.get("bibcode").is_some_and(Value::is_string) => {
                Some(Self { raw })
            }
            _ => None,
        }
    }

    /// Parse a stored JSON blob.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.raw.clone()).to_string()
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    fn str_list(&self, key: &str) -> Vec<&str> {
        match self.raw.get(key) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    /// Like `str_list`, but non-string entries stay in place as `""` so
    /// lists parallel to `author` keep their positions.
    fn positional_list(&self, key: &str) -> Vec<&str> {
        match self.raw.get(key) {
            Some(Value::Array(items)) => items.iter().map(|v| v.as_str().unwrap_or("")).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    fn count_field(&self, key: &str) -> Option<u64> {
        self.raw.get(key).and_then(Value::as_u64)
    }

    /// ADS internal record id (string or number in the API response).
    pub fn id(&self) -> String {
        match self.raw.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    pub fn bibcode(&self) -> &str {
        self.str_field("bibcode").unwrap_or_default()
    }

    /// First title, or empty.
    pub fn title(&self) -> &str {
        self.str_list("title").first().copied().unwrap_or_default()
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.str_field("abstract")
    }

    pub fn acknowledgement(&self) -> Option<&str> {
        self.str_field("ack")
    }

    /// Publication date as `YYYY-MM-DD`; month/day may be `00`.
    pub fn pubdate(&self) -> &str {
        self.str_field("pubdate").unwrap_or_default()
    }

    /// Year as text, falling back to the pubdate prefix.
    pub fn year(&self) -> &str {
        match self.str_field("year") {
            Some(y) => y,
            None => self.pubdate().get(..4).unwrap_or_default(),
        }
    }

    pub fn year_number(&self) -> Option<i32> {
        self.year().parse().ok()
    }

    /// `YYYY-MM` prefix of the pubdate.
    pub fn month(&self) -> &str {
        let date = self.pubdate();
        date.get(..7).unwrap_or(date)
    }

    pub fn authors(&self) -> Vec<&str> {
        self.str_list("author")
    }

    pub fn author_norm(&self) -> Vec<&str> {
        self.str_list("author_norm")
    }

    pub fn first_author_norm(&self) -> Option<&str> {
        self.str_field("first_author_norm")
    }

    /// Affiliation strings, one per author position.
    pub fn affiliations(&self) -> Vec<&str> {
        self.positional_list("aff")
    }

    /// ADS property flags; a null `property` is an empty list.
    pub fn properties(&self) -> Vec<&str> {
        self.str_list("property")
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.str_list("keyword")
    }

    pub fn keyword_norm(&self) -> Vec<&str> {
        self.str_list("keyword_norm")
    }

    /// Journal / venue name.
    pub fn pub_name(&self) -> Option<&str> {
        self.str_field("pub")
    }

    pub fn citation_count(&self) -> Option<u64> {
        self.count_field("citation_count")
    }

    pub fn read_count(&self) -> Option<u64> {
        self.count_field("read_count")
    }

    pub fn is_refereed(&self) -> bool {
        self.properties().contains(&"REFEREED")
    }

    pub fn is_not_refereed(&self) -> bool {
        self.properties().contains(&"NOT REFEREED")
    }

    pub fn is_phd_thesis(&self) -> bool {
        self.bibcode().contains("PhDT")
    }

    /// Text of a named field for matching: arrays are joined with `; `.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.raw.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                (!parts.is_empty()).then(|| parts.join("; "))
            }
            _ => None,
        }
    }

    pub fn mission(&self) -> &str {
        self.str_field("mission").unwrap_or_default()
    }

    pub fn science(&self) -> &str {
        self.str_field("science").unwrap_or_default()
    }

    /// Record the user classification inside the raw document.
    pub fn set_classification(&mut self, mission: &str, science: &str) {
        self.raw.insert("mission".into(), Value::from(mission));
        self.raw.insert("science".into(), Value::from(science));
    }

    /// Record instrument tags and the archive flag inside the raw document.
    pub fn set_tags(&mut self, instruments: &[String], archive: bool) {
        self.raw.insert("instruments".into(), Value::from(instruments.to_vec()));
        self.raw.insert("archive".into(), Value::from(archive));
    }

    /// ADS abstract page.
    pub fn url(&self) -> String {
        format!("https://ui.adsabs.harvard.edu/abs/{}", self.bibcode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Article {
        Article::from_value(json!({
            "id": "1234",
            "bibcode": "2019ApJ...870...10S",
            "title": ["A study of things"],
            "pubdate": "2019-01-00",
            "year": "2019",
            "author": ["Smith, J.", "Doe, A."],
            "author_norm": ["Smith, J", "Doe, A"],
            "first_author_norm": "Smith, J",
            "aff": ["W. M. Keck Observatory", "-"],
            "property": ["REFEREED", "ARTICLE"],
            "citation_count": 12,
            "read_count": null
        }))
        .unwrap()
    }

    #[test]
    fn accessors() {
        let a = sample();
        assert_eq!(a.id(), "1234");
        assert_eq!(a.bibcode(), "2019ApJ...870...10S");
        assert_eq!(a.title(), "A study of things");
        assert_eq!(a.month(), "2019-01");
        assert_eq!(a.year_number(), Some(2019));
        assert_eq!(a.authors().len(), 2);
        assert_eq!(a.citation_count(), Some(12));
        assert_eq!(a.read_count(), None);
        assert!(a.is_refereed());
        assert!(!a.is_phd_thesis());
    }

    #[test]
    fn numeric_id() {
        let a = Article::from_value(json!({"id": 42, "bibcode": "x"})).unwrap();
        assert_eq!(a.id(), "42");
    }

    #[test]
    fn null_property_is_empty() {
        let a = Article::from_value(json!({"bibcode": "x", "property": null})).unwrap();
        assert!(a.properties().is_empty());
        assert!(!a.is_refereed());
    }

    #[test]
    fn not_refereed_is_not_refereed() {
        let a = Article::from_value(json!({"bibcode": "x", "property": ["NOT REFEREED"]}))
            .unwrap();
        assert!(!a.is_refereed());
        assert!(a.is_not_refereed());
    }

    #[test]
    fn year_falls_back_to_pubdate() {
        let a = Article::from_value(json!({"bibcode": "x", "pubdate": "2021-03-00"})).unwrap();
        assert_eq!(a.year(), "2021");
    }

    #[test]
    fn rejects_non_objects() {
        assert!(Article::from_value(json!(["bibcode"])).is_none());
        assert!(Article::from_value(json!({"title": ["no bibcode"]})).is_none());
    }

    #[test]
    fn classification_is_stored_in_raw() {
        let mut a = sample();
        a.set_classification("keck", "planets");
        a.set_tags(&["HIRES".to_string()], true);
        let back = Article::from_json(&a.to_json()).unwrap();
        assert_eq!(back.mission(), "keck");
        assert_eq!(back.science(), "planets");
        assert_eq!(back.raw()["instruments"], json!(["HIRES"]));
        assert_eq!(back.raw()["archive"], json!(true));
    }

    #[test]
    fn text_field_joins_arrays() {
        let a = sample();
        assert_eq!(
            a.text_field("aff").as_deref(),
            Some("W. M. Keck Observatory; -")
        );
        assert_eq!(a.text_field("missing"), None);
    }

    #[test]
    fn affiliations_keep_author_positions() {
        let a = Article::from_value(json!({
            "author": ["A", "B", "C"],
            "aff": [null, "Keck Observatory", "-"],
        }))
        .unwrap();
        assert_eq!(a.affiliations(), vec!["", "Keck Observatory", "-"]);
    }
}
