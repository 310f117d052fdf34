//! Ordered affiliation rule sets

use kpub_ads::Article;
use serde::Deserialize;

use crate::pattern::{Pattern, RuleError};

/// Inputs this short (after trimming) carry no affiliation; ADS uses `-`.
const MIN_AFFILIATION_CHARS: usize = 3;

/// One affiliation category and the patterns that identify it.
#[derive(Debug, Clone, Deserialize)]
pub struct AffRule {
    #[serde(rename = "type")]
    pub kind: String,
    pub strings: Vec<String>,
}

/// `affiliations` section of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AffiliationConfig {
    /// Category for affiliations no rule matches
    pub default: String,
    /// Author positions examined per paper (first author = 1)
    pub positions: usize,
    pub rules: Vec<AffRule>,
}

impl Default for AffiliationConfig {
    fn default() -> Self {
        Self {
            default: "other".to_string(),
            positions: 3,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    kind: String,
    patterns: Vec<Pattern>,
}

/// Compiled, ordered rules. The first rule with any pattern matching any
/// `;`-separated segment decides the category.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
    default: String,
}

impl RuleSet {
    pub fn new(rules: &[AffRule], default: impl Into<String>) -> Result<Self, RuleError> {
        let rules = rules
            .iter()
            .map(|rule| {
                let patterns = rule
                    .strings
                    .iter()
                    .map(|s| Pattern::new(s))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CompiledRule {
                    kind: rule.kind.clone(),
                    patterns,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        Ok(Self {
            rules,
            default: default.into(),
        })
    }

    pub fn from_config(config: &AffiliationConfig) -> Result<Self, RuleError> {
        Self::new(&config.rules, config.default.clone())
    }

    /// Category of an affiliation string.
    ///
    /// `None` means unknown (empty or placeholder input), which is distinct
    /// from the default category returned when nothing matches.
    pub fn classify(&self, affiliation: &str) -> Option<&str> {
        if affiliation.trim().chars().count() < MIN_AFFILIATION_CHARS {
            return None;
        }
        let segments: Vec<&str> = affiliation.split(';').collect();
        for rule in &self.rules {
            for pattern in &rule.patterns {
                if segments.iter().any(|seg| pattern.is_match(seg)) {
                    return Some(&rule.kind);
                }
            }
        }
        Some(&self.default)
    }

    /// Categories of the first `positions` authors, `None` where the author
    /// has no (or a placeholder) affiliation or the paper has fewer authors.
    pub fn classify_authors(&self, article: &Article, positions: usize) -> Vec<Option<&str>> {
        let affs = article.affiliations();
        (0..positions)
            .map(|i| affs.get(i).and_then(|aff| self.classify(aff)))
            .collect()
    }

    pub fn default_kind(&self) -> &str {
        &self.default
    }

    /// Rule categories in declared order, then the default.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.rules.iter().map(|r| r.kind.as_str()).collect();
        kinds.push(&self.default);
        kinds
    }

    /// Category for a 1-based numeric code: rule order, then the default
    /// as the last code. Legacy spreadsheets encode categories this way.
    pub fn kind_for_code(&self, code: usize) -> Option<&str> {
        let kinds = self.kinds();
        code.checked_sub(1).and_then(|i| kinds.get(i).copied())
    }
}
