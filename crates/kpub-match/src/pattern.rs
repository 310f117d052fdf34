//! Match patterns with the uppercase-means-case-sensitive convention

use regex::{Regex, RegexBuilder};

/// A pattern failed to compile.
#[derive(Debug)]
pub enum RuleError {
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    UnknownColor {
        word: String,
        color: String,
    },
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern {pattern:?}: {source}")
            }
            Self::UnknownColor { word, color } => {
                write!(f, "unknown highlight color {color:?} for {word:?}")
            }
        }
    }
}

impl std::error::Error for RuleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::UnknownColor { .. } => None,
        }
    }
}

/// True when the text has at least one uppercase letter and every cased
/// letter is uppercase.
///
/// Titlecase letters such as `ǅ` count as cased but not uppercase, so
/// `"Aǅ"` is false: any character that uppercasing would change disqualifies
/// the text.
///
/// Acronyms like `UCLA` or `JPL` must not match inside ordinary words, so
/// they are matched case-sensitively.
pub fn is_all_uppercase(text: &str) -> bool {
    text.chars().any(char::is_uppercase)
        && text
            .chars()
            .all(|c| !c.is_lowercase() && c.to_uppercase().eq(std::iter::once(c)))
}

/// A compiled regular expression plus its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    text: String,
    regex: Regex,
    case_sensitive: bool,
}

impl Pattern {
    pub fn new(text: &str) -> Result<Self, RuleError> {
        Self::build(text, is_all_uppercase(text))
    }

    /// Case-insensitive regardless of the text (terminal highlighting).
    pub fn insensitive(text: &str) -> Result<Self, RuleError> {
        Self::build(text, false)
    }

    fn build(text: &str, case_sensitive: bool) -> Result<Self, RuleError> {
        let regex = RegexBuilder::new(text)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                pattern: text.to_string(),
                source,
            })?;
        Ok(Self {
            text: text.to_string(),
            regex,
            case_sensitive,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// Number of non-overlapping matches.
    pub fn count(&self, haystack: &str) -> usize {
        self.regex.find_iter(haystack).count()
    }
}
