//! Terminal highlighting of configured keywords

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use crate::pattern::{Pattern, RuleError};

const END: &str = "\x1b[0m";

/// Underlined ANSI color for a config color name.
fn ansi_code(color: &str) -> Option<&'static str> {
    Some(match color.to_ascii_uppercase().as_str() {
        "RED" => "\x1b[4;31m",
        "GREEN" => "\x1b[4;32m",
        "YELLOW" => "\x1b[4;33m",
        "BLUE" => "\x1b[4;34m",
        "PURPLE" => "\x1b[4;35m",
        "CYAN" => "\x1b[4;36m",
        _ => return None,
    })
}

/// Wraps every case-insensitive occurrence of a configured word in its color.
///
/// All words are combined into one alternation and applied in a single
/// pass, so no word can match inside an escape code inserted for another.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    combined: Option<Regex>,
    codes: Vec<&'static str>,
}

fn group_name(i: usize) -> String {
    format!("kpubw{i}")
}

impl Highlighter {
    /// `colors` maps a word (regex) to a color name. Where words overlap at
    /// the same position, the first in key order wins.
    pub fn new(colors: &BTreeMap<String, String>) -> Result<Self, RuleError> {
        if colors.is_empty() {
            return Ok(Self::default());
        }
        let mut codes = Vec::with_capacity(colors.len());
        let mut alternatives = Vec::with_capacity(colors.len());
        for (i, (word, color)) in colors.iter().enumerate() {
            let code = ansi_code(color).ok_or_else(|| RuleError::UnknownColor {
                word: word.clone(),
                color: color.clone(),
            })?;
            // compiled alone first so a bad word is reported by name
            Pattern::insensitive(word)?;
            alternatives.push(format!("(?P<{}>{word})", group_name(i)));
            codes.push(code);
        }
        let text = alternatives.join("|");
        let combined = RegexBuilder::new(&text)
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                pattern: text.clone(),
                source,
            })?;
        Ok(Self {
            combined: Some(combined),
            codes,
        })
    }

    pub fn highlight(&self, text: &str) -> String {
        let Some(combined) = &self.combined else {
            return text.to_string();
        };
        combined
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let whole = &caps[0];
                let code = (0..self.codes.len())
                    .find(|&i| caps.name(&group_name(i)).is_some())
                    .map(|i| self.codes[i]);
                match code {
                    Some(code) if !whole.is_empty() => format!("{code}{whole}{END}"),
                    _ => whole.to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(w, c)| (w.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn wraps_matches_keeping_original_case() {
        let h = Highlighter::new(&colors(&[("keck", "RED")])).unwrap();
        assert_eq!(
            h.highlight("W. M. Keck Observatory"),
            "W. M. \x1b[4;31mKeck\x1b[0m Observatory"
        );
    }

    #[test]
    fn no_words_is_identity() {
        let h = Highlighter::default();
        assert_eq!(h.highlight("plain"), "plain");
    }

    #[test]
    fn color_names_case_insensitive() {
        assert!(Highlighter::new(&colors(&[("hires", "green")])).is_ok());
    }

    #[test]
    fn later_words_do_not_match_inside_codes() {
        // "m" and "4" both occur in the escape code wrapped around "Keck"
        let h = Highlighter::new(&colors(&[("Keck", "RED"), ("m", "GREEN"), ("4", "BLUE")])).unwrap();
        assert_eq!(h.highlight("Keck"), "\x1b[4;31mKeck\x1b[0m");
        assert_eq!(
            h.highlight("Keck M4"),
            "\x1b[4;31mKeck\x1b[0m \x1b[4;32mM\x1b[0m\x1b[4;34m4\x1b[0m"
        );
    }

    #[test]
    fn overlapping_words_pick_first_key() {
        let h = Highlighter::new(&colors(&[("Keck", "RED"), ("Keck Observatory", "GREEN")])).unwrap();
        assert_eq!(h.highlight("Keck Observatory"), "\x1b[4;31mKeck\x1b[0m Observatory");
    }

    #[test]
    fn invalid_word_reported_by_name() {
        let err = Highlighter::new(&colors(&[("Keck (", "RED")])).unwrap_err();
        assert!(err.to_string().contains("\"Keck (\""));
    }

    #[test]
    fn unknown_color_rejected() {
        let err = Highlighter::new(&colors(&[("keck", "MAGENTA")])).unwrap_err();
        assert!(err.to_string().contains("MAGENTA"));
    }
}
