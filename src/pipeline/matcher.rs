//! Pattern matching: find raw p-value mentions in page text.

use crate::error::PScoreError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Built-in search pattern.
///
/// Matches a `P`/`p`, optional spaces, optional `=`/`<`, optional spaces, an
/// optional leading digit, a decimal point and one or more digits:
/// `P = 0.05`, `p<.001`, `P 0.01`.
pub const DEFAULT_PATTERN: &str = r"[P|p][ ]*[=|<]*[ ]*[0-9]?[.][0-9]+";

static RE_DEFAULT: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_PATTERN).unwrap());

/// Compiled search pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self {
            regex: RE_DEFAULT.clone(),
        }
    }
}

impl PatternMatcher {
    /// Compile a custom pattern.
    pub fn new(pattern: &str) -> Result<Self, PScoreError> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| PScoreError::InvalidPattern {
                pattern: pattern.to_string(),
                detail: e.to_string(),
            })
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// All non-overlapping matches in `text`, in order of occurrence.
    ///
    /// When the pattern has capture groups, the first group is reported
    /// instead of the whole match; a match where that group did not
    /// participate yields an empty string.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        if self.regex.captures_len() > 1 {
            self.regex
                .captures_iter(text)
                .map(|caps| caps.get(1).map_or("", |m| m.as_str()).to_string())
                .collect()
        } else {
            self.regex
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_finds_common_notations() {
        let m = PatternMatcher::default();
        let text = "We found P = 0.05 and p<.001, then P 0.01 overall.";
        assert_eq!(m.find_all(text), vec!["P = 0.05", "p<.001", "P 0.01"]);
    }

    #[test]
    fn default_pattern_keeps_order_of_occurrence() {
        let m = PatternMatcher::default();
        let found = m.find_all("p=.2 ... p = 0.03 ... P<0.5");
        assert_eq!(found, vec!["p=.2", "p = 0.03", "P<0.5"]);
    }

    #[test]
    fn default_pattern_requires_a_decimal_point() {
        let m = PatternMatcher::default();
        assert!(m.find_all("p = 5 and P < 1").is_empty());
    }

    #[test]
    fn empty_text_has_no_matches() {
        assert!(PatternMatcher::default().find_all("").is_empty());
    }

    #[test]
    fn capture_group_is_reported_instead_of_match() {
        let m = PatternMatcher::new(r"p-value of (\.[0-9]+)").unwrap();
        assert_eq!(m.find_all("a p-value of .03 here"), vec![".03"]);
    }

    #[test]
    fn source_text_is_kept() {
        assert_eq!(PatternMatcher::default().as_str(), DEFAULT_PATTERN);
        assert_eq!(PatternMatcher::new(r"p=\d").unwrap().as_str(), r"p=\d");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = PatternMatcher::new("[p").unwrap_err();
        assert!(matches!(err, PScoreError::InvalidPattern { .. }));
    }
}
