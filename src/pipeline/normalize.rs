//! Normalisation: turn a raw match such as `"P = 0.023"` into a number.
//!
//! A raw match carries markers and noise around the numeral: the `P`/`p`
//! label, spaces, `=`, `<` and sometimes a trailing citation bracket picked
//! up by a custom pattern. Cleanup is an ordered list of named rules, each a
//! pure `&str → &str` slice operation, followed by a split on `<` that tells
//! an exact reading (`p = .023`) from a bound (`p < .05`).
//!
//! ## Rule Order
//!
//! Rules run in the order of [`RULES`] and each sees the output of the
//! previous one. The two "after P" rules are applied lowercase first, so
//! whichever marker occurs later in the match wins.

use crate::error::PScoreError;
use crate::pipeline::expand::TruncationExpander;
use std::sync::Arc;

/// Caller-supplied conversion for exact readings.
///
/// Receives the normaliser (so it can fall back to
/// [`ValueNormalizer::expand`]) and the cleaned token.
pub type ConvertFn =
    Arc<dyn Fn(&mut ValueNormalizer, &str) -> Result<f64, PScoreError> + Send + Sync>;

/// Wrap a closure as a [`ConvertFn`].
pub fn convert_fn<F>(f: F) -> ConvertFn
where
    F: Fn(&mut ValueNormalizer, &str) -> Result<f64, PScoreError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A named cleanup step.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str) -> &str,
}

/// Cleanup rules, in application order.
pub const RULES: [Rule; 5] = [
    Rule {
        name: "strip_citation",
        apply: strip_citation,
    },
    Rule {
        name: "after_lower_p",
        apply: after_lower_p,
    },
    Rule {
        name: "after_upper_p",
        apply: after_upper_p,
    },
    Rule {
        name: "after_last_space",
        apply: after_last_space,
    },
    Rule {
        name: "after_equals",
        apply: after_equals,
    },
];

// ── Rule 1: Strip citation ───────────────────────────────────────────────────

/// Drop the first `]` and everything after it.
pub fn strip_citation(s: &str) -> &str {
    s.split_once(']').map_or(s, |(head, _)| head)
}

// ── Rules 2–5: Select text after a marker ────────────────────────────────────

fn after_last(s: &str, marker: char) -> &str {
    s.rsplit_once(marker).map_or(s, |(_, tail)| tail)
}

pub fn after_lower_p(s: &str) -> &str {
    after_last(s, 'p')
}

pub fn after_upper_p(s: &str) -> &str {
    after_last(s, 'P')
}

pub fn after_last_space(s: &str) -> &str {
    after_last(s, ' ')
}

pub fn after_equals(s: &str) -> &str {
    after_last(s, '=')
}

/// Run every rule of [`RULES`] over `raw`.
pub fn apply_rules(raw: &str) -> &str {
    RULES.iter().fold(raw, |s, rule| (rule.apply)(s))
}

// ── Reading classification ───────────────────────────────────────────────────

/// What a cleaned match says about the p-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading<'a> {
    /// A reported value, e.g. `0.023` from `p = 0.023`.
    Exact(&'a str),
    /// An upper bound, e.g. `.05` from `p<.05`. Only the piece directly
    /// after the first `<` is kept.
    Bound(&'a str),
}

/// Clean `raw` and classify it.
pub fn read(raw: &str) -> Reading<'_> {
    let cleaned = apply_rules(raw);
    match cleaned.split_once('<') {
        None => Reading::Exact(cleaned),
        Some((_, rest)) => Reading::Bound(rest.split_once('<').map_or(rest, |(b, _)| b)),
    }
}

// ── Normaliser ───────────────────────────────────────────────────────────────

/// Converts raw matches to p-values.
#[derive(Debug)]
pub struct ValueNormalizer {
    expander: TruncationExpander,
}

impl Default for ValueNormalizer {
    fn default() -> Self {
        Self::new(TruncationExpander::from_entropy())
    }
}

impl ValueNormalizer {
    pub fn new(expander: TruncationExpander) -> Self {
        Self { expander }
    }

    /// Normalise one raw match.
    ///
    /// `convert` replaces the built-in expansion for exact readings only;
    /// bounds always go through [`TruncationExpander`].
    pub fn normalize(
        &mut self,
        raw: &str,
        convert: Option<&ConvertFn>,
    ) -> Result<f64, PScoreError> {
        match read(raw) {
            Reading::Exact(token) => match convert {
                Some(hook) => hook(self, token),
                None => self.expand_match(raw, token),
            },
            Reading::Bound(token) => self.expand_match(raw, token),
        }
    }

    /// Built-in conversion of a cleaned token.
    pub fn expand(&mut self, token: &str) -> Result<f64, PScoreError> {
        self.expand_match(token, token)
    }

    fn expand_match(&mut self, raw: &str, token: &str) -> Result<f64, PScoreError> {
        self.expander
            .expand(token)
            .map_err(|_| PScoreError::NumericFormat {
                raw: raw.to_string(),
                token: token.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn normalizer() -> ValueNormalizer {
        ValueNormalizer::new(TruncationExpander::with_rng(StepRng::new(0, 0)))
    }

    // ── Individual rules ─────────────────────────────────────────────────

    #[test]
    fn strip_citation_cuts_at_first_bracket() {
        assert_eq!(strip_citation("p=0.04]"), "p=0.04");
        assert_eq!(strip_citation("p=0.04] [12]"), "p=0.04");
        assert_eq!(strip_citation("p=0.04"), "p=0.04");
    }

    #[test]
    fn after_p_rules_keep_tail() {
        assert_eq!(after_lower_p("p = 0.1"), " = 0.1");
        assert_eq!(after_upper_p("P<.05"), "<.05");
        assert_eq!(after_lower_p("P = .2"), "P = .2");
    }

    #[test]
    fn later_marker_wins() {
        // Lowercase runs first, so an uppercase P after it still cuts.
        assert_eq!(apply_rules("p x P=.3"), ".3");
    }

    #[test]
    fn space_and_equals_rules() {
        assert_eq!(after_last_space(" = 0.1"), "0.1");
        assert_eq!(after_equals("=0.1"), "0.1");
        assert_eq!(after_equals("0.1"), "0.1");
    }

    #[test]
    fn rules_are_listed_in_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "strip_citation",
                "after_lower_p",
                "after_upper_p",
                "after_last_space",
                "after_equals"
            ]
        );
    }

    // ── Classification ───────────────────────────────────────────────────

    #[test]
    fn read_classifies_exact_and_bound() {
        assert_eq!(read("P = 0.023"), Reading::Exact("0.023"));
        assert_eq!(read("p<.05"), Reading::Bound(".05"));
        // The spaced form loses its `<` to the space rule.
        assert_eq!(read("p < .001"), Reading::Exact(".001"));
        assert_eq!(read("P 0.01"), Reading::Exact("0.01"));
    }

    #[test]
    fn read_keeps_only_piece_after_first_lt() {
        assert_eq!(read("p<.05<.01"), Reading::Bound(".05"));
    }

    // ── Normalisation ────────────────────────────────────────────────────

    #[test]
    fn plain_decimal_is_exact() {
        assert_eq!(normalizer().normalize("p=0.023", None).unwrap(), 0.023);
    }

    #[test]
    fn bracketed_match_is_truncated() {
        assert_eq!(normalizer().normalize("p=0.04]", None).unwrap(), 0.04);
    }

    #[test]
    fn threshold_forms_expand_into_their_ranges() {
        let mut n = ValueNormalizer::default();
        for _ in 0..50 {
            let a = n.normalize("P = 0.05", None).unwrap();
            assert!((0.01..=0.05).contains(&a), "got {a}");
            let b = n.normalize("p=.05", None).unwrap();
            assert!((0.01..=0.05).contains(&b), "got {b}");
            let c = n.normalize("P<0.01", None).unwrap();
            assert!((0.001..=0.01).contains(&c), "got {c}");
            let d = n.normalize("p < .001", None).unwrap();
            assert!((0.0..=0.0001).contains(&d), "got {d}");
        }
    }

    #[test]
    fn non_numeric_token_fails_with_raw_text() {
        let err = normalizer().normalize("p = .x", None).unwrap_err();
        match err {
            PScoreError::NumericFormat { raw, token } => {
                assert_eq!(raw, "p = .x");
                assert_eq!(token, ".x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn hook_replaces_exact_conversion() {
        let hook = convert_fn(|_, token| Ok(token.len() as f64));
        assert_eq!(normalizer().normalize("p = 0.023", Some(&hook)).unwrap(), 5.0);
    }

    #[test]
    fn hook_is_not_used_for_bounds() {
        let hook = convert_fn(|_, _| Ok(42.0));
        assert_eq!(normalizer().normalize("p<.3", Some(&hook)).unwrap(), 0.3);
    }

    #[test]
    fn hook_can_fall_back_to_builtin() {
        let hook = convert_fn(|n, token| {
            let v = n.expand(token)?;
            Ok(v * 2.0)
        });
        assert_eq!(normalizer().normalize("p = 0.2", Some(&hook)).unwrap(), 0.4);
    }
}
