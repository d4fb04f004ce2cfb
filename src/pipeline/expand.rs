//! Truncation expansion: give bound-style p-values a plausible value.
//!
//! Papers often report only a bound ("p < .05"). Plotting every such report
//! at exactly 0.05 piles mass onto the reporting thresholds and distorts a
//! fine-grained histogram, so the three conventional thresholds are replaced
//! by a random draw from a range below them. Every other token is parsed as
//! a plain decimal.
//!
//! The random source is injected. Production code seeds it from entropy (or
//! from a configured seed); tests pass a deterministic generator.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;
use std::num::ParseFloatError;

/// One threshold token family and the range that replaces it.
struct Expansion {
    tokens: [&'static str; 2],
    scale: f64,
    offset: f64,
}

/// Value = `U * scale + offset`, with `U` uniform in [0, 1).
const EXPANSIONS: [Expansion; 3] = [
    Expansion {
        tokens: ["0.05", ".05"],
        scale: 0.04,
        offset: 0.01,
    },
    Expansion {
        tokens: ["0.01", ".01"],
        scale: 0.009,
        offset: 0.001,
    },
    Expansion {
        tokens: ["0.001", ".001"],
        scale: 0.0001,
        offset: 0.0,
    },
];

/// Converts a cleaned numeric token into a p-value.
pub struct TruncationExpander {
    rng: Box<dyn RngCore + Send>,
}

impl TruncationExpander {
    /// Expander seeded from operating-system entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Expander with a reproducible sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Expander drawing from the given generator.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self { rng: Box::new(rng) }
    }

    /// Expand a threshold token or parse a plain decimal.
    ///
    /// Matching on the three threshold families is exact: `"0.050"` is
    /// parsed as the number 0.05, not expanded.
    pub fn expand(&mut self, token: &str) -> Result<f64, ParseFloatError> {
        if let Some(exp) = EXPANSIONS.iter().find(|e| e.tokens.iter().any(|t| *t == token)) {
            let u: f64 = self.rng.gen();
            return Ok(u * exp.scale + exp.offset);
        }
        token.trim().parse::<f64>()
    }
}

impl fmt::Debug for TruncationExpander {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TruncationExpander")
            .field("rng", &"<dyn RngCore>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn lowest() -> TruncationExpander {
        TruncationExpander::with_rng(StepRng::new(0, 0))
    }

    fn highest() -> TruncationExpander {
        TruncationExpander::with_rng(StepRng::new(u64::MAX, 0))
    }

    #[test]
    fn point_zero_five_maps_into_range() {
        assert_eq!(lowest().expand(".05").unwrap(), 0.01);
        let hi = highest().expand("0.05").unwrap();
        assert!(hi > 0.0499 && hi <= 0.05, "got {hi}");
    }

    #[test]
    fn point_zero_one_maps_into_range() {
        assert_eq!(lowest().expand("0.01").unwrap(), 0.001);
        let hi = highest().expand(".01").unwrap();
        assert!(hi > 0.0099 && hi <= 0.01, "got {hi}");
    }

    #[test]
    fn point_zero_zero_one_maps_below_ten_thousandth() {
        assert_eq!(lowest().expand(".001").unwrap(), 0.0);
        let hi = highest().expand("0.001").unwrap();
        assert!(hi > 0.0 && hi <= 0.0001, "got {hi}");
    }

    #[test]
    fn other_tokens_parse_exactly() {
        let mut e = lowest();
        assert_eq!(e.expand("0.023").unwrap(), 0.023);
        assert_eq!(e.expand(".4").unwrap(), 0.4);
        assert_eq!(e.expand("0.050").unwrap(), 0.05);
    }

    #[test]
    fn non_numeric_token_is_an_error() {
        assert!(lowest().expand("").is_err());
        assert!(lowest().expand(".0x5").is_err());
    }

    #[test]
    fn seeded_expanders_agree() {
        let mut a = TruncationExpander::seeded(7);
        let mut b = TruncationExpander::seeded(7);
        for token in [".05", "0.01", ".001", ".05"] {
            assert_eq!(a.expand(token).unwrap(), b.expand(token).unwrap());
        }
    }

    #[test]
    fn entropy_draws_stay_in_range() {
        let mut e = TruncationExpander::from_entropy();
        for _ in 0..200 {
            let v = e.expand(".05").unwrap();
            assert!((0.01..=0.05).contains(&v), "got {v}");
        }
    }
}
