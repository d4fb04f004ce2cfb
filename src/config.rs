//! Configuration types for p-value scoring.
//!
//! Two levels, matching how the knobs are used:
//!
//! * [`ScorerConfig`]: fixed for the lifetime of a [`crate::scorer::PScorer`].
//!   Holds the default search pattern, the directory prefix documents are resolved
//!   against, and the seed of the random source. Built via
//!   [`ScorerConfigBuilder`], which validates the pattern up front.
//! * [`SummarizeOptions`]: per call. Bins, significance filtering, title,
//!   a pattern override and an optional conversion hook.

use crate::error::PScoreError;
use crate::pipeline::matcher::{PatternMatcher, DEFAULT_PATTERN};
use crate::pipeline::normalize::ConvertFn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a [`crate::scorer::PScorer`].
///
/// # Example
/// ```rust
/// use pscore::ScorerConfig;
///
/// let config = ScorerConfig::builder()
///     .files_path("papers/")
///     .seed(42)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Regular expression used to find p-value mentions. Default:
    /// [`DEFAULT_PATTERN`]. Overridable per call with
    /// [`SummarizeOptions::search_pattern`].
    pub search_pattern: String,

    /// Directory every document identifier is resolved against. Default: `.`.
    ///
    /// An absolute document path ignores the prefix.
    pub files_path: PathBuf,

    /// Seed for the random source that expands `.05`/`.01`/`.001`. Default: None.
    ///
    /// `None` seeds from OS entropy, so two runs over the same documents give
    /// slightly different values for those three tokens. Set a seed when runs
    /// must be reproducible.
    pub seed: Option<u64>,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            search_pattern: DEFAULT_PATTERN.to_string(),
            files_path: PathBuf::from("."),
            seed: None,
        }
    }
}

impl ScorerConfig {
    /// Create a new builder for `ScorerConfig`.
    pub fn builder() -> ScorerConfigBuilder {
        ScorerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ScorerConfig`].
#[derive(Debug)]
pub struct ScorerConfigBuilder {
    config: ScorerConfig,
}

impl ScorerConfigBuilder {
    pub fn search_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.search_pattern = pattern.into();
        self
    }

    pub fn files_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.files_path = path.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScorerConfig, PScoreError> {
        if self.config.search_pattern.is_empty() {
            return Err(PScoreError::InvalidConfig(
                "search pattern must not be empty".into(),
            ));
        }
        PatternMatcher::new(&self.config.search_pattern)?;
        Ok(self.config)
    }
}

// ── Per-call options ─────────────────────────────────────────────────────────

/// Options for [`crate::scorer::PScorer::summarize`] and
/// [`crate::scorer::PScorer::plot_distrib`].
#[derive(Clone)]
pub struct SummarizeOptions {
    /// Explicit bin edges. Default: None (layout chosen from `significant`).
    pub bins: Option<Vec<f64>>,

    /// Drop values above 0.05 and zoom the axis to [0, 0.05]. Default: true.
    pub significant: bool,

    /// Chart title. Default: None ("p-values distribution (bin size: …)").
    pub title: Option<String>,

    /// Pattern overriding [`ScorerConfig::search_pattern`] for this call.
    pub search_pattern: Option<String>,

    /// Conversion hook for exact readings. Default: None (built-in).
    pub convert: Option<ConvertFn>,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            bins: None,
            significant: true,
            title: None,
            search_pattern: None,
            convert: None,
        }
    }
}

impl fmt::Debug for SummarizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizeOptions")
            .field("bins", &self.bins)
            .field("significant", &self.significant)
            .field("title", &self.title)
            .field("search_pattern", &self.search_pattern)
            .field("convert", &self.convert.as_ref().map(|_| "<dyn Fn>"))
            .finish()
    }
}

impl SummarizeOptions {
    pub fn bins(mut self, edges: Vec<f64>) -> Self {
        self.bins = Some(edges);
        self
    }

    pub fn significant(mut self, v: bool) -> Self {
        self.significant = v;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn search_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.search_pattern = Some(pattern.into());
        self
    }

    pub fn convert(mut self, hook: ConvertFn) -> Self {
        self.convert = Some(hook);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ScorerConfig::default();
        assert_eq!(c.search_pattern, DEFAULT_PATTERN);
        assert_eq!(c.files_path, PathBuf::from("."));
        assert_eq!(c.seed, None);

        let o = SummarizeOptions::default();
        assert!(o.significant);
        assert!(o.bins.is_none() && o.title.is_none() && o.convert.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = ScorerConfig::builder()
            .search_pattern(r"p\s*=\s*[0-9.]+")
            .files_path("/data/papers")
            .seed(9)
            .build()
            .unwrap();
        assert_eq!(c.files_path, PathBuf::from("/data/papers"));
        assert_eq!(c.seed, Some(9));
    }

    #[test]
    fn builder_rejects_bad_pattern() {
        let err = ScorerConfig::builder().search_pattern("(p").build().unwrap_err();
        assert!(matches!(err, PScoreError::InvalidPattern { .. }));
        assert!(ScorerConfig::builder().search_pattern("").build().is_err());
    }

    #[test]
    fn options_debug_hides_hook() {
        let opts = SummarizeOptions::default()
            .convert(crate::pipeline::normalize::convert_fn(|_, _| Ok(0.0)));
        assert!(format!("{opts:?}").contains("<dyn Fn>"));
    }

    #[test]
    fn config_round_trips_through_json() {
        let c = ScorerConfig::builder().seed(1).build().unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: ScorerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
