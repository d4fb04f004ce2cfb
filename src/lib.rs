//! # pscore
//!
//! Extract p-value mentions from scientific PDFs, normalise them to numbers
//! and plot their distribution.
//!
//! ## Why this crate?
//!
//! The shape of the p-value distribution across a body of literature says a
//! lot about reporting practice: a bump just under 0.05 is a classic sign of
//! selective reporting. Getting that distribution means reading p-values out
//! of free text, where they appear as `P = 0.023`, `p<.05`, `P 0.01` and a
//! dozen other spellings. This crate finds them, turns each into a number
//! and draws the histogram.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Source     per-page text via pdfium (one bad page → whole doc skipped)
//!  ├─ 2. Match      regex over each page, in order
//!  ├─ 3. Normalise  ordered cleanup rules, exact vs. bound ("p<.05")
//!  ├─ 4. Expand     .05 / .01 / .001 → random draw below the threshold
//!  ├─ 5. Filter     keep values ≤ 0.05 (optional)
//!  └─ 6. Plot       histogram via a pluggable renderer (text, SVG, …)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pscore::{PScorer, ScorerConfig, SummarizeOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScorerConfig::builder().files_path("papers/").build()?;
//!     let mut scorer = PScorer::new(config)?;
//!     let values = scorer.summarize(["a.pdf", "b.pdf"], &SummarizeOptions::default())?;
//!     eprintln!("{} significant p-values", values.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Reproducibility
//!
//! Bound-style reports at the conventional thresholds are replaced by random
//! draws, so by default two runs differ slightly. Configure a seed with
//! [`ScorerConfigBuilder::seed`] for identical output.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pscore` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod histogram;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod scorer;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ScorerConfig, ScorerConfigBuilder, SummarizeOptions};
pub use error::{PScoreError, SourceError};
pub use histogram::{
    BinLayout, HistogramPlot, HistogramRenderer, NoopRenderer, SvgHistogram, TextHistogram,
};
pub use output::DocumentValues;
pub use pipeline::expand::TruncationExpander;
pub use pipeline::filter::{remove_non_significant, SIGNIFICANCE_THRESHOLD};
pub use pipeline::matcher::{PatternMatcher, DEFAULT_PATTERN};
pub use pipeline::normalize::{convert_fn, ConvertFn, ValueNormalizer};
pub use pipeline::source::{PdfiumTextSource, TextSource};
pub use progress::{NoopProgressCallback, ProgressCallback, ScanProgressCallback};
pub use scorer::PScorer;
