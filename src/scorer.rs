//! The scorer: documents in, p-value distribution out.
//!
//! [`PScorer::summarize`] is the main entry point. For each document, in
//! order, it extracts page text, finds raw p-value mentions, normalises them
//! and concatenates the values; it then filters and renders the batch.
//! Lower-level steps ([`PScorer::raw_p_values`], [`PScorer::p_values`],
//! [`PScorer::scan_document`], [`PScorer::plot_distrib`]) are public for
//! callers that want to inspect or re-plot intermediate results.
//!
//! ## Failure policy
//!
//! | Condition | Effect |
//! |-----------|--------|
//! | invalid pattern or bins                           | `Err` before any document is read |
//! | document unreadable (parse, page text, I/O error) | logged, contributes no values, batch continues |
//! | document missing, a directory, or permission denied | `Err`, batch aborted |
//! | match not a decimal after cleanup                 | `Err`, batch aborted |
//! | fewer than 2 values to plot                       | logged, renderer not called, values returned |

use crate::config::{ScorerConfig, SummarizeOptions};
use crate::error::{PScoreError, SourceError};
use crate::histogram::{BinLayout, HistogramPlot, HistogramRenderer, TextHistogram};
use crate::output::DocumentValues;
use crate::pipeline::expand::TruncationExpander;
use crate::pipeline::filter;
use crate::pipeline::matcher::PatternMatcher;
use crate::pipeline::normalize::{ConvertFn, ValueNormalizer};
use crate::pipeline::source::{PdfiumTextSource, TextSource};
use crate::progress::ProgressCallback;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

/// Extracts, normalises and plots p-values.
pub struct PScorer {
    config: ScorerConfig,
    matcher: PatternMatcher,
    normalizer: ValueNormalizer,
    source: Box<dyn TextSource>,
    renderer: Box<dyn HistogramRenderer>,
    progress: Option<ProgressCallback>,
}

/// Raw matches of one readable document.
struct Extraction {
    page_count: usize,
    raw: Vec<String>,
}

impl PScorer {
    /// Scorer reading PDFs through pdfium and drawing text histograms on
    /// stderr.
    pub fn new(config: ScorerConfig) -> Result<Self, PScoreError> {
        Self::with_source(config, PdfiumTextSource::new()?)
    }

    /// Scorer reading documents through a custom [`TextSource`].
    pub fn with_source(
        config: ScorerConfig,
        source: impl TextSource + 'static,
    ) -> Result<Self, PScoreError> {
        let matcher = PatternMatcher::new(&config.search_pattern)?;
        let expander = match config.seed {
            Some(seed) => TruncationExpander::seeded(seed),
            None => TruncationExpander::from_entropy(),
        };
        Ok(Self {
            config,
            matcher,
            normalizer: ValueNormalizer::new(expander),
            source: Box::new(source),
            renderer: Box::new(TextHistogram::new(std::io::stderr())),
            progress: None,
        })
    }

    /// Replace the histogram renderer.
    pub fn with_renderer(mut self, renderer: impl HistogramRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace the random source used for threshold expansion.
    pub fn with_expander(mut self, expander: TruncationExpander) -> Self {
        self.normalizer = ValueNormalizer::new(expander);
        self
    }

    /// Receive per-document progress events.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Path a document identifier resolves to.
    pub fn resolve(&self, document: &str) -> PathBuf {
        self.config.files_path.join(document)
    }

    // ── Entry points ─────────────────────────────────────────────────────

    /// Collect p-values from `documents`, in order, then filter and plot them.
    ///
    /// Pass `[doc]` for a single document. Returns the values handed to the
    /// renderer (after significance filtering), or the filtered values that
    /// were too few to plot.
    pub fn summarize<I, D>(
        &mut self,
        documents: I,
        options: &SummarizeOptions,
    ) -> Result<Vec<f64>, PScoreError>
    where
        I: IntoIterator<Item = D>,
        D: AsRef<str>,
    {
        let documents: Vec<D> = documents.into_iter().collect();
        let total = documents.len();
        let pattern = per_call_pattern(options)?;
        let layout = BinLayout::resolve(options.bins.as_deref(), options.significant)?;
        let progress = self.progress.clone();

        debug!(
            "Scanning {} documents with pattern {}",
            total,
            pattern.as_ref().unwrap_or(&self.matcher).as_str()
        );

        if let Some(ref cb) = progress {
            cb.on_scan_start(total);
        }

        let mut values = Vec::new();
        for (i, document) in documents.iter().enumerate() {
            let document = document.as_ref();
            if let Some(ref cb) = progress {
                cb.on_document_start(i + 1, total, document);
            }

            let report = self.scan_document(document, pattern.as_ref(), options.convert.as_ref())?;

            if let Some(ref cb) = progress {
                match &report.error {
                    None => cb.on_document_complete(i + 1, total, report.values.len()),
                    Some(e) => cb.on_document_error(i + 1, total, &e.to_string()),
                }
            }
            values.extend(report.values);
        }

        info!("Collected {} p-values from {} documents", values.len(), total);
        if let Some(ref cb) = progress {
            cb.on_scan_complete(total, values.len());
        }

        self.plot_filtered(values, &layout, options)
    }

    /// Normalised p-values of one document.
    ///
    /// Honours `options.search_pattern` and `options.convert`; ignores the
    /// plotting fields.
    pub fn p_values(
        &mut self,
        document: &str,
        options: &SummarizeOptions,
    ) -> Result<Vec<f64>, PScoreError> {
        let pattern = per_call_pattern(options)?;
        self.scan_document(document, pattern.as_ref(), options.convert.as_ref())
            .map(|report| report.values)
    }

    /// Raw matches of one document, as written in its text.
    ///
    /// An unreadable document yields an empty list.
    pub fn raw_p_values(
        &self,
        document: &str,
        pattern: Option<&PatternMatcher>,
    ) -> Result<Vec<String>, PScoreError> {
        let matcher = pattern.unwrap_or(&self.matcher);
        Ok(self
            .extract(document, matcher)?
            .map(|extraction| extraction.raw)
            .unwrap_or_default())
    }

    /// Extract and normalise one document, reporting what it contributed.
    pub fn scan_document(
        &mut self,
        document: &str,
        pattern: Option<&PatternMatcher>,
        convert: Option<&ConvertFn>,
    ) -> Result<DocumentValues, PScoreError> {
        let path = self.resolve(document);
        let matcher = pattern.unwrap_or(&self.matcher);

        let extraction = match self.extract(document, matcher)? {
            Ok(extraction) => extraction,
            Err(e) => return Ok(DocumentValues::unreadable(document, path, e)),
        };

        let values = extraction
            .raw
            .iter()
            .map(|raw| self.normalizer.normalize(raw, convert))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("{}: {} p-values", document, values.len());

        Ok(DocumentValues {
            document: document.to_string(),
            path,
            page_count: extraction.page_count,
            match_count: extraction.raw.len(),
            values,
            error: None,
        })
    }

    /// Filter `values` per `options.significant` and draw their histogram.
    ///
    /// Returns the filtered values whether or not a chart was drawn.
    pub fn plot_distrib(
        &mut self,
        values: Vec<f64>,
        options: &SummarizeOptions,
    ) -> Result<Vec<f64>, PScoreError> {
        let layout = BinLayout::resolve(options.bins.as_deref(), options.significant)?;
        self.plot_filtered(values, &layout, options)
    }

    // ── Internal helpers ─────────────────────────────────────────────────

    fn plot_filtered(
        &mut self,
        values: Vec<f64>,
        layout: &BinLayout,
        options: &SummarizeOptions,
    ) -> Result<Vec<f64>, PScoreError> {
        let values = filter::apply(values, options.significant);

        if values.len() < 2 {
            warn!("not enough p-values found ({}), skipping plot", values.len());
            return Ok(values);
        }

        let title = options
            .title
            .clone()
            .unwrap_or_else(|| layout.default_title());
        {
            let plot = HistogramPlot::new(&values, layout, &title);
            self.renderer.render(&plot)?;
        }
        info!("Plotted {} p-values in {} bins", values.len(), layout.bin_count());

        Ok(values)
    }

    /// Page text → raw matches.
    ///
    /// The outer `Result` carries fatal errors; the inner one an unreadable
    /// document, which callers turn into an empty contribution.
    fn extract(
        &self,
        document: &str,
        matcher: &PatternMatcher,
    ) -> Result<Result<Extraction, SourceError>, PScoreError> {
        let path = self.resolve(document);

        let pages = match self.source.page_texts(&path) {
            Ok(pages) => pages,
            Err(SourceError::Missing { path }) => {
                return Err(PScoreError::DocumentNotFound { path })
            }
            Err(SourceError::PermissionDenied { path }) => {
                return Err(PScoreError::PermissionDenied { path })
            }
            Err(e) => {
                warn!("could not read document {}: {}", document, e);
                return Ok(Err(e));
            }
        };

        let mut raw = Vec::new();
        for (idx, text) in pages.iter().enumerate() {
            trace!("{} page {} text: {:?}", document, idx + 1, text);
            let found = matcher.find_all(text);
            debug!("{} page {}: {:?}", document, idx + 1, found);
            raw.extend(found);
        }

        Ok(Ok(Extraction {
            page_count: pages.len(),
            raw,
        }))
    }
}

/// Compile the per-call pattern override, if any.
fn per_call_pattern(options: &SummarizeOptions) -> Result<Option<PatternMatcher>, PScoreError> {
    options
        .search_pattern
        .as_deref()
        .map(PatternMatcher::new)
        .transpose()
}
