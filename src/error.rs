//! Error types for the pscore library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PScoreError`]: **fatal**. The invocation cannot proceed (missing
//!   file, malformed p-value token, invalid pattern or bins). Returned as
//!   `Err(PScoreError)` from the [`crate::scorer::PScorer`] entry points.
//!
//! * [`SourceError`]: raised by a [`crate::pipeline::source::TextSource`].
//!   The `Unreadable` variant is **non-fatal**: the scorer logs it and the
//!   document contributes zero values while the rest of the batch continues.
//!   `Missing` and `PermissionDenied` are promoted to the matching fatal
//!   [`PScoreError`] variants.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pscore library.
#[derive(Debug, Error)]
pub enum PScoreError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The document could not be opened at all.
    #[error("Document not found: '{path}'\nCheck the path and --files-path prefix.")]
    DocumentNotFound { path: PathBuf },

    /// Process does not have read permission on the document.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// A cleaned match is not a decimal numeral.
    ///
    /// Aborts the whole invocation, including every other document of a batch.
    #[error("P-value not recognized: '{raw}' (cleaned token '{token}' is not a number)")]
    NumericFormat { raw: String, token: String },

    /// The search pattern is not a valid regular expression.
    #[error("Invalid search pattern '{pattern}': {detail}")]
    InvalidPattern { pattern: String, detail: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// Explicit histogram bin edges are unusable.
    #[error("Invalid bins: {0}")]
    InvalidBins(String),

    /// A histogram renderer failed to draw.
    #[error("Histogram rendering failed: {0}")]
    RenderFailed(String),

    /// Could not create or write a chart file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium system-wide, or set PDFIUM_LIB_PATH=/path/to/libpdfium\n\
to load a specific copy.\n"
    )]
    PdfiumBindingFailed(String),
}

/// Failure reported by a text source for one document.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum SourceError {
    /// The file does not exist or cannot be opened.
    #[error("'{path}' cannot be opened")]
    Missing { path: PathBuf },

    /// The file exists but the process may not read it.
    #[error("'{path}' is not readable by this process")]
    PermissionDenied { path: PathBuf },

    /// The file opened but the document, or one of its pages, has no
    /// extractable text.
    #[error("could not read document '{path}': {detail}")]
    Unreadable { path: PathBuf, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_format_display() {
        let e = PScoreError::NumericFormat {
            raw: "p=.0x5".into(),
            token: ".0x5".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("p=.0x5"), "got: {msg}");
        assert!(msg.contains("not a number"), "got: {msg}");
    }

    #[test]
    fn invalid_pattern_display() {
        let e = PScoreError::InvalidPattern {
            pattern: "[p".into(),
            detail: "unclosed character class".into(),
        };
        assert!(e.to_string().contains("[p"));
    }

    #[test]
    fn unreadable_display() {
        let e = SourceError::Unreadable {
            path: PathBuf::from("papers/a.pdf"),
            detail: "page 3 has no text layer".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("papers/a.pdf"));
        assert!(msg.contains("page 3"));
    }
}
