//! Result types returned by the scorer.

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What one document contributed to a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentValues {
    /// Identifier as given by the caller.
    pub document: String,
    /// Identifier resolved against the configured `files_path`.
    pub path: PathBuf,
    /// Pages whose text was extracted. 0 when the document was unreadable.
    pub page_count: usize,
    /// Number of pattern matches across all pages.
    pub match_count: usize,
    /// Normalised values, page order then order of occurrence.
    pub values: Vec<f64>,
    /// Why the document contributed nothing, if it was unreadable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SourceError>,
}

impl DocumentValues {
    /// Report for a document that could not be read.
    pub fn unreadable(document: &str, path: PathBuf, error: SourceError) -> Self {
        Self {
            document: document.to_string(),
            path,
            page_count: 0,
            match_count: 0,
            values: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_readable(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_report_is_empty() {
        let path = PathBuf::from("x.pdf");
        let r = DocumentValues::unreadable(
            "x.pdf",
            path.clone(),
            SourceError::Unreadable {
                path,
                detail: "bad xref".into(),
            },
        );
        assert!(!r.is_readable());
        assert!(r.values.is_empty());
        assert_eq!(r.page_count, 0);
    }

    #[test]
    fn unreadable_reports_compare_by_error() {
        let path = PathBuf::from("x.pdf");
        let missing = DocumentValues::unreadable(
            "x.pdf",
            path.clone(),
            SourceError::Missing { path: path.clone() },
        );
        let json = serde_json::to_string(&missing).unwrap();
        let back: DocumentValues = serde_json::from_str(&json).unwrap();
        assert_eq!(back, missing);

        let denied = DocumentValues::unreadable(
            "x.pdf",
            path.clone(),
            SourceError::PermissionDenied { path },
        );
        assert_ne!(denied, missing);
    }

    #[test]
    fn readable_report_serialises_without_error_field() {
        let r = DocumentValues {
            document: "a.pdf".into(),
            path: PathBuf::from("./a.pdf"),
            page_count: 2,
            match_count: 1,
            values: vec![0.02],
            error: None,
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("error"), "got {json}");
        assert!(json.contains("\"match_count\":1"));
    }
}
