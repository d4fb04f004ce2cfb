//! Page text extraction: turn a document path into one string per page.
//!
//! The core never parses PDF itself. It talks to a [`TextSource`], and the
//! production implementation, [`PdfiumTextSource`], delegates to pdfium via
//! `pdfium-render`. Tests substitute an in-memory source.
//!
//! ## All-or-nothing pages
//!
//! A document whose page text cannot be extracted for even one page is
//! reported as [`SourceError::Unreadable`] as a whole. Partial page lists are
//! never returned: the text of pages that did extract before the failure is
//! discarded along with the rest of the document.

use crate::error::{PScoreError, SourceError};
use pdfium_render::prelude::*;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Produces per-page plain text for a document.
pub trait TextSource {
    /// Extract the text of every page, in page order.
    ///
    /// An empty page is an empty string, not an error.
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, SourceError>;
}

/// [`TextSource`] backed by the pdfium library.
pub struct PdfiumTextSource {
    pdfium: Pdfium,
}

impl PdfiumTextSource {
    /// Bind to pdfium and build a source.
    ///
    /// `PDFIUM_LIB_PATH` selects an explicit library file; otherwise the
    /// platform library is loaded from the system search path.
    pub fn new() -> Result<Self, PScoreError> {
        Ok(Self {
            pdfium: bind_pdfium()?,
        })
    }
}

impl TextSource for PdfiumTextSource {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        check_openable(path)?;

        // The document handle is dropped (and closed) on every return path.
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| SourceError::Unreadable {
                path: path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        debug!("{} has {} pages", path.display(), pages.len());

        collect_pages(
            path,
            pages.iter().map(|page| -> Result<String, PdfiumError> {
                let text = page.text()?;
                Ok(text.all())
            }),
        )
    }
}

/// Gather page texts in order, failing the whole document on the first bad
/// page.
fn collect_pages<E: fmt::Debug>(
    path: &Path,
    pages: impl Iterator<Item = Result<String, E>>,
) -> Result<Vec<String>, SourceError> {
    pages
        .enumerate()
        .map(|(idx, page)| {
            page.map_err(|e| SourceError::Unreadable {
                path: path.to_path_buf(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })
        })
        .collect()
}

/// Load the pdfium library.
fn bind_pdfium() -> Result<Pdfium, PScoreError> {
    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        let lib = PathBuf::from(env_path);
        info!("Binding pdfium from {}", lib.display());
        return Pdfium::bind_to_library(&lib)
            .map(Pdfium::new)
            .map_err(|e| PScoreError::PdfiumBindingFailed(format!("{}: {:?}", lib.display(), e)));
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PScoreError::PdfiumBindingFailed(format!("{:?}", e)))
}

/// Distinguish "cannot open" from "opened but unparseable" before pdfium
/// gets the file, since pdfium reports both as a generic load failure.
///
/// A directory counts as missing: there is no document file at that path.
fn check_openable(path: &Path) -> Result<(), SourceError> {
    if path.is_dir() {
        return Err(SourceError::Missing {
            path: path.to_path_buf(),
        });
    }
    match std::fs::File::open(path) {
        Ok(_) => Ok(()),
        Err(e) => match e.kind() {
            io::ErrorKind::NotFound => Err(SourceError::Missing {
                path: path.to_path_buf(),
            }),
            io::ErrorKind::PermissionDenied => Err(SourceError::PermissionDenied {
                path: path.to_path_buf(),
            }),
            _ => Err(SourceError::Unreadable {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_unreadable() {
        let err = check_openable(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, SourceError::Missing { .. }), "got {err:?}");
    }

    #[test]
    fn existing_file_is_openable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(check_openable(file.path()).is_ok());
    }

    #[test]
    fn directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_openable(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::Missing { .. }), "got {err:?}");
    }

    #[test]
    fn pages_are_kept_in_order() {
        let pages = vec![Ok::<_, String>("p = .2".to_string()), Ok(String::new())];
        let texts = collect_pages(Path::new("a.pdf"), pages.into_iter()).unwrap();
        assert_eq!(texts, vec!["p = .2".to_string(), String::new()]);
    }

    #[test]
    fn one_bad_page_makes_document_unreadable() {
        let pages = vec![
            Ok("p = .2".to_string()),
            Err("no text layer"),
            Ok("p = .3".to_string()),
        ];
        let err = collect_pages(Path::new("a.pdf"), pages.into_iter()).unwrap_err();
        match err {
            SourceError::Unreadable { path, detail } => {
                assert_eq!(path, PathBuf::from("a.pdf"));
                assert!(detail.starts_with("page 2:"), "got {detail}");
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }
}
