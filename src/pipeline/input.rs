//! Input resolution: classify a user-supplied path and check it can be read.
//!
//! Classification is by extension only, so an unsupported file is rejected
//! before any engine is touched. PDFs additionally get their `%PDF` magic
//! bytes checked, which turns "renamed JPEG" into a clear error instead of a
//! pdfium failure deep inside the page loop.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raster image extensions accepted as single-page sources.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif"];

/// The two kinds of source the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Multi-page PDF, rasterised page by page.
    Pdf,
    /// One raster image, recognised without pagination.
    Image,
}

impl SourceKind {
    /// Classify `path` by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if ext == "pdf" {
            Some(SourceKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Image)
        } else {
            None
        }
    }
}

/// Whether the file picker should offer `path`.
pub fn is_supported(path: &Path) -> bool {
    SourceKind::from_path(path).is_some()
}

/// A validated, readable source.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// Resolve a source path string into a [`ResolvedInput`].
///
/// Checks, in order: non-empty, supported extension, exists, readable,
/// and for PDFs the magic bytes.
pub fn resolve_input(input: &str) -> Result<ResolvedInput, ExtractError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::MissingSource);
    }
    let path = PathBuf::from(trimmed);

    let kind = SourceKind::from_path(&path)
        .ok_or_else(|| ExtractError::UnsupportedFormat { path: path.clone() })?;

    if !path.exists() {
        return Err(ExtractError::SourceNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            if kind == SourceKind::Pdf {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(ExtractError::NotAPdf { path, magic });
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::SourceNotFound { path });
        }
    }

    debug!("Resolved {:?} source: {}", kind, path.display());
    Ok(ResolvedInput { path, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn classify_by_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a.pdf")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_path(Path::new("a.PDF")), Some(SourceKind::Pdf));
        assert_eq!(SourceKind::from_path(Path::new("scan.JPeG")), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_path(Path::new("scan.tiff")), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_path(Path::new("anim.gif")), None);
        assert_eq!(SourceKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn empty_input_is_missing_source() {
        assert!(matches!(resolve_input("   "), Err(ExtractError::MissingSource)));
    }

    #[test]
    fn unsupported_checked_before_existence() {
        let err = resolve_input("/definitely/not/here.gif").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file() {
        let err = resolve_input("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::SourceNotFound { .. }));
    }

    #[test]
    fn pdf_magic_is_checked() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"GIF89a not a pdf").unwrap();
        let err = resolve_input(tmp.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { .. }), "got: {err}");
    }

    #[test]
    fn real_pdf_header_resolves() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.7\n").unwrap();
        let resolved = resolve_input(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(resolved.kind, SourceKind::Pdf);
    }
}
