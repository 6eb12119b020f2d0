//! Result types produced by an extraction job.

use crate::pipeline::input::SourceKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything one job produced, before serialisation to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// The accumulated text, page markers included for PDFs.
    pub text: String,
    /// Per-page results in page order.
    pub pages: Vec<PageText>,
    /// What was read.
    pub source: SourceInfo,
    pub stats: ExtractionStats,
}

/// Recognised text for one page (or the single image).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Paragraphs joined with `\n`.
    pub text: String,
    /// Number of paragraphs the engine returned.
    pub paragraphs: usize,
    /// Render + recognition time for this page.
    pub duration_ms: u64,
}

/// Timing and counts for a finished job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the source document (1 for images).
    pub total_pages: usize,
    /// Pages actually recognised.
    pub processed_pages: usize,
    pub render_duration_ms: u64,
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Metadata about a source file, available without running OCR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub kind: SourceKind,
    /// 1 for images.
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    /// Pixel size, images only.
    pub dimensions: Option<(u32, u32)>,
}

impl SourceInfo {
    /// Info for a single raster image.
    pub fn image(path: PathBuf, width: u32, height: u32) -> Self {
        Self {
            path,
            kind: SourceKind::Image,
            page_count: 1,
            title: None,
            author: None,
            producer: None,
            dimensions: Some((width, height)),
        }
    }
}
