//! # ocr-extract
//!
//! Extract text from scanned PDFs and raster images with OCR, and save it as
//! plain text or a Word document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source path
//!  │
//!  ├─ 1. Input     classify (.pdf / .png .jpg .jpeg .bmp .tiff .tif), check readable
//!  ├─ 2. Render    rasterise PDF pages via pdfium at 300 DPI, one at a time
//!  ├─ 3. OCR       PNG over stdin to tesseract, paragraphs back
//!  ├─ 4. Assemble  "\n--- Page N ---\n" + paragraphs joined by "\n" per page
//!  └─ 5. Write     TXT verbatim, or DOCX with one paragraph per line
//! ```
//!
//! Two front ends share the same [`Extractor::run_job`] unit: the
//! `ocr-extract` batch CLI and the `ocr-extract-tui` terminal form.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocr_extract::{CancelToken, ExtractionConfig, Extractor, NoopProgress};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = Extractor::new(ExtractionConfig::default());
//!     let out = extractor.extract_blocking("scan.pdf", &NoopProgress, &CancelToken::new())?;
//!     println!("{}", out.text);
//!     eprintln!("{} pages in {}ms", out.stats.processed_pages, out.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | The `ocr-extract` binary (clap + anyhow + indicatif + tracing-subscriber) |
//! | `tui`   | on      | The `ocr-extract-tui` binary and [`tui`] module (ratatui + crossterm) |
//!
//! Library-only use:
//! ```toml
//! ocr-extract = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime Requirements
//!
//! * `tesseract` on `PATH` (or `--tesseract`), with the wanted language data.
//! * `libpdfium` next to the binary, in `PDFIUM_LIB_PATH`, or system-wide.
//!   Only needed for PDF sources.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
#[cfg(feature = "tui")]
pub mod tui;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ensure_extension, ExtractionConfig, ExtractionConfigBuilder, OutputFormat, PageSelection,
};
pub use error::{ErrorKind, ExtractError, OcrError};
pub use extract::{page_marker, Extractor};
pub use job::{JobOutcome, JobRequest, JobRunner, JobState, JobStatus};
pub use output::{Extraction, ExtractionStats, PageText, SourceInfo};
pub use pipeline::input::SourceKind;
pub use pipeline::ocr::{OcrEngine, SharedEngine, TesseractEngine};
pub use pipeline::render::{PageVisitor, PdfiumRasterizer, Rasterizer, RenderedPage};
pub use progress::{CancelToken, ExtractionProgress, NoopProgress, ProgressCallback};
