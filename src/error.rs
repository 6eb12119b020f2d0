//! Error types for the ocr-extract library.
//!
//! Two error types reflect two layers:
//!
//! * [`ExtractError`]: everything a job can fail with, from an empty path
//!   field to a half-written DOCX. Every variant maps to exactly one
//!   [`ErrorKind`] so front ends can branch on the class of failure while the
//!   `Display` text keeps the underlying library message.
//!
//! * [`OcrError`]: failures inside an [`crate::pipeline::ocr::OcrEngine`].
//!   Engines know nothing about pages; the pipeline wraps these into
//!   [`ExtractError::RecognitionFailed`] together with the page number.

use std::path::PathBuf;
use thiserror::Error;

/// The closed set of failure classes a job can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Bad user input, detected before any work starts.
    Validation,
    /// The source file extension is not one we can OCR.
    UnsupportedFormat,
    /// The source could not be opened, rasterised or recognised.
    Decode,
    /// The output file could not be produced.
    Write,
    /// The job was cancelled between pages.
    Cancelled,
    /// Worker panic or runtime failure.
    Internal,
}

/// All errors returned by the ocr-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Validation ────────────────────────────────────────────────────────
    /// No source path was given.
    #[error("Please select a file.")]
    MissingSource,

    /// No destination path was given.
    #[error("Please specify an output file.")]
    MissingDestination,

    /// Source file was not found at the given path.
    #[error("The specified file does not exist: '{path}'")]
    SourceNotFound { path: PathBuf },

    /// Process does not have read permission on the source.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Output format token was neither `txt` nor `docx`.
    #[error("Unsupported file type '{0}'. Use 'txt' or 'docx'.")]
    InvalidOutputFormat(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A job is already running on this runner.
    #[error("A job is already running; wait for it to finish or cancel it.")]
    JobInProgress,

    // ── Unsupported input ─────────────────────────────────────────────────
    /// Source extension is not PDF or a supported raster image.
    #[error("Unsupported file format.")]
    UnsupportedFormat { path: PathBuf },

    // ── Decode ────────────────────────────────────────────────────────────
    /// The file has a `.pdf` extension but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// A raster image could not be decoded.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// The OCR engine could not be initialised.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(#[source] OcrError),

    /// The OCR engine failed on a page (page 1 for single images).
    #[error("Text recognition failed on page {page}: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    /// The page selection matched no page of the document.
    #[error("No pages selected (document has {total} pages)")]
    NoPagesSelected { total: usize },

    // ── Write ─────────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The DOCX container could not be assembled.
    #[error("Failed to build document '{path}': {detail}")]
    DocumentBuildFailed { path: PathBuf, detail: String },

    // ── Cancelled ─────────────────────────────────────────────────────────
    /// The cancel token was tripped between pages.
    #[error("Cancelled after {completed}/{total} pages")]
    Cancelled { completed: usize, total: usize },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::MissingSource
            | ExtractError::MissingDestination
            | ExtractError::SourceNotFound { .. }
            | ExtractError::PermissionDenied { .. }
            | ExtractError::InvalidOutputFormat(_)
            | ExtractError::InvalidConfig(_)
            | ExtractError::JobInProgress => ErrorKind::Validation,

            ExtractError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,

            ExtractError::NotAPdf { .. }
            | ExtractError::CorruptPdf { .. }
            | ExtractError::PasswordRequired { .. }
            | ExtractError::WrongPassword { .. }
            | ExtractError::PdfiumBindingFailed(_)
            | ExtractError::RasterisationFailed { .. }
            | ExtractError::ImageDecode { .. }
            | ExtractError::EngineUnavailable(_)
            | ExtractError::RecognitionFailed { .. }
            | ExtractError::NoPagesSelected { .. } => ErrorKind::Decode,

            ExtractError::OutputWriteFailed { .. } | ExtractError::DocumentBuildFailed { .. } => {
                ErrorKind::Write
            }

            ExtractError::Cancelled { .. } => ErrorKind::Cancelled,

            ExtractError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// A failure reported by an OCR engine.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine executable could not be started.
    #[error("could not run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but exited unsuccessfully.
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The requested recognition language is not installed.
    #[error("language '{language}' is not installed (available: {available})")]
    LanguageMissing { language: String, available: String },

    /// The page bitmap could not be encoded for the engine.
    #[error("image encoding failed: {0}")]
    Encode(String),
}
