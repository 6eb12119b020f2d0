//! End-to-end tests against the real tesseract and pdfium.
//!
//! Gated behind `E2E_ENABLED` so they only run where both are installed.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/lib cargo test --test e2e -- --nocapture
//!
//! PDF tests additionally need a scanned document at `test_cases/sample.pdf`.

use image::{Rgba, RgbaImage};
use ocr_extract::{
    CancelToken, ExtractionConfig, Extractor, JobRequest, NoopProgress, OutputFormat,
    SharedEngine, SourceKind,
};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn test_engine_initialises_once() {
    e2e_skip_unless_enabled!();

    let shared = SharedEngine::new(&ExtractionConfig::default());
    assert!(!shared.is_initialized());
    let a = shared.get().expect("tesseract with 'eng' data must be installed");
    let b = shared.get().unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(a.name(), "tesseract");
}

#[test]
fn test_blank_image_has_no_text() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let img = dir.path().join("blank.png");
    RgbaImage::from_pixel(600, 200, Rgba([255, 255, 255, 255]))
        .save(&img)
        .unwrap();

    let ex = Extractor::new(ExtractionConfig::default());
    let out = ex
        .extract_blocking(
            img.to_str().unwrap(),
            &NoopProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(out.source.kind, SourceKind::Image);
    assert!(out.text.trim().is_empty(), "got {:?}", out.text);
}

#[test]
fn test_pdf_to_docx() {
    e2e_skip_unless_enabled!();

    let pdf = test_cases_dir().join("sample.pdf");
    if !pdf.exists() {
        println!("SKIP: test file not found: {}", pdf.display());
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("sample.docx");
    let ex = Extractor::new(ExtractionConfig::default());

    let info = ex.inspect(pdf.to_str().unwrap()).unwrap();
    println!("Pages: {}  Title: {:?}", info.page_count, info.title);

    let outcome = ex
        .run_job(
            &JobRequest::new(
                pdf.to_string_lossy(),
                out_path.to_string_lossy(),
                OutputFormat::Docx,
            ),
            &NoopProgress,
            &CancelToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.stats.processed_pages, info.page_count);
    let bytes = std::fs::read(&out_path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
    println!(
        "{} pages in {}ms (OCR {}ms)",
        outcome.stats.processed_pages, outcome.stats.total_duration_ms, outcome.stats.ocr_duration_ms
    );
}
