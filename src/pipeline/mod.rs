//! Pipeline stages for OCR text extraction.
//!
//! Each submodule implements exactly one step, so a stage can be swapped
//! (another OCR engine, another rasteriser) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ ocr ──▶ postprocess ──▶ write
//! (path)    (pdfium)  (tesseract) (paragraphs)  (txt/docx)
//! ```
//!
//! 1. [`input`] : classify the source by extension and check it is readable
//! 2. [`render`]: rasterise PDF pages (or decode the single image)
//! 3. [`ocr`]   : hand each bitmap to the shared OCR engine
//! 4. [`postprocess`]: group raw engine output into paragraphs
//! 5. [`write`] : serialise the accumulated text to disk, atomically

pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
pub mod write;
