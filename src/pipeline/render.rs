//! Page rasterisation: turn each selected PDF page into a `DynamicImage`.
//!
//! Pages are rendered one at a time and pushed into a [`PageVisitor`], so
//! at most one page bitmap is alive at any moment. The visitor recognises
//! the page and drops it before the next one is rendered; a 400-page scan
//! never sits in memory as 400 bitmaps.
//!
//! pdfium wraps a C++ library with thread-local state. Everything here is
//! blocking and is meant to run on a blocking thread (the job worker, or
//! `tokio::task::spawn_blocking` in the async wrappers).

use crate::config::{ExtractionConfig, PageSelection};
use crate::error::ExtractError;
use crate::output::SourceInfo;
use crate::pipeline::input::SourceKind;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One rendered page, handed to a [`PageVisitor`].
pub struct RenderedPage {
    /// 0-indexed page in the document.
    pub index: usize,
    /// Number of pages in the selection.
    pub total: usize,
    pub image: DynamicImage,
}

impl RenderedPage {
    /// 1-indexed page number, as printed in page markers.
    pub fn page_num(&self) -> usize {
        self.index + 1
    }
}

/// Receives rendered pages in ascending page order.
pub trait PageVisitor {
    /// Called once, before the first page, with the selection size.
    fn begin(&mut self, total: usize) -> Result<(), ExtractError>;

    /// Called for each page. Returning an error stops rendering.
    fn page(&mut self, page: RenderedPage) -> Result<(), ExtractError>;
}

/// A source of paginated bitmaps.
pub trait Rasterizer: Send + Sync {
    /// Read page count and metadata without rendering.
    fn inspect(&self, path: &Path, password: Option<&str>) -> Result<SourceInfo, ExtractError>;

    /// Render the selected pages in ascending order into `visitor`.
    fn visit_pages(
        &self,
        path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
        visitor: &mut dyn PageVisitor,
    ) -> Result<(), ExtractError>;
}

/// [`Rasterizer`] backed by pdfium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    max_pixels: u32,
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            dpi: config.dpi,
            max_pixels: config.max_rendered_pixels,
            library_dir: config.pdfium_library_dir.clone(),
        }
    }

    /// Bind to the pdfium shared library.
    ///
    /// Searches, in order: the configured directory, `PDFIUM_LIB_PATH`
    /// (a directory or the library file itself), the working directory,
    /// the system library path.
    fn bind(&self) -> Result<Pdfium, ExtractError> {
        let library = self
            .library_dir
            .clone()
            .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from))
            .map(|p| {
                if p.is_file() {
                    p
                } else {
                    Pdfium::pdfium_platform_library_name_at_path(&p)
                }
            })
            .unwrap_or_else(|| Pdfium::pdfium_platform_library_name_at_path("./"));
        debug!("Binding pdfium, trying {} first", library.display());

        let bindings = Pdfium::bind_to_library(&library)
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }

    /// Render configuration for one page at the configured DPI.
    ///
    /// pdfium sizes bitmaps in pixels, not DPI: the target width is the page
    /// width in points (1/72 inch) scaled by `dpi / 72`, then capped.
    fn render_config(&self, page: &PdfPage) -> PdfRenderConfig {
        let width_px = (page.width().value * self.dpi as f32 / 72.0).round() as i32;
        let max = self.max_pixels as i32;
        PdfRenderConfig::new()
            .set_target_width(width_px.clamp(1, max))
            .set_maximum_height(max)
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn inspect(&self, path: &Path, password: Option<&str>) -> Result<SourceInfo, ExtractError> {
        let pdfium = self.bind()?;
        let document = open_document(&pdfium, path, password)?;
        let metadata = document.metadata();

        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata.get(tag).and_then(|t| {
                let v = t.value().to_string();
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            })
        };

        Ok(SourceInfo {
            path: path.to_path_buf(),
            kind: SourceKind::Pdf,
            page_count: document.pages().len() as usize,
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            dimensions: None,
        })
    }

    fn visit_pages(
        &self,
        path: &Path,
        password: Option<&str>,
        selection: &PageSelection,
        visitor: &mut dyn PageVisitor,
    ) -> Result<(), ExtractError> {
        let pdfium = self.bind()?;
        let document = open_document(&pdfium, path, password)?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        // A document with no pages yields empty text; only an explicit
        // selection that matches nothing is an error.
        let indices = selection.to_indices(total_pages);
        if indices.is_empty() && *selection != PageSelection::All {
            return Err(ExtractError::NoPagesSelected { total: total_pages });
        }
        if indices.len() < total_pages {
            debug!("Selected {} of {} pages", indices.len(), total_pages);
        }

        visitor.begin(indices.len())?;

        for &idx in &indices {
            let page = pages
                .get(idx as u16)
                .map_err(|e| ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let bitmap = page
                .render_with_config(&self.render_config(&page))
                .map_err(|e| ExtractError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            visitor.page(RenderedPage {
                index: idx,
                total: indices.len(),
                image,
            })?;
        }

        Ok(())
    }
}

/// Open a PDF, telling "needs a password" apart from "corrupt".
fn open_document<'a>(
    pdfium: &'a Pdfium,
    path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium.load_pdf_from_file(path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractError::WrongPassword {
                    path: path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: path.to_path_buf(),
                }
            }
        } else {
            warn!("pdfium could not open {}: {}", path.display(), err_str);
            ExtractError::CorruptPdf {
                path: path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Decode a single raster image (PNG, JPEG, BMP, TIFF).
pub fn load_image(path: &Path) -> Result<DynamicImage, ExtractError> {
    let image = image::open(path).map_err(|e| ExtractError::ImageDecode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!(
        "Decoded image {} → {}x{} px",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn page_num_is_one_based() {
        let page = RenderedPage {
            index: 0,
            total: 1,
            image: DynamicImage::ImageRgba8(RgbaImage::new(1, 1)),
        };
        assert_eq!(page.page_num(), 1);
    }

    #[test]
    fn load_png_round_trips_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        RgbaImage::from_pixel(12, 7, Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!((img.width(), img.height()), (12, 7));
    }

    #[test]
    fn load_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, ExtractError::ImageDecode { .. }));
    }

    #[test]
    fn rasterizer_takes_config_values() {
        let config = ExtractionConfig::builder()
            .dpi(150)
            .max_rendered_pixels(3000)
            .pdfium_library_dir("/opt/pdfium/lib")
            .build()
            .unwrap();
        let r = PdfiumRasterizer::new(&config);
        assert_eq!(r.dpi, 150);
        assert_eq!(r.max_pixels, 3000);
        assert_eq!(r.library_dir.as_deref(), Some(Path::new("/opt/pdfium/lib")));
    }
}
