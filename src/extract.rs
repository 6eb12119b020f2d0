//! Extraction entry points: source → accumulated text → output file.
//!
//! [`Extractor`] bundles the three things every job needs: the configuration,
//! the process-wide OCR engine handle and the page rasteriser. It is cheap to
//! clone (two `Arc`s and a small config), so front ends build one at start-up
//! and clone it into each job.
//!
//! The work itself is blocking (pdfium, tesseract). The `*_blocking` and
//! [`Extractor::run_job`] methods run it on the calling thread; the async
//! methods move it onto tokio's blocking pool with `spawn_blocking`.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::job::{JobOutcome, JobRequest};
use crate::output::{Extraction, ExtractionStats, PageText, SourceInfo};
use crate::pipeline::input::{self, ResolvedInput, SourceKind};
use crate::pipeline::ocr::{OcrEngine, SharedEngine};
use crate::pipeline::render::{self, PageVisitor, PdfiumRasterizer, Rasterizer, RenderedPage};
use crate::pipeline::write;
use crate::progress::{CancelToken, ExtractionProgress, ProgressCallback};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The line placed before each PDF page's text.
pub fn page_marker(page_num: usize) -> String {
    format!("\n--- Page {} ---\n", page_num)
}

/// Runs extraction jobs against one shared engine and rasteriser.
#[derive(Clone)]
pub struct Extractor {
    config: ExtractionConfig,
    engine: Arc<SharedEngine>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl Extractor {
    /// Tesseract + pdfium, both configured from `config`.
    ///
    /// Nothing is loaded yet: the engine initialises on the first job.
    pub fn new(config: ExtractionConfig) -> Self {
        let engine = Arc::new(SharedEngine::new(&config));
        let rasterizer = Arc::new(PdfiumRasterizer::new(&config));
        Self {
            config,
            engine,
            rasterizer,
        }
    }

    /// Assemble from explicit parts, e.g. a custom engine.
    pub fn with_parts(
        config: ExtractionConfig,
        engine: Arc<SharedEngine>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            config,
            engine,
            rasterizer,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Initialise the OCR engine now instead of on the first job.
    pub fn warm_up(&self) -> Result<(), ExtractError> {
        self.engine.get().map(|_| ())
    }

    /// Source metadata without OCR.
    pub fn inspect(&self, input_str: &str) -> Result<SourceInfo, ExtractError> {
        let resolved = input::resolve_input(input_str)?;
        self.source_info(&resolved)
    }

    /// Extract the text of a PDF or image.
    ///
    /// PDF pages are recognised in ascending order and each is preceded by
    /// its [`page_marker`]; an image yields its paragraphs with no marker.
    pub fn extract_blocking(
        &self,
        input_str: &str,
        progress: &dyn ExtractionProgress,
        cancel: &CancelToken,
    ) -> Result<Extraction, ExtractError> {
        let resolved = input::resolve_input(input_str)?;
        self.extract_resolved(&resolved, progress, cancel)
    }

    /// Validate, extract and write one job. The unit both front ends share.
    ///
    /// Nothing is written unless every page was recognised.
    pub fn run_job(
        &self,
        request: &JobRequest,
        progress: &dyn ExtractionProgress,
        cancel: &CancelToken,
    ) -> Result<JobOutcome, ExtractError> {
        let job = request.validate()?;
        let extraction = self.extract_resolved(&job.input, progress, cancel)?;
        write::write_output(&extraction.text, &job.destination, job.format)?;
        Ok(JobOutcome {
            output: job.destination,
            format: job.format,
            stats: extraction.stats,
        })
    }

    /// Async wrapper around [`Extractor::extract_blocking`].
    pub async fn extract(
        &self,
        input_str: &str,
        progress: ProgressCallback,
        cancel: CancelToken,
    ) -> Result<Extraction, ExtractError> {
        let this = self.clone();
        let input_str = input_str.to_string();
        tokio::task::spawn_blocking(move || {
            this.extract_blocking(&input_str, progress.as_ref(), &cancel)
        })
        .await
        .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))?
    }

    /// Async wrapper around [`Extractor::run_job`].
    pub async fn extract_to_file(
        &self,
        request: JobRequest,
        progress: ProgressCallback,
        cancel: CancelToken,
    ) -> Result<JobOutcome, ExtractError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.run_job(&request, progress.as_ref(), &cancel))
            .await
            .map_err(|e| ExtractError::Internal(format!("Extraction task panicked: {}", e)))?
    }

    fn source_info(&self, resolved: &ResolvedInput) -> Result<SourceInfo, ExtractError> {
        match resolved.kind {
            SourceKind::Pdf => self
                .rasterizer
                .inspect(&resolved.path, self.config.password.as_deref()),
            SourceKind::Image => {
                let image = render::load_image(&resolved.path)?;
                Ok(SourceInfo::image(
                    resolved.path.clone(),
                    image.width(),
                    image.height(),
                ))
            }
        }
    }

    fn extract_resolved(
        &self,
        resolved: &ResolvedInput,
        progress: &dyn ExtractionProgress,
        cancel: &CancelToken,
    ) -> Result<Extraction, ExtractError> {
        let total_start = Instant::now();
        info!("Starting extraction: {}", resolved.path.display());

        // Load the engine before touching the source so a missing tesseract
        // fails fast instead of after rendering page 1.
        let engine = self.engine.get()?;
        debug!("OCR engine: {}", engine.name());

        let paginated = resolved.kind == SourceKind::Pdf;
        let mut acc = Accumulator::new(engine.as_ref(), progress, cancel, paginated);

        let source = match resolved.kind {
            SourceKind::Pdf => {
                let info = self
                    .rasterizer
                    .inspect(&resolved.path, self.config.password.as_deref())?;
                self.rasterizer.visit_pages(
                    &resolved.path,
                    self.config.password.as_deref(),
                    &self.config.pages,
                    &mut acc,
                )?;
                info
            }
            SourceKind::Image => {
                let image = render::load_image(&resolved.path)?;
                let info =
                    SourceInfo::image(resolved.path.clone(), image.width(), image.height());
                acc.begin(1)?;
                acc.page(RenderedPage {
                    index: 0,
                    total: 1,
                    image,
                })?;
                info
            }
        };

        progress.on_job_complete(acc.total);

        let stats = ExtractionStats {
            total_pages: source.page_count,
            processed_pages: acc.completed,
            render_duration_ms: acc.render_time.as_millis() as u64,
            ocr_duration_ms: acc.ocr_time.as_millis() as u64,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Extraction complete: {}/{} pages, {} chars, {}ms total",
            stats.processed_pages,
            acc.total,
            acc.text.len(),
            stats.total_duration_ms
        );

        Ok(Extraction {
            text: acc.text,
            pages: acc.pages,
            source,
            stats,
        })
    }
}

/// Recognises pages as they arrive and builds the accumulated text.
struct Accumulator<'a> {
    engine: &'a dyn OcrEngine,
    progress: &'a dyn ExtractionProgress,
    cancel: &'a CancelToken,
    paginated: bool,
    text: String,
    pages: Vec<PageText>,
    total: usize,
    completed: usize,
    render_time: Duration,
    ocr_time: Duration,
    mark: Instant,
}

impl<'a> Accumulator<'a> {
    fn new(
        engine: &'a dyn OcrEngine,
        progress: &'a dyn ExtractionProgress,
        cancel: &'a CancelToken,
        paginated: bool,
    ) -> Self {
        Self {
            engine,
            progress,
            cancel,
            paginated,
            text: String::new(),
            pages: Vec::new(),
            total: 0,
            completed: 0,
            render_time: Duration::ZERO,
            ocr_time: Duration::ZERO,
            mark: Instant::now(),
        }
    }

    fn check_cancelled(&self) -> Result<(), ExtractError> {
        if self.cancel.is_cancelled() {
            info!("Cancelled after {}/{} pages", self.completed, self.total);
            return Err(ExtractError::Cancelled {
                completed: self.completed,
                total: self.total,
            });
        }
        Ok(())
    }
}

impl PageVisitor for Accumulator<'_> {
    fn begin(&mut self, total: usize) -> Result<(), ExtractError> {
        self.total = total;
        self.check_cancelled()?;
        self.progress.on_job_start(total);
        self.mark = Instant::now();
        Ok(())
    }

    fn page(&mut self, page: RenderedPage) -> Result<(), ExtractError> {
        self.check_cancelled()?;
        let page_start = Instant::now();
        self.render_time += page_start.duration_since(self.mark);

        let page_num = page.page_num();
        self.progress.on_page_start(page_num, page.total);

        let paragraphs = match self.engine.recognize(&page.image) {
            Ok(paragraphs) => paragraphs,
            Err(e) => {
                // Ctrl-C also reaches the engine's child process; a page that
                // failed after cancellation was requested is a cancellation.
                self.check_cancelled()?;
                return Err(ExtractError::RecognitionFailed {
                    page: page_num,
                    detail: e.to_string(),
                });
            }
        };
        drop(page);
        self.ocr_time += page_start.elapsed();

        let joined = paragraphs.join("\n");
        if self.paginated {
            self.text.push_str(&page_marker(page_num));
        }
        self.text.push_str(&joined);
        debug!(
            "Page {}: {} paragraphs, {} chars",
            page_num,
            paragraphs.len(),
            joined.len()
        );

        self.completed += 1;
        self.progress
            .on_page_complete(self.completed, self.total, page_num, joined.len());

        self.pages.push(PageText {
            page_num,
            paragraphs: paragraphs.len(),
            text: joined,
            duration_ms: page_start.elapsed().as_millis() as u64,
        });

        self.mark = Instant::now();
        Ok(())
    }
}
