//! OCR invocation: hand a page bitmap to the engine, get paragraphs back.
//!
//! The engine is the expensive part of the process (model loading, language
//! data checks), so it is built once per process behind a [`SharedEngine`]
//! and passed explicitly to every job.
//!
//! [`TesseractEngine`] drives the `tesseract` executable. The bitmap is
//! PNG-encoded in memory and piped through stdin; no temporary image files
//! are written. Tesseract's plain-text output is then grouped into
//! paragraphs by [`crate::pipeline::postprocess::paragraphs`], dropping
//! layout detail.

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, OcrError};
use crate::pipeline::postprocess;
use image::DynamicImage;
use once_cell::sync::OnceCell;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, info};

/// A text recogniser.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// job in the process, and jobs run on worker threads.
pub trait OcrEngine: Send + Sync {
    /// Engine identifier for logs, e.g. `"tesseract"`.
    fn name(&self) -> &'static str;

    /// Recognise `page` and return its paragraphs in reading order.
    fn recognize(&self, page: &DynamicImage) -> Result<Vec<String>, OcrError>;
}

/// [`OcrEngine`] backed by the tesseract command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
    language: String,
    psm: u8,
    dpi: u32,
}

impl TesseractEngine {
    /// Check that tesseract runs and has the configured language installed.
    pub fn initialize(config: &ExtractionConfig) -> Result<Self, OcrError> {
        let engine = Self {
            program: config.tesseract_path.clone(),
            language: config.language.clone(),
            psm: config.page_segmentation_mode,
            dpi: config.dpi,
        };

        let version = engine.run(&["--version"], None)?;
        info!(
            "Using {}",
            version.lines().next().unwrap_or("tesseract (unknown version)")
        );

        let installed = engine.list_languages()?;
        for wanted in engine.language.split('+') {
            if !installed.iter().any(|l| l == wanted) {
                return Err(OcrError::LanguageMissing {
                    language: wanted.to_string(),
                    available: installed.join(", "),
                });
            }
        }

        Ok(engine)
    }

    /// Languages reported by `tesseract --list-langs`.
    pub fn list_languages(&self) -> Result<Vec<String>, OcrError> {
        let out = self.run(&["--list-langs"], None)?;
        Ok(parse_language_list(&out))
    }

    /// Run tesseract with `args`, optionally feeding `stdin`, and return stdout.
    fn run(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<String, OcrError> {
        let program = self.program.display().to_string();
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| OcrError::Spawn {
                program: program.clone(),
                source,
            })?;

        // tesseract reads the whole image before writing anything, so filling
        // stdin first cannot deadlock against stdout. The pipe is closed at
        // the end of the match arm.
        let write_err = match (stdin, child.stdin.take()) {
            (Some(bytes), Some(mut pipe)) => pipe.write_all(bytes).err(),
            _ => None,
        };

        // Always reap the child: when it exits early the broken pipe is only
        // a symptom, and its stderr says why.
        let output = child.wait_with_output().map_err(|source| OcrError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if let Some(source) = write_err {
            return Err(OcrError::Spawn { program, source });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, page: &DynamicImage) -> Result<Vec<String>, OcrError> {
        let mut png = Vec::new();
        page.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| OcrError::Encode(e.to_string()))?;
        debug!(
            "Sending {}x{} px page ({} bytes PNG) to tesseract",
            page.width(),
            page.height(),
            png.len()
        );

        let psm = self.psm.to_string();
        let dpi = self.dpi.to_string();
        let raw = self.run(
            &[
                "stdin",
                "stdout",
                "-l",
                &self.language,
                "--psm",
                &psm,
                "--dpi",
                &dpi,
            ],
            Some(&png),
        )?;

        Ok(postprocess::paragraphs(&raw))
    }
}

/// `--list-langs` prints a header line followed by one code per line.
fn parse_language_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("List of available languages"))
        .map(str::to_string)
        .collect()
}

/// Process-wide OCR engine handle.
///
/// The engine is constructed on first use and reused for every later job.
/// Clone the surrounding `Arc<SharedEngine>` into each job; do not build a
/// second one.
pub struct SharedEngine {
    config: ExtractionConfig,
    cell: OnceCell<Arc<dyn OcrEngine>>,
}

impl SharedEngine {
    /// A handle that will initialise tesseract from `config` on first use.
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            config: config.clone(),
            cell: OnceCell::new(),
        }
    }

    /// A handle around an engine that is already built.
    pub fn from_engine(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            config: ExtractionConfig::default(),
            cell: OnceCell::with_value(engine),
        }
    }

    /// Whether the engine has been constructed yet.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Get the engine, constructing it on first call.
    ///
    /// A failed initialisation is not cached; the next call retries.
    pub fn get(&self) -> Result<Arc<dyn OcrEngine>, ExtractError> {
        self.cell
            .get_or_try_init(|| {
                TesseractEngine::initialize(&self.config)
                    .map(|e| Arc::new(e) as Arc<dyn OcrEngine>)
            })
            .map(Arc::clone)
            .map_err(ExtractError::EngineUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEngine(AtomicUsize);

    impl OcrEngine for FixedEngine {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<String>, OcrError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["Hello".into()])
        }
    }

    #[test]
    fn parse_list_langs_output() {
        let out = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\ndeu\n";
        assert_eq!(parse_language_list(out), vec!["eng", "osd", "deu"]);
    }

    #[test]
    fn shared_engine_hands_out_same_instance() {
        let engine: Arc<dyn OcrEngine> = Arc::new(FixedEngine(AtomicUsize::new(0)));
        let shared = SharedEngine::from_engine(Arc::clone(&engine));
        assert!(shared.is_initialized());
        let a = shared.get().unwrap();
        let b = shared.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "fixed");
    }

    #[test]
    fn missing_binary_is_engine_unavailable() {
        let config = ExtractionConfig::builder()
            .tesseract_path("/definitely/not/tesseract")
            .build()
            .unwrap();
        let shared = SharedEngine::new(&config);
        let err = shared.get().err().unwrap();
        assert!(matches!(
            err,
            ExtractError::EngineUnavailable(OcrError::Spawn { .. })
        ));
        assert!(!shared.is_initialized());
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_reports_stderr_not_broken_pipe() {
        // Stands in for tesseract failing on missing language data: exits
        // without reading its stdin.
        let engine = TesseractEngine {
            program: PathBuf::from("/bin/sh"),
            language: "eng".into(),
            psm: 3,
            dpi: 300,
        };
        let image = vec![0u8; 4 << 20];
        let err = engine
            .run(
                &[
                    "-c",
                    "echo 'Error opening data file eng.traineddata' >&2; exit 1",
                ],
                Some(&image),
            )
            .unwrap_err();

        match err {
            OcrError::Failed { stderr, .. } => {
                assert_eq!(stderr, "Error opening data file eng.traineddata");
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
