//! CLI binary for ocr-extract.
//!
//! A thin shim over the library crate: maps flags to `ExtractionConfig`,
//! prompts for whatever was not given, runs one job and reports the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ocr_extract::pipeline::write::write_output_async;
use ocr_extract::{
    ensure_extension, CancelToken, ExtractionConfig, ExtractionProgress, Extractor, JobRequest,
    NoopProgress, OutputFormat, PageSelection, ProgressCallback, SourceKind,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Console line after each page. Plain text: it may be piped or logged.
fn progress_line(completed: usize, total: usize) -> String {
    format!("Progress: {completed}/{total} pages processed.")
}

/// Prints one "Progress: i/n pages processed." line per page, above an
/// optional indicatif bar. With `to_stderr` the lines stay off stdout.
struct CliProgress {
    bar: Option<ProgressBar>,
    to_stderr: bool,
}

impl CliProgress {
    fn new(show_bar: bool, to_stderr: bool) -> Arc<Self> {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
            );
            bar.set_message("Loading OCR engine…");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Arc::new(Self { bar, to_stderr })
    }

    fn line(&self, msg: String) {
        match &self.bar {
            Some(bar) => bar.println(msg),
            None if self.to_stderr => eprintln!("{msg}"),
            None => println!("{msg}"),
        }
    }
}

impl ExtractionProgress for CliProgress {
    fn on_job_start(&self, total_pages: usize) {
        if let Some(bar) = &self.bar {
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}/{len} pages  \
                     ⏱ {elapsed_precise}  ETA {eta_precise}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            bar.set_length(total_pages as u64);
            bar.reset_eta();
        }
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("page {page_num}"));
        }
    }

    fn on_page_complete(&self, completed: usize, total: usize, _page_num: usize, _chars: usize) {
        self.line(progress_line(completed, total));
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_job_complete(&self, _total_pages: usize) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Prompt for the input and output paths
  ocr-extract

  # Scanned PDF to plain text
  ocr-extract scan.pdf -o scan.txt

  # Photo to a Word document (".docx" is appended when missing)
  ocr-extract receipt.jpg -o receipt --format docx

  # German text, pages 3 to 10 only
  ocr-extract --lang deu --pages 3-10 book.pdf -o book.txt

  # Page count and metadata, no OCR
  ocr-extract --inspect-only scan.pdf

SUPPORTED INPUT:
  .pdf .png .jpg .jpeg .bmp .tiff .tif (case-insensitive)

ENVIRONMENT VARIABLES:
  OCR_EXTRACT_*     Every flag, e.g. OCR_EXTRACT_DPI=200 OCR_EXTRACT_LANG=fra
  PDFIUM_LIB_PATH   Directory (or file) of an existing libpdfium
  RUST_LOG          Log filter, e.g. RUST_LOG=ocr_extract=debug

SETUP:
  Install tesseract and its language data (e.g. apt install tesseract-ocr),
  and place libpdfium next to the binary or point PDFIUM_LIB_PATH at it.
"#;

/// Extract text from scanned PDFs and images with Tesseract OCR.
#[derive(Parser, Debug)]
#[command(
    name = "ocr-extract",
    version,
    about = "Extract text from scanned PDFs and images with Tesseract OCR",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF or image file. Prompted for when omitted.
    #[arg(env = "OCR_EXTRACT_INPUT")]
    input: Option<String>,

    /// Output file. Prompted for when omitted.
    #[arg(short, long, env = "OCR_EXTRACT_OUTPUT")]
    output: Option<String>,

    /// Output format.
    #[arg(long, env = "OCR_EXTRACT_FORMAT", value_enum, default_value = "txt")]
    format: FormatArg,

    /// Rendering DPI for PDF pages (72–600).
    #[arg(long, env = "OCR_EXTRACT_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Tesseract language(s), e.g. eng or eng+deu.
    #[arg(long, env = "OCR_EXTRACT_LANG", default_value = "eng")]
    lang: String,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "OCR_EXTRACT_PSM", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: u8,

    /// Path to the tesseract executable.
    #[arg(long, env = "OCR_EXTRACT_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Directory containing libpdfium.
    #[arg(long, env = "OCR_EXTRACT_PDFIUM_DIR")]
    pdfium_dir: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "OCR_EXTRACT_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "OCR_EXTRACT_PASSWORD")]
    password: Option<String>,

    /// Also print the extraction (text, pages, stats) as JSON on stdout.
    #[arg(long, env = "OCR_EXTRACT_JSON")]
    json: bool,

    /// Print source metadata only, no OCR.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the progress bar.
    #[arg(long, env = "OCR_EXTRACT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCR_EXTRACT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCR_EXTRACT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Txt,
    Docx,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Txt => OutputFormat::Txt,
            FormatArg::Docx => OutputFormat::Docx,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress lines carry the feedback; library INFO logs only show up
    // with --verbose or RUST_LOG.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || !cli.no_progress {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("An error occurred:"), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let input = match cli.input.clone() {
        Some(i) => i,
        None => prompt("Enter the path to the PDF or image file: ")?,
    };

    let config = build_config(&cli)?;
    let extractor = Extractor::new(config);

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = extractor.inspect(&input)?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", info.path.display());
            println!(
                "Kind:         {}",
                match info.kind {
                    SourceKind::Pdf => "PDF",
                    SourceKind::Image => "image",
                }
            );
            println!("Pages:        {}", info.page_count);
            if let Some((w, h)) = info.dimensions {
                println!("Dimensions:   {}x{} px", w, h);
            }
            if let Some(ref t) = info.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = info.author {
                println!("Author:       {}", a);
            }
            if let Some(ref p) = info.producer {
                println!("Producer:     {}", p);
            }
        }
        return Ok(());
    }

    let format: OutputFormat = cli.format.into();
    let output = match cli.output.clone() {
        Some(o) => o,
        None => prompt("Enter the output file name: ")?,
    };
    let output = with_default_extension(&output, format);
    let request = JobRequest::new(input.as_str(), output, format);

    // Fail on bad paths before the engine is loaded.
    let job = request.validate()?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let show_bar = !cli.quiet && !cli.no_progress && !cli.json;
    let progress: ProgressCallback = if cli.quiet {
        Arc::new(NoopProgress)
    } else {
        CliProgress::new(show_bar, cli.json)
    };

    // JSON owns stdout; console lines move to stderr.
    let say = |msg: String| match (cli.quiet, cli.json) {
        (true, _) => {}
        (false, true) => eprintln!("{msg}"),
        (false, false) => println!("{msg}"),
    };

    say("Starting OCR...".to_string());

    let (saved_to, stats) = if cli.json {
        let extraction = extractor.extract(&input, progress, cancel).await?;
        write_output_async(extraction.text.clone(), &job.destination, format).await?;
        println!(
            "{}",
            serde_json::to_string_pretty(&extraction).context("Failed to serialise output")?
        );
        (job.destination, extraction.stats)
    } else {
        let outcome = extractor.extract_to_file(request, progress, cancel).await?;
        (outcome.output, outcome.stats)
    };

    say(format!(
        "{} {}",
        green("OCR completed. Extracted text saved to:"),
        saved_to.display()
    ));
    if !cli.quiet {
        eprintln!(
            "{}",
            dim(&format!(
                "{} pages in {}ms (render {}ms, OCR {}ms)",
                stats.processed_pages,
                stats.total_duration_ms,
                stats.render_duration_ms,
                stats.ocr_duration_ms
            ))
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let pages: PageSelection = cli.pages.parse()?;

    let mut builder = ExtractionConfig::builder()
        .dpi(cli.dpi)
        .language(cli.lang.as_str())
        .page_segmentation_mode(cli.psm)
        .tesseract_path(cli.tesseract.clone())
        .pages(pages);

    if let Some(ref dir) = cli.pdfium_dir {
        builder = builder.pdfium_library_dir(dir.clone());
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.as_str());
    }

    builder.build().context("Invalid configuration")
}

/// Print `question` and read one trimmed line from stdin.
fn prompt(question: &str) -> Result<String> {
    let mut stdout = io::stdout();
    stdout
        .write_all(question.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Append the format's extension to a non-empty output path.
fn with_default_extension(output: &str, format: OutputFormat) -> String {
    let output = output.trim();
    if output.is_empty() {
        return String::new();
    }
    ensure_extension(Path::new(output), format)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_is_plain() {
        assert_eq!(progress_line(2, 5), "Progress: 2/5 pages processed.");
        assert!(!progress_line(1, 1).contains('\x1b'));
    }

    #[test]
    fn default_extension_follows_format() {
        assert_eq!(
            with_default_extension("notes", OutputFormat::Docx),
            "notes.docx"
        );
        assert_eq!(with_default_extension("  ", OutputFormat::Txt), "");
    }
}
