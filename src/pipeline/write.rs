//! Serialisation: write the accumulated text as TXT or DOCX.
//!
//! Both formats are written to a temporary file in the destination directory
//! and renamed into place once complete, so a failure mid-write never leaves
//! a truncated file at the destination, and an existing file there is only
//! replaced by a finished one.

use crate::config::OutputFormat;
use crate::error::ExtractError;
use docx_rs::{Docx, Paragraph, Run};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Write `text` to `path` in `format`.
///
/// * [`OutputFormat::Txt`]: verbatim UTF-8.
/// * [`OutputFormat::Docx`]: one paragraph per `\n`-separated line, empty
///   lines included, in order.
pub fn write_output(text: &str, path: &Path, format: OutputFormat) -> Result<(), ExtractError> {
    let mut tmp = create_temp(path)?;

    match format {
        OutputFormat::Txt => {
            tmp.write_all(text.as_bytes())
                .and_then(|_| tmp.flush())
                .map_err(|source| ExtractError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        OutputFormat::Docx => {
            let docx = build_docx(text);
            docx.build()
                .pack(tmp.as_file_mut())
                .map_err(|e| ExtractError::DocumentBuildFailed {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                })?;
        }
    }

    tmp.persist(path)
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    info!("Wrote {} output to {}", format, path.display());
    Ok(())
}

/// Async wrapper around [`write_output`].
pub async fn write_output_async(
    text: String,
    path: &Path,
    format: OutputFormat,
) -> Result<(), ExtractError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_output(&text, &path, format))
        .await
        .map_err(|e| ExtractError::Internal(format!("Write task panicked: {}", e)))?
}

/// One paragraph per line, in order.
fn build_docx(text: &str) -> Docx {
    let mut lines = 0usize;
    let docx = text.split('\n').fold(Docx::new(), |docx, line| {
        lines += 1;
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
    });
    debug!("Built document with {} paragraphs", lines);
    docx
}

/// Temporary file next to `path`, creating parent directories as needed.
fn create_temp(path: &Path) -> Result<NamedTempFile, ExtractError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().map_err(|source| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })?,
    };

    std::fs::create_dir_all(&parent).map_err(|source| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;

    tempfile::Builder::new()
        .prefix(".ocr-extract-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|source| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txt_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let text = "\n--- Page 1 ---\nHéllo wörld\n--- Page 2 ---\n";
        write_output(text, &path, OutputFormat::Txt).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), text.as_bytes());
    }

    #[test]
    fn txt_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old content that is longer").unwrap();
        write_output("new", &path, OutputFormat::Txt).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.txt");
        write_output("x", &path, OutputFormat::Txt).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        write_output("a\nb", &path, OutputFormat::Docx).unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.docx")]);
    }

    #[test]
    fn docx_is_a_zip_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        write_output("Hello\n\nWorld", &path, OutputFormat::Docx).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
