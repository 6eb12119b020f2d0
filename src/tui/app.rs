//! TUI App State
//!
//! The form fields, the focused widget, the optional file picker and the last
//! job status snapshot.

use crate::config::{ensure_extension, OutputFormat};
use crate::job::{JobRequest, JobRunner, JobState, JobStatus};
use crate::tui::picker::FilePicker;
use std::path::{Path, PathBuf};

/// Focusable widgets, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Source,
    Destination,
    Format,
    Process,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Source => Focus::Destination,
            Focus::Destination => Focus::Format,
            Focus::Format => Focus::Process,
            Focus::Process => Focus::Source,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Focus::Source => Focus::Process,
            Focus::Destination => Focus::Source,
            Focus::Format => Focus::Destination,
            Focus::Process => Focus::Format,
        }
    }
}

pub struct AppState {
    pub source: String,
    pub destination: String,
    pub format: OutputFormat,
    pub focus: Focus,
    pub picker: Option<FilePicker>,
    pub status: JobStatus,
    /// Mirrors [`JobRunner::is_busy`] as of the last [`AppState::sync`].
    pub busy: bool,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            source: String::new(),
            destination: String::new(),
            format: OutputFormat::default(),
            focus: Focus::Source,
            picker: None,
            status: JobStatus {
                message: "Select a PDF or image file to begin.".into(),
                ..JobStatus::default()
            },
            busy: false,
            should_quit: false,
        }
    }

    /// Pull the runner's latest status. The welcome text stays until the
    /// first submission.
    pub fn sync(&mut self, runner: &JobRunner) {
        self.busy = runner.is_busy();
        let status = runner.status();
        if status.state != JobState::Idle {
            self.status = status;
        }
    }

    /// The request for the current form contents.
    ///
    /// A non-empty destination gets the format's extension appended when it
    /// does not already end with it.
    pub fn request(&self) -> JobRequest {
        let destination = self.destination.trim();
        let destination = if destination.is_empty() {
            String::new()
        } else {
            ensure_extension(Path::new(destination), self.format)
                .to_string_lossy()
                .into_owned()
        };
        JobRequest::new(self.source.trim(), destination, self.format)
    }

    /// Open the picker in the directory of the current source, if any.
    pub fn open_picker(&mut self) {
        let start = Path::new(self.source.trim())
            .parent()
            .filter(|p| p.is_dir())
            .map(Path::to_path_buf);
        self.picker = Some(FilePicker::open(start));
    }

    /// Take a file chosen in the picker as the source.
    ///
    /// An empty destination is pre-filled with the source path and the
    /// current format's extension.
    pub fn choose_source(&mut self, path: PathBuf) {
        self.source = path.to_string_lossy().into_owned();
        if self.destination.trim().is_empty() {
            self.destination = path
                .with_extension(self.format.extension())
                .to_string_lossy()
                .into_owned();
        }
        self.picker = None;
        self.focus = Focus::Destination;
    }

    /// Switch TXT ↔ DOCX, carrying the destination's extension along.
    pub fn toggle_format(&mut self) {
        let old = self.format;
        self.format = old.toggled();
        let dest = Path::new(self.destination.trim());
        let has_old = dest
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(old.extension()));
        if has_old {
            self.destination = dest
                .with_extension(self.format.extension())
                .to_string_lossy()
                .into_owned();
        }
    }

    /// The text field under focus, if the focus is on one.
    pub fn focused_field(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Source => Some(&mut self.source),
            Focus::Destination => Some(&mut self.destination),
            Focus::Format | Focus::Process => None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
