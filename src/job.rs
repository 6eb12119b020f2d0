//! Job requests, the job state machine and the single-slot background runner.
//!
//! ```text
//! Idle → Validating → Running{completed,total} → Succeeded{output}
//!            │                 │                → Failed{kind,message}
//!            └──── Failed ◄────┘                → Cancelled
//! ```
//!
//! The interactive front end owns one [`JobRunner`]. Submitting while a job is
//! active is rejected with [`ExtractError::JobInProgress`]; the UI polls
//! [`JobRunner::status`] on every tick to draw the gauge and status line.

use crate::config::OutputFormat;
use crate::error::{ErrorKind, ExtractError};
use crate::extract::Extractor;
use crate::output::ExtractionStats;
use crate::pipeline::input::{self, ResolvedInput};
use crate::progress::{percent, CancelToken, ExtractionProgress};
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use tracing::{error, info, warn};

/// What the user asked for: a source, a destination and a format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    pub source: String,
    pub destination: String,
    pub format: OutputFormat,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedJob {
    pub input: ResolvedInput,
    pub destination: PathBuf,
    pub format: OutputFormat,
}

impl JobRequest {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        format: OutputFormat,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            format,
        }
    }

    /// Check the request before any work starts.
    ///
    /// Order: source given, destination given, source extension supported,
    /// source exists and is readable.
    pub fn validate(&self) -> Result<ValidatedJob, ExtractError> {
        if self.source.trim().is_empty() {
            return Err(ExtractError::MissingSource);
        }
        let destination = self.destination.trim();
        if destination.is_empty() {
            return Err(ExtractError::MissingDestination);
        }
        let input = input::resolve_input(&self.source)?;
        Ok(ValidatedJob {
            input,
            destination: PathBuf::from(destination),
            format: self.format,
        })
    }
}

/// Result of a successful job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub output: PathBuf,
    pub format: OutputFormat,
    pub stats: ExtractionStats,
}

/// Where a job is in its life cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Validating,
    Running { completed: usize, total: usize },
    Succeeded { output: PathBuf },
    Failed { kind: ErrorKind, message: String },
    Cancelled,
}

impl JobState {
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Validating | JobState::Running { .. })
    }
}

/// Snapshot of the runner, as drawn by the UI.
#[derive(Debug, Clone, Default)]
pub struct JobStatus {
    pub state: JobState,
    /// 0–100.
    pub percent: u16,
    /// Status line text.
    pub message: String,
}

impl JobStatus {
    fn running(completed: usize, total: usize) -> Self {
        Self {
            state: JobState::Running { completed, total },
            percent: percent(completed, total),
            message: format!("Processing... {}/{} pages", completed, total),
        }
    }

    fn succeeded(output: PathBuf) -> Self {
        Self {
            message: format!("Text extracted and saved to {}", output.display()),
            state: JobState::Succeeded { output },
            percent: 100,
        }
    }

    /// Terminal status for a failed job. Cancellation gets its own state.
    ///
    /// Input problems are shown as the bare message ("Please select a
    /// file."); failures during the run are prefixed with "Error: ".
    pub fn failed(err: &ExtractError, percent: u16) -> Self {
        let message = match err.kind() {
            ErrorKind::Validation | ErrorKind::UnsupportedFormat => err.to_string(),
            _ => format!("Error: {}", err),
        };
        let state = match err.kind() {
            ErrorKind::Cancelled => JobState::Cancelled,
            kind => JobState::Failed {
                kind,
                message: err.to_string(),
            },
        };
        Self {
            state,
            percent,
            message,
        }
    }
}

/// Runs at most one job at a time on a background thread.
pub struct JobRunner {
    extractor: Extractor,
    busy: Arc<AtomicBool>,
    status: Arc<Mutex<JobStatus>>,
    cancel: Mutex<Option<CancelToken>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl JobRunner {
    pub fn new(extractor: Extractor) -> Self {
        Self {
            extractor,
            busy: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(JobStatus::default())),
            cancel: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> JobStatus {
        lock(&self.status).clone()
    }

    /// Start `request` in the background.
    ///
    /// Validation runs on the caller's thread: an invalid request fails
    /// immediately, its error is returned and recorded in the status, and no
    /// worker is started.
    pub fn submit(&self, request: JobRequest) -> Result<(), ExtractError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected submission: a job is already running");
            return Err(ExtractError::JobInProgress);
        }

        *lock(&self.status) = JobStatus {
            state: JobState::Validating,
            percent: 0,
            message: "Validating...".into(),
        };

        if let Err(e) = request.validate() {
            info!("Validation failed: {}", e);
            *lock(&self.status) = JobStatus::failed(&e, 0);
            self.busy.store(false, Ordering::SeqCst);
            return Err(e);
        }

        let cancel = CancelToken::new();
        *lock(&self.cancel) = Some(cancel.clone());

        let extractor = self.extractor.clone();
        let status = Arc::clone(&self.status);
        let busy = Arc::clone(&self.busy);

        let spawned = std::thread::Builder::new()
            .name("ocr-job".into())
            .spawn(move || {
                let progress = StatusProgress {
                    status: Arc::clone(&status),
                };
                let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
                    extractor.run_job(&request, &progress, &cancel)
                }))
                .unwrap_or_else(|_| {
                    Err(ExtractError::Internal("Extraction worker panicked".into()))
                });

                let mut current = lock(&status);
                let reached = current.percent;
                *current = match result {
                    Ok(outcome) => {
                        info!("Job finished: {}", outcome.output.display());
                        JobStatus::succeeded(outcome.output)
                    }
                    Err(e) => {
                        error!("Job failed: {}", e);
                        JobStatus::failed(&e, reached)
                    }
                };
                drop(current);
                busy.store(false, Ordering::SeqCst);
            });

        match spawned {
            Ok(handle) => {
                *lock(&self.handle) = Some(handle);
                Ok(())
            }
            Err(e) => {
                let err = ExtractError::Internal(format!("Failed to start worker: {}", e));
                *lock(&self.status) = JobStatus::failed(&err, 0);
                self.busy.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    /// Ask the running job to stop before its next page.
    ///
    /// Returns `false` when nothing is running.
    pub fn cancel(&self) -> bool {
        if !self.is_busy() {
            return false;
        }
        match lock(&self.cancel).as_ref() {
            Some(token) => {
                info!("Cancellation requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Block until the current worker, if any, has finished.
    pub fn wait(&self) {
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mirrors page events into the shared status.
struct StatusProgress {
    status: Arc<Mutex<JobStatus>>,
}

impl ExtractionProgress for StatusProgress {
    fn on_job_start(&self, total_pages: usize) {
        *lock(&self.status) = JobStatus::running(0, total_pages);
    }

    fn on_page_complete(&self, completed: usize, total: usize, _page_num: usize, _chars: usize) {
        *lock(&self.status) = JobStatus::running(completed, total);
    }
}
