//! Terminal UI binary for ocr-extract.
//!
//! Owns the terminal, the event loop and one `JobRunner`. Logs go to
//! `<temp dir>/ocr-extract-tui.log`, and only when `RUST_LOG` is set, so they
//! never draw over the screen.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ocr_extract::tui::{draw_ui, handle_key_event, Action, AppState};
use ocr_extract::{ExtractionConfig, Extractor, JobRunner};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const TICK: Duration = Duration::from_millis(100);

/// Restores the terminal on drop, including on panic.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<(Self, Terminal<CrosstermBackend<Stdout>>)> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let terminal =
            Terminal::new(CrosstermBackend::new(stdout)).context("Failed to open terminal")?;
        Ok((Self, terminal))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn main() -> Result<()> {
    init_logging()?;

    // Load the engine before the first frame. A failure here is not fatal:
    // the first job retries and reports it in the status line.
    let extractor = Extractor::new(ExtractionConfig::default());
    if let Err(e) = extractor.warm_up() {
        warn!("OCR engine not ready: {}", e);
    }
    let runner = JobRunner::new(extractor);

    let (guard, mut terminal) = TerminalGuard::enter()?;
    let result = run(&mut terminal, &runner);
    drop(guard);
    terminal.show_cursor().ok();

    if runner.is_busy() {
        info!("Quitting with a job in progress; cancelling it");
        runner.cancel();
    }
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, runner: &JobRunner) -> Result<()> {
    let mut state = AppState::new();

    while !state.should_quit {
        state.sync(runner);

        terminal
            .draw(|f| draw_ui(f, &mut state))
            .context("Failed to draw")?;

        if !event::poll(TICK).context("Failed to poll events")? {
            continue;
        }
        let Event::Key(key) = event::read().context("Failed to read event")? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key_event(key, &mut state) {
            Some(Action::Submit) => {
                // Validation errors are already recorded in the runner status.
                if let Err(e) = runner.submit(state.request()) {
                    debug!("Submission rejected: {}", e);
                }
                state.sync(runner);
            }
            Some(Action::Cancel) => {
                runner.cancel();
            }
            Some(Action::Quit) | None => {}
        }
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return Ok(());
    };
    let path = std::env::temp_dir().join("ocr-extract-tui.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
