//! Terminal form for one-file-at-a-time extraction.
//!
//! A source field with a file picker, a destination field, a TXT/DOCX toggle,
//! a Process action, a progress gauge and a status line. Jobs run on the
//! [`crate::JobRunner`] worker; the event loop in the `ocr-extract-tui`
//! binary polls its status on every tick.

pub mod app;
pub mod input;
pub mod picker;
pub mod render;

pub use app::{AppState, Focus};
pub use input::{handle_key_event, Action};
pub use picker::FilePicker;
pub use render::draw_ui;
