//! Keyboard Input Handler
//!
//! Processes crossterm key events and updates `AppState`. Anything that
//! touches the job runner is returned as an [`Action`] for the event loop.

use crate::tui::app::{AppState, Focus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Cancel,
    Quit,
}

/// Handles a single key press.
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return Some(Action::Quit);
    }

    if state.picker.is_some() {
        handle_picker_key(key, state);
        return None;
    }

    match key.code {
        KeyCode::Esc => {
            if state.busy {
                return Some(Action::Cancel);
            }
            state.should_quit = true;
            Some(Action::Quit)
        }
        KeyCode::Tab => {
            state.focus = state.focus.next();
            None
        }
        KeyCode::BackTab => {
            state.focus = state.focus.previous();
            None
        }
        KeyCode::F(2) => {
            state.open_picker();
            None
        }
        KeyCode::Char('o') if ctrl => {
            state.open_picker();
            None
        }
        KeyCode::Char('u') if ctrl => {
            if let Some(field) = state.focused_field() {
                field.clear();
            }
            None
        }
        KeyCode::Enter => match state.focus {
            Focus::Process if !state.busy => Some(Action::Submit),
            Focus::Process => None,
            Focus::Format => {
                state.toggle_format();
                None
            }
            Focus::Source | Focus::Destination => {
                state.focus = state.focus.next();
                None
            }
        },
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right if state.focus == Focus::Format => {
            state.toggle_format();
            None
        }
        KeyCode::Backspace => {
            if let Some(field) = state.focused_field() {
                field.pop();
            }
            None
        }
        KeyCode::Char(c) if !ctrl => {
            if let Some(field) = state.focused_field() {
                field.push(c);
            }
            None
        }
        _ => None,
    }
}

fn handle_picker_key(key: KeyEvent, state: &mut AppState) {
    let Some(picker) = state.picker.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => state.picker = None,
        KeyCode::Up | KeyCode::Char('k') => picker.previous(),
        KeyCode::Down | KeyCode::Char('j') => picker.next(),
        KeyCode::Backspace | KeyCode::Left => picker.up(),
        KeyCode::Char('~') => picker.home(),
        KeyCode::Enter | KeyCode::Right => {
            if let Some(path) = picker.activate() {
                state.choose_source(path);
            }
        }
        _ => {}
    }
}
