//! TUI Rendering
//!
//! Translates `AppState` into Ratatui widgets and draws them to the frame.

use crate::config::OutputFormat;
use crate::job::JobState;
use crate::tui::app::{AppState, Focus};
use crate::tui::picker::FilePicker;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::block::{Position, Title},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

const HELP: &str =
    "Tab/Shift-Tab: move  Ctrl-O/F2: browse  Space: format  Enter: process  Esc: cancel/quit";

/// Main draw function, called once per tick.
pub fn draw_ui(f: &mut Frame, state: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Source
            Constraint::Length(3), // Destination
            Constraint::Length(3), // Format
            Constraint::Length(3), // Process
            Constraint::Length(3), // Progress
            Constraint::Min(3),    // Status
            Constraint::Length(1), // Help
        ])
        .split(f.size());

    draw_field(
        f,
        chunks[0],
        "Source (PDF or image)",
        &state.source,
        state.focus == Focus::Source,
    );
    draw_field(
        f,
        chunks[1],
        "Save as",
        &state.destination,
        state.focus == Focus::Destination,
    );
    draw_format(f, chunks[2], state.format, state.focus == Focus::Format);
    draw_process(f, chunks[3], state.busy, state.focus == Focus::Process);

    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(state.status.percent.min(100));
    f.render_widget(gauge, chunks[4]);

    let status_style = match state.status.state {
        JobState::Failed { .. } | JobState::Cancelled => Style::default().fg(Color::Red),
        JobState::Succeeded { .. } => Style::default().fg(Color::Green),
        _ => Style::default(),
    };
    let status = Paragraph::new(state.status.message.as_str())
        .style(status_style)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Status").borders(Borders::ALL));
    f.render_widget(status, chunks[5]);

    f.render_widget(
        Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        chunks[6],
    );

    if let Some(picker) = state.picker.as_mut() {
        draw_picker(f, picker);
    } else if let Some((area, len)) = match state.focus {
        Focus::Source => Some((chunks[0], state.source.chars().count())),
        Focus::Destination => Some((chunks[1], state.destination.chars().count())),
        _ => None,
    } {
        let x = (area.x + 1 + len as u16).min(area.right().saturating_sub(2));
        f.set_cursor(x, area.y + 1);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_field(f: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let widget = Paragraph::new(value).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(focus_style(focused)),
    );
    f.render_widget(widget, area);
}

fn draw_format(f: &mut Frame, area: Rect, format: OutputFormat, focused: bool) {
    let option = |label: &'static str, value: OutputFormat| {
        let (mark, style) = if format == value {
            ("(•) ", Style::default().add_modifier(Modifier::BOLD))
        } else {
            ("( ) ", Style::default())
        };
        Span::styled(format!("{}{}   ", mark, label), style)
    };
    let line = Line::from(vec![
        option("Plain text (.txt)", OutputFormat::Txt),
        option("Word document (.docx)", OutputFormat::Docx),
    ]);
    let widget = Paragraph::new(line).block(
        Block::default()
            .title("Format")
            .borders(Borders::ALL)
            .border_style(focus_style(focused)),
    );
    f.render_widget(widget, area);
}

fn draw_process(f: &mut Frame, area: Rect, busy: bool, focused: bool) {
    let (label, style) = if busy {
        ("Processing...  (Esc to cancel)", Style::default().fg(Color::DarkGray))
    } else if focused {
        (
            "[ Process ]",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )
    } else {
        ("[ Process ]", Style::default())
    };
    let widget = Paragraph::new(Span::styled(label, style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(focused && !busy)),
    );
    f.render_widget(widget, area);
}

fn draw_picker(f: &mut Frame, picker: &mut FilePicker) {
    let area = centered(f.size(), 70, 70);
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = picker
        .entries
        .iter()
        .map(|e| {
            let style = if e.is_dir {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(e.name.clone(), style))
        })
        .collect();

    let title = match &picker.error {
        Some(err) => err.clone(),
        None => picker.dir.display().to_string(),
    };
    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .title(
                    Title::from("Enter: open  Backspace: up  ~: home  Esc: close")
                        .position(Position::Bottom),
                )
                .borders(Borders::ALL),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("▶ ");
    f.render_stateful_widget(list, area, &mut picker.list_state);
}

/// A `percent_x` by `percent_y` rectangle centred in `r`.
fn centered(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(state: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw_ui(f, state)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(100)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn form_shows_fields_and_status() {
        let mut state = AppState::new();
        state.source = "scan.pdf".into();
        state.status.message = "Text extracted and saved to out.txt".into();
        let s = screen(&mut state);
        assert!(s.contains("scan.pdf"));
        assert!(s.contains("[ Process ]"));
        assert!(s.contains("Text extracted and saved to out.txt"));
    }

    #[test]
    fn centered_rect_fits_inside() {
        let r = centered(Rect::new(0, 0, 100, 40), 50, 50);
        assert!(r.width <= 50 && r.height <= 20);
        assert!(r.x >= 25 && r.y >= 10);
    }
}
