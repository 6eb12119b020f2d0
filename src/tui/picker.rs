//! Directory browser limited to supported source files.

use crate::pipeline::input::is_supported;
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

pub struct FilePicker {
    pub dir: PathBuf,
    pub entries: Vec<Entry>,
    pub list_state: ListState,
    /// Set when the directory could not be read.
    pub error: Option<String>,
}

impl FilePicker {
    /// Open at `start`, or the working directory, or home.
    pub fn open(start: Option<PathBuf>) -> Self {
        let dir = start
            .or_else(|| std::env::current_dir().ok())
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut picker = Self {
            dir,
            entries: Vec::new(),
            list_state: ListState::default(),
            error: None,
        };
        picker.load();
        picker
    }

    /// Re-read the current directory.
    pub fn load(&mut self) {
        self.entries.clear();
        self.error = None;

        if let Some(parent) = self.dir.parent() {
            self.entries.push(Entry {
                name: "..".into(),
                path: parent.to_path_buf(),
                is_dir: true,
            });
        }

        match list_dir(&self.dir) {
            Ok(mut listed) => self.entries.append(&mut listed),
            Err(e) => {
                debug!("Cannot read {}: {}", self.dir.display(), e);
                self.error = Some(format!("Cannot read {}: {}", self.dir.display(), e));
            }
        }

        self.list_state
            .select(if self.entries.is_empty() { None } else { Some(0) });
    }

    pub fn selected(&self) -> Option<&Entry> {
        self.list_state.selected().and_then(|i| self.entries.get(i))
    }

    pub fn next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % self.entries.len());
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let len = self.entries.len();
        let i = self.list_state.selected().map_or(0, |i| (i + len - 1) % len);
        self.list_state.select(Some(i));
    }

    /// Enter the selected directory, or return the selected file.
    pub fn activate(&mut self) -> Option<PathBuf> {
        let entry = self.selected()?.clone();
        if entry.is_dir {
            self.change_dir(entry.path);
            None
        } else {
            Some(entry.path)
        }
    }

    pub fn up(&mut self) {
        if let Some(parent) = self.dir.parent() {
            let parent = parent.to_path_buf();
            self.change_dir(parent);
        }
    }

    pub fn home(&mut self) {
        if let Some(home) = dirs::home_dir() {
            self.change_dir(home);
        }
    }

    fn change_dir(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.load();
    }
}

/// Sub-directories first, then supported files; each group sorted by name.
/// Hidden entries are skipped.
fn list_dir(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for item in std::fs::read_dir(dir)? {
        let Ok(item) = item else { continue };
        let name = item.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = item.path();
        if path.is_dir() {
            dirs.push(Entry {
                name: format!("{}/", name),
                path,
                is_dir: true,
            });
        } else if is_supported(&path) {
            files.push(Entry {
                name,
                path,
                is_dir: false,
            });
        }
    }

    dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    dirs.append(&mut files);
    Ok(dirs)
}
