//! Post-processing: turn raw tesseract output into paragraph fragments.
//!
//! Tesseract prints one line per recognised text line and separates blocks
//! with blank lines. Downstream we want paragraph units, not layout lines:
//! lines of one block are merged, words split by an end-of-line hyphen are
//! re-joined, and engine artefacts (form feeds, zero-width characters,
//! ragged whitespace) are removed.
//!
//! ## Rule Order
//!
//! Line endings are normalised before anything splits on `\n`, invisible
//! characters go before de-hyphenation so `recog\u{00AD}-\nnition` still
//! matches, and whitespace is collapsed last, per paragraph.

use once_cell::sync::Lazy;
use regex::Regex;

/// Group raw engine output into paragraphs, in reading order.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Drop form feeds (tesseract ends each page with `\x0c`)
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Re-join words hyphenated across a line break
/// 5. Split into blocks at blank lines
/// 6. Join each block's lines with single spaces, collapse whitespace
/// 7. Drop empty blocks
pub fn paragraphs(raw: &str) -> Vec<String> {
    let s = normalise_line_endings(raw);
    let s = remove_form_feeds(&s);
    let s = remove_invisible_chars(&s);
    let s = join_hyphenated_words(&s);
    split_blocks(&s)
        .into_iter()
        .map(|block| collapse_whitespace(&block.join(" ")))
        .filter(|p| !p.is_empty())
        .collect()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Drop form feeds ──────────────────────────────────────────────────

fn remove_form_feeds(input: &str) -> String {
    input.replace('\u{000C}', "\n")
}

// ── Rule 3: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 4: Re-join hyphenated words ─────────────────────────────────────────
//
// Only a lowercase letter, a hyphen at end of line and a lowercase letter
// starting the next line count. "Jean-\nPaul" and "2019-\n2020" stay split.

static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Ll})-[ \t]*\n[ \t]*(\p{Ll})").unwrap());

fn join_hyphenated_words(input: &str) -> String {
    RE_HYPHEN_BREAK.replace_all(input, "$1$2").to_string()
}

// ── Rule 5: Split into blocks ────────────────────────────────────────────────

fn split_blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

// ── Rule 6: Collapse whitespace ──────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input.trim(), " ").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
