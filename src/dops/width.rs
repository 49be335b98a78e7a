//! ANSI-aware width measurement.
//!
//! Cell values may carry color escapes (the state column does). Counting raw
//! characters would overstate their width, breaking both alignment and the
//! "does this format fit" decision, so everything here measures through
//! [`printable_width`].

use console::measure_text_width;
use unicode_width::UnicodeWidthChar;

/// Blank columns between two table columns, as in `docker ps`.
pub const COLUMN_SPACING: usize = 3;

const ELLIPSIS: char = '…';

/// A line of output together with its printable width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub width: usize,
}

impl RenderedLine {
    pub fn new(text: String) -> Self {
        let width = printable_width(&text);
        Self { text, width }
    }
}

/// Number of terminal columns `s` occupies, ignoring escape sequences.
pub fn printable_width(s: &str) -> usize {
    measure_text_width(s)
}

/// Total width of a table whose columns have the given content widths.
pub fn table_width(column_widths: &[usize]) -> usize {
    if column_widths.is_empty() {
        return 0;
    }
    column_widths.iter().sum::<usize>() + COLUMN_SPACING * (column_widths.len() - 1)
}

/// Widest line of a block of output.
pub fn block_width(lines: &[RenderedLine]) -> usize {
    lines.iter().map(|l| l.width).max().unwrap_or(0)
}

/// Pads `s` with spaces on the right up to `width` printable columns.
pub fn pad_right(s: &str, width: usize) -> String {
    let current = printable_width(s);
    if current >= width {
        return s.to_string();
    }
    format!("{}{}", s, " ".repeat(width - current))
}

/// Cuts `s` down to `max_width` printable columns, ending in `…`.
///
/// Escape sequences are copied through untouched so a colored value keeps its
/// color; a reset is appended when the cut dropped the original one.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if printable_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let limit = max_width - 1;
    let mut out = String::with_capacity(s.len());
    let mut used = 0;
    let mut saw_escape = false;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            saw_escape = true;
            out.push(c);
            if chars.peek() == Some(&'[') {
                out.push('[');
                chars.next();
                for next in chars.by_ref() {
                    out.push(next);
                    if next.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }

        let w = c.width().unwrap_or(0);
        if used + w > limit {
            break;
        }
        out.push(c);
        used += w;
    }

    out.push(ELLIPSIS);
    if saw_escape {
        out.push_str("\x1b[0m");
    }
    out
}
