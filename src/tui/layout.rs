//! Row placement for the single-screen dashboard.
//!
//! Placement is a pure function of terminal size so it can be tested without a
//! terminal. Every pane is bounded by the available height; the layout never
//! scrolls and never writes to the last row.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use unicode_width::UnicodeWidthChar;

use crate::core::config::{HISTORY_CAPACITY, RAW_PANE_MAX_LINES};

pub const HEADER_ROW: u16 = 0;
pub const UPDATED_ROW: u16 = 1;
pub const RAW_TITLE_ROW: u16 = 3;
pub const RAW_FIRST_ROW: u16 = 4;

/// Rows reserved below the raw pane for the message and history panes.
const RAW_PANE_RESERVE: u16 = 15;
/// Rows kept free below the history pane.
const HISTORY_PANE_RESERVE: u16 = 5;

/// Message pane placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePane {
    pub title_row: u16,
    pub text_row: u16,
}

/// History pane placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPane {
    pub rule_row: u16,
    pub title_row: u16,
    pub first_entry_row: u16,
    /// Number of trailing entries that fit.
    pub visible: usize,
}

/// Where each dashboard element goes for one terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    pub cols: u16,
    pub rows: u16,
    /// Usable columns per line; the last column stays empty to avoid
    /// auto-wrap on some terminals.
    pub text_width: usize,
    /// Raw status lines the pane can hold, independent of how many exist.
    pub raw_capacity: usize,
    pub message: Option<MessagePane>,
    pub history: Option<HistoryPane>,
}

impl FramePlan {
    #[must_use]
    pub fn compute(cols: u16, rows: u16) -> Self {
        let text_width = usize::from(cols.saturating_sub(1));
        let raw_budget = rows
            .saturating_sub(RAW_PANE_RESERVE)
            .min(RAW_PANE_MAX_LINES as u16);
        let raw_capacity = usize::from(raw_budget);

        let message_title = RAW_FIRST_ROW + raw_budget + 1;
        let message = (message_title + 1 < rows).then_some(MessagePane {
            title_row: message_title,
            text_row: message_title + 1,
        });

        let hist_start = message_title + 3;
        let history = (hist_start < rows.saturating_sub(3)).then(|| {
            let fit = rows.saturating_sub(hist_start + HISTORY_PANE_RESERVE);
            HistoryPane {
                rule_row: hist_start,
                title_row: hist_start + 1,
                first_entry_row: hist_start + 2,
                visible: usize::from(fit).min(HISTORY_CAPACITY),
            }
        });

        Self {
            cols,
            rows,
            text_width,
            raw_capacity,
            message,
            history,
        }
    }

    /// Whether `row` may be written. The last row is never used.
    #[must_use]
    pub const fn row_fits(&self, row: u16) -> bool {
        row < self.rows.saturating_sub(1)
    }
}

/// Cut `text` to at most `width` display columns. Never wraps, never adds an
/// ellipsis. Control characters are replaced so one entry stays one row.
#[must_use]
pub fn fit_width(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len().min(width * 4));
    let mut used = 0;
    for ch in text.chars() {
        let ch = if ch.is_control() { ' ' } else { ch };
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

/// Pad (or cut) `text` to exactly `width` display columns.
#[must_use]
pub fn pad_to_width(text: &str, width: usize) -> String {
    let mut out = fit_width(text, width);
    let used = unicode_width::UnicodeWidthStr::width(out.as_str());
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}
