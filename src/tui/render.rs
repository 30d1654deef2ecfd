//! Frame composition: turns a [`DashboardSnapshot`] plus a [`FramePlan`] into
//! positioned, width-clamped text lines. No terminal I/O happens here.

#![allow(missing_docs)]
#![allow(clippy::cast_possible_truncation)]

use crate::monitor::snapshot::DashboardSnapshot;
use crate::tui::layout::{
    FramePlan, HEADER_ROW, RAW_FIRST_ROW, RAW_TITLE_ROW, UPDATED_ROW, fit_width, pad_to_width,
};

pub const HEADER_TITLE: &str = "DRBD LIVE STATUS MONITOR (Auto-exits when synced)";
pub const MESSAGE_TITLE: &str = "LATEST STATUS MESSAGE:";
pub const HISTORY_TITLE: &str = "STATE CHANGE HISTORY:";
const RULE_CHAR: char = '─';

/// Text attributes for a frame line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Bold,
    BoldUnderline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLine {
    pub row: u16,
    pub text: String,
    pub style: LineStyle,
}

/// One fully laid-out dashboard screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub lines: Vec<FrameLine>,
}

impl Frame {
    /// Compose the dashboard for `snapshot` within `plan`.
    #[must_use]
    pub fn compose(snapshot: &DashboardSnapshot, plan: &FramePlan) -> Self {
        let mut frame = FrameBuilder {
            plan,
            lines: Vec::new(),
        };
        let width = plan.text_width;

        frame.push(
            HEADER_ROW,
            pad_to_width(HEADER_TITLE, width),
            LineStyle::BoldUnderline,
        );
        frame.push(
            UPDATED_ROW,
            pad_to_width(&format!("Last update: {}", snapshot.timestamp()), width),
            LineStyle::Plain,
        );

        frame.push(
            RAW_TITLE_ROW,
            raw_pane_title(&snapshot.source),
            LineStyle::Bold,
        );
        for (i, line) in snapshot.raw.lines.iter().take(plan.raw_capacity).enumerate() {
            frame.push(RAW_FIRST_ROW + i as u16, line.clone(), LineStyle::Plain);
        }

        if let Some(pane) = plan.message {
            frame.push(pane.title_row, MESSAGE_TITLE.to_string(), LineStyle::Bold);
            frame.push(pane.text_row, snapshot.message.clone(), LineStyle::Plain);
        }

        if let Some(pane) = plan.history {
            frame.push(
                pane.rule_row,
                std::iter::repeat_n(RULE_CHAR, width).collect(),
                LineStyle::Plain,
            );
            frame.push(pane.title_row, HISTORY_TITLE.to_string(), LineStyle::Bold);
            for (i, entry) in snapshot.recent_history(pane.visible).iter().enumerate() {
                frame.push(
                    pane.first_entry_row + i as u16,
                    entry.display_line(),
                    LineStyle::Plain,
                );
            }
        }

        Self { lines: frame.lines }
    }

    /// Text at `row`, if anything was placed there.
    #[must_use]
    pub fn row_text(&self, row: u16) -> Option<&str> {
        self.lines
            .iter()
            .find(|l| l.row == row)
            .map(|l| l.text.as_str())
    }

    /// Whole frame as newline-joined text, for diagnostics and tests.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Pane title naming the polled interface.
#[must_use]
pub fn raw_pane_title(source: &str) -> String {
    format!("CURRENT DRBD STATUS ({source}):")
}

struct FrameBuilder<'a> {
    plan: &'a FramePlan,
    lines: Vec<FrameLine>,
}

impl FrameBuilder<'_> {
    /// Place a line if its row fits; text is clamped to the usable width.
    fn push(&mut self, row: u16, text: String, style: LineStyle) {
        if !self.plan.row_fits(row) {
            return;
        }
        self.lines.push(FrameLine {
            row,
            text: fit_width(&text, self.plan.text_width),
            style,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::classifier::classify;
    use crate::monitor::history::HistoryTracker;
    use crate::monitor::status_source::RawStatus;
    use chrono::{Duration as ChronoDuration, Local, TimeZone};
    use unicode_width::UnicodeWidthStr;

    fn snapshot(status: &str, history_len: usize) -> DashboardSnapshot {
        let base = Local
            .with_ymd_and_hms(2026, 10, 19, 8, 30, 0)
            .single()
            .unwrap();
        let mut history = HistoryTracker::new();
        for i in 0..history_len {
            history.record(
                base + ChronoDuration::seconds(i64::try_from(i).unwrap()),
                &format!("event {i}"),
            );
        }
        let raw = RawStatus::from_text(status);
        let classification = classify(&raw);
        DashboardSnapshot::new(
            base,
            "/proc/drbd".to_string(),
            raw,
            classification,
            history.snapshot(),
        )
    }

    #[test]
    fn header_and_timestamp_rows() {
        let frame = Frame::compose(&snapshot("cs:WFConnection", 1), &FramePlan::compute(80, 24));
        let header = frame.row_text(0).unwrap();
        assert!(header.starts_with(HEADER_TITLE));
        assert_eq!(header.width(), 79);
        assert_eq!(
            frame.row_text(1).unwrap().trim_end(),
            "Last update: 2026-10-19 08:30:00"
        );
        assert_eq!(frame.row_text(3), Some("CURRENT DRBD STATUS (/proc/drbd):"));
        assert_eq!(frame.lines[0].style, LineStyle::BoldUnderline);
    }

    #[test]
    fn raw_pane_capped_at_eight_lines() {
        let status: String = (0..20).map(|i| format!("line {i}\n")).collect();
        let frame = Frame::compose(&snapshot(&status, 0), &FramePlan::compute(80, 40));
        assert_eq!(frame.row_text(4), Some("line 0"));
        assert_eq!(frame.row_text(11), Some("line 7"));
        assert_eq!(frame.row_text(12), None);
    }

    #[test]
    fn message_pane_shows_classification() {
        let frame = Frame::compose(
            &snapshot("cs:SyncSource\nresync: 42%", 0),
            &FramePlan::compute(80, 24),
        );
        assert_eq!(frame.row_text(13), Some(MESSAGE_TITLE));
        assert!(frame.row_text(14).unwrap().contains("42%"));
    }

    #[test]
    fn history_pane_shows_trailing_window_in_order() {
        let frame = Frame::compose(&snapshot("", 10), &FramePlan::compute(80, 24));
        assert!(frame.row_text(16).unwrap().starts_with('─'));
        assert_eq!(frame.row_text(17), Some(HISTORY_TITLE));
        assert!(frame.row_text(18).unwrap().ends_with("event 7"));
        assert!(frame.row_text(19).unwrap().ends_with("event 8"));
        assert!(frame.row_text(20).unwrap().ends_with("event 9"));
        assert_eq!(frame.row_text(21), None);
    }

    #[test]
    fn long_lines_truncated_to_width() {
        let long = "x".repeat(300);
        let frame = Frame::compose(&snapshot(&long, 0), &FramePlan::compute(40, 24));
        for line in &frame.lines {
            assert!(line.text.width() <= 39, "row {} too wide", line.row);
        }
        assert_eq!(frame.row_text(4).unwrap().len(), 39);
    }

    #[test]
    fn nothing_drawn_on_last_row() {
        for rows in 0..30 {
            let frame = Frame::compose(&snapshot("a\nb\nc", 12), &FramePlan::compute(80, rows));
            assert!(frame.lines.iter().all(|l| l.row + 1 < rows.max(1)));
        }
    }

    #[test]
    fn error_status_rendered_verbatim() {
        let raw = RawStatus::read_failure(
            std::path::Path::new("/proc/drbd"),
            &std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        let snap = DashboardSnapshot::new(
            Local::now(),
            "/proc/drbd".to_string(),
            raw.clone(),
            classify(&raw),
            Vec::new(),
        );
        let frame = Frame::compose(&snap, &FramePlan::compute(100, 30));
        assert_eq!(frame.row_text(4), Some(raw.lines[0].as_str()));
        assert_eq!(frame.row_text(5), Some(raw.lines[1].as_str()));
        assert!(frame.to_plain_text().contains("Unknown DRBD state"));
    }
}
