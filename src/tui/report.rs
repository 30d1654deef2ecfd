//! Plain-text final report printed after the dashboard is torn down.
//!
//! This is the only output that survives when stdout is captured by a
//! provisioning pipeline, so it carries the full raw status and the entire
//! retained history rather than the visible window.

#![allow(missing_docs)]

use std::io::{self, Write};

use crate::monitor::snapshot::DashboardSnapshot;
use crate::tui::render::{HISTORY_TITLE, MESSAGE_TITLE, raw_pane_title};

const REPORT_WIDTH: usize = 80;

/// Write the final report for `snapshot` to `out`.
pub fn write_final_report<W: Write>(out: &mut W, snapshot: &DashboardSnapshot) -> io::Result<()> {
    let heavy = "=".repeat(REPORT_WIDTH);
    let light = "-".repeat(REPORT_WIDTH);

    writeln!(out)?;
    writeln!(out, "{heavy}")?;
    writeln!(out, "FINAL DRBD STATUS (captured at exit):")?;
    writeln!(out, "{heavy}")?;
    writeln!(out, "Timestamp: {}", snapshot.timestamp())?;

    writeln!(out)?;
    writeln!(out, "{}", raw_pane_title(&snapshot.source))?;
    for line in &snapshot.raw.lines {
        writeln!(out, "{line}")?;
    }

    writeln!(out)?;
    writeln!(out, "{MESSAGE_TITLE}")?;
    writeln!(out, "{}", snapshot.message)?;

    writeln!(out)?;
    writeln!(out, "{HISTORY_TITLE}")?;
    writeln!(out, "{light}")?;
    for entry in &snapshot.history {
        writeln!(out, "{}", entry.display_line())?;
    }
    writeln!(out, "{heavy}")?;
    out.flush()
}

/// Render the report into a `String`.
#[must_use]
pub fn final_report_string(snapshot: &DashboardSnapshot) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_final_report(&mut buf, snapshot);
    String::from_utf8_lossy(&buf).into_owned()
}
