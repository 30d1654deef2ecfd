//! Replication state classification from free-text DRBD status.
//!
//! The kernel module's status grammar is loosely structured and varies across
//! versions, so classification is marker-based substring matching rather than
//! a strict parse. Rules are checked in priority order and the first match wins.

#![allow(missing_docs)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::monitor::status_source::RawStatus;

/// Peer is not connected yet; the secondary disk is still missing.
pub const MARKER_WAITING_SECONDARY: &str = "cs:WFConnection";
/// This node is the source side of an active resync.
pub const MARKER_SYNC_SOURCE: &str = "cs:SyncSource";
/// Token label carrying resync progress.
pub const MARKER_RESYNC_PROGRESS: &str = "resync:";
/// Peer connected.
pub const MARKER_CONNECTED: &str = "cs:Connected";
/// Both replicas up to date.
pub const MARKER_BOTH_UP_TO_DATE: &str = "ds:UpToDate/UpToDate";
/// Out-of-sync block counter label.
pub const OUT_OF_SYNC_LABEL: &str = "oos:";

pub const MSG_WAITING_SECONDARY: &str = "🕒 Waiting for Secondary Node Disk";
pub const MSG_SYNCING_PREFIX: &str = "🔄 Syncing disks: ";
pub const MSG_SYNCING_GENERIC: &str = "🔄 Secondary node disk online, waiting for sync to complete";
pub const MSG_DONE: &str = "✅ DRBD SYNC COMPLETE - Resources fully synchronized";
pub const MSG_UNKNOWN: &str = "❓ Unknown DRBD state";

/// Semantic replication state for one tick. `Done` is the only terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationState {
    WaitingSecondary,
    Syncing,
    Done,
    Unknown,
}

impl ReplicationState {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::WaitingSecondary => "WAITING_SECONDARY",
            Self::Syncing => "SYNCING",
            Self::Done => "DONE",
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for ReplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification result: state plus the operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub state: ReplicationState,
    pub message: String,
}

impl Classification {
    fn new(state: ReplicationState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}

/// Classify one poll's raw status. Total: every input yields a state.
#[must_use]
pub fn classify(raw: &RawStatus) -> Classification {
    let text = raw.joined();

    if text.contains(MARKER_WAITING_SECONDARY) {
        return Classification::new(ReplicationState::WaitingSecondary, MSG_WAITING_SECONDARY);
    }

    if text.contains(MARKER_SYNC_SOURCE) {
        let progress = raw.lines.iter().find_map(|line| resync_progress(line));
        let message = progress.map_or_else(
            || MSG_SYNCING_GENERIC.to_string(),
            |progress| format!("{MSG_SYNCING_PREFIX}{progress}"),
        );
        return Classification::new(ReplicationState::Syncing, message);
    }

    if text.contains(MARKER_CONNECTED)
        && text.contains(MARKER_BOTH_UP_TO_DATE)
        && has_zero_out_of_sync(&text)
    {
        return Classification::new(ReplicationState::Done, MSG_DONE);
    }

    Classification::new(ReplicationState::Unknown, MSG_UNKNOWN)
}

/// Extract the value of the first `resync:` token on a line.
///
/// Accepts both `resync:42%` and `resync: 42%`. Returns `None` when the line
/// has no such token or the token carries no value.
fn resync_progress(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        let Some(idx) = token.find(MARKER_RESYNC_PROGRESS) else {
            continue;
        };
        let inline = &token[idx + MARKER_RESYNC_PROGRESS.len()..];
        let value = inline.split(':').next().unwrap_or_default();
        if !value.is_empty() {
            return Some(value);
        }
        return tokens.next();
    }
    None
}

/// `true` when some `oos:` token reports exactly zero out-of-sync blocks.
fn has_zero_out_of_sync(text: &str) -> bool {
    text.split_whitespace()
        .filter_map(|token| token.strip_prefix(OUT_OF_SYNC_LABEL))
        .any(|count| count == "0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw(text: &str) -> RawStatus {
        RawStatus::from_text(text)
    }

    const CONNECTED_DONE: &str = concat!(
        " 0: cs:Connected ro:Primary/Secondary ds:UpToDate/UpToDate C r-----\n",
        "    ns:1048576 nr:0 dw:0 dr:1049000 al:0 bm:64 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0",
    );
    const WAITING: &str = " 0: cs:WFConnection ro:Primary/Unknown ds:UpToDate/DUnknown C r----s";
    const SYNC_HEADER: &str = " 0: cs:SyncSource ro:Primary/Secondary ds:UpToDate/Inconsistent";

    #[test]
    fn waiting_secondary_detected() {
        let c = classify(&raw(WAITING));
        assert_eq!(c.state, ReplicationState::WaitingSecondary);
        assert!(c.message.contains("Waiting for Secondary"));
    }

    #[test]
    fn syncing_with_spaced_progress() {
        let text = format!("{SYNC_HEADER}\n    resync: 42% finish: 0:10:12");
        let c = classify(&raw(&text));
        assert_eq!(c.state, ReplicationState::Syncing);
        assert_eq!(c.message, "🔄 Syncing disks: 42%");
    }

    #[test]
    fn syncing_with_inline_progress() {
        let c = classify(&raw("cs:SyncSource\n  resync:17.5%"));
        assert_eq!(c.state, ReplicationState::Syncing);
        assert!(c.message.ends_with("17.5%"));
    }

    #[test]
    fn syncing_without_progress_uses_generic_message() {
        let text = format!("{SYNC_HEADER}\n  [==>....] sync'ed: 21.4% (80/100)M");
        let c = classify(&raw(&text));
        assert_eq!(c.state, ReplicationState::Syncing);
        assert_eq!(c.message, MSG_SYNCING_GENERIC);
    }

    #[test]
    fn dangling_resync_label_falls_back_to_generic() {
        let c = classify(&raw("cs:SyncSource resync:"));
        assert_eq!(c.message, MSG_SYNCING_GENERIC);
    }

    #[test]
    fn done_requires_all_three_markers() {
        assert_eq!(classify(&raw(CONNECTED_DONE)).state, ReplicationState::Done);
        assert_eq!(classify(&raw(CONNECTED_DONE)).message, MSG_DONE);

        let not_connected = CONNECTED_DONE.replace("cs:Connected", "cs:StandAlone");
        assert_eq!(classify(&raw(&not_connected)).state, ReplicationState::Unknown);

        let outdated = CONNECTED_DONE.replace("ds:UpToDate/UpToDate", "ds:UpToDate/Outdated");
        assert_eq!(classify(&raw(&outdated)).state, ReplicationState::Unknown);

        let dirty = CONNECTED_DONE.replace("oos:0", "oos:1024");
        assert_eq!(classify(&raw(&dirty)).state, ReplicationState::Unknown);
    }

    #[test]
    fn nonzero_count_with_leading_zero_digit_is_not_done() {
        let text = CONNECTED_DONE.replace("oos:0", "oos:012");
        assert_eq!(classify(&raw(&text)).state, ReplicationState::Unknown);
    }

    #[test]
    fn waiting_outranks_syncing_and_done() {
        let text = format!("{CONNECTED_DONE}\n 1: cs:WFConnection\n 2: cs:SyncSource resync: 5%");
        assert_eq!(classify(&raw(&text)).state, ReplicationState::WaitingSecondary);
    }

    #[test]
    fn syncing_outranks_done() {
        let text = format!("{CONNECTED_DONE}\n 1: cs:SyncSource resync: 99%");
        let c = classify(&raw(&text));
        assert_eq!(c.state, ReplicationState::Syncing);
        assert!(c.message.contains("99%"));
    }

    #[test]
    fn read_error_falls_through_to_unknown() {
        let err = RawStatus::read_failure(
            std::path::Path::new("/proc/drbd"),
            &std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        );
        let c = classify(&err);
        assert_eq!(c.state, ReplicationState::Unknown);
        assert_eq!(c.message, MSG_UNKNOWN);
    }

    #[test]
    fn empty_status_is_unknown() {
        assert_eq!(classify(&RawStatus::default()).state, ReplicationState::Unknown);
    }

    #[test]
    fn state_labels_are_stable() {
        assert_eq!(ReplicationState::WaitingSecondary.to_string(), "WAITING_SECONDARY");
        assert_eq!(ReplicationState::Syncing.label(), "SYNCING");
        assert_eq!(ReplicationState::Done.label(), "DONE");
        assert_eq!(ReplicationState::Unknown.label(), "UNKNOWN");
        assert!(ReplicationState::Done.is_terminal());
        assert!(!ReplicationState::Syncing.is_terminal());
    }

    #[test]
    fn state_serializes_as_label() {
        let json = serde_json::to_string(&ReplicationState::WaitingSecondary).unwrap();
        assert_eq!(json, "\"WAITING_SECONDARY\"");
    }

    proptest! {
        #[test]
        fn waiting_marker_always_wins(
            prefix in "[ -~]{0,40}",
            suffix in "[ -~]{0,40}",
            extra in prop::sample::select(vec![
                "",
                "cs:SyncSource resync: 10%",
                "cs:Connected ds:UpToDate/UpToDate oos:0",
            ]),
        ) {
            let text = format!("{prefix} cs:WFConnection {suffix}\n{extra}");
            prop_assert_eq!(classify(&raw(&text)).state, ReplicationState::WaitingSecondary);
        }

        #[test]
        fn sync_source_without_waiting_is_syncing(noise in "[a-z0-9 ]{0,60}") {
            let text = format!("{CONNECTED_DONE}\n{noise} cs:SyncSource");
            prop_assert_eq!(classify(&raw(&text)).state, ReplicationState::Syncing);
        }

        #[test]
        fn classify_is_pure(text in "[ -~\n]{0,200}") {
            let status = raw(&text);
            prop_assert_eq!(classify(&status), classify(&status));
        }
    }
}
