//! Optional JSONL event log of monitor transitions.

pub mod jsonl;
