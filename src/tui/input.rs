//! Keyboard routing for the dashboard.
//!
//! Raw mode delivers Ctrl-C as a key event instead of SIGINT, so interruption
//! from the keyboard has to be recognized here.

#![allow(missing_docs)]

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Stop monitoring and print the final report.
    Quit,
    /// Re-poll and redraw immediately.
    ForceRefresh,
}

/// Map a key press to a dashboard action. Releases and repeats are ignored.
#[must_use]
pub fn resolve_key(key: &KeyEvent) -> Option<InputAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c' | 'd') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputAction::Quit)
        }
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(InputAction::Quit),
        KeyCode::Char('r' | 'R') => Some(InputAction::ForceRefresh),
        _ => None,
    }
}

/// Map any terminal event to a dashboard action.
#[must_use]
pub fn resolve_event(event: &Event) -> Option<InputAction> {
    match event {
        Event::Key(key) => resolve_key(key),
        Event::Resize(..) => Some(InputAction::ForceRefresh),
        _ => None,
    }
}
