//! Keybinding dispatcher for threadpost.
//!
//! Translates raw crossterm `KeyEvent`s into composer calls and `AppState`
//! mutations, and returns a `KeyAction` telling the event loop what to do next.
//! The dispatcher branches first on `state.mode` so that every mode has an
//! isolated handler function.
//!
//! Synchronous composer operations (text edits, segment add/remove, audience)
//! run inline. Anything that may suspend is returned as
//! `KeyAction::Dispatch` for the event loop to spawn.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use threadpost_core::composer::DraftComposer;

use crate::app::{AppState, Mode};
use crate::worker::ComposerRequest;

const BUSY: &str = "Posting in progress; try again afterwards";

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Exit immediately without touching the draft.
    Quit,
    /// Run an asynchronous composer request in the background.
    Dispatch(ComposerRequest),
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState, composer: &DraftComposer) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    let action = match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::Prompt => handle_prompt(key, state),
        Mode::ConfirmDiscard => handle_confirm_discard(key, state, composer),
        Mode::Insert => handle_insert(key, state, composer),
        Mode::Normal => handle_normal(key, state, composer),
    };
    state.refresh(composer);
    action
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState, composer: &DraftComposer) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let selected = state.selected_id();

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.select_next();
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.select_prev();
            KeyAction::Continue
        }
        KeyCode::Char('g') => {
            state.select_first();
            KeyAction::Continue
        }
        KeyCode::Char('G') => {
            state.select_last();
            KeyAction::Continue
        }
        KeyCode::Char(']') => {
            state.next_attachment();
            KeyAction::Continue
        }
        KeyCode::Char('[') => {
            state.prev_attachment();
            KeyAction::Continue
        }
        KeyCode::Char('i') | KeyCode::Enter => {
            state.mode = Mode::Insert;
            KeyAction::Continue
        }

        // Thread structure
        KeyCode::Char('a') => {
            match composer.append_segment() {
                Some(id) => {
                    state.refresh(composer);
                    state.select_id(id);
                    state.mode = Mode::Insert;
                }
                None if composer.is_submitting() => state.set_status(BUSY),
                None => state.set_status("Finish the last post before adding another"),
            }
            KeyAction::Continue
        }
        KeyCode::Char('d') => {
            if state.selected == 0 {
                state.set_status("The first post can't be removed");
            } else if let Some(id) = selected {
                if !composer.remove_segment(id) {
                    state.set_status(BUSY);
                }
            }
            KeyAction::Continue
        }
        KeyCode::Char('x') => {
            if let (Some(id), Some(index)) = (selected, state.selected_attachment()) {
                if !composer.remove_attachment_at(id, index) {
                    state.set_status(BUSY);
                }
            }
            KeyAction::Continue
        }
        KeyCode::Tab => {
            match composer.cycle_reply_audience() {
                Some(audience) => {
                    state.set_status(format!("{} can reply & quote", audience.label()))
                }
                None => state.set_status(BUSY),
            }
            KeyAction::Continue
        }

        // Acquisition
        KeyCode::Char('p') => dispatch(state, selected.map(ComposerRequest::PickFromLibrary)),
        KeyCode::Char('c') => dispatch(state, selected.map(ComposerRequest::CaptureFromCamera)),
        KeyCode::Char('l') => dispatch(state, selected.map(ComposerRequest::AttachLocation)),

        KeyCode::Char('P') => dispatch(state, Some(ComposerRequest::Submit)),
        KeyCode::Char('s') if ctrl => dispatch(state, Some(ComposerRequest::Submit)),

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }

        KeyCode::Char('q') | KeyCode::Esc => {
            if composer.is_submitting() {
                state.set_status(BUSY);
            } else if composer.is_pristine() {
                composer.discard();
            } else {
                state.mode = Mode::ConfirmDiscard;
            }
            KeyAction::Continue
        }

        _ => KeyAction::Continue,
    }
}

fn dispatch(state: &mut AppState, request: Option<ComposerRequest>) -> KeyAction {
    match request {
        Some(request) => {
            state.request_started();
            KeyAction::Dispatch(request)
        }
        None => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

/// Edits the selected segment's text. Every keystroke is pushed to the
/// composer immediately so eligibility is always current.
fn handle_insert(key: KeyEvent, state: &mut AppState, composer: &DraftComposer) -> KeyAction {
    let Some(segment) = state.selected_segment() else {
        state.mode = Mode::Normal;
        return KeyAction::Continue;
    };
    let id = segment.id;
    let mut text = segment.text.clone();

    match key.code {
        KeyCode::Esc => {
            state.mode = Mode::Normal;
            return KeyAction::Continue;
        }
        KeyCode::Char(ch) => text.push(ch),
        KeyCode::Enter => text.push('\n'),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => return KeyAction::Continue,
    }
    if !composer.update_text(id, text) {
        state.set_status(BUSY);
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Prompt mode
// ---------------------------------------------------------------------------

/// Permission prompt: open settings or dismiss.
fn handle_prompt(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('o') | KeyCode::Char('O') | KeyCode::Enter => {
            state.close_prompt();
            dispatch(state, Some(ComposerRequest::OpenSettings))
        }
        KeyCode::Esc | KeyCode::Char('c') | KeyCode::Char('n') | KeyCode::Char('q') => {
            state.close_prompt();
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// ConfirmDiscard mode
// ---------------------------------------------------------------------------

fn handle_confirm_discard(
    key: KeyEvent,
    state: &mut AppState,
    composer: &DraftComposer,
) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if !composer.discard() {
                state.set_status(BUSY);
            }
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::Normal;
        }
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Scroll wheel moves the help overlay or the thread panel by 3 lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let scroll = if state.mode == Mode::HelpOverlay {
        &mut state.help_scroll
    } else {
        &mut state.thread_scroll
    };
    match mouse.kind {
        MouseEventKind::ScrollUp => *scroll = scroll.saturating_sub(3),
        MouseEventKind::ScrollDown => *scroll = scroll.saturating_add(3),
        _ => {}
    }
    KeyAction::Continue
}
