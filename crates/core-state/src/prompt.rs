//! Modal status-bar prompt.
//!
//! The prompt is not a nested read loop: it is a mode stored on the editor
//! and fed one key per main-loop iteration, which keeps the state machine
//! single-threaded and directly testable.

use core_input::Key;

use crate::find::FindState;

/// Cursor and viewport snapshot taken when a search prompt opens, restored
/// on cancellation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedCursor {
    pub cx: usize,
    pub cy: usize,
    pub rowoff: usize,
    pub coloff: usize,
}

/// The active prompt mode, if any.
pub(crate) enum PromptMode {
    /// Ctrl-S on an unnamed buffer: ask for a filename.
    SaveAs { buffer: String },
    /// Ctrl-F: incremental search.
    Find {
        buffer: String,
        saved_cursor: SavedCursor,
        state: FindState,
    },
}

impl PromptMode {
    pub(crate) fn save_as() -> Self {
        PromptMode::SaveAs {
            buffer: String::new(),
        }
    }

    pub(crate) fn find(saved_cursor: SavedCursor) -> Self {
        PromptMode::Find {
            buffer: String::new(),
            saved_cursor,
            state: FindState::default(),
        }
    }

    /// Text shown in the message bar while this prompt is active.
    pub(crate) fn display(&self) -> String {
        match self {
            PromptMode::SaveAs { buffer } => format!("Save as: {buffer} (ESC to cancel)"),
            PromptMode::Find { buffer, .. } => {
                format!("Search: {buffer} (Use ESC/Arrows/Enter)")
            }
        }
    }
}

/// Result of feeding one key into a prompt buffer.
pub(crate) enum PromptOutcome {
    Active(String),
    Cancelled,
    Submitted(String),
}

/// Apply one key to the prompt buffer. Enter submits only a non-empty
/// buffer; Delete, Ctrl-H and Backspace erase one byte; printable bytes
/// below 128 append; everything else leaves the buffer untouched.
pub(crate) fn prompt_keypress(mut buffer: String, key: Key) -> PromptOutcome {
    match key {
        Key::Enter => {
            if buffer.is_empty() {
                PromptOutcome::Active(buffer)
            } else {
                PromptOutcome::Submitted(buffer)
            }
        }
        Key::Escape => PromptOutcome::Cancelled,
        Key::Backspace | Key::Delete | Key::Ctrl(b'h') => {
            buffer.pop();
            PromptOutcome::Active(buffer)
        }
        Key::Char(c) if !c.is_ascii_control() && c < 128 => {
            buffer.push(c as char);
            PromptOutcome::Active(buffer)
        }
        _ => PromptOutcome::Active(buffer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_bytes_append() {
        let PromptOutcome::Active(buf) = prompt_keypress(String::from("a"), Key::Char(b'b'))
        else {
            panic!("prompt should stay active");
        };
        assert_eq!(buf, "ab");
    }

    #[test]
    fn erase_keys_pop_one_byte() {
        for key in [Key::Backspace, Key::Delete, Key::Ctrl(b'h')] {
            let PromptOutcome::Active(buf) = prompt_keypress(String::from("ab"), key) else {
                panic!("prompt should stay active");
            };
            assert_eq!(buf, "a");
        }
    }

    #[test]
    fn enter_requires_a_non_empty_buffer() {
        assert!(matches!(
            prompt_keypress(String::new(), Key::Enter),
            PromptOutcome::Active(_)
        ));
        assert!(matches!(
            prompt_keypress(String::from("x"), Key::Enter),
            PromptOutcome::Submitted(_)
        ));
    }

    #[test]
    fn escape_cancels() {
        assert!(matches!(
            prompt_keypress(String::from("x"), Key::Escape),
            PromptOutcome::Cancelled
        ));
    }

    #[test]
    fn control_bytes_are_ignored() {
        let PromptOutcome::Active(buf) = prompt_keypress(String::from("x"), Key::Char(0x01))
        else {
            panic!("prompt should stay active");
        };
        assert_eq!(buf, "x");
    }
}
