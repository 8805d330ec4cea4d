//! Input decoding: terminal events to wide key codes.
//!
//! The terminal backend parses the raw escape-sequence stream (CSI arrows,
//! `ESC [ N ~` editing keys, `ESC O` variants); this crate narrows those
//! events to the small key surface the editor dispatches on. The byte-cell
//! text model only accepts ASCII input, so wider characters are dropped at
//! this boundary rather than smeared across cells.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::trace;

/// Wide key code produced by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable byte (or tab) to be inserted as-is.
    Char(u8),
    /// A control chord, identified by its lowercase letter (`Ctrl(b'q')`).
    Ctrl(u8),
    Enter,
    Escape,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
}

/// One unit of input delivered to the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(Key),
    /// The terminal was resized to (columns, rows).
    Resize(u16, u16),
}

/// Poll bound for the blocking read; keeps the loop responsive without
/// spinning on a quiet terminal.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Block until the terminal delivers a key press or a resize.
pub fn read_input() -> Result<Input> {
    loop {
        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                if let Some(key) = map_key_event(&key_event) {
                    return Ok(Input::Key(key));
                }
                trace!(target: "input", ?key_event, "unmapped_key_event");
            }
            Event::Resize(cols, rows) => return Ok(Input::Resize(cols, rows)),
            _ => {}
        }
    }
}

/// Map a terminal key event onto the editor's key surface. Returns `None`
/// for events outside it (function keys, non-ASCII characters, alt chords).
pub fn map_key_event(event: &KeyEvent) -> Option<Key> {
    if event.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }
    let key = match event.code {
        KeyCode::Char(c) => {
            if !c.is_ascii() {
                return None;
            }
            if event.modifiers.contains(KeyModifiers::CONTROL) {
                Key::Ctrl(c.to_ascii_lowercase() as u8)
            } else {
                Key::Char(c as u8)
            }
        }
        KeyCode::Tab => Key::Char(b'\t'),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn maps_printable_char() {
        let key = map_key_event(&key_event(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(key, Some(Key::Char(b'a')));
    }

    #[test]
    fn maps_shifted_char_as_its_byte() {
        let key = map_key_event(&key_event(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert_eq!(key, Some(Key::Char(b'A')));
    }

    #[test]
    fn maps_control_chords_case_insensitively() {
        let lower = map_key_event(&key_event(KeyCode::Char('q'), KeyModifiers::CONTROL));
        let upper = map_key_event(&key_event(
            KeyCode::Char('Q'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ));
        assert_eq!(lower, Some(Key::Ctrl(b'q')));
        assert_eq!(upper, Some(Key::Ctrl(b'q')));
    }

    #[test]
    fn maps_tab_to_the_tab_byte() {
        let key = map_key_event(&key_event(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(key, Some(Key::Char(b'\t')));
    }

    #[test]
    fn maps_navigation_keys() {
        let cases = [
            (KeyCode::Up, Key::ArrowUp),
            (KeyCode::Down, Key::ArrowDown),
            (KeyCode::Left, Key::ArrowLeft),
            (KeyCode::Right, Key::ArrowRight),
            (KeyCode::Home, Key::Home),
            (KeyCode::End, Key::End),
            (KeyCode::PageUp, Key::PageUp),
            (KeyCode::PageDown, Key::PageDown),
            (KeyCode::Delete, Key::Delete),
            (KeyCode::Backspace, Key::Backspace),
            (KeyCode::Enter, Key::Enter),
            (KeyCode::Esc, Key::Escape),
        ];
        for (code, expected) in cases {
            assert_eq!(
                map_key_event(&key_event(code, KeyModifiers::NONE)),
                Some(expected),
                "{code:?}"
            );
        }
    }

    #[test]
    fn drops_non_ascii_and_function_keys() {
        assert_eq!(
            map_key_event(&key_event(KeyCode::Char('é'), KeyModifiers::NONE)),
            None
        );
        assert_eq!(map_key_event(&key_event(KeyCode::F(5), KeyModifiers::NONE)), None);
    }

    #[test]
    fn drops_alt_chords() {
        assert_eq!(
            map_key_event(&key_event(KeyCode::Char('x'), KeyModifiers::ALT)),
            None
        );
    }
}
