//! Editor state and key dispatch.
//!
//! `Editor` owns the document, the cursor/viewport model, the status message,
//! the quit guard and the active prompt mode. It consumes decoded input units
//! and mutates itself; it never touches the terminal. The main loop is
//! `scroll → render → read → process_input`, so every state transition here
//! is observable by feeding keys in a test.
//!
//! Cursor model: `cy` ranges over `[0, num_rows]`; the past-the-end row is a
//! legal position used to append to the buffer. `cx` is a byte index into the
//! current row's source bytes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use core_config::Config;
use core_input::{Input, Key};
use core_text::Document;
use tracing::{debug, info};

mod find;
mod prompt;

use find::{FindState, find_bytes};
use prompt::{PromptMode, PromptOutcome, SavedCursor, prompt_keypress};

/// Initial status line content.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

/// Verdict of one dispatch step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

struct StatusMessage {
    text: String,
    time: Instant,
}

pub struct Editor {
    doc: Document,
    config: Config,
    cx: usize,
    cy: usize,
    /// Render column of the cursor, derived during scroll resolution.
    rx: usize,
    rowoff: usize,
    coloff: usize,
    screenrows: usize,
    screencols: usize,
    status: Option<StatusMessage>,
    quit_times: usize,
    prompt: Option<PromptMode>,
}

impl Editor {
    /// An empty, unnamed buffer.
    pub fn new(config: Config) -> Self {
        let doc = Document::new(config.tab_stop);
        Self::with_document(doc, config)
    }

    /// Open `path` at startup. Unreadable files are a hard failure.
    pub fn open(path: &Path, config: Config) -> Result<Self> {
        let doc = Document::open(path, config.tab_stop)?;
        info!(target: "runtime", file = %path.display(), rows = doc.num_rows(), "opened");
        Ok(Self::with_document(doc, config))
    }

    fn with_document(doc: Document, config: Config) -> Self {
        let quit_times = config.quit_times;
        Self {
            doc,
            config,
            cx: 0,
            cy: 0,
            rx: 0,
            rowoff: 0,
            coloff: 0,
            screenrows: 0,
            screencols: 0,
            status: None,
            quit_times,
            prompt: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Logical cursor as `(cx, cy)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cx, self.cy)
    }

    /// Render column of the cursor as of the last scroll resolution.
    pub fn rx(&self) -> usize {
        self.rx
    }

    /// Scroll offsets as `(rowoff, coloff)`.
    pub fn offsets(&self) -> (usize, usize) {
        (self.rowoff, self.coloff)
    }

    /// Drawable text area as `(rows, cols)`.
    pub fn screen(&self) -> (usize, usize) {
        (self.screenrows, self.screencols)
    }

    /// Adopt a new terminal size, keeping the two bottom lines for the status
    /// and message bars.
    pub fn set_screen_size(&mut self, cols: u16, rows: u16) {
        self.screencols = cols as usize;
        self.screenrows = (rows as usize).saturating_sub(2);
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            time: Instant::now(),
        });
    }

    /// What the message bar shows this frame: the active prompt, or the
    /// status message while it is younger than the configured TTL.
    pub fn message_bar_text(&self) -> Option<String> {
        if let Some(prompt) = &self.prompt {
            return Some(prompt.display());
        }
        self.status
            .as_ref()
            .filter(|message| message.time.elapsed() < self.config.message_timeout())
            .map(|message| message.text.clone())
    }

    /// Resolve the scroll offsets so the cursor cell lands inside the
    /// drawable window. Runs once per frame, before drawing.
    pub fn scroll(&mut self) {
        self.rx = if self.cy < self.doc.num_rows() {
            self.doc.cx_to_rx(self.cy, self.cx)
        } else {
            0
        };
        if self.cy < self.rowoff {
            self.rowoff = self.cy;
        }
        if self.cy >= self.rowoff + self.screenrows {
            self.rowoff = self.cy + 1 - self.screenrows;
        }
        if self.rx < self.coloff {
            self.coloff = self.rx;
        }
        if self.rx >= self.coloff + self.screencols {
            self.coloff = self.rx + 1 - self.screencols;
        }
    }

    /// Dispatch one input unit.
    pub fn process_input(&mut self, input: Input) -> ControlFlow {
        match input {
            Input::Resize(cols, rows) => {
                self.set_screen_size(cols, rows);
                ControlFlow::Continue
            }
            Input::Key(key) => self.process_key(key),
        }
    }

    fn process_key(&mut self, key: Key) -> ControlFlow {
        if self.prompt.is_some() {
            self.process_prompt_key(key);
            return ControlFlow::Continue;
        }
        match key {
            Key::Enter => self.insert_newline(),
            Key::Ctrl(b'q') => {
                if self.doc.is_dirty() && self.quit_times > 1 {
                    self.quit_times -= 1;
                    self.set_status(format!(
                        "WARNING!!! File has unsaved changes. \
                         Press Ctrl-Q {} more times to quit.",
                        self.quit_times
                    ));
                    return ControlFlow::Continue;
                }
                debug!(target: "runtime", "quit");
                return ControlFlow::Quit;
            }
            Key::Ctrl(b's') => self.save(),
            Key::Ctrl(b'f') => {
                self.prompt = Some(PromptMode::find(SavedCursor {
                    cx: self.cx,
                    cy: self.cy,
                    rowoff: self.rowoff,
                    coloff: self.coloff,
                }));
            }
            Key::Home => self.cx = 0,
            Key::End => {
                if let Some(row) = self.doc.row(self.cy) {
                    self.cx = row.chars.len();
                }
            }
            Key::Backspace | Key::Ctrl(b'h') => self.del_char(),
            Key::Delete => {
                self.move_cursor(Key::ArrowRight);
                self.del_char();
            }
            Key::PageUp | Key::PageDown => self.page(key),
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key)
            }
            // Ctrl-L asks for a repaint, which every key gets anyway.
            Key::Ctrl(b'l') | Key::Escape => {}
            Key::Char(c) => self.insert_char(c),
            Key::Ctrl(_) => {}
        }
        self.quit_times = self.config.quit_times;
        ControlFlow::Continue
    }

    fn move_cursor(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => {
                if self.cx > 0 {
                    self.cx -= 1;
                } else if self.cy > 0 {
                    self.cy -= 1;
                    self.cx = self.doc.row(self.cy).map_or(0, |row| row.chars.len());
                }
            }
            Key::ArrowRight => {
                if let Some(row) = self.doc.row(self.cy) {
                    if self.cx < row.chars.len() {
                        self.cx += 1;
                    } else {
                        self.cy += 1;
                        self.cx = 0;
                    }
                }
            }
            Key::ArrowUp => {
                if self.cy > 0 {
                    self.cy -= 1;
                }
            }
            Key::ArrowDown => {
                if self.cy < self.doc.num_rows() {
                    self.cy += 1;
                }
            }
            _ => {}
        }
        let row_len = self.doc.row(self.cy).map_or(0, |row| row.chars.len());
        self.cx = self.cx.min(row_len);
    }

    /// Page moves snap the cursor to the viewport edge, then take a whole
    /// screen of arrow steps.
    fn page(&mut self, key: Key) {
        let arrow = match key {
            Key::PageUp => {
                self.cy = self.rowoff;
                Key::ArrowUp
            }
            Key::PageDown => {
                self.cy = (self.rowoff + self.screenrows)
                    .saturating_sub(1)
                    .min(self.doc.num_rows());
                Key::ArrowDown
            }
            _ => return,
        };
        for _ in 0..self.screenrows {
            self.move_cursor(arrow);
        }
    }

    fn insert_char(&mut self, c: u8) {
        if self.cy == self.doc.num_rows() {
            self.doc.insert_row(self.cy, Vec::new());
        }
        self.doc.row_insert_char(self.cy, self.cx, c);
        self.cx += 1;
    }

    fn insert_newline(&mut self) {
        if self.cx == 0 {
            self.doc.insert_row(self.cy, Vec::new());
        } else {
            self.doc.split_row(self.cy, self.cx);
        }
        self.cy += 1;
        self.cx = 0;
    }

    fn del_char(&mut self) {
        if self.cy == self.doc.num_rows() {
            return;
        }
        if self.cx == 0 && self.cy == 0 {
            return;
        }
        if self.cx > 0 {
            self.doc.row_del_char(self.cy, self.cx - 1);
            self.cx -= 1;
        } else {
            self.cx = self.doc.join_rows(self.cy);
            self.cy -= 1;
        }
    }

    fn save(&mut self) {
        if self.doc.filename().is_none() {
            self.prompt = Some(PromptMode::save_as());
            return;
        }
        self.do_save();
    }

    fn do_save(&mut self) {
        match self.doc.save() {
            Ok(written) => self.set_status(format!("{written} bytes written to disk")),
            Err(error) => {
                self.set_status(format!("Can't save! I/O error: {error}"));
            }
        }
    }

    fn process_prompt_key(&mut self, key: Key) {
        let Some(mode) = self.prompt.take() else {
            return;
        };
        match mode {
            PromptMode::SaveAs { buffer } => match prompt_keypress(buffer, key) {
                PromptOutcome::Active(buffer) => {
                    self.prompt = Some(PromptMode::SaveAs { buffer });
                }
                PromptOutcome::Cancelled => self.set_status("Save aborted"),
                PromptOutcome::Submitted(name) => {
                    self.doc.set_filename(PathBuf::from(name));
                    self.do_save();
                }
            },
            PromptMode::Find {
                buffer,
                saved_cursor,
                mut state,
            } => match prompt_keypress(buffer, key) {
                PromptOutcome::Active(buffer) => {
                    self.find_step(&mut state, &buffer, key);
                    self.prompt = Some(PromptMode::Find {
                        buffer,
                        saved_cursor,
                        state,
                    });
                }
                PromptOutcome::Cancelled => {
                    self.find_step(&mut state, "", key);
                    self.cx = saved_cursor.cx;
                    self.cy = saved_cursor.cy;
                    self.rowoff = saved_cursor.rowoff;
                    self.coloff = saved_cursor.coloff;
                    self.status = None;
                }
                PromptOutcome::Submitted(_) => {
                    // Cursor stays on the match; only the mark is cleaned up.
                    self.find_step(&mut state, "", key);
                    self.status = None;
                }
            },
        }
    }

    /// One incremental search step. Always restores the previously marked
    /// row first, then walks the rows from the last match in the current
    /// direction, wrapping at both ends.
    fn find_step(&mut self, state: &mut FindState, query: &str, key: Key) {
        if let Some((line, saved)) = state.saved.take() {
            self.doc.restore_highlight(line, saved);
        }
        match key {
            Key::Enter | Key::Escape => {
                state.last_match = None;
                state.forward = true;
                return;
            }
            Key::ArrowRight | Key::ArrowDown => state.forward = true,
            Key::ArrowLeft | Key::ArrowUp => state.forward = false,
            _ => {
                state.last_match = None;
                state.forward = true;
            }
        }
        if state.last_match.is_none() {
            state.forward = true;
        }

        let num_rows = self.doc.num_rows();
        if num_rows == 0 {
            return;
        }
        let mut current: isize = state.last_match.map_or(-1, |m| m as isize);
        for _ in 0..num_rows {
            current += if state.forward { 1 } else { -1 };
            if current < 0 {
                current = num_rows as isize - 1;
            } else if current >= num_rows as isize {
                current = 0;
            }
            let idx = current as usize;
            let Some(row) = self.doc.row(idx) else {
                break;
            };
            if let Some(offset) = find_bytes(&row.render, query.as_bytes()) {
                state.last_match = Some(idx);
                self.cy = idx;
                self.cx = self.doc.rx_to_cx(idx, offset);
                // Snap past the end so scroll resolution pulls the match row
                // to the top of the viewport.
                self.rowoff = num_rows;
                let saved = self.doc.mark_match(idx, offset, query.len());
                state.saved = Some((idx, saved));
                break;
            }
        }
    }
}
