//! Screen composition.
//!
//! Every frame is staged into a `FrameBuffer` (the append buffer) and flushed
//! to the terminal in a single write, so a frame is atomic against terminal
//! flushing. Nothing here talks to the terminal directly; tests assert on the
//! staged bytes.

use std::io::{self, Write};

use anyhow::Result;
use core_state::Editor;
use core_syntax::Highlight;
use core_text::Row;
use tracing::trace;

pub mod ansi;

/// Per-frame staging buffer. Created fresh for a frame, consumed by exactly
/// one write to the TTY.
#[derive(Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Hand the staged frame to the terminal in one write.
    pub fn flush_to(self, out: &mut impl io::Write) -> Result<()> {
        out.write_all(&self.buf)?;
        out.flush()?;
        Ok(())
    }
}

impl io::Write for FrameBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Stage one full frame and write it out. The editor's scroll resolution must
/// have run already this frame.
pub fn refresh(editor: &Editor, out: &mut impl io::Write) -> Result<()> {
    let (screenrows, screencols) = editor.screen();
    // Rough per-cell estimate; colour switches make rows wider than the text.
    let mut frame = FrameBuffer::with_capacity((screenrows + 2) * (screencols + 16));
    render_frame(editor, &mut frame)?;
    trace!(
        target: "render",
        frame_bytes = frame.as_bytes().len(),
        rows_drawn = screenrows,
        "frame_flush"
    );
    frame.flush_to(out)
}

/// Stage the full frame envelope: hide cursor, home, rows, status bar,
/// message bar, cursor placement, show cursor.
pub fn render_frame(editor: &Editor, frame: &mut FrameBuffer) -> Result<()> {
    frame.push(ansi::HIDE_CURSOR);
    frame.push(ansi::CURSOR_HOME);

    draw_rows(editor, frame)?;
    draw_status_bar(editor, frame);
    draw_message_bar(editor, frame);

    let (_, cy) = editor.cursor();
    let (rowoff, coloff) = editor.offsets();
    let screen_y = cy.saturating_sub(rowoff) + 1;
    let screen_x = editor.rx().saturating_sub(coloff) + 1;
    write!(frame, "\x1b[{screen_y};{screen_x}H")?;

    frame.push(ansi::SHOW_CURSOR);
    Ok(())
}

fn draw_rows(editor: &Editor, frame: &mut FrameBuffer) -> Result<()> {
    let (screenrows, screencols) = editor.screen();
    let (rowoff, coloff) = editor.offsets();
    let doc = editor.document();
    for y in 0..screenrows {
        let filerow = y + rowoff;
        match doc.row(filerow) {
            Some(row) => draw_row(row, coloff, screencols, frame)?,
            None => {
                if doc.num_rows() == 0 && y == screenrows / 3 {
                    draw_welcome(screencols, frame);
                } else {
                    frame.push(b"~");
                }
            }
        }
        frame.push(ansi::CLEAR_LINE);
        frame.push(b"\r\n");
    }
    Ok(())
}

fn draw_welcome(screencols: usize, frame: &mut FrameBuffer) {
    let mut welcome = format!("Kilo editor -- version {}", env!("CARGO_PKG_VERSION"));
    welcome.truncate(welcome.len().min(screencols));
    let mut padding = (screencols.saturating_sub(welcome.len())) / 2;
    if padding > 0 {
        frame.push(b"~");
        padding -= 1;
    }
    frame.push(" ".repeat(padding).as_bytes());
    frame.push(welcome.as_bytes());
}

/// Emit the visible slice of one row, switching the SGR colour only when the
/// class changes between adjacent cells. Control bytes render reverse-video
/// as `@`-offset caret notation (`?` beyond 26) with the active colour
/// re-asserted afterwards, since the SGR reset clears it too.
fn draw_row(row: &Row, coloff: usize, screencols: usize, frame: &mut FrameBuffer) -> Result<()> {
    if coloff < row.render.len() {
        let end = row.render.len().min(coloff + screencols);
        let mut current_color: Option<u8> = None;
        for (&byte, &hl) in row.render[coloff..end].iter().zip(&row.hl[coloff..end]) {
            if byte.is_ascii_control() {
                let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
                frame.push(ansi::REVERSE_VIDEO);
                frame.push(&[symbol]);
                frame.push(ansi::RESET_FMT);
                if let Some(color) = current_color {
                    write!(frame, "\x1b[{color}m")?;
                }
            } else if hl == Highlight::Normal {
                if current_color.is_some() {
                    frame.push(ansi::DEFAULT_FG);
                    current_color = None;
                }
                frame.push(&[byte]);
            } else {
                let color = hl.color();
                if current_color != Some(color) {
                    current_color = Some(color);
                    write!(frame, "\x1b[{color}m")?;
                }
                frame.push(&[byte]);
            }
        }
    }
    frame.push(ansi::DEFAULT_FG);
    Ok(())
}

fn draw_status_bar(editor: &Editor, frame: &mut FrameBuffer) {
    let (_, screencols) = editor.screen();
    let doc = editor.document();
    let (_, cy) = editor.cursor();

    frame.push(ansi::REVERSE_VIDEO);

    let name = doc
        .filename()
        .map_or_else(|| String::from("[No Name]"), |p| p.display().to_string());
    let mut left = format!(
        "{:.20} - {} lines {}",
        name,
        doc.num_rows(),
        if doc.is_dirty() { "(modified)" } else { "" }
    );
    truncate_to_width(&mut left, screencols);
    let right = format!(
        "{} | {}/{}",
        doc.syntax().map_or("no ft", |s| s.filetype),
        cy + 1,
        doc.num_rows()
    );

    frame.push(left.as_bytes());
    let mut len = left.len();
    while len < screencols {
        if screencols - len == right.len() {
            frame.push(right.as_bytes());
            break;
        }
        frame.push(b" ");
        len += 1;
    }

    frame.push(ansi::RESET_FMT);
    frame.push(b"\r\n");
}

fn draw_message_bar(editor: &Editor, frame: &mut FrameBuffer) {
    frame.push(ansi::CLEAR_LINE);
    let (_, screencols) = editor.screen();
    if let Some(mut message) = editor.message_bar_text() {
        truncate_to_width(&mut message, screencols);
        frame.push(message.as_bytes());
    }
}

/// Trim a display string to at most `max` bytes without splitting a char.
fn truncate_to_width(s: &mut String, max: usize) {
    while s.len() > max {
        s.pop();
    }
}
