//! Row-store document model.
//!
//! A `Document` is an ordered sequence of `Row`s plus the file-level metadata
//! the editor needs: filename, the active syntax definition, the tab stop fed
//! into render derivation, and the dirty counter. Every mutating operation
//! re-derives the affected row's render and highlight state and bumps the
//! dirty counter; highlight changes that flip a row's trailing comment flag
//! cascade iteratively into the following rows.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use core_syntax::{Highlight, SyntaxDef, select_syntax};
use tracing::debug;

mod row;
pub use row::Row;

pub struct Document {
    rows: Vec<Row>,
    filename: Option<PathBuf>,
    syntax: Option<&'static SyntaxDef>,
    /// Edit generation counter; non-zero means the buffer is modified.
    dirty: u64,
    tab_stop: usize,
}

impl Document {
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            filename: None,
            syntax: None,
            dirty: 0,
            tab_stop,
        }
    }

    /// Load a document from disk. Lines are split on `\n` with an optional
    /// preceding `\r` stripped; the loaded document starts clean.
    pub fn open(path: &Path, tab_stop: usize) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut doc = Self::new(tab_stop);
        if !data.is_empty() {
            let mut lines: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
            if data.ends_with(b"\n") {
                lines.pop();
            }
            for line in lines {
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                let idx = doc.rows.len();
                let mut row = Row::new(line.to_vec(), idx);
                row.update_render(tab_stop);
                doc.rows.push(row);
            }
        }
        doc.set_filename(path.to_path_buf());
        doc.dirty = 0;
        debug!(
            target: "io",
            file = %path.display(),
            size_bytes = data.len(),
            line_count = doc.rows.len(),
            "file_read_ok"
        );
        Ok(doc)
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Adopt a filename, re-run filetype selection against it and re-classify
    /// every row under the selected definition.
    pub fn set_filename(&mut self, path: PathBuf) {
        self.syntax = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(select_syntax);
        self.filename = Some(path);
        self.rehighlight_all();
    }

    pub fn syntax(&self) -> Option<&'static SyntaxDef> {
        self.syntax
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    pub fn dirty(&self) -> u64 {
        self.dirty
    }

    /// Insert a new row at `at` (clamped semantics: out-of-range is a no-op),
    /// shifting the following rows and their `idx` up.
    pub fn insert_row(&mut self, at: usize, chars: Vec<u8>) {
        if at > self.rows.len() {
            return;
        }
        self.rows.insert(at, Row::new(chars, at));
        for row in &mut self.rows[at + 1..] {
            row.idx += 1;
        }
        self.update_row(at);
        self.dirty += 1;
    }

    /// Delete the row at `at`; `at == num_rows` is a no-op. The row that
    /// moves into the vacated slot is re-classified so no cascaded highlight
    /// state dangles.
    pub fn del_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        for row in &mut self.rows[at..] {
            row.idx -= 1;
        }
        if at < self.rows.len() {
            self.cascade_highlight(at);
        }
        self.dirty += 1;
    }

    /// Insert one byte into a row; `at` is clamped into `[0, len]`.
    pub fn row_insert_char(&mut self, cy: usize, at: usize, c: u8) {
        let Some(row) = self.rows.get_mut(cy) else {
            return;
        };
        let at = at.min(row.chars.len());
        row.chars.insert(at, c);
        self.update_row(cy);
        self.dirty += 1;
    }

    /// Append bytes to a row's source content.
    pub fn row_append_bytes(&mut self, cy: usize, bytes: &[u8]) {
        let Some(row) = self.rows.get_mut(cy) else {
            return;
        };
        row.chars.extend_from_slice(bytes);
        self.update_row(cy);
        self.dirty += 1;
    }

    /// Delete the byte at `at`; out-of-range is a no-op.
    pub fn row_del_char(&mut self, cy: usize, at: usize) {
        let Some(row) = self.rows.get_mut(cy) else {
            return;
        };
        if at >= row.chars.len() {
            return;
        }
        row.chars.remove(at);
        self.update_row(cy);
        self.dirty += 1;
    }

    /// Split the row at `cy` in two: bytes `[cx..]` move to a new row at
    /// `cy + 1`.
    pub fn split_row(&mut self, cy: usize, cx: usize) {
        let Some(row) = self.rows.get_mut(cy) else {
            return;
        };
        let cx = cx.min(row.chars.len());
        let tail = row.chars.split_off(cx);
        self.insert_row(cy + 1, tail);
        self.update_row(cy);
    }

    /// Join the row at `cy` onto the end of its predecessor. Returns the
    /// column in the predecessor where the joined content starts.
    pub fn join_rows(&mut self, cy: usize) -> usize {
        if cy == 0 || cy >= self.rows.len() {
            return 0;
        }
        let joined_at = self.rows[cy - 1].chars.len();
        let tail = std::mem::take(&mut self.rows[cy].chars);
        self.row_append_bytes(cy - 1, &tail);
        self.del_row(cy);
        joined_at
    }

    /// Serialise every row followed by a single `\n`, including the last.
    pub fn rows_to_string(&self) -> Vec<u8> {
        let len = self.rows.iter().map(|r| r.chars.len() + 1).sum();
        let mut out = Vec::with_capacity(len);
        for row in &self.rows {
            out.extend_from_slice(&row.chars);
            out.push(b'\n');
        }
        out
    }

    /// Write the document back to its file: open read-write/create, truncate
    /// to the exact serialised length, then write it. Clears the dirty
    /// counter and returns the number of bytes written.
    pub fn save(&mut self) -> io::Result<usize> {
        let Some(path) = self.filename.clone() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no filename"));
        };
        let buf = self.rows_to_string();
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }
        let mut file = options.open(&path)?;
        file.set_len(buf.len() as u64)?;
        file.write_all(&buf)?;
        self.dirty = 0;
        debug!(
            target: "io",
            file = %path.display(),
            size_bytes = buf.len(),
            "file_write_ok"
        );
        Ok(buf.len())
    }

    pub fn cx_to_rx(&self, cy: usize, cx: usize) -> usize {
        self.rows
            .get(cy)
            .map_or(0, |row| row.cx_to_rx(cx, self.tab_stop))
    }

    pub fn rx_to_cx(&self, cy: usize, rx: usize) -> usize {
        self.rows
            .get(cy)
            .map_or(0, |row| row.rx_to_cx(rx, self.tab_stop))
    }

    /// Overwrite the highlight of `len` render cells starting at `start` with
    /// the match class, returning the previous highlight bytes so the caller
    /// can restore them.
    pub fn mark_match(&mut self, cy: usize, start: usize, len: usize) -> Vec<Highlight> {
        let Some(row) = self.rows.get_mut(cy) else {
            return Vec::new();
        };
        let saved = row.hl.clone();
        let start = start.min(row.hl.len());
        let end = (start + len).min(row.hl.len());
        for cell in &mut row.hl[start..end] {
            *cell = Highlight::Match;
        }
        saved
    }

    /// Restore a highlight array previously captured by `mark_match`. Ignored
    /// if the row shape changed in between.
    pub fn restore_highlight(&mut self, cy: usize, saved: Vec<Highlight>) {
        if let Some(row) = self.rows.get_mut(cy) {
            if row.hl.len() == saved.len() {
                row.hl = saved;
            }
        }
    }

    /// Re-derive a row's render form, then re-classify it and cascade.
    fn update_row(&mut self, at: usize) {
        let tab_stop = self.tab_stop;
        if let Some(row) = self.rows.get_mut(at) {
            row.update_render(tab_stop);
        }
        self.cascade_highlight(at);
    }

    /// Re-classify the row at `at`; while the trailing comment flag of the
    /// just-classified row flipped, keep walking forward. Iterative so a flag
    /// flip near the top of a long file cannot recurse deeply.
    fn cascade_highlight(&mut self, at: usize) {
        let syntax = self.syntax;
        let mut idx = at;
        let mut prev_open = idx
            .checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .is_some_and(|row| row.hl_open_comment);
        while idx < self.rows.len() {
            let changed = self.rows[idx].update_highlight(syntax, prev_open);
            prev_open = self.rows[idx].hl_open_comment;
            if !changed {
                break;
            }
            idx += 1;
        }
    }

    fn rehighlight_all(&mut self) {
        let syntax = self.syntax;
        let mut prev_open = false;
        for row in &mut self.rows {
            row.update_highlight(syntax, prev_open);
            prev_open = row.hl_open_comment;
        }
    }
}
