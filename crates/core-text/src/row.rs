//! A single logical line: source bytes plus the derived display form.

use core_syntax::{Highlight, SyntaxDef, highlight_row};

/// One row of text. `chars` holds the raw source bytes (no trailing newline);
/// `render` is the display form with tabs expanded to spaces; `hl` classifies
/// every render cell. `render.len() == hl.len()` holds after every update.
pub struct Row {
    /// Position of this row in its document, maintained on insert/delete.
    pub idx: usize,
    pub chars: Vec<u8>,
    pub render: Vec<u8>,
    pub hl: Vec<Highlight>,
    /// Whether this row ends inside an unterminated multi-line comment.
    pub hl_open_comment: bool,
}

impl Row {
    pub(crate) fn new(chars: Vec<u8>, idx: usize) -> Self {
        Self {
            idx,
            chars,
            render: Vec::new(),
            hl: Vec::new(),
            hl_open_comment: false,
        }
    }

    /// Rebuild `render` from `chars`, expanding each tab to 1..tab_stop spaces
    /// so the run ends on a tab-stop boundary.
    pub(crate) fn update_render(&mut self, tab_stop: usize) {
        self.render.clear();
        for &b in &self.chars {
            if b == b'\t' {
                self.render.push(b' ');
                while self.render.len() % tab_stop != 0 {
                    self.render.push(b' ');
                }
            } else {
                self.render.push(b);
            }
        }
    }

    /// Re-classify this row given the predecessor's trailing comment flag.
    /// Returns true when the trailing flag flipped, i.e. the successor row
    /// needs re-classification too.
    pub(crate) fn update_highlight(
        &mut self,
        syntax: Option<&SyntaxDef>,
        prev_open_comment: bool,
    ) -> bool {
        let (hl, open) = highlight_row(&self.render, syntax, prev_open_comment);
        self.hl = hl;
        let changed = self.hl_open_comment != open;
        self.hl_open_comment = open;
        changed
    }

    /// Translate a `chars` index into a render column under tab expansion.
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        let mut rx = 0;
        for &b in self.chars.iter().take(cx) {
            if b == b'\t' {
                rx += (tab_stop - 1) - (rx % tab_stop);
            }
            rx += 1;
        }
        rx
    }

    /// Inverse of `cx_to_rx`: the first `cx` whose running render column
    /// exceeds `rx`, or `chars.len()` when the row is too short.
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, &b) in self.chars.iter().enumerate() {
            if b == b'\t' {
                cur_rx += (tab_stop - 1) - (cur_rx % tab_stop);
            }
            cur_rx += 1;
            if cur_rx > rx {
                return cx;
            }
        }
        self.chars.len()
    }
}
