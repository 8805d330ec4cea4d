//! Incremental search state.
//!
//! One `FindState` lives inside an active search prompt and dies with it.
//! The highlighted match is painted directly into the row's highlight array;
//! the previous bytes are saved here and must be restored before the next
//! search step (or on prompt exit) so match marks never leak.

use core_syntax::Highlight;

pub struct FindState {
    /// Row index of the previous hit; `None` restarts from the top.
    pub(crate) last_match: Option<usize>,
    /// Search direction; reset to forward whenever there is no anchor match.
    pub(crate) forward: bool,
    /// Saved highlight bytes of the currently marked row.
    pub(crate) saved: Option<(usize, Vec<Highlight>)>,
}

impl Default for FindState {
    fn default() -> Self {
        Self {
            last_match: None,
            forward: true,
            saved: None,
        }
    }
}

/// First offset of `needle` in `haystack`; an empty needle matches at 0.
pub(crate) fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
