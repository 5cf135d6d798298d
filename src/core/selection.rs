use std::ops::Range;

use super::host::Host;

/// Anchor/cursor pair for the visual modes, plus the derived range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub anchor: usize,
    pub cursor: usize,
    /// Normalized `[start, end)`; line aligned when `linewise`.
    pub range: Range<usize>,
    pub linewise: bool,
}

impl SelectionState {
    pub fn new(host: &dyn Host, anchor: usize, linewise: bool) -> Self {
        let mut sel = Self {
            anchor,
            cursor: anchor,
            range: anchor..anchor,
            linewise,
        };
        sel.normalize(host);
        sel
    }

    pub fn update(&mut self, host: &dyn Host, cursor: usize) {
        self.cursor = cursor;
        self.normalize(host);
    }

    pub fn set_linewise(&mut self, host: &dyn Host, linewise: bool) {
        self.linewise = linewise;
        self.normalize(host);
    }

    /// Exchange anchor and cursor (visual `o`).
    pub fn swap_ends(&mut self) {
        std::mem::swap(&mut self.anchor, &mut self.cursor);
    }

    fn normalize(&mut self, host: &dyn Host) {
        let len = host.len();
        let lo = self.anchor.min(self.cursor).min(len);
        let hi = self.anchor.max(self.cursor).min(len);
        self.range = if self.linewise {
            let end = host.line_end(hi);
            host.line_start(lo)..(end + 1).min(len)
        } else {
            lo..(hi + 1).min(len)
        };
    }
}
