use std::ops::Range;

use super::buffer::BufferId;
use super::host::ViewId;

/// One window onto a buffer. Two views of the same buffer keep separate
/// cursors and scroll positions.
#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    pub buffer_id: BufferId,
    /// Char offset.
    pub cursor: usize,
    pub scroll_top: usize,
    /// Text rows the front end gives this view. Drives scrolling and paging.
    pub viewport_lines: usize,
    /// Visual selection or search match to paint.
    pub highlight: Option<Range<usize>>,
}

impl View {
    pub fn new(id: ViewId, buffer_id: BufferId) -> Self {
        Self {
            id,
            buffer_id,
            cursor: 0,
            scroll_top: 0,
            // Until a front end measures the screen.
            viewport_lines: 40,
            highlight: None,
        }
    }

    /// Scroll the least amount that brings `line` on screen.
    pub fn ensure_line_visible(&mut self, line: usize) {
        if line < self.scroll_top {
            self.scroll_top = line;
        } else if self.viewport_lines > 0 && line >= self.scroll_top + self.viewport_lines {
            self.scroll_top = line + 1 - self.viewport_lines;
        }
    }

    pub fn visible_lines(&self) -> Range<usize> {
        self.scroll_top..self.scroll_top + self.viewport_lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(viewport_lines: usize, scroll_top: usize) -> View {
        let mut view = View::new(ViewId(0), BufferId(1));
        view.viewport_lines = viewport_lines;
        view.scroll_top = scroll_top;
        view
    }

    #[test]
    fn test_scrolls_down_to_show_line() {
        let mut v = view(10, 0);
        v.ensure_line_visible(15);
        assert_eq!(v.scroll_top, 6);
        assert_eq!(v.visible_lines(), 6..16);
    }

    #[test]
    fn test_scrolls_up_to_show_line() {
        let mut v = view(10, 20);
        v.ensure_line_visible(5);
        assert_eq!(v.scroll_top, 5);
    }

    #[test]
    fn test_visible_line_does_not_scroll() {
        let mut v = view(10, 4);
        v.ensure_line_visible(13);
        assert_eq!(v.scroll_top, 4);
    }
}
