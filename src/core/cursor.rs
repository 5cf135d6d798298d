use super::buffer::Buffer;

/// Line/column form of a buffer offset, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self { line: 0, col: 0 }
    }

    /// Locate char offset `pos` (clamped) in `buffer`.
    pub fn from_offset(buffer: &Buffer, pos: usize) -> Self {
        let pos = pos.min(buffer.len_chars());
        let line = buffer.char_to_line(pos);
        Self {
            line,
            col: pos - buffer.line_to_char(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::BufferId;

    #[test]
    fn test_from_offset() {
        let buffer = Buffer::from_text(BufferId(0), "ab\ncde\n");
        assert_eq!(Cursor::from_offset(&buffer, 0), Cursor::new());
        assert_eq!(Cursor::from_offset(&buffer, 5), Cursor { line: 1, col: 2 });
        assert_eq!(Cursor::from_offset(&buffer, 99), Cursor { line: 2, col: 0 });
    }
}
