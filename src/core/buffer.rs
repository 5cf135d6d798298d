use std::fmt;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::Path;

use ropey::Rope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub usize);

/// Rope-backed text. Every position is a char offset and every range is
/// clamped to the text, so callers never index past the end.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub id: BufferId,
    pub content: Rope,
}

impl Buffer {
    pub fn new(id: BufferId) -> Self {
        Self::from_text(id, "")
    }

    pub fn from_text(id: BufferId, text: &str) -> Self {
        Self {
            id,
            content: Rope::from_str(text),
        }
    }

    pub fn load(id: BufferId, path: &Path) -> io::Result<Self> {
        let file = fs::File::open(path)?;
        Ok(Self {
            id,
            content: Rope::from_reader(io::BufReader::new(file))?,
        })
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let file = fs::File::create(path)?;
        self.content.write_to(io::BufWriter::new(file))
    }

    fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let end = range.end.min(self.len_chars());
        range.start.min(end)..end
    }

    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let range = self.clamp(range);
        if !range.is_empty() {
            self.content.remove(range.clone());
        }
        if !text.is_empty() {
            self.content.insert(range.start, text);
        }
    }

    pub fn slice(&self, range: Range<usize>) -> String {
        self.content.slice(self.clamp(range)).to_string()
    }

    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.content.get_char(pos)
    }

    pub fn len_chars(&self) -> usize {
        self.content.len_chars()
    }

    pub fn line_to_char(&self, line: usize) -> usize {
        self.content.line_to_char(line.min(self.content.len_lines()))
    }

    pub fn char_to_line(&self, pos: usize) -> usize {
        self.content.char_to_line(pos.min(self.len_chars()))
    }

    /// Lines that hold text. A trailing `\n` ends the last line rather than
    /// starting an empty one, unlike `Rope::len_lines`.
    pub fn len_lines(&self) -> usize {
        let n = self.content.len_lines();
        if n > 1 && self.content.get_char(self.len_chars().wrapping_sub(1)) == Some('\n') {
            n - 1
        } else {
            n
        }
    }

    /// Text of `line` including its newline; empty past the end.
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.len_lines() {
            return String::new();
        }
        self.content.line(line).to_string()
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_slice_clamp() {
        let mut buffer = Buffer::from_text(BufferId(1), "abcdef");
        buffer.replace(1..3, "XYZ");
        assert_eq!(buffer.to_string(), "aXYZdef");
        assert_eq!(buffer.slice(4..100), "def");
        buffer.replace(5..100, "");
        assert_eq!(buffer.to_string(), "aXYZd");
        buffer.replace(99..99, "!");
        assert_eq!(buffer.to_string(), "aXYZd!");
    }

    #[test]
    fn test_char_at_past_end() {
        let buffer = Buffer::from_text(BufferId(1), "ab");
        assert_eq!(buffer.char_at(1), Some('b'));
        assert_eq!(buffer.char_at(2), None);
    }

    #[test]
    fn test_len_lines_ignores_trailing_newline() {
        let buffer = Buffer::from_text(BufferId(1), "a\nb\n");
        assert_eq!(buffer.len_lines(), 2);
        assert_eq!(buffer.line_text(1), "b\n");
        assert_eq!(buffer.line_text(2), "");
        let buffer = Buffer::from_text(BufferId(1), "a\nb");
        assert_eq!(buffer.len_lines(), 2);
        assert_eq!(Buffer::new(BufferId(1)).len_lines(), 1);
    }
}
