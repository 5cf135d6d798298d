//! Cursor motions as plain functions of the buffer and a start offset.
//!
//! Each returns the landing offset, or `None` when the motion cannot move
//! (seek without a match, `j` on the last line). They never touch the host;
//! the engine decides whether the result moves the cursor or feeds an operator.

use super::host::Host;
use super::search::is_word_char;

/// How a motion's before/after pair turns into an operator range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    /// `[start, end)`: the landing char is not included.
    Exclusive,
    /// The landing char is included.
    Inclusive,
    /// Whole lines from the first to the last touched line.
    Linewise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Blank,
    Newline,
    Word,
    Punct,
}

fn class(ch: char) -> CharClass {
    if ch == '\n' {
        CharClass::Newline
    } else if ch.is_whitespace() {
        CharClass::Blank
    } else if is_word_char(ch) {
        CharClass::Word
    } else {
        CharClass::Punct
    }
}

fn class_at(host: &dyn Host, pos: usize) -> Option<CharClass> {
    host.char_at(pos).map(class)
}

fn is_blank_line(host: &dyn Host, pos: usize) -> bool {
    host.line_start(pos) == host.line_end(pos)
}

pub fn left(host: &dyn Host, pos: usize) -> Option<usize> {
    (pos > host.line_start(pos)).then(|| pos - 1)
}

/// One char right, allowed to land on the line end so `dl` on the last char
/// still covers it.
pub fn right(host: &dyn Host, pos: usize) -> Option<usize> {
    (pos < host.line_end(pos)).then(|| pos + 1)
}

fn column(host: &dyn Host, pos: usize) -> usize {
    pos - host.line_start(pos)
}

fn on_line_at_column(host: &dyn Host, line_start: usize, col: usize) -> usize {
    let end = host.line_end(line_start);
    (line_start + col).min(end)
}

pub fn down(host: &dyn Host, pos: usize) -> Option<usize> {
    let end = host.line_end(pos);
    if end >= host.len() {
        return None;
    }
    Some(on_line_at_column(host, end + 1, column(host, pos)))
}

pub fn up(host: &dyn Host, pos: usize) -> Option<usize> {
    let start = host.line_start(pos);
    if start == 0 {
        return None;
    }
    let prev = host.line_start(start - 1);
    Some(on_line_at_column(host, prev, column(host, pos)))
}

/// Start of the next word (`w`). Empty lines count as words.
pub fn word_forward(host: &dyn Host, pos: usize) -> Option<usize> {
    let len = host.len();
    if pos >= len {
        return None;
    }
    let mut p = pos;
    if let Some(c) = class_at(host, p).filter(|c| matches!(c, CharClass::Word | CharClass::Punct)) {
        while class_at(host, p) == Some(c) {
            p += 1;
        }
    }
    // Skip blanks; a newline followed by another newline stops on the empty line.
    while p < len {
        match class_at(host, p) {
            Some(CharClass::Blank) => p += 1,
            Some(CharClass::Newline) => {
                p += 1;
                if host.char_at(p) == Some('\n') {
                    break;
                }
            }
            _ => break,
        }
    }
    Some(p)
}

/// `w` under an operator: a word run that ends the line stops at the line
/// end instead of spilling onto the next line.
pub fn word_forward_op(host: &dyn Host, pos: usize) -> Option<usize> {
    let target = word_forward(host, pos)?;
    let end = host.line_end(pos);
    if target > end && pos < end {
        Some(end)
    } else {
        Some(target)
    }
}

/// Start of the previous word (`b`).
pub fn word_backward(host: &dyn Host, pos: usize) -> Option<usize> {
    if pos == 0 {
        return None;
    }
    let mut p = pos - 1;
    while p > 0 && matches!(class_at(host, p), Some(CharClass::Blank | CharClass::Newline)) {
        if host.char_at(p) == Some('\n') && host.char_at(p - 1) == Some('\n') {
            // Empty line counts as a word.
            return Some(p);
        }
        p -= 1;
    }
    let Some(c) = class_at(host, p) else {
        return Some(p);
    };
    if matches!(c, CharClass::Word | CharClass::Punct) {
        while p > 0 && class_at(host, p - 1) == Some(c) {
            p -= 1;
        }
    }
    Some(p)
}

/// Last char of the current or next word (`e`).
pub fn word_end(host: &dyn Host, pos: usize) -> Option<usize> {
    let len = host.len();
    if pos + 1 >= len {
        return None;
    }
    let mut p = pos + 1;
    while p < len && matches!(class_at(host, p), Some(CharClass::Blank | CharClass::Newline)) {
        p += 1;
    }
    let c = class_at(host, p)?;
    while p + 1 < len && class_at(host, p + 1) == Some(c) {
        p += 1;
    }
    Some(p)
}

pub fn line_start(host: &dyn Host, pos: usize) -> Option<usize> {
    Some(host.line_start(pos))
}

/// First non-blank char of the line (`^`).
pub fn first_non_blank(host: &dyn Host, pos: usize) -> Option<usize> {
    let end = host.line_end(pos);
    let mut p = host.line_start(pos);
    while p < end && class_at(host, p) == Some(CharClass::Blank) {
        p += 1;
    }
    Some(p)
}

/// Last char of the line (`$`); the line start for an empty line.
pub fn line_end(host: &dyn Host, pos: usize) -> Option<usize> {
    let start = host.line_start(pos);
    let end = host.line_end(pos);
    Some(if end > start { end - 1 } else { start })
}

/// Next blank line after the current paragraph (`}`), or the buffer end.
pub fn paragraph_forward(host: &dyn Host, pos: usize) -> Option<usize> {
    let len = host.len();
    let mut start = host.line_start(pos);
    // Leave the blank lines we are sitting in.
    while start < len && is_blank_line(host, start) {
        start = host.line_end(start) + 1;
    }
    loop {
        let next = host.line_end(start) + 1;
        if next >= len {
            return Some(len);
        }
        if is_blank_line(host, next) {
            return Some(next);
        }
        start = next;
    }
}

/// Previous blank line before the current paragraph (`{`), or the buffer start.
pub fn paragraph_backward(host: &dyn Host, pos: usize) -> Option<usize> {
    let mut start = host.line_start(pos);
    while start > 0 && is_blank_line(host, start) {
        start = host.line_start(start - 1);
    }
    while start > 0 {
        let prev = host.line_start(start - 1);
        if is_blank_line(host, prev) {
            return Some(prev);
        }
        start = prev;
    }
    Some(0)
}

/// First line (`gg`).
pub fn buffer_top(_host: &dyn Host, _pos: usize) -> Option<usize> {
    Some(0)
}

/// Start of the last line (`G`).
pub fn buffer_bottom(host: &dyn Host, _pos: usize) -> Option<usize> {
    let len = host.len();
    let last = if len > 0 && host.char_at(len - 1) == Some('\n') {
        // A trailing newline does not start a line of its own.
        host.line_start(len - 1)
    } else {
        host.line_start(len)
    };
    Some(last)
}

/// How a seek chord treats the found char.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seek {
    /// `f`: land on the next occurrence.
    Find,
    /// `t`: land just before the next occurrence.
    Til,
    /// `F`: land on the previous occurrence.
    FindBackward,
    /// `T`: land just after the previous occurrence.
    TilBackward,
}

impl Seek {
    pub fn is_forward(self) -> bool {
        matches!(self, Seek::Find | Seek::Til)
    }
}

/// Seek for `target` from `pos` in the direction of `seek`.
pub fn seek_char(host: &dyn Host, pos: usize, target: char, seek: Seek) -> Option<usize> {
    let len = host.len();
    match seek {
        Seek::Find | Seek::Til => {
            let found = (pos + 1..len).find(|&p| host.char_at(p) == Some(target))?;
            Some(if seek == Seek::Til { found - 1 } else { found })
        }
        Seek::FindBackward | Seek::TilBackward => {
            let found = (0..pos).rev().find(|&p| host.char_at(p) == Some(target))?;
            Some(if seek == Seek::TilBackward { found + 1 } else { found })
        }
    }
}

/// Normal-mode cursor rule: rest on a char, never on the newline of a
/// non-empty line.
pub fn clamp_to_char(host: &dyn Host, pos: usize) -> usize {
    let start = host.line_start(pos);
    let end = host.line_end(pos);
    if pos >= end && end > start {
        end - 1
    } else {
        pos.min(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rope_host::RopeHost;

    fn host(text: &str) -> RopeHost {
        RopeHost::with_text(text)
    }

    #[test]
    fn test_left_right_stay_on_line() {
        let h = host("ab\ncd");
        assert_eq!(left(&h, 3), None);
        assert_eq!(left(&h, 4), Some(3));
        assert_eq!(right(&h, 1), Some(2));
        assert_eq!(right(&h, 2), None);
    }

    #[test]
    fn test_up_down_keep_column() {
        let h = host("hello\nhi\nworld");
        assert_eq!(down(&h, 4), Some(8));
        assert_eq!(down(&h, 7), Some(10));
        assert_eq!(down(&h, 12), None);
        assert_eq!(up(&h, 13), Some(8));
        assert_eq!(up(&h, 2), None);
    }

    #[test]
    fn test_word_forward() {
        let h = host("foo.bar baz\n\nqux");
        assert_eq!(word_forward(&h, 0), Some(3));
        assert_eq!(word_forward(&h, 3), Some(4));
        assert_eq!(word_forward(&h, 4), Some(8));
        assert_eq!(word_forward(&h, 8), Some(12));
        assert_eq!(word_forward(&h, 12), Some(13));
        assert_eq!(word_forward(&h, 13), Some(16));
        assert_eq!(word_forward(&h, 16), None);
    }

    #[test]
    fn test_word_forward_op_stops_at_line_end() {
        let h = host("one two\nthree");
        assert_eq!(word_forward(&h, 4), Some(8));
        assert_eq!(word_forward_op(&h, 4), Some(7));
        assert_eq!(word_forward_op(&h, 0), Some(4));
    }

    #[test]
    fn test_word_backward() {
        let h = host("foo bar\n\n  baz");
        assert_eq!(word_backward(&h, 11), Some(8));
        assert_eq!(word_backward(&h, 8), Some(4));
        assert_eq!(word_backward(&h, 4), Some(0));
        assert_eq!(word_backward(&h, 2), Some(0));
        assert_eq!(word_backward(&h, 0), None);
    }

    #[test]
    fn test_word_end() {
        let h = host("foo bar  x");
        assert_eq!(word_end(&h, 0), Some(2));
        assert_eq!(word_end(&h, 2), Some(6));
        assert_eq!(word_end(&h, 6), Some(9));
        assert_eq!(word_end(&h, 9), None);
    }

    #[test]
    fn test_line_motions() {
        let h = host("  abc\n\nxyz");
        assert_eq!(line_start(&h, 4), Some(0));
        assert_eq!(first_non_blank(&h, 4), Some(2));
        assert_eq!(line_end(&h, 0), Some(4));
        assert_eq!(line_end(&h, 6), Some(6));
        assert_eq!(buffer_bottom(&h, 0), Some(7));
        assert_eq!(buffer_top(&h, 9), Some(0));
        assert_eq!(buffer_bottom(&host("a\nb\n"), 0), Some(2));
    }

    #[test]
    fn test_paragraphs() {
        let h = host("a\nb\n\nc\nd\n\ne");
        assert_eq!(paragraph_forward(&h, 0), Some(4));
        assert_eq!(paragraph_forward(&h, 4), Some(9));
        assert_eq!(paragraph_forward(&h, 10), Some(11));
        assert_eq!(paragraph_backward(&h, 10), Some(9));
        assert_eq!(paragraph_backward(&h, 9), Some(4));
        assert_eq!(paragraph_backward(&h, 2), Some(0));
    }

    #[test]
    fn test_seek_char() {
        let h = host("a,b,c");
        assert_eq!(seek_char(&h, 0, ',', Seek::Find), Some(1));
        assert_eq!(seek_char(&h, 1, ',', Seek::Find), Some(3));
        assert_eq!(seek_char(&h, 0, ',', Seek::Til), Some(0));
        assert_eq!(seek_char(&h, 0, 'c', Seek::Til), Some(3));
        assert_eq!(seek_char(&h, 4, ',', Seek::FindBackward), Some(3));
        assert_eq!(seek_char(&h, 4, ',', Seek::TilBackward), Some(4));
        assert_eq!(seek_char(&h, 4, 'a', Seek::TilBackward), Some(1));
        assert_eq!(seek_char(&h, 0, 'z', Seek::Find), None);
    }

    #[test]
    fn test_clamp_to_char() {
        let h = host("abc\n\n");
        assert_eq!(clamp_to_char(&h, 3), 2);
        assert_eq!(clamp_to_char(&h, 4), 4);
        assert_eq!(clamp_to_char(&h, 1), 1);
    }
}
