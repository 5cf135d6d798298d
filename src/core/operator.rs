//! Operator-motion composition: a pending operator captures the range a
//! motion sweeps and applies itself to it.

use std::ops::Range;

use tracing::debug;

use super::engine::Engine;
use super::host::Host;
use super::keymap::KeymapId;
use super::motion::{self, MotionKind};
use super::register::RegisterId;
use super::Mode;

/// The operator awaiting a motion, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingOperator {
    #[default]
    None,
    Delete,
    Change,
    Yank,
    Format,
    IndentLeft,
    IndentRight,
}

impl PendingOperator {
    /// The chord table live while this operator waits.
    pub fn keymap(self) -> Option<KeymapId> {
        match self {
            PendingOperator::None => None,
            PendingOperator::Delete => Some(KeymapId::Delete),
            PendingOperator::Change => Some(KeymapId::Change),
            PendingOperator::Yank => Some(KeymapId::Yank),
            PendingOperator::Format => Some(KeymapId::Format),
            PendingOperator::IndentLeft => Some(KeymapId::IndentLeft),
            PendingOperator::IndentRight => Some(KeymapId::IndentRight),
        }
    }
}

impl Engine {
    /// Run a motion from the cursor. Without an operator the cursor moves;
    /// with one, the swept range is handed to the operator. A motion that
    /// cannot move abandons any chord in progress.
    pub(crate) fn run_motion(
        &mut self,
        host: &mut dyn Host,
        kind: MotionKind,
        motion: impl Fn(&dyn Host, usize) -> Option<usize>,
    ) {
        let start = host.cursor();
        let Some(target) = motion(&*host, start) else {
            if self.chord.in_chord() || self.pending != PendingOperator::None {
                self.cancel_chord(host);
            }
            return;
        };

        if self.pending == PendingOperator::None {
            let target = if self.mode.is_typing() {
                target.min(host.len())
            } else {
                motion::clamp_to_char(&*host, target)
            };
            host.set_cursor(target, true);
            self.update_selection(host);
            self.finish_chord();
            return;
        }

        let (range, is_line) = motion_range(&*host, start, target, kind);
        self.apply_operator(host, range, is_line);
    }

    /// Apply the pending operator to `range` and end the chord.
    pub(crate) fn apply_operator(&mut self, host: &mut dyn Host, range: Range<usize>, is_line: bool) {
        let op = std::mem::take(&mut self.pending);
        let register = self.active_register.take().unwrap_or(RegisterId::Unnamed);
        debug!(?op, ?range, is_line, %register, "apply operator");

        match op {
            PendingOperator::None => {}
            PendingOperator::Delete => {
                self.registers
                    .copy_from(host, range.clone(), register, is_line);
                let removed = delete_span(&*host, range.clone(), is_line);
                host.replace_range(removed.clone(), "");
                let cursor = if is_line {
                    motion::first_non_blank(&*host, host.line_start(removed.start))
                        .unwrap_or(removed.start)
                } else {
                    removed.start
                };
                host.set_cursor(motion::clamp_to_char(&*host, cursor), true);
            }
            PendingOperator::Change => {
                self.registers
                    .copy_from(host, range.clone(), register, is_line);
                // Changing whole lines leaves one empty line to type into.
                let mut removed = range;
                if is_line
                    && removed.end > removed.start
                    && host.char_at(removed.end - 1) == Some('\n')
                {
                    removed.end -= 1;
                }
                host.replace_range(removed.clone(), "");
                host.set_cursor(removed.start, true);
                self.enter_insert(host);
                return;
            }
            PendingOperator::Yank => {
                self.registers.copy_from(host, range.clone(), register, is_line);
                host.set_cursor(motion::clamp_to_char(&*host, range.start), true);
            }
            PendingOperator::Format => {
                host.auto_indent(range.clone(), self.settings.format_indent_width);
                let start = host.line_start(range.start);
                let cursor = motion::first_non_blank(&*host, start).unwrap_or(start);
                host.set_cursor(cursor, true);
            }
            PendingOperator::IndentLeft => self.shift_lines(host, range, false),
            PendingOperator::IndentRight => self.shift_lines(host, range, true),
        }

        if self.mode.is_visual() {
            self.enter_normal(host);
        } else {
            self.finish_chord();
        }
    }

    /// Start (or, on the doubled key, complete) an operator chord.
    pub(crate) fn start_operator(&mut self, op: PendingOperator, token: &str) {
        if let Some(keymap) = op.keymap() {
            self.pending = op;
            self.start_chord(keymap, token);
        }
    }

    /// `dd`, `yy`, `>>` and friends: the operator on the current line.
    pub(crate) fn operator_line(&mut self, host: &mut dyn Host) {
        let pos = host.cursor();
        let range = line_range(&*host, pos, pos);
        self.apply_operator(host, range, true);
    }

    /// Run `op` on `range` directly, without a motion.
    pub(crate) fn operate(
        &mut self,
        host: &mut dyn Host,
        op: PendingOperator,
        range: Range<usize>,
        is_line: bool,
    ) {
        self.pending = op;
        self.apply_operator(host, range, is_line);
    }

    /// Shift every line touched by `range` one `shift_width` right or left,
    /// as a single edit.
    fn shift_lines(&mut self, host: &mut dyn Host, range: Range<usize>, right: bool) {
        let start = host.line_start(range.start);
        let last = range.end.saturating_sub(1).max(range.start);
        let end = host.line_end(last);
        let text = host.read_range(start..end);

        let sw = self.settings.shift_width;
        let ts = self.settings.tabstop.max(1);
        let unit = if self.settings.expand_tab {
            " ".repeat(sw)
        } else {
            "\t".to_string()
        };

        let shifted: Vec<String> = text
            .split('\n')
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else if right {
                    format!("{unit}{line}")
                } else {
                    let mut width = 0;
                    let mut cut = 0;
                    for ch in line.chars() {
                        let w = match ch {
                            ' ' => 1,
                            '\t' => ts,
                            _ => break,
                        };
                        if width + w > sw {
                            break;
                        }
                        width += w;
                        cut += ch.len_utf8();
                    }
                    line[cut..].to_string()
                }
            })
            .collect();

        host.replace_range(start..end, &shifted.join("\n"));
        let cursor = motion::first_non_blank(&*host, start).unwrap_or(start);
        host.set_cursor(cursor, true);
    }

    /// Paste the chosen register before or after the cursor.
    pub(crate) fn paste(&mut self, host: &mut dyn Host, after: bool) {
        let register = self.active_register.take().unwrap_or(RegisterId::Unnamed);
        let reg = self.registers.fetch(host, register);
        if reg.is_empty() {
            self.finish_chord();
            return;
        }

        let pos = host.cursor();
        if reg.is_line {
            let end = host.line_end(pos);
            let (at, text, line_start) = if !after {
                let at = host.line_start(pos);
                (at, reg.text, at)
            } else if end < host.len() {
                (end + 1, reg.text, end + 1)
            } else if end == 0 || host.char_at(end - 1) == Some('\n') {
                // Empty last line: the text becomes that line.
                (end, reg.text, end)
            } else {
                // Last line has no newline to paste after.
                let body = reg.text.strip_suffix('\n').unwrap_or(&reg.text);
                (end, format!("\n{body}"), end + 1)
            };
            host.replace_range(at..at, &text);
            host.set_cursor(line_start, true);
        } else {
            // Charwise text goes in at the cursor in both directions, so
            // a delete followed by a paste puts the text back.
            host.replace_range(pos..pos, &reg.text);
            let count = reg.text.chars().count();
            host.set_cursor(pos + count.saturating_sub(1), true);
        }
        debug!(%register, after, "paste");
        self.finish_chord();
    }
}

/// Turn a motion's start and landing offsets into an operator range.
pub(crate) fn motion_range(
    host: &dyn Host,
    start: usize,
    target: usize,
    kind: MotionKind,
) -> (Range<usize>, bool) {
    let lo = start.min(target);
    let hi = start.max(target);
    let len = host.len();
    match kind {
        MotionKind::Exclusive => {
            // Line start to line start covers whole lines.
            let is_line = lo < hi && host.line_start(lo) == lo && host.line_start(hi) == hi;
            (lo..hi, is_line)
        }
        MotionKind::Inclusive => {
            let end = if hi >= len || host.char_at(hi) == Some('\n') {
                hi.min(len)
            } else {
                hi + 1
            };
            (lo..end, false)
        }
        MotionKind::Linewise => (line_range(host, lo, hi), true),
    }
}

/// Whole lines from the line of `lo` through the line of `hi`, including the
/// final newline when there is one.
pub(crate) fn line_range(host: &dyn Host, lo: usize, hi: usize) -> Range<usize> {
    let end = host.line_end(hi);
    host.line_start(lo)..(end + 1).min(host.len())
}

/// Span actually removed by a delete. Removing the final line of a buffer
/// that lacks a trailing newline takes the preceding newline with it.
fn delete_span(host: &dyn Host, range: Range<usize>, is_line: bool) -> Range<usize> {
    let ends_without_newline = range.end >= host.len()
        && range.end > range.start
        && host.char_at(range.end - 1) != Some('\n');
    if is_line && ends_without_newline && range.start > 0 {
        range.start - 1..range.end
    } else {
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::key::Key;
    use crate::core::rope_host::RopeHost;

    fn setup(text: &str) -> (Engine, RopeHost) {
        (Engine::default(), RopeHost::with_text(text))
    }

    fn press(engine: &mut Engine, host: &mut RopeHost, keys: &str) {
        for key in Key::parse_seq(keys) {
            engine.handle_key(host, key);
        }
    }

    fn unnamed(engine: &Engine) -> (String, bool) {
        let reg = engine.registers.get(RegisterId::Unnamed);
        (reg.text.clone(), reg.is_line)
    }

    #[test]
    fn test_motion_range_kinds() {
        let host = RopeHost::with_text("abc def\nghi\n");
        assert_eq!(motion_range(&host, 0, 4, MotionKind::Exclusive), (0..4, false));
        assert_eq!(motion_range(&host, 4, 0, MotionKind::Exclusive), (0..4, false));
        assert_eq!(motion_range(&host, 0, 6, MotionKind::Inclusive), (0..7, false));
        // Inclusive never swallows the newline.
        assert_eq!(motion_range(&host, 0, 7, MotionKind::Inclusive), (0..7, false));
        assert_eq!(motion_range(&host, 2, 9, MotionKind::Linewise), (0..12, true));
        // Exclusive from line start to line start is linewise.
        assert_eq!(motion_range(&host, 0, 8, MotionKind::Exclusive), (0..8, true));
    }

    #[test]
    fn test_delete_word() {
        let (mut engine, mut host) = setup("hello world");
        press(&mut engine, &mut host, "dw");
        assert_eq!(host.text(), "world");
        assert_eq!(unnamed(&engine), ("hello ".to_string(), false));
        assert_eq!(host.cursor(), 0);
        assert_eq!(engine.chord_display(), "");
    }

    #[test]
    fn test_delete_word_stops_at_line_end() {
        let (mut engine, mut host) = setup("foo\nbar");
        press(&mut engine, &mut host, "dw");
        assert_eq!(host.text(), "\nbar");
    }

    #[test]
    fn test_change_word_keeps_trailing_space() {
        let (mut engine, mut host) = setup("hello world");
        press(&mut engine, &mut host, "cwbye<Esc>");
        assert_eq!(host.text(), "bye world");
        assert_eq!(engine.mode(), Mode::Normal);
        assert_eq!(unnamed(&engine).0, "hello");
    }

    #[test]
    fn test_delete_line() {
        let (mut engine, mut host) = setup("one\ntwo\nthree");
        press(&mut engine, &mut host, "jdd");
        assert_eq!(host.text(), "one\nthree");
        assert_eq!(unnamed(&engine), ("two\n".to_string(), true));
        assert_eq!(host.cursor(), 4);
    }

    #[test]
    fn test_delete_last_line_without_newline() {
        let (mut engine, mut host) = setup("one\ntwo");
        press(&mut engine, &mut host, "jdd");
        assert_eq!(host.text(), "one");
        assert_eq!(unnamed(&engine), ("two\n".to_string(), true));
        assert_eq!(host.cursor(), 0);
    }

    #[test]
    fn test_delete_down_is_linewise() {
        let (mut engine, mut host) = setup("a\nb\nc\n");
        press(&mut engine, &mut host, "dj");
        assert_eq!(host.text(), "c\n");
        assert_eq!(unnamed(&engine), ("a\nb\n".to_string(), true));
    }

    #[test]
    fn test_delete_inclusive_motions() {
        let (mut engine, mut host) = setup("abc,def");
        press(&mut engine, &mut host, "df,");
        assert_eq!(host.text(), "def");

        let (mut engine, mut host) = setup("abc,def");
        press(&mut engine, &mut host, "dt,");
        assert_eq!(host.text(), ",def");

        let (mut engine, mut host) = setup("abc def");
        press(&mut engine, &mut host, "ld$");
        assert_eq!(host.text(), "a");
        assert_eq!(host.cursor(), 0);
    }

    #[test]
    fn test_delete_backward_seek_is_exclusive() {
        let (mut engine, mut host) = setup("abc,def");
        press(&mut engine, &mut host, "$dF,");
        assert_eq!(host.text(), "abcf");
        let (mut engine, mut host) = setup("abc,def");
        press(&mut engine, &mut host, "$dT,");
        assert_eq!(host.text(), "abc,f");
    }

    #[test]
    fn test_failed_motion_cancels_operator() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "dfz");
        assert_eq!(host.text(), "abc");
        assert_eq!(engine.pending_operator(), PendingOperator::None);
        assert_eq!(engine.active_keymap(), KeymapId::Normal);
        assert_eq!(engine.chord_display(), "");
    }

    #[test]
    fn test_failed_seek_in_visual_returns_to_normal() {
        let (mut engine, mut host) = setup("abc def");
        press(&mut engine, &mut host, "vlfz");
        assert_eq!(engine.mode(), Mode::Normal);
        assert_eq!(host.cursor(), 1);
        assert_eq!(host.view().highlight, None);
        assert_eq!(engine.chord_display(), "");
    }

    #[test]
    fn test_escape_cancels_operator() {
        let (mut engine, mut host) = setup("abc def");
        press(&mut engine, &mut host, "d<Esc>w");
        assert_eq!(host.text(), "abc def");
        assert_eq!(host.cursor(), 4);
        assert!(engine.registers.get(RegisterId::Unnamed).is_empty());
    }

    #[test]
    fn test_unbound_key_cancels_operator() {
        let (mut engine, mut host) = setup("abc def");
        press(&mut engine, &mut host, "dyw");
        assert_eq!(host.text(), "abc def");
        assert_eq!(host.cursor(), 4);
    }

    #[test]
    fn test_yank_leaves_buffer() {
        let (mut engine, mut host) = setup("abc def");
        press(&mut engine, &mut host, "wyb");
        assert_eq!(host.text(), "abc def");
        assert_eq!(unnamed(&engine), ("abc ".to_string(), false));
        assert_eq!(host.cursor(), 0);
    }

    #[test]
    fn test_yank_line_and_paste() {
        let (mut engine, mut host) = setup("one\ntwo\n");
        press(&mut engine, &mut host, "yyjp");
        assert_eq!(host.text(), "one\ntwo\none\n");
        assert_eq!(host.cursor(), 8);
        press(&mut engine, &mut host, "ggP");
        assert_eq!(host.text(), "one\none\ntwo\none\n");
        assert_eq!(host.cursor(), 0);
    }

    #[test]
    fn test_linewise_paste_after_last_line_without_newline() {
        let (mut engine, mut host) = setup("one\ntwo");
        press(&mut engine, &mut host, "yyjp");
        assert_eq!(host.text(), "one\ntwo\none");
        assert_eq!(host.cursor(), 8);
    }

    #[test]
    fn test_charwise_paste() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "ylp");
        assert_eq!(host.text(), "aabc");
        assert_eq!(host.cursor(), 0);
        press(&mut engine, &mut host, "$P");
        assert_eq!(host.text(), "aabac");
        assert_eq!(host.cursor(), 3);
    }

    #[test]
    fn test_delete_then_paste_restores_text() {
        for keys in ["dwp", "dep", "xp", "dfop", "dtop"] {
            let (mut engine, mut host) = setup("hello world");
            press(&mut engine, &mut host, keys);
            assert_eq!(host.text(), "hello world", "{keys}");
        }
        let (mut engine, mut host) = setup("hello world");
        press(&mut engine, &mut host, "wxp");
        assert_eq!(host.text(), "hello world");
        assert_eq!(host.cursor(), 6);
    }

    #[test]
    fn test_paste_empty_register_is_noop() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "p");
        assert_eq!(host.text(), "abc");
    }

    #[test]
    fn test_indent_operators() {
        let (mut engine, mut host) = setup("a\n\nb\n");
        press(&mut engine, &mut host, ">G");
        assert_eq!(host.text(), "    a\n\n    b\n");
        press(&mut engine, &mut host, "gg<lt><lt>");
        assert_eq!(host.text(), "a\n\n    b\n");
    }

    #[test]
    fn test_indent_left_counts_tabs() {
        let (mut engine, mut host) = setup("\t  x\n");
        engine.settings.tabstop = 2;
        press(&mut engine, &mut host, "<lt><lt>");
        assert_eq!(host.text(), "x\n");
    }

    #[test]
    fn test_indent_right_with_tabs() {
        let (mut engine, mut host) = setup("x\n");
        engine.settings.expand_tab = false;
        press(&mut engine, &mut host, ">>");
        assert_eq!(host.text(), "\tx\n");
        assert_eq!(host.cursor(), 1);
    }

    #[test]
    fn test_format_operator() {
        let (mut engine, mut host) = setup("if {\nx\n}\n");
        press(&mut engine, &mut host, "=G");
        assert_eq!(host.text(), "if {\n    x\n}\n");
    }

    #[test]
    fn test_change_line_keeps_empty_line() {
        let (mut engine, mut host) = setup("one\ntwo\n");
        press(&mut engine, &mut host, "ccnew<Esc>");
        assert_eq!(host.text(), "new\ntwo\n");
        assert_eq!(unnamed(&engine), ("one\n".to_string(), true));
    }

    #[test]
    fn test_register_prefix_is_one_shot() {
        let (mut engine, mut host) = setup("abc def");
        press(&mut engine, &mut host, "\"ayw");
        assert_eq!(engine.registers.get(RegisterId::Letter(0)).text, "abc ");
        assert!(engine.registers.get(RegisterId::Unnamed).is_empty());
        assert_eq!(engine.active_register(), None);
        press(&mut engine, &mut host, "yw");
        assert_eq!(unnamed(&engine).0, "abc ");
    }

    #[test]
    fn test_register_prefix_dropped_by_plain_motion() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "\"al");
        assert_eq!(engine.active_register(), None);
        press(&mut engine, &mut host, "x");
        assert!(engine.registers.get(RegisterId::Letter(0)).is_empty());
        assert_eq!(unnamed(&engine).0, "b");
    }
}
