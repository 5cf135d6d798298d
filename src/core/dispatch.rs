//! Keystroke dispatch: resolve a key in the live keymap and run the command.

use tracing::{debug, warn};

use super::command::Command;
use super::engine::{Engine, EngineAction};
use super::error::HostError;
use super::host::{Host, SplitDirection};
use super::key::Key;
use super::keymap::KeymapId;
use super::motion::{self, MotionKind, Seek};
use super::operator::{line_range, PendingOperator};
use super::register::RegisterId;
use super::search::{self, is_word_char, SearchDirection, SearchState};
use super::Mode;

impl Engine {
    /// Process one keystroke to completion.
    pub fn handle_key(&mut self, host: &mut dyn Host, key: Key) -> EngineAction {
        let keymap = self.chord.keymap;
        match self.keymaps.lookup(keymap, key) {
            Some(command) => {
                debug!(key = %key, ?keymap, command = command.name(), "dispatch");
                self.execute(host, command, key)
            }
            None => {
                // A key no table claims ends the chord; in a base table it is
                // simply ignored.
                if self.chord.in_chord() || self.pending != PendingOperator::None {
                    self.cancel_chord(host);
                }
                EngineAction::None
            }
        }
    }

    /// Feed a sequence of keys in `<C-w>`-style notation.
    pub fn handle_keys(&mut self, host: &mut dyn Host, notation: &str) -> EngineAction {
        let mut action = EngineAction::None;
        for key in Key::parse_seq(notation) {
            if self.handle_key(host, key) == EngineAction::Quit {
                action = EngineAction::Quit;
            }
        }
        action
    }

    /// Run `command` as if `key` had been bound to it.
    pub fn execute(&mut self, host: &mut dyn Host, command: Command, key: Key) -> EngineAction {
        use Command as C;

        match command {
            // --- Motions ---
            C::MoveLeft => self.run_motion(host, MotionKind::Exclusive, motion::left),
            C::MoveRight => self.run_motion(host, MotionKind::Exclusive, motion::right),
            C::MoveUp => self.run_motion(host, MotionKind::Linewise, motion::up),
            C::MoveDown => self.run_motion(host, MotionKind::Linewise, motion::down),
            C::WordForward => self.word_forward(host),
            C::WordEnd => self.run_motion(host, MotionKind::Inclusive, motion::word_end),
            C::WordBackward => self.run_motion(host, MotionKind::Exclusive, motion::word_backward),
            C::LineStart => self.run_motion(host, MotionKind::Exclusive, motion::line_start),
            C::FirstNonBlank => {
                self.run_motion(host, MotionKind::Exclusive, motion::first_non_blank)
            }
            C::LineEnd if self.mode.is_typing() => {
                self.run_motion(host, MotionKind::Exclusive, |h, p| Some(h.line_end(p)))
            }
            C::LineEnd => self.run_motion(host, MotionKind::Inclusive, motion::line_end),
            C::ParagraphForward => {
                self.run_motion(host, MotionKind::Exclusive, motion::paragraph_forward)
            }
            C::ParagraphBackward => {
                self.run_motion(host, MotionKind::Exclusive, motion::paragraph_backward)
            }
            C::BufferTop => self.run_motion(host, MotionKind::Linewise, motion::buffer_top),
            C::BufferBottom => self.run_motion(host, MotionKind::Linewise, motion::buffer_bottom),
            C::SearchNext => self.search_repeat(host, false),
            C::SearchPrev => self.search_repeat(host, true),
            C::SearchWordUnderCursor => self.search_word_under_cursor(host),
            C::JumpMark => match key.printable().and_then(|ch| self.mark(ch)) {
                Some(mark) => self.run_motion(host, MotionKind::Exclusive, |h, _| {
                    Some(mark.min(h.len()))
                }),
                None => self.cancel_chord(host),
            },
            C::SeekChar => self.seek_char(host, key),
            C::OperatorLine => self.operator_line(host),

            // --- Chord starters ---
            C::StartDelete => self.start_operator(PendingOperator::Delete, &key.token()),
            C::StartChange => self.start_operator(PendingOperator::Change, &key.token()),
            C::StartYank => self.start_operator(PendingOperator::Yank, &key.token()),
            C::StartFormat => self.start_operator(PendingOperator::Format, &key.token()),
            C::StartIndentLeft => self.start_operator(PendingOperator::IndentLeft, &key.token()),
            C::StartIndentRight => self.start_operator(PendingOperator::IndentRight, &key.token()),
            C::StartFind => self.start_seek(Seek::Find, KeymapId::Find, key),
            C::StartTil => self.start_seek(Seek::Til, KeymapId::Til, key),
            C::StartFindBackward => {
                self.start_seek(Seek::FindBackward, KeymapId::FindBackward, key)
            }
            C::StartTilBackward => self.start_seek(Seek::TilBackward, KeymapId::TilBackward, key),
            C::StartG => self.start_chord(KeymapId::G, &key.token()),
            C::StartWindow => self.start_chord(KeymapId::Window, &key.token()),
            C::StartChooseRegister => self.start_chord(KeymapId::ChooseRegister, &key.token()),
            C::StartReplaceChar => self.start_chord(KeymapId::ReplaceSingle, &key.token()),
            C::StartSetMark => self.start_chord(KeymapId::SetMark, &key.token()),
            C::StartJumpMark => self.start_chord(KeymapId::JumpMark, &key.token()),

            // --- Chord continuations ---
            C::SelectRegister => {
                match key.printable().and_then(RegisterId::from_char) {
                    Some(id) => {
                        self.active_register = Some(id);
                        self.chord.push(&key.token());
                        self.resume_base_keymap();
                    }
                    // Not a register name: back to Normal, unnamed implied.
                    None => self.enter_normal(host),
                }
            }
            C::ReplaceChar => self.replace_char(host, key),
            C::SetMark => {
                let pos = host.cursor();
                match key.printable() {
                    Some(ch) if self.set_mark(ch, pos) => self.finish_chord(),
                    _ => self.cancel_chord(host),
                }
            }
            C::OpenFileUnderCursor => {
                self.open_file_under_cursor(host);
                self.finish_chord();
            }

            // --- Prompts ---
            C::StatusCommand => return self.status_command(host),
            C::SearchForward => self.search_prompt(host, SearchDirection::Forward),
            C::SearchBackward => self.search_prompt(host, SearchDirection::Backward),

            // --- Mode entry ---
            C::EnterInsert => self.enter_insert(host),
            C::Append => {
                let pos = host.cursor();
                if pos < host.line_end(pos) {
                    host.set_cursor(pos + 1, true);
                }
                self.enter_insert(host);
            }
            C::AppendLineEnd => {
                let end = host.line_end(host.cursor());
                host.set_cursor(end, true);
                self.enter_insert(host);
            }
            C::InsertLineStart => {
                let pos = host.cursor();
                let first = motion::first_non_blank(&*host, pos).unwrap_or(pos);
                host.set_cursor(first, true);
                self.enter_insert(host);
            }
            C::OpenLineBelow => {
                let pos = host.cursor();
                let indent = line_indent(&*host, pos);
                let end = host.line_end(pos);
                host.replace_range(end..end, &format!("\n{indent}"));
                host.set_cursor(end + 1 + indent.chars().count(), true);
                self.enter_insert(host);
            }
            C::OpenLineAbove => {
                let pos = host.cursor();
                let indent = line_indent(&*host, pos);
                let start = host.line_start(pos);
                host.replace_range(start..start, &format!("{indent}\n"));
                host.set_cursor(start + indent.chars().count(), true);
                self.enter_insert(host);
            }
            C::EnterReplace => self.enter_replace(host),
            C::EnterVisual if self.mode == Mode::Visual => self.enter_normal(host),
            C::EnterVisual => self.enter_visual(host),
            C::EnterVisualLine if self.mode == Mode::VisualLine => self.enter_normal(host),
            C::EnterVisualLine => self.enter_visual_line(host),
            C::ExitToNormal => self.enter_normal(host),
            C::Cancel => self.cancel_chord(host),

            // --- Normal-mode edits ---
            C::DeleteChar => {
                let pos = host.cursor();
                if pos < host.line_end(pos) {
                    self.operate(host, PendingOperator::Delete, pos..pos + 1, false);
                } else {
                    self.finish_chord();
                }
            }
            C::DeleteCharBackward => {
                let pos = host.cursor();
                if pos > host.line_start(pos) {
                    self.operate(host, PendingOperator::Delete, pos - 1..pos, false);
                } else {
                    self.finish_chord();
                }
            }
            C::DeleteToLineEnd => {
                let pos = host.cursor();
                let end = host.line_end(pos);
                if pos < end {
                    self.operate(host, PendingOperator::Delete, pos..end, false);
                } else {
                    self.finish_chord();
                }
            }
            C::ChangeToLineEnd => {
                let pos = host.cursor();
                let end = host.line_end(pos);
                self.operate(host, PendingOperator::Change, pos..end, false);
            }
            C::YankLine => {
                let pos = host.cursor();
                let range = line_range(&*host, pos, pos);
                self.operate(host, PendingOperator::Yank, range, true);
                host.set_cursor(pos, false);
            }
            C::PasteAfter => self.paste(host, true),
            C::PasteBefore => self.paste(host, false),
            C::JoinLines => {
                self.join_lines(host);
                self.finish_chord();
            }
            C::Undo => {
                host.undo();
                self.clamp_cursor(host);
            }
            C::Redo => {
                host.redo();
                self.clamp_cursor(host);
            }
            C::PageUp => {
                host.page_up();
                self.clamp_cursor(host);
            }
            C::PageDown => {
                host.page_down();
                self.clamp_cursor(host);
            }

            // --- Visual mode ---
            C::VisualDelete => self.visual_operate(host, PendingOperator::Delete),
            C::VisualChange => self.visual_operate(host, PendingOperator::Change),
            C::VisualYank => self.visual_operate(host, PendingOperator::Yank),
            C::VisualFormat => self.visual_operate(host, PendingOperator::Format),
            C::VisualIndentLeft => self.visual_operate(host, PendingOperator::IndentLeft),
            C::VisualIndentRight => self.visual_operate(host, PendingOperator::IndentRight),
            C::VisualSwapEnds => {
                if let Some(sel) = self.selection.as_mut() {
                    sel.swap_ends();
                    host.set_cursor(sel.cursor, true);
                }
            }

            // --- Insert / Replace typing ---
            C::InsertChar => {
                if let Some(ch) = key.printable() {
                    self.insert_text(host, &ch.to_string());
                }
            }
            C::InsertBackspace => {
                let pos = host.cursor();
                if pos > 0 {
                    if self.mode == Mode::Insert {
                        host.replace_range(pos - 1..pos, "");
                    }
                    host.set_cursor(pos - 1, true);
                }
            }
            C::InsertDelete => {
                let pos = host.cursor();
                if pos < host.len() {
                    host.replace_range(pos..pos + 1, "");
                }
            }
            C::InsertNewline => {
                let pos = host.cursor();
                let start = host.line_start(pos);
                // Carry the indentation typed so far on this line.
                let indent: String = host
                    .read_range(start..pos)
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect();
                self.insert_text(host, &format!("\n{indent}"));
            }
            C::InsertTab => {
                let tab = if self.settings.expand_tab {
                    " ".repeat(self.settings.tabstop)
                } else {
                    "\t".to_string()
                };
                self.insert_text(host, &tab);
            }
            C::OverwriteChar => {
                if let Some(ch) = key.printable() {
                    let pos = host.cursor();
                    let end = if pos < host.line_end(pos) { pos + 1 } else { pos };
                    host.replace_range(pos..end, &ch.to_string());
                    host.set_cursor(pos + 1, true);
                }
            }

            // --- Windows ---
            C::CycleView => {
                host.cycle_view();
                self.finish_chord();
            }
            C::SplitHorizontal => {
                host.split_view(SplitDirection::Horizontal);
                self.finish_chord();
            }
            C::SplitVertical => {
                host.split_view(SplitDirection::Vertical);
                self.finish_chord();
            }
            C::CloseView => {
                self.finish_chord();
                match host.close_view() {
                    Ok(()) => {}
                    Err(HostError::LastView) => return EngineAction::Quit,
                    Err(e) => self.report(host, &e),
                }
            }
        }
        EngineAction::None
    }

    // =======================================================================
    // Command helpers
    // =======================================================================

    /// `w` moves to the next word start; under an operator it stops at the
    /// line end, and `cw` on a word changes only to the word's end.
    fn word_forward(&mut self, host: &mut dyn Host) {
        let pos = host.cursor();
        let on_text = host.char_at(pos).is_some_and(|c| !c.is_whitespace());
        match self.pending {
            PendingOperator::Change if on_text => {
                self.run_motion(host, MotionKind::Inclusive, change_word_end)
            }
            PendingOperator::None => {
                self.run_motion(host, MotionKind::Exclusive, motion::word_forward)
            }
            _ => self.run_motion(host, MotionKind::Exclusive, motion::word_forward_op),
        }
    }

    fn start_seek(&mut self, seek: Seek, keymap: KeymapId, key: Key) {
        self.seek = Some(seek);
        self.start_chord(keymap, &key.token());
    }

    /// Complete `f`/`t`/`F`/`T`. Forward seeks include the landing char;
    /// backward ones stop short of the cursor.
    fn seek_char(&mut self, host: &mut dyn Host, key: Key) {
        let (Some(seek), Some(target)) = (self.seek, key.printable()) else {
            self.cancel_chord(host);
            return;
        };
        // A seek with no landing char ends visual mode too.
        if motion::seek_char(&*host, host.cursor(), target, seek).is_none() {
            self.enter_normal(host);
            return;
        }
        let kind = if seek.is_forward() {
            MotionKind::Inclusive
        } else {
            MotionKind::Exclusive
        };
        self.run_motion(host, kind, |h, p| motion::seek_char(h, p, target, seek));
    }

    /// `r{c}`: overwrite the char under the cursor, cursor unmoved.
    fn replace_char(&mut self, host: &mut dyn Host, key: Key) {
        let pos = host.cursor();
        match key.printable() {
            Some(ch) if pos < host.line_end(pos) => {
                host.replace_range(pos..pos + 1, &ch.to_string());
                host.set_cursor(pos, false);
                self.finish_chord();
            }
            _ => self.cancel_chord(host),
        }
    }

    /// `J`: join the next line onto this one with a single space.
    fn join_lines(&mut self, host: &mut dyn Host) {
        let end = host.line_end(host.cursor());
        if end >= host.len() {
            return;
        }
        let mut next = end + 1;
        while matches!(host.char_at(next), Some(' ' | '\t')) {
            next += 1;
        }
        let sep = match host.char_at(next) {
            None | Some('\n') => "",
            _ if end == host.line_start(end) => "",
            _ => " ",
        };
        host.replace_range(end..next, sep);
        host.set_cursor(end, true);
    }

    /// `gf`: open the file named between the quotes around the cursor.
    fn open_file_under_cursor(&mut self, host: &mut dyn Host) {
        let pos = host.cursor();
        let start = host.line_start(pos);
        let line: Vec<char> = host.read_range(start..host.line_end(pos)).chars().collect();
        let col = pos - start;
        let is_quote = |c: char| c == '"' || c == '\'';

        let open = (0..=col.min(line.len()))
            .rev()
            .find(|&i| line.get(i).copied().is_some_and(is_quote));
        let name = open.and_then(|open| {
            let close = (open + 1..line.len()).find(|&i| line[i] == line[open])?;
            (close > open + 1).then(|| line[open + 1..close].iter().collect::<String>())
        });

        match name {
            Some(name) => {
                debug!(%name, "open file under cursor");
                if let Err(e) = host.open_file(Some(&name)) {
                    self.report(host, &e);
                }
            }
            None => host.show_message("No file name under cursor"),
        }
    }

    fn visual_operate(&mut self, host: &mut dyn Host, op: PendingOperator) {
        match self.selection.clone() {
            Some(sel) => self.operate(host, op, sel.range, sel.linewise),
            None => self.enter_normal(host),
        }
    }

    fn insert_text(&mut self, host: &mut dyn Host, text: &str) {
        let pos = host.cursor();
        host.replace_range(pos..pos, text);
        host.set_cursor(pos + text.chars().count(), true);
    }

    /// Keep the Normal-mode cursor on a char after the host moved it.
    fn clamp_cursor(&mut self, host: &mut dyn Host) {
        if !self.mode.is_typing() {
            let pos = motion::clamp_to_char(&*host, host.cursor());
            host.set_cursor(pos, true);
        }
        self.update_selection(host);
        self.finish_chord();
    }

    pub(crate) fn report(&mut self, host: &mut dyn Host, err: &dyn std::error::Error) {
        warn!("{err}");
        host.show_message(&err.to_string());
    }

    // =======================================================================
    // Search
    // =======================================================================

    fn search_prompt(&mut self, host: &mut dyn Host, direction: SearchDirection) {
        let Some(input) = self.read_prompt(host, direction.prompt()) else {
            // Aborted: an operator waiting on the search is dropped too.
            if self.pending != PendingOperator::None {
                self.cancel_chord(host);
            }
            return;
        };
        let pattern = if input.is_empty() {
            self.search.pattern.clone()
        } else {
            input
        };
        if pattern.is_empty() {
            host.show_message("No previous search pattern");
            self.cancel_chord(host);
            return;
        }
        self.search_to(host, pattern, direction, true);
    }

    /// `n` / `N`: repeat the last search, `N` in the opposite direction.
    /// The reversal is not remembered.
    fn search_repeat(&mut self, host: &mut dyn Host, reverse: bool) {
        if self.search.is_empty() {
            host.show_message("No previous search pattern");
            self.cancel_chord(host);
            return;
        }
        let direction = if reverse {
            self.search.direction.reversed()
        } else {
            self.search.direction
        };
        let pattern = self.search.pattern.clone();
        self.search_to(host, pattern, direction, false);
    }

    fn search_word_under_cursor(&mut self, host: &mut dyn Host) {
        match search::word_at(&*host, host.cursor()) {
            Some(word) => self.search_to(host, word, SearchDirection::Forward, true),
            None => {
                host.show_message("No string under cursor");
                self.cancel_chord(host);
            }
        }
    }

    /// Move to (or operate up to) the next match of `pattern`. A miss leaves
    /// the cursor and the remembered search untouched.
    fn search_to(
        &mut self,
        host: &mut dyn Host,
        pattern: String,
        direction: SearchDirection,
        remember: bool,
    ) {
        let from = host.cursor();
        let Some(found) = search::find(&*host, &pattern, from, direction, self.search_options())
        else {
            host.show_message(&format!("Pattern not found: {pattern}"));
            self.cancel_chord(host);
            return;
        };

        let highlight = self.mode == Mode::Normal && self.pending == PendingOperator::None;
        let width = pattern.chars().count();
        if remember {
            self.search = SearchState { pattern, direction };
        }
        self.run_motion(host, MotionKind::Exclusive, |_, _| Some(found));
        if highlight {
            host.set_highlight(Some(found..found + width));
        }
    }
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(host: &dyn Host, pos: usize) -> String {
    let start = host.line_start(pos);
    host.read_range(start..host.line_end(pos))
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

/// End of the word under the cursor for `cw`; a one-char word ends where it
/// starts.
fn change_word_end(host: &dyn Host, pos: usize) -> Option<usize> {
    let same_run = match (host.char_at(pos), host.char_at(pos + 1)) {
        (Some(c), Some(n)) => !n.is_whitespace() && is_word_char(c) == is_word_char(n),
        _ => false,
    };
    if same_run {
        motion::word_end(host, pos)
    } else {
        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rope_host::RopeHost;

    fn setup(text: &str) -> (Engine, RopeHost) {
        (Engine::default(), RopeHost::with_text(text))
    }

    fn press(engine: &mut Engine, host: &mut RopeHost, keys: &str) -> EngineAction {
        engine.handle_keys(host, keys)
    }

    #[test]
    fn test_basic_motions() {
        let (mut engine, mut host) = setup("hello world\nsecond line");
        press(&mut engine, &mut host, "w");
        assert_eq!(host.cursor(), 6);
        press(&mut engine, &mut host, "e");
        assert_eq!(host.cursor(), 10);
        press(&mut engine, &mut host, "b");
        assert_eq!(host.cursor(), 6);
        press(&mut engine, &mut host, "$");
        assert_eq!(host.cursor(), 10);
        press(&mut engine, &mut host, "0");
        assert_eq!(host.cursor(), 0);
        press(&mut engine, &mut host, "G");
        assert_eq!(host.cursor(), 12);
        press(&mut engine, &mut host, "gg");
        assert_eq!(host.cursor(), 0);
    }

    #[test]
    fn test_normal_cursor_never_on_newline() {
        let (mut engine, mut host) = setup("ab\ncd");
        press(&mut engine, &mut host, "llll");
        assert_eq!(host.cursor(), 1);
    }

    #[test]
    fn test_chord_display_tracks_keys() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "\"a");
        insta::assert_snapshot!(engine.chord_display(), @r#""a"#);
        press(&mut engine, &mut host, "d");
        insta::assert_snapshot!(engine.chord_display(), @r#""ad"#);
        press(&mut engine, &mut host, "f");
        insta::assert_snapshot!(engine.chord_display(), @r#""adf"#);
        press(&mut engine, &mut host, "c");
        assert_eq!(engine.chord_display(), "");
        assert_eq!(host.text(), "");
        assert_eq!(engine.registers.get(RegisterId::Letter(0)).text, "abc");
    }

    #[test]
    fn test_window_chord_display() {
        let (mut engine, mut host) = setup("");
        press(&mut engine, &mut host, "<C-w>");
        insta::assert_snapshot!(engine.chord_display(), @"^W");
        press(&mut engine, &mut host, "v");
        assert_eq!(host.all_views().len(), 2);
        assert_eq!(engine.chord_display(), "");
    }

    #[test]
    fn test_invalid_register_returns_to_normal() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "vl\"#");
        assert_eq!(engine.mode(), Mode::Normal);
        assert_eq!(engine.active_register(), None);
        press(&mut engine, &mut host, "yl");
        assert_eq!(engine.registers.get(RegisterId::Unnamed).text, "b");
    }

    #[test]
    fn test_registers_are_independent() {
        let (mut engine, mut host) = setup("alpha beta");
        press(&mut engine, &mut host, "\"ayw");
        press(&mut engine, &mut host, "w\"byw");
        press(&mut engine, &mut host, "\"bP");
        assert_eq!(engine.registers.get(RegisterId::Letter(0)).text, "alpha ");
        assert_eq!(host.text(), "alpha betabeta");
    }

    #[test]
    fn test_clipboard_register_round_trip() {
        let (mut engine, mut host) = setup("copy me");
        press(&mut engine, &mut host, "\"*yw");
        assert_eq!(host.clipboard_read().unwrap().as_deref(), Some("copy "));
        host.clipboard_post("line\n").unwrap();
        press(&mut engine, &mut host, "\"*p");
        assert_eq!(host.text(), "copy me\nline");
    }

    #[test]
    fn test_visual_yank_length() {
        let (mut engine, mut host) = setup("abcdef");
        press(&mut engine, &mut host, "lvlly");
        let reg = engine.registers.get(RegisterId::Unnamed);
        assert_eq!(reg.text, "bcd");
        assert!(!reg.is_line);
        assert_eq!(engine.mode(), Mode::Normal);
        assert_eq!(host.cursor(), 1);
    }

    #[test]
    fn test_visual_line_delete() {
        let (mut engine, mut host) = setup("one\ntwo\nthree\n");
        press(&mut engine, &mut host, "lVjd");
        assert_eq!(host.text(), "three\n");
        let reg = engine.registers.get(RegisterId::Unnamed);
        assert_eq!(reg.text, "one\ntwo\n");
        assert!(reg.is_line);
    }

    #[test]
    fn test_visual_change_and_swap() {
        let (mut engine, mut host) = setup("abcdef");
        press(&mut engine, &mut host, "lvlo");
        assert_eq!(host.cursor(), 1);
        press(&mut engine, &mut host, "hcX<Esc>");
        assert_eq!(host.text(), "Xdef");
    }

    #[test]
    fn test_visual_escape_keeps_text() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "vl<Esc>");
        assert_eq!(host.text(), "abc");
        assert_eq!(engine.mode(), Mode::Normal);
        assert_eq!(host.cursor(), 1);
    }

    #[test]
    fn test_visual_operator_chord_escape_keeps_selection() {
        let (mut engine, mut host) = setup("abc def");
        press(&mut engine, &mut host, "vf<Esc>");
        assert_eq!(engine.mode(), Mode::Visual);
        assert!(engine.selection().is_some());
        press(&mut engine, &mut host, "fdd");
        assert_eq!(host.text(), "ef");
    }

    #[test]
    fn test_insert_typing() {
        let (mut engine, mut host) = setup("");
        press(&mut engine, &mut host, "ihello<BS><BS>p<CR>x<Esc>");
        assert_eq!(host.text(), "help\nx");
        assert_eq!(engine.mode(), Mode::Normal);
    }

    #[test]
    fn test_insert_newline_keeps_indent() {
        let (mut engine, mut host) = setup("    foo");
        press(&mut engine, &mut host, "A<CR>bar<Esc>");
        assert_eq!(host.text(), "    foo\n    bar");
    }

    #[test]
    fn test_insert_tab_expands() {
        let (mut engine, mut host) = setup("");
        press(&mut engine, &mut host, "i<Tab>x");
        assert_eq!(host.text(), "    x");
        engine.settings.expand_tab = false;
        press(&mut engine, &mut host, "<Tab>");
        assert_eq!(host.text(), "    x\t");
    }

    #[test]
    fn test_insert_arrow_reaches_line_end() {
        let (mut engine, mut host) = setup("ab\ncd");
        press(&mut engine, &mut host, "i<Right><Right>!");
        assert_eq!(host.text(), "ab!\ncd");
    }

    #[test]
    fn test_replace_mode() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "Rxyzw<BS><Esc>");
        assert_eq!(host.text(), "xyzw");
        assert_eq!(engine.mode(), Mode::Normal);
        assert_eq!(host.cursor(), 2);
    }

    #[test]
    fn test_replace_single_char() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "lrX");
        assert_eq!(host.text(), "aXc");
        assert_eq!(host.cursor(), 1);
        assert_eq!(engine.mode(), Mode::Normal);
    }

    #[test]
    fn test_open_lines() {
        let (mut engine, mut host) = setup("  one\ntwo");
        press(&mut engine, &mut host, "onew<Esc>");
        assert_eq!(host.text(), "  one\n  new\ntwo");
        press(&mut engine, &mut host, "GOup<Esc>");
        assert_eq!(host.text(), "  one\n  new\nup\ntwo");
    }

    #[test]
    fn test_append_variants() {
        let (mut engine, mut host) = setup("  abc");
        press(&mut engine, &mut host, "Iz<Esc>");
        assert_eq!(host.text(), "  zabc");
        press(&mut engine, &mut host, "A!<Esc>");
        assert_eq!(host.text(), "  zabc!");
        press(&mut engine, &mut host, "0a-<Esc>");
        assert_eq!(host.text(), " - zabc!");
    }

    #[test]
    fn test_line_edits() {
        let (mut engine, mut host) = setup("abc def\nghi");
        press(&mut engine, &mut host, "wD");
        assert_eq!(host.text(), "abc \nghi");
        assert_eq!(engine.registers.get(RegisterId::Unnamed).text, "def");
        press(&mut engine, &mut host, "0xX");
        assert_eq!(host.text(), "bc \nghi");
        press(&mut engine, &mut host, "Cnew<Esc>");
        assert_eq!(host.text(), "new\nghi");
        press(&mut engine, &mut host, "Y");
        assert_eq!(engine.registers.get(RegisterId::Unnamed).text, "new\n");
    }

    #[test]
    fn test_join_lines() {
        let (mut engine, mut host) = setup("one\n    two\n\nthree");
        press(&mut engine, &mut host, "J");
        assert_eq!(host.text(), "one two\n\nthree");
        assert_eq!(host.cursor(), 3);
        press(&mut engine, &mut host, "J");
        assert_eq!(host.text(), "one two\nthree");
    }

    #[test]
    fn test_undo_redo() {
        let (mut engine, mut host) = setup("abc");
        press(&mut engine, &mut host, "x");
        assert_eq!(host.text(), "bc");
        press(&mut engine, &mut host, "u");
        assert_eq!(host.text(), "abc");
        press(&mut engine, &mut host, "<C-r>");
        assert_eq!(host.text(), "bc");
    }

    #[test]
    fn test_search_forward_and_repeat() {
        let (mut engine, mut host) = setup("foo bar foo baz foo");
        host.feed("foo<CR>");
        press(&mut engine, &mut host, "/");
        assert_eq!(host.cursor(), 8);
        assert_eq!(host.view().highlight, Some(8..11));
        press(&mut engine, &mut host, "n");
        assert_eq!(host.cursor(), 16);
        press(&mut engine, &mut host, "n");
        assert_eq!(host.cursor(), 0);
        press(&mut engine, &mut host, "N");
        assert_eq!(host.cursor(), 16);
        // N does not flip the stored direction.
        assert_eq!(engine.search_state().direction, SearchDirection::Forward);
        assert!(host.prompt.is_none());
    }

    #[test]
    fn test_search_backward_prompt() {
        let (mut engine, mut host) = setup("ab ab ab");
        press(&mut engine, &mut host, "$");
        host.feed("ab<CR>");
        press(&mut engine, &mut host, "?");
        assert_eq!(host.cursor(), 6);
        press(&mut engine, &mut host, "n");
        assert_eq!(host.cursor(), 3);
    }

    #[test]
    fn test_search_not_found() {
        let (mut engine, mut host) = setup("abc");
        host.feed("zz<CR>");
        press(&mut engine, &mut host, "/");
        assert_eq!(host.cursor(), 0);
        assert_eq!(host.message.as_deref(), Some("Pattern not found: zz"));
        assert!(engine.search_state().is_empty());
    }

    #[test]
    fn test_search_prompt_editing_and_abort() {
        let (mut engine, mut host) = setup("abc xyz");
        host.feed("xq<BS>y<Tab><CR>");
        press(&mut engine, &mut host, "/");
        assert_eq!(host.cursor(), 4);
        assert_eq!(engine.search_state().pattern, "xy");

        host.feed("ab<Esc>");
        press(&mut engine, &mut host, "/");
        assert_eq!(host.cursor(), 4);
        assert_eq!(engine.search_state().pattern, "xy");
        assert_eq!(engine.active_keymap(), KeymapId::Normal);
    }

    #[test]
    fn test_empty_search_reuses_pattern() {
        let (mut engine, mut host) = setup("ab ab ab");
        host.feed("ab<CR><CR>");
        press(&mut engine, &mut host, "//");
        assert_eq!(host.cursor(), 6);
    }

    #[test]
    fn test_delete_to_search_match() {
        let (mut engine, mut host) = setup("keep this, drop");
        host.feed(",<CR>");
        press(&mut engine, &mut host, "d/");
        assert_eq!(host.text(), ", drop");
        assert_eq!(engine.registers.get(RegisterId::Unnamed).text, "keep this");
    }

    #[test]
    fn test_search_word_under_cursor() {
        let (mut engine, mut host) = setup("let x = foo; foo();");
        press(&mut engine, &mut host, "fo*");
        assert_eq!(host.cursor(), 13);
        assert_eq!(engine.search_state().pattern, "foo");
    }

    #[test]
    fn test_ignore_case_search() {
        let (mut engine, mut host) = setup("x Foo");
        engine.settings.ignore_case = true;
        host.feed("foo<CR>");
        press(&mut engine, &mut host, "/");
        assert_eq!(host.cursor(), 2);
    }

    #[test]
    fn test_paragraph_motions() {
        let (mut engine, mut host) = setup("a\nb\n\nc\nd");
        press(&mut engine, &mut host, "}");
        assert_eq!(host.cursor(), 4);
        press(&mut engine, &mut host, "{");
        assert_eq!(host.cursor(), 0);
        press(&mut engine, &mut host, "d}");
        assert_eq!(host.text(), "\nc\nd");
    }

    #[test]
    fn test_open_file_under_cursor() {
        let dir = std::env::temp_dir().join(format!("vimchord-gf-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let target = dir.join("target.txt");
        std::fs::write(&target, "opened").unwrap();
        let line = format!("see \"{}\" here", target.display());
        let (mut engine, mut host) = setup(&line);
        press(&mut engine, &mut host, "fagf");
        assert_eq!(host.text(), "opened");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_close_last_view_quits() {
        let (mut engine, mut host) = setup("");
        assert_eq!(press(&mut engine, &mut host, "<C-w>s"), EngineAction::None);
        assert_eq!(press(&mut engine, &mut host, "<C-w>q"), EngineAction::None);
        assert_eq!(press(&mut engine, &mut host, "<C-w>q"), EngineAction::Quit);
    }

    #[test]
    fn test_custom_binding() {
        let (mut engine, mut host) = setup("abc");
        engine.keymaps.bind(
            KeymapId::Normal,
            Key::char('Q'),
            Command::from_name("delete_to_line_end").unwrap(),
        );
        press(&mut engine, &mut host, "lQ");
        assert_eq!(host.text(), "a");
    }
}
