//! In-memory [`Host`] over ropey buffers.
//!
//! Used by the test suite and wrapped by the terminal front end. Keys for the
//! modal read loop come from a queue the caller fills ahead of time.

use std::collections::VecDeque;
use std::ops::Range;
use std::path::{Path, PathBuf};

use ropey::Rope;
#[cfg(feature = "system-clipboard")]
use copypasta_ext::prelude::ClipboardProvider;
use tracing::debug;
#[cfg(feature = "system-clipboard")]
use tracing::warn;

use super::buffer::BufferId;
use super::buffer_manager::BufferManager;
use super::cursor::Cursor;
use super::error::HostError;
use super::host::{Host, SplitDirection, ViewId};
use super::key::Key;
use super::mode::ModeHook;
use super::view::View;

/// Undo history depth per host.
const UNDO_LIMIT: usize = 1000;

#[derive(Debug, Clone)]
struct Snapshot {
    buffer_id: BufferId,
    content: Rope,
    cursor: usize,
}

enum Clipboard {
    Memory(Option<String>),
    #[cfg(feature = "system-clipboard")]
    System(Box<dyn copypasta_ext::prelude::ClipboardProviderExt>),
}

impl std::fmt::Debug for Clipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Clipboard::Memory(text) => f.debug_tuple("Memory").field(text).finish(),
            #[cfg(feature = "system-clipboard")]
            Clipboard::System(_) => f.write_str("System"),
        }
    }
}

#[derive(Debug)]
pub struct RopeHost {
    pub buffers: BufferManager,
    views: Vec<View>,
    active: usize,
    next_view_id: usize,
    /// Layout direction of each split, oldest first. Display only.
    pub splits: Vec<SplitDirection>,
    /// Keys handed out by [`Host::next_key`].
    pub keys: VecDeque<Key>,
    clipboard: Clipboard,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// End of the last single-char insertion, so typed runs undo as one step.
    typing_run_end: Option<usize>,
    /// Every mode hook fired, in order.
    pub hooks: Vec<ModeHook>,
    /// Open prompt: (prompt, text).
    pub prompt: Option<(String, String)>,
    pub message: Option<String>,
    pub theme: Option<String>,
}

impl RopeHost {
    pub fn new() -> Self {
        Self::with_text("")
    }

    /// A host with a single unnamed buffer holding `text`.
    pub fn with_text(text: &str) -> Self {
        let mut buffers = BufferManager::new();
        let buffer_id = buffers.create_with_text(text);
        Self {
            buffers,
            views: vec![View::new(ViewId(0), buffer_id)],
            active: 0,
            next_view_id: 1,
            splits: Vec::new(),
            keys: VecDeque::new(),
            clipboard: Clipboard::Memory(None),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            typing_run_end: None,
            hooks: Vec::new(),
            prompt: None,
            message: None,
            theme: None,
        }
    }

    /// A host with a single buffer loaded from `path` (empty if missing).
    pub fn with_file(path: &Path) -> Result<Self, HostError> {
        let mut host = Self::new();
        let old = host.view().buffer_id;
        let id = host.buffers.open_file(path)?;
        host.view_mut().buffer_id = id;
        host.buffers.delete(old, true)?;
        Ok(host)
    }

    /// Route the clipboard register through the system clipboard.
    #[cfg(feature = "system-clipboard")]
    pub fn use_system_clipboard(&mut self) -> bool {
        match copypasta_ext::try_context() {
            Some(ctx) => {
                self.clipboard = Clipboard::System(ctx);
                true
            }
            None => {
                warn!("system clipboard unavailable, keeping in-process clipboard");
                false
            }
        }
    }

    pub fn text(&self) -> String {
        self.state().buffer.to_string()
    }

    /// Queue keys from vim notation for the modal read loop.
    pub fn feed(&mut self, notation: &str) {
        self.keys.extend(Key::parse_seq(notation));
    }

    pub fn view(&self) -> &View {
        &self.views[self.active]
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.views[self.active]
    }

    pub fn all_views(&self) -> &[View] {
        &self.views
    }

    pub fn file_name(&self) -> String {
        self.state().display_name()
    }

    pub fn last_hook(&self) -> Option<ModeHook> {
        self.hooks.last().copied()
    }

    /// Line/column of the active cursor.
    pub fn cursor_position(&self) -> Cursor {
        Cursor::from_offset(&self.state().buffer, self.view().cursor)
    }

    fn state(&self) -> &super::buffer_manager::BufferState {
        let id = self.view().buffer_id;
        match self.buffers.get(id) {
            Some(state) => state,
            None => unreachable!("view {:?} points at a closed buffer", id),
        }
    }

    fn state_mut(&mut self) -> &mut super::buffer_manager::BufferState {
        let id = self.view().buffer_id;
        match self.buffers.get_mut(id) {
            Some(state) => state,
            None => unreachable!("view {:?} points at a closed buffer", id),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            buffer_id: self.view().buffer_id,
            content: self.state().buffer.content.clone(),
            cursor: self.view().cursor,
        }
    }

    fn push_undo(&mut self) {
        let snap = self.snapshot();
        self.undo_stack.push(snap);
        if self.undo_stack.len() > UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Swap the buffer contents with `snap`, returning the state it replaced.
    fn restore(&mut self, snap: Snapshot) -> Option<Snapshot> {
        let cursor = self.view().cursor;
        let state = self.buffers.get_mut(snap.buffer_id)?;
        let previous = Snapshot {
            buffer_id: snap.buffer_id,
            content: std::mem::replace(&mut state.buffer.content, snap.content),
            cursor,
        };
        state.dirty = true;
        if let Some(view) = self.views.iter_mut().find(|v| v.buffer_id == snap.buffer_id) {
            view.cursor = snap.cursor;
        }
        self.typing_run_end = None;
        Some(previous)
    }

    fn scroll_to_cursor(&mut self) {
        let pos = self.view().cursor;
        let line = self.state().buffer.char_to_line(pos);
        self.view_mut().ensure_line_visible(line);
    }

    fn clamp_cursors(&mut self) {
        let id = self.view().buffer_id;
        let len = self.state().buffer.len_chars();
        for view in self.views.iter_mut().filter(|v| v.buffer_id == id) {
            view.cursor = view.cursor.min(len);
        }
    }
}

impl Default for RopeHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for RopeHost {
    fn active_view(&self) -> ViewId {
        self.view().id
    }

    fn views(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.id).collect()
    }

    fn cursor(&self) -> usize {
        self.view().cursor
    }

    fn set_cursor(&mut self, pos: usize, scroll_into_view: bool) {
        let len = self.len();
        self.view_mut().cursor = pos.min(len);
        if scroll_into_view {
            self.scroll_to_cursor();
        }
    }

    fn len(&self) -> usize {
        self.state().buffer.len_chars()
    }

    fn read_range(&self, range: Range<usize>) -> String {
        self.state().buffer.slice(range)
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.state().buffer.char_at(pos)
    }

    fn replace_range(&mut self, range: Range<usize>, text: &str) {
        let single_char_typed =
            range.is_empty() && text.chars().count() == 1 && !text.contains('\n');
        let continues_run = single_char_typed && self.typing_run_end == Some(range.start);
        if !continues_run {
            self.push_undo();
        }
        self.typing_run_end = if single_char_typed {
            Some(range.start + 1)
        } else {
            None
        };

        let state = self.state_mut();
        state.buffer.replace(range, text);
        state.dirty = true;
        self.clamp_cursors();
    }

    fn is_modified(&self) -> bool {
        self.state().dirty
    }

    fn clipboard_post(&mut self, text: &str) -> Result<(), HostError> {
        match &mut self.clipboard {
            Clipboard::Memory(slot) => {
                *slot = Some(text.to_string());
                Ok(())
            }
            #[cfg(feature = "system-clipboard")]
            Clipboard::System(ctx) => ctx
                .set_contents(text.to_string())
                .map_err(|e| HostError::Clipboard(e.to_string())),
        }
    }

    fn clipboard_read(&mut self) -> Result<Option<String>, HostError> {
        match &mut self.clipboard {
            Clipboard::Memory(slot) => Ok(slot.clone()),
            #[cfg(feature = "system-clipboard")]
            Clipboard::System(ctx) => ctx
                .get_contents()
                .map(Some)
                .map_err(|e| HostError::Clipboard(e.to_string())),
        }
    }

    fn next_key(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }

    fn on_enter_mode(&mut self, hook: ModeHook) {
        self.hooks.push(hook);
    }

    fn set_highlight(&mut self, range: Option<Range<usize>>) {
        self.view_mut().highlight = range;
    }

    fn show_prompt(&mut self, prompt: &str, text: &str) {
        self.prompt = Some((prompt.to_string(), text.to_string()));
    }

    fn clear_prompt(&mut self) {
        self.prompt = None;
    }

    fn show_message(&mut self, message: &str) {
        self.message = Some(message.to_string());
    }

    /// Re-indent every line of `range` to the previous non-blank line's
    /// indentation, deepened by `indent_width` after a line ending in `{`
    /// and shallowed for a line starting with `}`.
    fn auto_indent(&mut self, range: Range<usize>, indent_width: usize) {
        let buffer = &self.state().buffer;
        let first = buffer.char_to_line(range.start);
        let last = buffer.char_to_line(range.end.saturating_sub(1).max(range.start));
        let mut lines: Vec<String> = Vec::new();
        for line in first..=last.min(buffer.len_lines().saturating_sub(1)) {
            lines.push(buffer.line_text(line));
        }

        let mut base = (0..first)
            .rev()
            .map(|l| buffer.line_text(l))
            .find(|t| !t.trim().is_empty())
            .map(|t| {
                let indent = t.chars().take_while(|c| *c == ' ').count();
                if t.trim_end().ends_with('{') {
                    indent + indent_width
                } else {
                    indent
                }
            })
            .unwrap_or(0);

        let mut out = String::new();
        for text in &lines {
            let body = text.trim_start_matches([' ', '\t']);
            if body.trim().is_empty() {
                out.push_str(if text.ends_with('\n') { "\n" } else { "" });
                continue;
            }
            let depth = if body.starts_with('}') {
                base.saturating_sub(indent_width)
            } else {
                base
            };
            out.push_str(&" ".repeat(depth));
            out.push_str(body);
            base = if body.trim_end().ends_with('{') {
                depth + indent_width
            } else {
                depth
            };
        }

        let start = buffer.line_to_char(first);
        let end = start + lines.iter().map(|l| l.chars().count()).sum::<usize>();
        if self.read_range(start..end) != out {
            self.replace_range(start..end, &out);
        }
    }

    fn page_up(&mut self) {
        let rows = self.view().viewport_lines.max(1);
        let line = self.line_of(self.cursor()).saturating_sub(rows);
        let pos = self.line_to_pos(line);
        self.view_mut().scroll_top = self.view().scroll_top.saturating_sub(rows);
        self.set_cursor(pos, true);
    }

    fn page_down(&mut self) {
        let rows = self.view().viewport_lines.max(1);
        let line = self.line_of(self.cursor()) + rows;
        let pos = self.line_to_pos(line);
        self.view_mut().scroll_top += rows;
        self.set_cursor(pos, true);
    }

    fn undo(&mut self) {
        let Some(snap) = self.undo_stack.pop() else {
            self.show_message("Already at oldest change");
            return;
        };
        if let Some(current) = self.restore(snap) {
            self.redo_stack.push(current);
        }
    }

    fn redo(&mut self) {
        let Some(snap) = self.redo_stack.pop() else {
            self.show_message("Already at newest change");
            return;
        };
        if let Some(current) = self.restore(snap) {
            self.undo_stack.push(current);
        }
    }

    fn cycle_view(&mut self) {
        self.active = (self.active + 1) % self.views.len();
        debug!(view = ?self.view().id, "cycled view");
    }

    fn split_view(&mut self, direction: SplitDirection) {
        let mut view = self.view().clone();
        view.id = ViewId(self.next_view_id);
        self.next_view_id += 1;
        self.views.insert(self.active + 1, view);
        self.active += 1;
        self.splits.push(direction);
        debug!(view = ?self.view().id, ?direction, "split view");
    }

    fn close_view(&mut self) -> Result<(), HostError> {
        if self.views.len() == 1 {
            return Err(HostError::LastView);
        }
        self.views.remove(self.active);
        self.splits.pop();
        if self.active >= self.views.len() {
            self.active = self.views.len() - 1;
        }
        Ok(())
    }

    fn save(&mut self, path: Option<&str>) -> Result<(), HostError> {
        let lines = self.state_mut().save(path.map(Path::new))?;
        let msg = format!("\"{}\" {}L written", self.file_name(), lines);
        self.show_message(&msg);
        Ok(())
    }

    fn open_file(&mut self, path: Option<&str>) -> Result<(), HostError> {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return Err(HostError::NoFileName);
        };
        let mut target = PathBuf::from(path);
        if target.is_relative() {
            if let Some(dir) = self.state().file_path.as_ref().and_then(|p| p.parent()) {
                target = dir.join(target);
            }
        }
        let id = self.buffers.open_file(&target)?;
        let view = self.view_mut();
        view.buffer_id = id;
        view.cursor = 0;
        view.scroll_top = 0;
        view.highlight = None;
        self.typing_run_end = None;
        Ok(())
    }

    fn new_file(&mut self) -> Result<(), HostError> {
        let id = self.buffers.create();
        let view = self.view_mut();
        view.buffer_id = id;
        view.cursor = 0;
        view.scroll_top = 0;
        view.highlight = None;
        Ok(())
    }

    fn change_theme(&mut self, name: Option<&str>) -> Result<(), HostError> {
        match name.filter(|n| !n.is_empty()) {
            Some(name) => {
                self.theme = Some(name.to_string());
                Ok(())
            }
            None => {
                let current = self.theme.clone().unwrap_or_else(|| "default".to_string());
                self.show_message(&current);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_cursor_clamp() {
        let mut host = RopeHost::with_text("hello world");
        host.set_cursor(100, true);
        assert_eq!(host.cursor(), 11);
        host.replace_range(5..11, "");
        assert_eq!(host.text(), "hello");
        assert_eq!(host.cursor(), 5);
        assert!(host.is_modified());
    }

    #[test]
    fn test_line_helpers() {
        let host = RopeHost::with_text("ab\ncd\n\nef");
        assert_eq!(host.line_start(4), 3);
        assert_eq!(host.line_end(4), 5);
        assert_eq!(host.line_of(7), 3);
        assert_eq!(host.line_to_pos(2), 6);
        assert_eq!(host.line_to_pos(3), 7);
        // Past the end clamps to the last line.
        assert_eq!(host.line_to_pos(99), 7);
    }

    #[test]
    fn test_undo_coalesces_typing() {
        let mut host = RopeHost::with_text("x");
        host.replace_range(0..0, "a");
        host.replace_range(1..1, "b");
        host.replace_range(2..2, "c");
        assert_eq!(host.text(), "abcx");
        host.undo();
        assert_eq!(host.text(), "x");
        host.redo();
        assert_eq!(host.text(), "abcx");
    }

    #[test]
    fn test_undo_separate_edits() {
        let mut host = RopeHost::with_text("one two");
        host.replace_range(0..4, "");
        host.replace_range(0..3, "");
        assert_eq!(host.text(), "");
        host.undo();
        assert_eq!(host.text(), "two");
        host.undo();
        assert_eq!(host.text(), "one two");
        host.undo();
        assert_eq!(host.message.as_deref(), Some("Already at oldest change"));
    }

    #[test]
    fn test_split_cycle_close() {
        let mut host = RopeHost::with_text("abc");
        host.split_view(SplitDirection::Vertical);
        assert_eq!(host.views(), vec![ViewId(0), ViewId(1)]);
        assert_eq!(host.active_view(), ViewId(1));
        host.cycle_view();
        assert_eq!(host.active_view(), ViewId(0));
        host.close_view().unwrap();
        assert_eq!(host.views(), vec![ViewId(1)]);
        assert!(matches!(host.close_view(), Err(HostError::LastView)));
    }

    #[test]
    fn test_memory_clipboard() {
        let mut host = RopeHost::new();
        assert_eq!(host.clipboard_read().unwrap(), None);
        host.clipboard_post("hi").unwrap();
        assert_eq!(host.clipboard_read().unwrap().as_deref(), Some("hi"));
    }

    #[test]
    fn test_auto_indent_follows_braces() {
        let mut host = RopeHost::with_text("fn x() {\nfoo();\n      }\n");
        let len = host.len();
        host.auto_indent(0..len, 4);
        assert_eq!(host.text(), "fn x() {\n    foo();\n}\n");
    }

    #[test]
    fn test_feed_queues_keys() {
        let mut host = RopeHost::new();
        host.feed("ab<CR>");
        assert_eq!(host.next_key(), Some(Key::char('a')));
        assert_eq!(host.next_key(), Some(Key::char('b')));
        assert_eq!(host.next_key(), Some(Key::ENTER));
        assert_eq!(host.next_key(), None);
    }
}
