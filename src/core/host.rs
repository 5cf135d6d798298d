//! The capability surface the engine consumes from its embedding editor.
//!
//! The engine owns no text. Every read, edit, cursor move and clipboard
//! round-trip goes through [`Host`]; cosmetic notifications have no-op
//! defaults so a minimal host only implements the buffer and cursor calls.

use std::ops::Range;

use super::error::HostError;
use super::key::Key;
use super::mode::ModeHook;

/// Identifier of a view (window/panel) in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// New view below the current one.
    Horizontal,
    /// New view beside the current one.
    Vertical,
}

pub trait Host {
    // --- Cursor / view ---

    fn active_view(&self) -> ViewId;

    fn views(&self) -> Vec<ViewId>;

    /// Cursor of the active view, as a char offset.
    fn cursor(&self) -> usize;

    fn set_cursor(&mut self, pos: usize, scroll_into_view: bool);

    // --- Buffer ---

    /// Length of the active buffer in chars.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of `range`, clamped to the buffer.
    fn read_range(&self, range: Range<usize>) -> String;

    fn char_at(&self, pos: usize) -> Option<char>;

    /// Replace `range` (clamped to the buffer) with `text`.
    fn replace_range(&mut self, range: Range<usize>, text: &str);

    /// Whether the active buffer has unsaved changes.
    fn is_modified(&self) -> bool {
        false
    }

    // --- Clipboard bridge ---

    fn clipboard_post(&mut self, text: &str) -> Result<(), HostError>;

    fn clipboard_read(&mut self) -> Result<Option<String>, HostError>;

    // --- Modal input ---

    /// Block for the next keystroke of a modal read loop.
    /// `None` aborts the loop, the same as Escape.
    fn next_key(&mut self) -> Option<Key>;

    // --- Notifications and feedback ---

    fn on_enter_mode(&mut self, _hook: ModeHook) {}

    fn set_highlight(&mut self, _range: Option<Range<usize>>) {}

    fn show_prompt(&mut self, _prompt: &str, _text: &str) {}

    fn clear_prompt(&mut self) {}

    fn show_message(&mut self, _message: &str) {}

    // --- Editor facilities ---

    /// Re-indent the lines covered by `range`.
    fn auto_indent(&mut self, _range: Range<usize>, _indent_width: usize) {}

    fn page_up(&mut self) {}

    fn page_down(&mut self) {}

    fn undo(&mut self) {}

    fn redo(&mut self) {}

    fn cycle_view(&mut self) {}

    fn split_view(&mut self, _direction: SplitDirection) {}

    /// Close the active view. Closing the last one fails with
    /// [`HostError::LastView`].
    fn close_view(&mut self) -> Result<(), HostError> {
        Err(HostError::Unsupported("close"))
    }

    fn save(&mut self, _path: Option<&str>) -> Result<(), HostError> {
        Err(HostError::Unsupported("write"))
    }

    /// Open `path` in the active view. Relative paths may be resolved against
    /// the active buffer's directory.
    fn open_file(&mut self, _path: Option<&str>) -> Result<(), HostError> {
        Err(HostError::Unsupported("edit"))
    }

    fn new_file(&mut self) -> Result<(), HostError> {
        Err(HostError::Unsupported("new"))
    }

    fn change_theme(&mut self, _name: Option<&str>) -> Result<(), HostError> {
        Err(HostError::Unsupported("colorscheme"))
    }

    // --- Line helpers (provided) ---

    /// Offset of the first char of the line containing `pos`.
    fn line_start(&self, pos: usize) -> usize {
        let mut p = pos.min(self.len());
        while p > 0 && self.char_at(p - 1) != Some('\n') {
            p -= 1;
        }
        p
    }

    /// Offset of the newline ending the line containing `pos`, or the buffer
    /// length on the last line.
    fn line_end(&self, pos: usize) -> usize {
        let len = self.len();
        let mut p = pos.min(len);
        while p < len && self.char_at(p) != Some('\n') {
            p += 1;
        }
        p
    }

    /// Zero-based line index of `pos`.
    fn line_of(&self, pos: usize) -> usize {
        let end = pos.min(self.len());
        self.read_range(0..end).chars().filter(|&c| c == '\n').count()
    }

    /// Offset of the start of `line`, clamped to the last line.
    fn line_to_pos(&self, line: usize) -> usize {
        let mut pos = 0;
        for _ in 0..line {
            let end = self.line_end(pos);
            if end >= self.len() {
                return self.line_start(end);
            }
            pos = end + 1;
        }
        pos
    }
}
