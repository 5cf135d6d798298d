/// Every named entry point the engine exposes to key bindings.
///
/// Hosts bind physical keys to these by name through
/// [`Keymaps::bind`](super::keymap::Keymaps::bind); [`Command::from_name`]
/// resolves names from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // --- Motions ---
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    WordForward,
    WordEnd,
    WordBackward,
    LineStart,
    FirstNonBlank,
    LineEnd,
    ParagraphForward,
    ParagraphBackward,
    BufferTop,
    BufferBottom,
    SearchNext,
    SearchPrev,
    SearchWordUnderCursor,
    /// Jump to the mark named by the key (`` `x ``).
    JumpMark,
    /// Seek the key's char in the direction of the active seek chord.
    SeekChar,
    /// Operator key pressed twice: act on the current line.
    OperatorLine,

    // --- Chord starters ---
    StartDelete,
    StartChange,
    StartYank,
    StartFormat,
    StartIndentLeft,
    StartIndentRight,
    StartFind,
    StartTil,
    StartFindBackward,
    StartTilBackward,
    StartG,
    StartWindow,
    StartChooseRegister,
    StartReplaceChar,
    StartSetMark,
    StartJumpMark,

    // --- Chord continuations ---
    SelectRegister,
    ReplaceChar,
    SetMark,
    OpenFileUnderCursor,

    // --- Prompts ---
    StatusCommand,
    SearchForward,
    SearchBackward,

    // --- Mode entry ---
    EnterInsert,
    Append,
    AppendLineEnd,
    InsertLineStart,
    OpenLineBelow,
    OpenLineAbove,
    EnterReplace,
    EnterVisual,
    EnterVisualLine,
    ExitToNormal,
    Cancel,

    // --- Normal-mode edits ---
    DeleteChar,
    DeleteCharBackward,
    DeleteToLineEnd,
    ChangeToLineEnd,
    YankLine,
    PasteAfter,
    PasteBefore,
    JoinLines,
    Undo,
    Redo,
    PageUp,
    PageDown,

    // --- Visual mode ---
    VisualDelete,
    VisualChange,
    VisualYank,
    VisualFormat,
    VisualIndentLeft,
    VisualIndentRight,
    VisualSwapEnds,

    // --- Insert / Replace typing ---
    InsertChar,
    InsertBackspace,
    InsertDelete,
    InsertNewline,
    InsertTab,
    OverwriteChar,

    // --- Windows ---
    CycleView,
    SplitHorizontal,
    SplitVertical,
    CloseView,
}

const NAMES: &[(Command, &str)] = &[
    (Command::MoveLeft, "move_left"),
    (Command::MoveRight, "move_right"),
    (Command::MoveUp, "move_up"),
    (Command::MoveDown, "move_down"),
    (Command::WordForward, "word_forward"),
    (Command::WordEnd, "word_end"),
    (Command::WordBackward, "word_backward"),
    (Command::LineStart, "line_start"),
    (Command::FirstNonBlank, "first_non_blank"),
    (Command::LineEnd, "line_end"),
    (Command::ParagraphForward, "paragraph_forward"),
    (Command::ParagraphBackward, "paragraph_backward"),
    (Command::BufferTop, "buffer_top"),
    (Command::BufferBottom, "buffer_bottom"),
    (Command::SearchNext, "search_next"),
    (Command::SearchPrev, "search_prev"),
    (Command::SearchWordUnderCursor, "search_word_under_cursor"),
    (Command::JumpMark, "jump_mark"),
    (Command::SeekChar, "seek_char"),
    (Command::OperatorLine, "operator_line"),
    (Command::StartDelete, "delete"),
    (Command::StartChange, "change"),
    (Command::StartYank, "yank"),
    (Command::StartFormat, "format"),
    (Command::StartIndentLeft, "indent_left"),
    (Command::StartIndentRight, "indent_right"),
    (Command::StartFind, "find"),
    (Command::StartTil, "til"),
    (Command::StartFindBackward, "find_backward"),
    (Command::StartTilBackward, "til_backward"),
    (Command::StartG, "g_prefix"),
    (Command::StartWindow, "window_prefix"),
    (Command::StartChooseRegister, "choose_register"),
    (Command::StartReplaceChar, "replace_char"),
    (Command::StartSetMark, "set_mark"),
    (Command::StartJumpMark, "goto_mark"),
    (Command::SelectRegister, "select_register"),
    (Command::ReplaceChar, "replace_char_with"),
    (Command::SetMark, "set_mark_at"),
    (Command::OpenFileUnderCursor, "open_file_under_cursor"),
    (Command::StatusCommand, "status_command"),
    (Command::SearchForward, "search_forward"),
    (Command::SearchBackward, "search_backward"),
    (Command::EnterInsert, "insert"),
    (Command::Append, "append"),
    (Command::AppendLineEnd, "append_line_end"),
    (Command::InsertLineStart, "insert_line_start"),
    (Command::OpenLineBelow, "open_line_below"),
    (Command::OpenLineAbove, "open_line_above"),
    (Command::EnterReplace, "replace_mode"),
    (Command::EnterVisual, "visual"),
    (Command::EnterVisualLine, "visual_line"),
    (Command::ExitToNormal, "normal"),
    (Command::Cancel, "cancel"),
    (Command::DeleteChar, "delete_char"),
    (Command::DeleteCharBackward, "delete_char_backward"),
    (Command::DeleteToLineEnd, "delete_to_line_end"),
    (Command::ChangeToLineEnd, "change_to_line_end"),
    (Command::YankLine, "yank_line"),
    (Command::PasteAfter, "paste_after"),
    (Command::PasteBefore, "paste_before"),
    (Command::JoinLines, "join_lines"),
    (Command::Undo, "undo"),
    (Command::Redo, "redo"),
    (Command::PageUp, "page_up"),
    (Command::PageDown, "page_down"),
    (Command::VisualDelete, "visual_delete"),
    (Command::VisualChange, "visual_change"),
    (Command::VisualYank, "visual_yank"),
    (Command::VisualFormat, "visual_format"),
    (Command::VisualIndentLeft, "visual_indent_left"),
    (Command::VisualIndentRight, "visual_indent_right"),
    (Command::VisualSwapEnds, "visual_swap_ends"),
    (Command::InsertChar, "insert_char"),
    (Command::InsertBackspace, "insert_backspace"),
    (Command::InsertDelete, "insert_delete"),
    (Command::InsertNewline, "insert_newline"),
    (Command::InsertTab, "insert_tab"),
    (Command::OverwriteChar, "overwrite_char"),
    (Command::CycleView, "cycle_view"),
    (Command::SplitHorizontal, "split_horizontal"),
    (Command::SplitVertical, "split_vertical"),
    (Command::CloseView, "close_view"),
];

impl Command {
    pub fn name(self) -> &'static str {
        NAMES
            .iter()
            .find(|(cmd, _)| *cmd == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    pub fn from_name(name: &str) -> Option<Command> {
        NAMES.iter().find(|(_, n)| *n == name).map(|(cmd, _)| *cmd)
    }

    pub fn all() -> impl Iterator<Item = Command> {
        NAMES.iter().map(|(cmd, _)| *cmd)
    }
}
