use std::collections::HashMap;

use super::command::Command;
use super::key::Key;

/// Identifies one dispatch table. Chord tables are live only between a
/// chord's starter key and its completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeymapId {
    Movements,
    Normal,
    Insert,
    Replace,
    Visual,
    Delete,
    Change,
    Yank,
    Format,
    IndentLeft,
    IndentRight,
    Find,
    Til,
    FindBackward,
    TilBackward,
    G,
    Window,
    ChooseRegister,
    ReplaceSingle,
    SetMark,
    JumpMark,
}

impl KeymapId {
    pub const ALL: [KeymapId; 21] = [
        KeymapId::Movements,
        KeymapId::Normal,
        KeymapId::Insert,
        KeymapId::Replace,
        KeymapId::Visual,
        KeymapId::Delete,
        KeymapId::Change,
        KeymapId::Yank,
        KeymapId::Format,
        KeymapId::IndentLeft,
        KeymapId::IndentRight,
        KeymapId::Find,
        KeymapId::Til,
        KeymapId::FindBackward,
        KeymapId::TilBackward,
        KeymapId::G,
        KeymapId::Window,
        KeymapId::ChooseRegister,
        KeymapId::ReplaceSingle,
        KeymapId::SetMark,
        KeymapId::JumpMark,
    ];

    /// The resting tables a mode installs. Everything else is a chord.
    pub fn is_base(self) -> bool {
        matches!(
            self,
            KeymapId::Normal | KeymapId::Insert | KeymapId::Replace | KeymapId::Visual
        )
    }
}

/// A single dispatch table.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<Key, Command>,
    /// Fallback for any unmodified printable key.
    printable: Option<Command>,
    /// Consulted when neither binding above matches.
    parent: Option<KeymapId>,
}

impl Keymap {
    fn with_parent(parent: KeymapId) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    fn own(&self, key: Key) -> Option<Command> {
        self.bindings
            .get(&key)
            .copied()
            .or_else(|| key.printable().and(self.printable))
    }
}

/// All dispatch tables, composed by explicit parent lookup.
#[derive(Debug, Clone)]
pub struct Keymaps {
    maps: HashMap<KeymapId, Keymap>,
}

impl Keymaps {
    /// Tables with no bindings, parents wired as in [`Keymaps::defaults`].
    pub fn empty() -> Self {
        let mut maps = HashMap::new();
        for id in KeymapId::ALL {
            let map = match id {
                KeymapId::Normal
                | KeymapId::Visual
                | KeymapId::Delete
                | KeymapId::Change
                | KeymapId::Yank
                | KeymapId::Format
                | KeymapId::IndentLeft
                | KeymapId::IndentRight => Keymap::with_parent(KeymapId::Movements),
                _ => Keymap::default(),
            };
            maps.insert(id, map);
        }
        Self { maps }
    }

    pub fn defaults() -> Self {
        let mut km = Self::empty();
        km.bind_defaults();
        km
    }

    pub fn bind(&mut self, id: KeymapId, key: Key, command: Command) {
        self.map_mut(id).bindings.insert(key, command);
    }

    pub fn unbind(&mut self, id: KeymapId, key: Key) {
        self.map_mut(id).bindings.remove(&key);
    }

    /// Route every unmodified printable key in `id` to `command`.
    pub fn bind_printable(&mut self, id: KeymapId, command: Command) {
        self.map_mut(id).printable = Some(command);
    }

    /// Resolve `key` in `id`: own binding, own printable binding, then the
    /// parent chain.
    pub fn lookup(&self, id: KeymapId, key: Key) -> Option<Command> {
        let mut current = Some(id);
        // Parent chains are shallow; the bound stops a misconfigured cycle.
        for _ in 0..KeymapId::ALL.len() {
            let map = self.maps.get(&current?)?;
            if let Some(cmd) = map.own(key) {
                return Some(cmd);
            }
            current = map.parent;
        }
        None
    }

    fn map_mut(&mut self, id: KeymapId) -> &mut Keymap {
        self.maps.entry(id).or_default()
    }

    fn bind_str(&mut self, id: KeymapId, bindings: &[(&str, Command)]) {
        for (notation, command) in bindings {
            if let Some(key) = Key::parse(notation) {
                self.bind(id, key, *command);
            }
        }
    }

    fn bind_defaults(&mut self) {
        use Command as C;
        use KeymapId as K;

        self.bind_str(
            K::Movements,
            &[
                ("h", C::MoveLeft),
                ("j", C::MoveDown),
                ("k", C::MoveUp),
                ("l", C::MoveRight),
                ("<Left>", C::MoveLeft),
                ("<Down>", C::MoveDown),
                ("<Up>", C::MoveUp),
                ("<Right>", C::MoveRight),
                ("w", C::WordForward),
                ("e", C::WordEnd),
                ("b", C::WordBackward),
                ("0", C::LineStart),
                ("<Home>", C::LineStart),
                ("^", C::FirstNonBlank),
                ("$", C::LineEnd),
                ("<End>", C::LineEnd),
                ("{", C::ParagraphBackward),
                ("}", C::ParagraphForward),
                ("G", C::BufferBottom),
                ("g", C::StartG),
                ("f", C::StartFind),
                ("t", C::StartTil),
                ("F", C::StartFindBackward),
                ("T", C::StartTilBackward),
                (":", C::StatusCommand),
                ("/", C::SearchForward),
                ("?", C::SearchBackward),
                ("n", C::SearchNext),
                ("N", C::SearchPrev),
                ("*", C::SearchWordUnderCursor),
                ("`", C::StartJumpMark),
                ("<Esc>", C::Cancel),
            ],
        );

        self.bind_str(
            K::Normal,
            &[
                ("i", C::EnterInsert),
                ("a", C::Append),
                ("A", C::AppendLineEnd),
                ("I", C::InsertLineStart),
                ("o", C::OpenLineBelow),
                ("O", C::OpenLineAbove),
                ("r", C::StartReplaceChar),
                ("R", C::EnterReplace),
                ("v", C::EnterVisual),
                ("V", C::EnterVisualLine),
                ("x", C::DeleteChar),
                ("<Del>", C::DeleteChar),
                ("X", C::DeleteCharBackward),
                ("p", C::PasteAfter),
                ("P", C::PasteBefore),
                ("u", C::Undo),
                ("<C-r>", C::Redo),
                ("<C-u>", C::PageUp),
                ("<C-d>", C::PageDown),
                ("<PageUp>", C::PageUp),
                ("<PageDown>", C::PageDown),
                ("J", C::JoinLines),
                ("D", C::DeleteToLineEnd),
                ("C", C::ChangeToLineEnd),
                ("Y", C::YankLine),
                ("d", C::StartDelete),
                ("c", C::StartChange),
                ("y", C::StartYank),
                ("<lt>", C::StartIndentLeft),
                (">", C::StartIndentRight),
                ("=", C::StartFormat),
                ("<C-w>", C::StartWindow),
                ("\"", C::StartChooseRegister),
                ("m", C::StartSetMark),
            ],
        );

        self.bind_str(
            K::Visual,
            &[
                ("d", C::VisualDelete),
                ("x", C::VisualDelete),
                ("c", C::VisualChange),
                ("y", C::VisualYank),
                ("=", C::VisualFormat),
                ("<lt>", C::VisualIndentLeft),
                (">", C::VisualIndentRight),
                ("o", C::VisualSwapEnds),
                ("v", C::EnterVisual),
                ("V", C::EnterVisualLine),
                ("\"", C::StartChooseRegister),
                ("<Esc>", C::ExitToNormal),
            ],
        );

        for id in [K::Insert, K::Replace] {
            self.bind_str(
                id,
                &[
                    ("<BS>", C::InsertBackspace),
                    ("<Del>", C::InsertDelete),
                    ("<CR>", C::InsertNewline),
                    ("<Tab>", C::InsertTab),
                    ("<Left>", C::MoveLeft),
                    ("<Right>", C::MoveRight),
                    ("<Up>", C::MoveUp),
                    ("<Down>", C::MoveDown),
                    ("<Home>", C::LineStart),
                    ("<End>", C::LineEnd),
                    ("<Esc>", C::ExitToNormal),
                ],
            );
        }
        self.bind_printable(K::Insert, C::InsertChar);
        self.bind_printable(K::Replace, C::OverwriteChar);

        // Operator chords: the motion table plus the doubled operator key.
        for (id, double) in [
            (K::Delete, "d"),
            (K::Change, "c"),
            (K::Yank, "y"),
            (K::Format, "="),
            (K::IndentLeft, "<lt>"),
            (K::IndentRight, ">"),
        ] {
            self.bind_str(id, &[(double, C::OperatorLine)]);
        }

        for id in [K::Find, K::Til, K::FindBackward, K::TilBackward] {
            self.bind_printable(id, C::SeekChar);
            self.bind_str(id, &[("<Esc>", C::Cancel)]);
        }

        self.bind_str(
            K::G,
            &[
                ("g", C::BufferTop),
                ("f", C::OpenFileUnderCursor),
                ("<Esc>", C::Cancel),
            ],
        );

        self.bind_str(
            K::Window,
            &[
                ("w", C::CycleView),
                ("<C-w>", C::CycleView),
                ("s", C::SplitHorizontal),
                ("n", C::SplitHorizontal),
                ("v", C::SplitVertical),
                ("q", C::CloseView),
                ("c", C::CloseView),
                ("<Esc>", C::Cancel),
            ],
        );

        for (id, command) in [
            (K::ChooseRegister, C::SelectRegister),
            (K::ReplaceSingle, C::ReplaceChar),
            (K::SetMark, C::SetMark),
            (K::JumpMark, C::JumpMark),
        ] {
            self.bind_printable(id, command);
            self.bind_str(id, &[("<Esc>", C::Cancel)]);
        }
    }
}

impl Default for Keymaps {
    fn default() -> Self {
        Self::defaults()
    }
}
