/// Editing mode. Exactly one is active per [`Engine`](super::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Replace,
    Visual,
    VisualLine,
}

impl Mode {
    /// Label shown in the status line.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
            Mode::Replace => "REPLACE",
            Mode::Visual => "VISUAL",
            Mode::VisualLine => "VISUAL LINE",
        }
    }

    pub fn is_visual(self) -> bool {
        matches!(self, Mode::Visual | Mode::VisualLine)
    }

    /// Insert and Replace both type text into the buffer.
    pub fn is_typing(self) -> bool {
        matches!(self, Mode::Insert | Mode::Replace)
    }

    /// The host notification fired when this mode is entered.
    /// Both visual flavours share one hook.
    pub fn hook(self) -> ModeHook {
        match self {
            Mode::Normal => ModeHook::Normal,
            Mode::Insert => ModeHook::Insert,
            Mode::Replace => ModeHook::Replace,
            Mode::Visual | Mode::VisualLine => ModeHook::Visual,
        }
    }
}

/// The four cosmetic notifications a host can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeHook {
    Normal,
    Insert,
    Replace,
    Visual,
}
