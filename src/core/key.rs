use std::fmt;

/// Named and printable keys the engine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Escape,
    Backspace,
    Enter,
    Tab,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
    };

    pub fn is_empty(self) -> bool {
        !self.ctrl && !self.alt
    }
}

/// A single keystroke as delivered by the host.
///
/// Shift is folded into the character itself (`'D'` rather than shift+`'d'`),
/// so only Ctrl and Alt travel as modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub mods: Modifiers,
}

impl Key {
    pub const ESCAPE: Key = Key::named(KeyCode::Escape);
    pub const ENTER: Key = Key::named(KeyCode::Enter);
    pub const BACKSPACE: Key = Key::named(KeyCode::Backspace);

    pub const fn named(code: KeyCode) -> Self {
        Self {
            code,
            mods: Modifiers::NONE,
        }
    }

    pub const fn char(ch: char) -> Self {
        Self::named(KeyCode::Char(ch))
    }

    pub const fn ctrl(ch: char) -> Self {
        Self {
            code: KeyCode::Char(ch),
            mods: Modifiers {
                ctrl: true,
                alt: false,
            },
        }
    }

    /// The character carried by an unmodified printable key.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch) if self.mods.is_empty() && !ch.is_control() => Some(ch),
            _ => None,
        }
    }

    /// Short human-readable form used in the chord display (`d`, `^W`, `<Esc>`).
    pub fn token(&self) -> String {
        let base = match self.code {
            KeyCode::Char(ch) if self.mods.ctrl => format!("^{}", ch.to_ascii_uppercase()),
            KeyCode::Char(ch) => ch.to_string(),
            KeyCode::Escape => "<Esc>".to_string(),
            KeyCode::Backspace => "<BS>".to_string(),
            KeyCode::Enter => "<CR>".to_string(),
            KeyCode::Tab => "<Tab>".to_string(),
            KeyCode::Delete => "<Del>".to_string(),
            KeyCode::Left => "<Left>".to_string(),
            KeyCode::Right => "<Right>".to_string(),
            KeyCode::Up => "<Up>".to_string(),
            KeyCode::Down => "<Down>".to_string(),
            KeyCode::Home => "<Home>".to_string(),
            KeyCode::End => "<End>".to_string(),
            KeyCode::PageUp => "<PageUp>".to_string(),
            KeyCode::PageDown => "<PageDown>".to_string(),
        };
        if self.mods.alt {
            format!("M-{base}")
        } else {
            base
        }
    }

    /// Parse a single key from vim-style notation: `x`, `<C-w>`, `<Esc>`, `<CR>`.
    pub fn parse(notation: &str) -> Option<Key> {
        let mut chars = notation.chars();
        let first = chars.next()?;
        if chars.as_str().is_empty() {
            return Some(Key::char(first));
        }
        let inner = notation.strip_prefix('<')?.strip_suffix('>')?;

        let mut mods = Modifiers::NONE;
        let mut rest = inner;
        loop {
            if let Some(r) = rest.strip_prefix("C-").or_else(|| rest.strip_prefix("c-")) {
                mods.ctrl = true;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("M-").or_else(|| rest.strip_prefix("A-")) {
                mods.alt = true;
                rest = r;
            } else {
                break;
            }
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "esc" => KeyCode::Escape,
            "bs" | "backspace" => KeyCode::Backspace,
            "cr" | "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "del" | "delete" => KeyCode::Delete,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            "lt" => KeyCode::Char('<'),
            _ => {
                let mut it = rest.chars();
                let ch = it.next()?;
                if it.next().is_some() {
                    return None;
                }
                KeyCode::Char(if mods.ctrl { ch.to_ascii_lowercase() } else { ch })
            }
        };
        Some(Key { code, mods })
    }

    /// Parse a run of keys (`"d2w"`, `"<C-w>v"`) into individual keystrokes.
    pub fn parse_seq(notation: &str) -> Vec<Key> {
        let mut keys = Vec::new();
        let mut rest = notation;
        while let Some(ch) = rest.chars().next() {
            if ch == '<' {
                if let Some(close) = rest.find('>') {
                    if let Some(key) = Key::parse(&rest[..=close]) {
                        keys.push(key);
                        rest = &rest[close + 1..];
                        continue;
                    }
                }
            }
            keys.push(Key::char(ch));
            rest = &rest[ch.len_utf8()..];
        }
        keys
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_named() {
        assert_eq!(Key::parse("x"), Some(Key::char('x')));
        assert_eq!(Key::parse("<Esc>"), Some(Key::ESCAPE));
        assert_eq!(Key::parse("<CR>"), Some(Key::ENTER));
        assert_eq!(Key::parse("<C-w>"), Some(Key::ctrl('w')));
        assert_eq!(Key::parse("<C-W>"), Some(Key::ctrl('w')));
        assert_eq!(Key::parse("<bogus>"), None);
    }

    #[test]
    fn test_parse_seq() {
        let keys = Key::parse_seq("d<C-w>v<Esc>");
        assert_eq!(
            keys,
            vec![Key::char('d'), Key::ctrl('w'), Key::char('v'), Key::ESCAPE]
        );
        // A stray '<' is just a character.
        assert_eq!(Key::parse_seq("<<"), vec![Key::char('<'), Key::char('<')]);
    }

    #[test]
    fn test_tokens() {
        assert_eq!(Key::char('d').token(), "d");
        assert_eq!(Key::ctrl('w').token(), "^W");
        assert_eq!(Key::ESCAPE.token(), "<Esc>");
    }

    #[test]
    fn test_printable() {
        assert_eq!(Key::char('a').printable(), Some('a'));
        assert_eq!(Key::ctrl('a').printable(), None);
        assert_eq!(Key::ENTER.printable(), None);
    }
}
