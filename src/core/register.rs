use std::fmt;
use std::ops::Range;

use tracing::warn;

use super::host::Host;

/// One of the 38 addressable register slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId {
    /// `"`: used when no register was chosen.
    Unnamed,
    /// `*` (also `+`): mirrors the system clipboard.
    Clipboard,
    /// `a`..`z`, stored as 0..26. Uppercase names address the same slot.
    Letter(u8),
    /// `0`..`9`.
    Digit(u8),
}

impl RegisterId {
    pub const COUNT: usize = 38;

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '"' => Some(Self::Unnamed),
            '*' | '+' => Some(Self::Clipboard),
            'a'..='z' => Some(Self::Letter(ch as u8 - b'a')),
            'A'..='Z' => Some(Self::Letter(ch as u8 - b'A')),
            '0'..='9' => Some(Self::Digit(ch as u8 - b'0')),
            _ => None,
        }
    }

    pub fn name(self) -> char {
        match self {
            Self::Unnamed => '"',
            Self::Clipboard => '*',
            Self::Letter(n) => (b'a' + n) as char,
            Self::Digit(n) => (b'0' + n) as char,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Unnamed => 0,
            Self::Clipboard => 1,
            Self::Letter(n) => 2 + n as usize,
            Self::Digit(n) => 28 + n as usize,
        }
    }

    /// Every slot in listing order.
    pub fn all() -> impl Iterator<Item = RegisterId> {
        [Self::Unnamed, Self::Clipboard]
            .into_iter()
            .chain((0..26).map(Self::Letter))
            .chain((0..10).map(Self::Digit))
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}", self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    pub text: String,
    /// Whether the text is a run of whole lines (pasted on line boundaries).
    pub is_line: bool,
}

impl Register {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The register store. Lives as long as the editing session.
#[derive(Debug, Clone)]
pub struct Registers {
    slots: Vec<Register>,
}

impl Registers {
    pub fn new() -> Self {
        Self {
            slots: vec![Register::default(); RegisterId::COUNT],
        }
    }

    pub fn get(&self, id: RegisterId) -> &Register {
        &self.slots[id.index()]
    }

    /// Replace the contents of `id`. The clipboard slot is mirrored out to
    /// the host clipboard; a failed post is logged and the slot keeps the text.
    pub fn set(&mut self, host: &mut dyn Host, id: RegisterId, text: String, is_line: bool) {
        if id == RegisterId::Clipboard {
            if let Err(e) = host.clipboard_post(&text) {
                warn!("clipboard post failed: {e}");
            }
        }
        self.slots[id.index()] = Register { text, is_line };
    }

    /// Copy `range` of the host buffer into `id`.
    pub fn copy_from(
        &mut self,
        host: &mut dyn Host,
        range: Range<usize>,
        id: RegisterId,
        is_line: bool,
    ) {
        let mut text = host.read_range(range);
        if is_line && !text.ends_with('\n') {
            text.push('\n');
        }
        self.set(host, id, text, is_line);
    }

    /// Contents of `id` for a paste. The clipboard slot is refreshed from the
    /// host clipboard first; foreign text is linewise when it ends in `\n`.
    pub fn fetch(&mut self, host: &mut dyn Host, id: RegisterId) -> Register {
        if id == RegisterId::Clipboard {
            match host.clipboard_read() {
                Ok(Some(text)) => {
                    let slot = &mut self.slots[id.index()];
                    if slot.text != text {
                        slot.is_line = text.ends_with('\n');
                        slot.text = text;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("clipboard read failed: {e}"),
            }
        }
        self.slots[id.index()].clone()
    }

    /// `:registers` listing: one line per non-empty slot.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for id in RegisterId::all() {
            let reg = self.get(id);
            if reg.is_empty() {
                continue;
            }
            let kind = if reg.is_line { 'l' } else { 'c' };
            let shown = reg.text.replace('\n', "^J");
            out.push_str(&format!("{kind}  {id}   {shown}\n"));
        }
        out
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rope_host::RopeHost;

    #[test]
    fn test_register_names() {
        assert_eq!(RegisterId::all().count(), RegisterId::COUNT);
        assert_eq!(RegisterId::from_char('a'), Some(RegisterId::Letter(0)));
        assert_eq!(RegisterId::from_char('A'), Some(RegisterId::Letter(0)));
        assert_eq!(RegisterId::from_char('7'), Some(RegisterId::Digit(7)));
        assert_eq!(RegisterId::from_char('+'), Some(RegisterId::Clipboard));
        assert_eq!(RegisterId::from_char('#'), None);
        for id in RegisterId::all() {
            assert_eq!(RegisterId::from_char(id.name()), Some(id));
        }
    }

    #[test]
    fn test_copy_from_host() {
        let mut host = RopeHost::with_text("alpha\nbeta");
        let mut regs = Registers::new();
        regs.copy_from(&mut host, 0..5, RegisterId::Letter(0), false);
        assert_eq!(regs.get(RegisterId::Letter(0)).text, "alpha");
        // Linewise text is always newline terminated.
        regs.copy_from(&mut host, 6..10, RegisterId::Unnamed, true);
        assert_eq!(regs.get(RegisterId::Unnamed).text, "beta\n");
        assert!(regs.get(RegisterId::Unnamed).is_line);
        assert_eq!(host.text(), "alpha\nbeta");
    }

    #[test]
    fn test_clipboard_slot_round_trips() {
        let mut host = RopeHost::new();
        let mut regs = Registers::new();
        regs.set(&mut host, RegisterId::Clipboard, "mine".into(), false);
        assert_eq!(host.clipboard_read().unwrap().as_deref(), Some("mine"));

        // Someone else writes the clipboard: the next fetch pulls it fresh.
        host.clipboard_post("theirs\n").unwrap();
        let reg = regs.fetch(&mut host, RegisterId::Clipboard);
        assert_eq!(reg.text, "theirs\n");
        assert!(reg.is_line);
        assert_eq!(regs.get(RegisterId::Clipboard).text, "theirs\n");
    }

    #[test]
    fn test_listing() {
        let mut host = RopeHost::new();
        let mut regs = Registers::new();
        regs.set(&mut host, RegisterId::Unnamed, "one\n".into(), true);
        regs.set(&mut host, RegisterId::Letter(1), "two".into(), false);
        insta::assert_snapshot!(regs.listing().trim_end(), @r#"
        l  ""   one^J
        c  "b   two
        "#);
    }
}
