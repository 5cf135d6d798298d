use super::keymap::KeymapId;

/// Keys typed since the last completed command, and the table they selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordState {
    /// Human-readable tokens for the chord bar, at most `capacity` chars.
    pub display: String,
    capacity: usize,
    /// The dispatch table that receives the next key.
    pub keymap: KeymapId,
}

impl ChordState {
    pub fn new(capacity: usize) -> Self {
        Self {
            display: String::with_capacity(capacity),
            capacity,
            keymap: KeymapId::Normal,
        }
    }

    /// Append `token`, dropping whatever does not fit.
    pub fn push(&mut self, token: &str) {
        for ch in token.chars() {
            if self.display.chars().count() >= self.capacity {
                break;
            }
            self.display.push(ch);
        }
    }

    pub fn clear(&mut self) {
        self.display.clear();
    }

    /// Whether a chord table (rather than a mode's base table) is live.
    pub fn in_chord(&self) -> bool {
        !self.keymap.is_base()
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        if self.display.chars().count() > capacity {
            self.display = self.display.chars().take(capacity).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_truncates_on_char_boundary() {
        let mut chord = ChordState::new(4);
        chord.push("\"a");
        chord.push("d");
        chord.push("éé");
        insta::assert_snapshot!(chord.display, @r#""adé"#);
        chord.push("x");
        assert_eq!(chord.display.chars().count(), 4);
        chord.clear();
        assert!(chord.display.is_empty());
    }

    #[test]
    fn test_shrinking_capacity() {
        let mut chord = ChordState::new(16);
        chord.push("^Wv");
        chord.set_capacity(2);
        assert_eq!(chord.display, "^W");
    }

    #[test]
    fn test_in_chord() {
        let mut chord = ChordState::new(16);
        assert!(!chord.in_chord());
        chord.keymap = KeymapId::Delete;
        assert!(chord.in_chord());
    }
}
