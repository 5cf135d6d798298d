use tracing::debug;

use super::chord::ChordState;
use super::command_line::CommandRegistry;
use super::host::Host;
use super::keymap::{KeymapId, Keymaps};
use super::motion::Seek;
use super::operator::PendingOperator;
use super::register::{RegisterId, Registers};
use super::search::{SearchOptions, SearchState};
use super::selection::SelectionState;
use super::settings::Settings;
use super::Mode;

/// Actions returned from `handle_key` that the host loop must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAction {
    None,
    /// The last view was asked to close.
    Quit,
}

/// Number of mark slots: `a`-`z` then `0`-`9`.
pub const MARK_COUNT: usize = 36;

/// One editing session: everything modal that outlives a single keystroke.
///
/// The engine owns no text. Every call takes the [`Host`] it edits, so one
/// engine can drive any buffer the host makes active.
#[derive(Debug)]
pub struct Engine {
    // --- Modal state ---
    pub(crate) mode: Mode,
    pub(crate) pending: PendingOperator,
    /// Seek flavour while an `f`/`t`/`F`/`T` chord waits for its char.
    pub(crate) seek: Option<Seek>,
    pub(crate) chord: ChordState,
    pub(crate) selection: Option<SelectionState>,

    // --- Session data ---
    pub registers: Registers,
    /// Register chosen with `"x` for the next yank/delete/paste.
    pub(crate) active_register: Option<RegisterId>,
    pub(crate) search: SearchState,
    pub(crate) marks: [Option<usize>; MARK_COUNT],

    // --- Configuration ---
    pub keymaps: Keymaps,
    pub(crate) commands: CommandRegistry,
    pub settings: Settings,
}

impl Engine {
    pub fn new(settings: Settings) -> Self {
        let mut engine = Self {
            mode: Mode::Normal,
            pending: PendingOperator::None,
            seek: None,
            chord: ChordState::new(settings.chord_capacity),
            selection: None,
            registers: Registers::new(),
            active_register: None,
            search: SearchState::default(),
            marks: [None; MARK_COUNT],
            keymaps: Keymaps::defaults(),
            commands: CommandRegistry::new(),
            settings,
        };
        engine.register_builtin_commands();
        engine
    }

    // =======================================================================
    // Queries
    // =======================================================================

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pending_operator(&self) -> PendingOperator {
        self.pending
    }

    /// Keys of the chord in progress, for the chord bar.
    pub fn chord_display(&self) -> &str {
        &self.chord.display
    }

    pub fn active_keymap(&self) -> KeymapId {
        self.chord.keymap
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.as_ref()
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn active_register(&self) -> Option<RegisterId> {
        self.active_register
    }

    pub fn mark(&self, name: char) -> Option<usize> {
        mark_index(name).and_then(|i| self.marks[i])
    }

    pub(crate) fn search_options(&self) -> SearchOptions {
        SearchOptions {
            wrap_scan: self.settings.wrap_scan,
            ignore_case: self.settings.ignore_case,
        }
    }

    // =======================================================================
    // Mode transitions
    // =======================================================================

    pub fn enter_normal(&mut self, host: &mut dyn Host) {
        let leaving_typing = self.mode.is_typing();
        self.transition(host, Mode::Normal);
        if leaving_typing {
            // Normal-mode cursor stands on a char, not between two.
            let pos = host.cursor();
            if pos > host.line_start(pos) {
                host.set_cursor(pos - 1, true);
            }
        }
    }

    pub fn enter_insert(&mut self, host: &mut dyn Host) {
        self.transition(host, Mode::Insert);
    }

    pub fn enter_replace(&mut self, host: &mut dyn Host) {
        self.transition(host, Mode::Replace);
    }

    pub fn enter_visual(&mut self, host: &mut dyn Host) {
        self.enter_visual_mode(host, false);
    }

    pub fn enter_visual_line(&mut self, host: &mut dyn Host) {
        self.enter_visual_mode(host, true);
    }

    fn enter_visual_mode(&mut self, host: &mut dyn Host, linewise: bool) {
        let selection = match self.selection.take() {
            // Switching flavour keeps the anchor.
            Some(mut sel) if self.mode.is_visual() => {
                sel.set_linewise(&*host, linewise);
                sel
            }
            _ => SelectionState::new(&*host, host.cursor(), linewise),
        };
        let mode = if linewise {
            Mode::VisualLine
        } else {
            Mode::Visual
        };
        self.transition(host, mode);
        host.set_highlight(Some(selection.range.clone()));
        self.selection = Some(selection);
    }

    /// Every mode change funnels through here: drop pending operator and
    /// chord, drop the selection when leaving the visual modes, install the
    /// mode's keymap and notify the host once per actual transition.
    fn transition(&mut self, host: &mut dyn Host, mode: Mode) {
        let previous = self.mode;
        self.pending = PendingOperator::None;
        self.seek = None;
        self.active_register = None;
        self.chord.clear();
        if previous.is_visual() && !mode.is_visual() {
            self.selection = None;
            host.set_highlight(None);
        }
        self.mode = mode;
        self.chord.keymap = base_keymap(mode);
        if previous.hook() != mode.hook() {
            debug!(from = ?previous, to = ?mode, "mode transition");
            host.on_enter_mode(mode.hook());
        }
    }

    // =======================================================================
    // Chord bookkeeping
    // =======================================================================

    /// Switch to a chord table and show `token` in the chord bar.
    pub(crate) fn start_chord(&mut self, keymap: KeymapId, token: &str) {
        self.chord.keymap = keymap;
        self.chord.push(token);
    }

    /// Return to the mode's base table, keeping the chord bar text.
    pub(crate) fn resume_base_keymap(&mut self) {
        self.chord.keymap = base_keymap(self.mode);
    }

    /// A command completed: the chord is over.
    pub(crate) fn finish_chord(&mut self) {
        self.pending = PendingOperator::None;
        self.active_register = None;
        self.seek = None;
        self.chord.clear();
        self.chord.keymap = base_keymap(self.mode);
    }

    /// Escape, or a chord that cannot complete. Nothing is applied and the
    /// mode (with any visual selection) is kept.
    pub fn cancel_chord(&mut self, host: &mut dyn Host) {
        if self.chord.in_chord() || self.pending != PendingOperator::None {
            debug!(chord = %self.chord.display, "chord cancelled");
        }
        self.finish_chord();
        if let Some(sel) = &self.selection {
            host.set_highlight(Some(sel.range.clone()));
        }
    }

    /// Re-extend the visual selection to the host cursor.
    pub(crate) fn update_selection(&mut self, host: &mut dyn Host) {
        if let Some(sel) = self.selection.as_mut() {
            sel.update(&*host, host.cursor());
            host.set_highlight(Some(sel.range.clone()));
        }
    }

    // =======================================================================
    // Marks
    // =======================================================================

    pub(crate) fn set_mark(&mut self, name: char, pos: usize) -> bool {
        match mark_index(name) {
            Some(i) => {
                self.marks[i] = Some(pos);
                true
            }
            None => false,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

/// The table a mode rests on between chords.
pub(crate) fn base_keymap(mode: Mode) -> KeymapId {
    match mode {
        Mode::Normal => KeymapId::Normal,
        Mode::Insert => KeymapId::Insert,
        Mode::Replace => KeymapId::Replace,
        Mode::Visual | Mode::VisualLine => KeymapId::Visual,
    }
}

fn mark_index(name: char) -> Option<usize> {
    match name {
        'a'..='z' => Some(name as usize - 'a' as usize),
        '0'..='9' => Some(26 + name as usize - '0' as usize),
        _ => None,
    }
}
