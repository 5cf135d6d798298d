//! Terminal front end for the engine.
//!
//! Wraps [`RopeHost`] in a [`Host`] that draws with ratatui and reads keys
//! from crossterm. The engine's modal read loops (`:`, `/`, `?`) pull keys
//! through [`Host::next_key`], which redraws before blocking so the prompt
//! stays current.

use std::io::{self, Stdout};
use std::ops::Range;
use std::path::PathBuf;

use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::cursor::SetCursorStyle;
use ratatui::crossterm::event::{
    self as ct_event, Event, KeyCode as CtKeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::Terminal;
use tracing::{debug, warn};

use crate::core::error::HostError;
use crate::core::host::{Host, SplitDirection, ViewId};
use crate::core::key::{Key, KeyCode, Modifiers};
use crate::core::mode::ModeHook;
use crate::core::rope_host::RopeHost;
use crate::core::settings::Settings;
use crate::core::view::View;
use crate::core::{Engine, EngineAction, Mode};

type Term = Terminal<CrosstermBackend<Stdout>>;

// ─── Colours ──────────────────────────────────────────────────────────────────

const STATUS_FG: Color = Color::Black;
const STATUS_BG: Color = Color::Rgb(0x98, 0xc3, 0x79);
const INACTIVE_STATUS_BG: Color = Color::DarkGray;
const TEXT_FG: Color = Color::Reset;
const SELECTION_BG: Color = Color::Rgb(0x3e, 0x44, 0x51);
const SEPARATOR_FG: Color = Color::DarkGray;

/// What the status line shows about the engine. Refreshed by the event loop
/// before each key; the modal read loops see the values from when they began.
#[derive(Debug, Clone, Default)]
struct EngineStatus {
    mode: Mode,
    chord: String,
}

/// A [`Host`] that renders to the terminal.
pub struct TuiHost {
    inner: RopeHost,
    terminal: Term,
    status: EngineStatus,
}

impl TuiHost {
    fn new(inner: RopeHost, terminal: Term) -> Self {
        Self {
            inner,
            terminal,
            status: EngineStatus::default(),
        }
    }

    fn sync(&mut self, engine: &Engine) {
        self.status.mode = engine.mode();
        self.status.chord = engine.chord_display().to_string();
    }

    fn draw(&mut self) -> io::Result<()> {
        if let Ok(size) = self.terminal.size() {
            // Two rows go to the status and command lines.
            let rows = size.height.saturating_sub(2).max(1) as usize;
            let per_view = rows / self.inner.all_views().len().max(1);
            self.inner.view_mut().viewport_lines = per_view.max(1);
        }
        let inner = &self.inner;
        let status = &self.status;
        self.terminal.draw(|frame| draw_frame(frame, inner, status))?;

        let style = match self.status.mode {
            Mode::Insert => SetCursorStyle::BlinkingBar,
            Mode::Replace => SetCursorStyle::SteadyUnderScore,
            _ => SetCursorStyle::SteadyBlock,
        };
        execute!(self.terminal.backend_mut(), style)?;
        Ok(())
    }

    /// Redraw, then block until a key the engine understands arrives.
    fn read_key(&mut self) -> io::Result<Key> {
        self.draw()?;
        loop {
            match ct_event::read()? {
                Event::Key(event) => {
                    if let Some(key) = translate_key(event) {
                        return Ok(key);
                    }
                }
                Event::Resize(..) => self.draw()?,
                _ => {}
            }
        }
    }
}

impl Host for TuiHost {
    fn active_view(&self) -> ViewId {
        self.inner.active_view()
    }

    fn views(&self) -> Vec<ViewId> {
        self.inner.views()
    }

    fn cursor(&self) -> usize {
        self.inner.cursor()
    }

    fn set_cursor(&mut self, pos: usize, scroll_into_view: bool) {
        self.inner.set_cursor(pos, scroll_into_view);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn read_range(&self, range: Range<usize>) -> String {
        self.inner.read_range(range)
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.inner.char_at(pos)
    }

    fn replace_range(&mut self, range: Range<usize>, text: &str) {
        self.inner.replace_range(range, text);
    }

    fn is_modified(&self) -> bool {
        self.inner.is_modified()
    }

    fn clipboard_post(&mut self, text: &str) -> Result<(), HostError> {
        self.inner.clipboard_post(text)
    }

    fn clipboard_read(&mut self) -> Result<Option<String>, HostError> {
        self.inner.clipboard_read()
    }

    fn next_key(&mut self) -> Option<Key> {
        match self.read_key() {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("terminal read failed: {e}");
                None
            }
        }
    }

    fn on_enter_mode(&mut self, hook: ModeHook) {
        debug!(?hook, "mode hook");
        self.inner.on_enter_mode(hook);
    }

    fn set_highlight(&mut self, range: Option<Range<usize>>) {
        self.inner.set_highlight(range);
    }

    fn show_prompt(&mut self, prompt: &str, text: &str) {
        self.inner.show_prompt(prompt, text);
    }

    fn clear_prompt(&mut self) {
        self.inner.clear_prompt();
    }

    fn show_message(&mut self, message: &str) {
        self.inner.show_message(message);
    }

    fn auto_indent(&mut self, range: Range<usize>, indent_width: usize) {
        self.inner.auto_indent(range, indent_width);
    }

    fn page_up(&mut self) {
        self.inner.page_up();
    }

    fn page_down(&mut self) {
        self.inner.page_down();
    }

    fn undo(&mut self) {
        self.inner.undo();
    }

    fn redo(&mut self) {
        self.inner.redo();
    }

    fn cycle_view(&mut self) {
        self.inner.cycle_view();
    }

    fn split_view(&mut self, direction: SplitDirection) {
        self.inner.split_view(direction);
    }

    fn close_view(&mut self) -> Result<(), HostError> {
        self.inner.close_view()
    }

    fn save(&mut self, path: Option<&str>) -> Result<(), HostError> {
        self.inner.save(path)
    }

    fn open_file(&mut self, path: Option<&str>) -> Result<(), HostError> {
        self.inner.open_file(path)
    }

    fn new_file(&mut self) -> Result<(), HostError> {
        self.inner.new_file()
    }

    fn change_theme(&mut self, name: Option<&str>) -> Result<(), HostError> {
        self.inner.change_theme(name)
    }
}

/// Initialise the engine, set up the terminal, run the event loop, and restore
/// the terminal on exit.
pub fn run(file_path: Option<PathBuf>) -> io::Result<()> {
    let settings = Settings::load();
    let mut engine = Engine::new(settings);

    #[allow(unused_mut)]
    let mut inner = match &file_path {
        Some(path) => RopeHost::with_file(path).map_err(io::Error::other)?,
        None => RopeHost::new(),
    };
    #[cfg(feature = "system-clipboard")]
    inner.use_system_clipboard();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let mut host = TuiHost::new(inner, terminal);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        event_loop(&mut host, &mut engine)
    }));

    restore_terminal(&mut host.terminal);

    match result {
        Ok(outcome) => outcome,
        Err(e) => std::panic::resume_unwind(e),
    }
}

fn restore_terminal(terminal: &mut Term) {
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        SetCursorStyle::DefaultUserShape,
        LeaveAlternateScreen
    );
    let _ = terminal.show_cursor();
}

// ─── Event loop ───────────────────────────────────────────────────────────────

fn event_loop(host: &mut TuiHost, engine: &mut Engine) -> io::Result<()> {
    loop {
        host.sync(engine);
        let key = host.read_key()?;
        // A message stays up until the next keystroke.
        host.inner.message = None;
        if engine.handle_key(host, key) == EngineAction::Quit {
            return Ok(());
        }
    }
}

// ─── Input translation ────────────────────────────────────────────────────────

fn translate_key(event: KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let code = match event.code {
        // Ctrl combos are bound by their lowercase letter.
        CtKeyCode::Char(c) if ctrl => KeyCode::Char(c.to_ascii_lowercase()),
        CtKeyCode::Char(c) => KeyCode::Char(c),
        CtKeyCode::Esc => KeyCode::Escape,
        CtKeyCode::Enter => KeyCode::Enter,
        CtKeyCode::Backspace => KeyCode::Backspace,
        CtKeyCode::Delete => KeyCode::Delete,
        CtKeyCode::Tab => KeyCode::Tab,
        CtKeyCode::Up => KeyCode::Up,
        CtKeyCode::Down => KeyCode::Down,
        CtKeyCode::Left => KeyCode::Left,
        CtKeyCode::Right => KeyCode::Right,
        CtKeyCode::Home => KeyCode::Home,
        CtKeyCode::End => KeyCode::End,
        CtKeyCode::PageUp => KeyCode::PageUp,
        CtKeyCode::PageDown => KeyCode::PageDown,
        _ => return None,
    };
    Some(Key {
        code,
        mods: Modifiers { ctrl, alt },
    })
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn draw_frame(frame: &mut ratatui::Frame, host: &RopeHost, status: &EngineStatus) {
    let [editor, status_area, command_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let views = host.all_views();
    let vertical = host.splits.first() == Some(&SplitDirection::Vertical);
    let constraints = vec![Constraint::Ratio(1, views.len().max(1) as u32); views.len()];
    let panes = if vertical {
        Layout::horizontal(constraints).split(editor)
    } else {
        Layout::vertical(constraints).split(editor)
    };

    let active = host.active_view();
    let mut cursor_cell = None;
    for (view, &pane) in views.iter().zip(panes.iter()) {
        let is_active = view.id == active;
        let pane = if vertical && pane.x > editor.x {
            render_separator(frame.buffer_mut(), pane);
            Rect {
                x: pane.x + 1,
                width: pane.width.saturating_sub(1),
                ..pane
            }
        } else {
            pane
        };
        render_view(frame.buffer_mut(), pane, host, view);
        if is_active {
            let pos = host.cursor_position();
            let row = pos.line.checked_sub(view.scroll_top);
            if let Some(row) = row.filter(|r| *r < pane.height as usize) {
                let col = (pos.col as u16).min(pane.width.saturating_sub(1));
                cursor_cell = Some((pane.x + col, pane.y + row as u16));
            }
        }
    }

    render_status_line(frame.buffer_mut(), status_area, host, status);

    match &host.prompt {
        Some((prompt, text)) => {
            let line = format!("{prompt}{text}");
            render_text(frame.buffer_mut(), command_area, &line, Style::default());
            let col = (line.chars().count() as u16).min(command_area.width.saturating_sub(1));
            frame.set_cursor_position((command_area.x + col, command_area.y));
        }
        None => {
            let message = host.message.as_deref().unwrap_or("");
            // Multi-line messages (`:registers`) show their last line.
            let shown = message.lines().last().unwrap_or("");
            render_text(frame.buffer_mut(), command_area, shown, Style::default());
            if let Some(cell) = cursor_cell {
                frame.set_cursor_position(cell);
            }
        }
    }
}

fn render_view(buf: &mut ratatui::buffer::Buffer, area: Rect, host: &RopeHost, view: &View) {
    let Some(state) = host.buffers.get(view.buffer_id) else {
        return;
    };
    let rope = &state.buffer.content;
    let normal = Style::default().fg(TEXT_FG);
    let selected = Style::default().bg(SELECTION_BG);

    for (row, line_idx) in view.visible_lines().take(area.height as usize).enumerate() {
        let y = area.y + row as u16;
        if line_idx >= rope.len_lines() {
            set_cell(buf, area.x, y, '~', Style::default().fg(SEPARATOR_FG));
            continue;
        }
        let start = rope.line_to_char(line_idx);
        for (col, ch) in rope.line(line_idx).chars().enumerate() {
            if ch == '\n' || col as u16 >= area.width {
                break;
            }
            let pos = start + col;
            let in_selection = view.highlight.as_ref().is_some_and(|r| r.contains(&pos));
            let style = if in_selection { selected } else { normal };
            let shown = if ch == '\t' { ' ' } else { ch };
            set_cell(buf, area.x + col as u16, y, shown, style);
        }
    }
}

fn render_separator(buf: &mut ratatui::buffer::Buffer, pane: Rect) {
    for y in pane.y..pane.y + pane.height {
        set_cell(buf, pane.x, y, '│', Style::default().fg(SEPARATOR_FG));
    }
}

fn render_status_line(
    buf: &mut ratatui::buffer::Buffer,
    area: Rect,
    host: &RopeHost,
    status: &EngineStatus,
) {
    let bg = if status.chord.is_empty() {
        STATUS_BG
    } else {
        INACTIVE_STATUS_BG
    };
    let style = Style::default()
        .fg(STATUS_FG)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let modified = if host.is_modified() { " [+]" } else { "" };
    let left = format!(" {}  {}{modified}", status.mode.name(), host.file_name());
    let pos = host.cursor_position();
    let right = format!("{}  {}:{} ", status.chord, pos.line + 1, pos.col + 1);

    render_text(buf, area, &left, style);
    let width = right.chars().count() as u16;
    if width <= area.width {
        let right_area = Rect {
            x: area.x + area.width - width,
            width,
            ..area
        };
        for (i, ch) in right.chars().enumerate() {
            set_cell(buf, right_area.x + i as u16, area.y, ch, style);
        }
    }
}

/// Fill `area`'s row with `style`, then write `text` from the left.
fn render_text(buf: &mut ratatui::buffer::Buffer, area: Rect, text: &str, style: Style) {
    for x in area.x..area.x + area.width {
        set_cell(buf, x, area.y, ' ', style);
    }
    for (i, ch) in text.chars().enumerate() {
        let x = area.x + i as u16;
        if x >= area.x + area.width {
            break;
        }
        set_cell(buf, x, area.y, ch, style);
    }
}

fn set_cell(buf: &mut ratatui::buffer::Buffer, x: u16, y: u16, ch: char, style: Style) {
    if buf.area.contains((x, y).into()) {
        buf[(x, y)].set_char(ch).set_style(style);
    }
}
