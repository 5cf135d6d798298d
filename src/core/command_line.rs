//! The `:` status line: a modal read loop, a parser and an ordered table of
//! named commands.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::engine::{Engine, EngineAction};
use super::error::{CommandError, HostError};
use super::host::{Host, SplitDirection};
use super::key::KeyCode;
use super::motion::{self, MotionKind};
use super::operator::PendingOperator;

/// A parsed `:verb[!] args` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub verb: String,
    pub args: String,
    /// A `!` followed the verb.
    pub force: bool,
}

impl Invocation {
    /// The argument string, or `None` when blank.
    pub fn arg(&self) -> Option<&str> {
        let args = self.args.trim();
        (!args.is_empty()).then_some(args)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    Empty,
    /// `:N` jumps to line N (1-based).
    GotoLine(usize),
    Invoke(Invocation),
}

impl CommandLine {
    pub fn parse(input: &str) -> Self {
        let input = input.trim_start();
        let token_end = input.find(char::is_whitespace).unwrap_or(input.len());
        let (token, rest) = input.split_at(token_end);
        // Only a trailing `!` on the verb token means force.
        let (verb, force) = match token.strip_suffix('!') {
            Some(verb) => (verb, true),
            None => (token, false),
        };
        if verb.is_empty() {
            return CommandLine::Empty;
        }
        let args = rest.trim_start().to_string();

        if verb.chars().all(|c| c.is_ascii_digit()) {
            // Absurdly long numbers saturate to the last line.
            let line = verb.parse().unwrap_or(usize::MAX);
            return CommandLine::GotoLine(line);
        }

        CommandLine::Invoke(Invocation {
            verb: verb.to_string(),
            args,
            force,
        })
    }
}

pub type CommandHandler =
    Rc<dyn Fn(&mut Engine, &mut dyn Host, &Invocation) -> Result<EngineAction, CommandError>>;

/// Named status-line commands in registration order.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    entries: Vec<(String, CommandHandler)>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, handler: CommandHandler) {
        self.entries.push((name.to_string(), handler));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Find the command `verb` names. A registration is a candidate when
    /// `verb` is a prefix of its name; the longest shared prefix wins and
    /// earlier registrations win ties.
    pub fn resolve(&self, verb: &str) -> Option<(&str, CommandHandler)> {
        let mut best: Option<(usize, &(String, CommandHandler))> = None;
        for entry in &self.entries {
            let name = entry.0.as_str();
            if !name.starts_with(verb) {
                continue;
            }
            let shared = name
                .chars()
                .zip(verb.chars())
                .take_while(|(a, b)| a == b)
                .count();
            match best {
                Some((len, _)) if len >= shared => {}
                _ => best = Some((shared, entry)),
            }
        }
        best.map(|(_, (name, handler))| (name.as_str(), Rc::clone(handler)))
    }
}

impl Engine {
    /// Add a status-line command. Later registrations lose prefix ties to
    /// earlier ones.
    pub fn define_command(
        &mut self,
        name: &str,
        handler: impl Fn(&mut Engine, &mut dyn Host, &Invocation) -> Result<EngineAction, CommandError>
            + 'static,
    ) {
        self.commands.register(name, Rc::new(handler));
    }

    pub fn command_names(&self) -> Vec<String> {
        self.commands.names().map(str::to_string).collect()
    }

    /// `:` pressed: read a line and run it.
    pub(crate) fn status_command(&mut self, host: &mut dyn Host) -> EngineAction {
        if self.chord.in_chord() || self.pending != PendingOperator::None {
            self.cancel_chord(host);
        }
        match self.read_prompt(host, ":") {
            Some(line) => self.execute_command_line(host, &line),
            None => EngineAction::None,
        }
    }

    /// Run one status line as if typed after `:`.
    pub fn execute_command_line(&mut self, host: &mut dyn Host, line: &str) -> EngineAction {
        match CommandLine::parse(line) {
            CommandLine::Empty => EngineAction::None,
            CommandLine::GotoLine(line) => {
                let start = host.line_to_pos(line.saturating_sub(1));
                self.run_motion(host, MotionKind::Linewise, move |h, _| {
                    motion::first_non_blank(h, start)
                });
                EngineAction::None
            }
            CommandLine::Invoke(invocation) => {
                let Some((name, handler)) = self.commands.resolve(&invocation.verb) else {
                    debug!(verb = %invocation.verb, "no such command");
                    return EngineAction::None;
                };
                debug!(verb = %invocation.verb, command = name, force = invocation.force, "status command");
                match handler(self, host, &invocation) {
                    Ok(action) => action,
                    Err(e) => {
                        self.report(host, &e);
                        EngineAction::None
                    }
                }
            }
        }
    }

    /// Modal line editor behind `:`, `/` and `?`. Returns the submitted text,
    /// or `None` when aborted. The keymap in effect before the loop is in
    /// effect after it.
    pub(crate) fn read_prompt(&mut self, host: &mut dyn Host, prompt: &str) -> Option<String> {
        let saved = self.chord.keymap;
        let mut text = String::new();
        host.show_prompt(prompt, &text);

        let result = loop {
            let Some(key) = host.next_key() else {
                break None;
            };
            match key.code {
                KeyCode::Escape => break None,
                KeyCode::Enter => break Some(text),
                KeyCode::Tab => {}
                KeyCode::Backspace => {
                    text.pop();
                }
                _ => {
                    if let Some(ch) = key.printable() {
                        text.push(ch);
                    }
                }
            }
            host.show_prompt(prompt, &text);
        };

        host.clear_prompt();
        self.chord.keymap = saved;
        result
    }

    pub(crate) fn register_builtin_commands(&mut self) {
        self.define_command("write", |_, host, inv| {
            host.save(inv.arg())?;
            Ok(EngineAction::None)
        });
        self.define_command("wq", |_, host, inv| {
            host.save(inv.arg())?;
            close_or_quit(host)
        });
        self.define_command("quit", |_, host, inv| {
            if !inv.force && host.is_modified() && host.views().len() <= 1 {
                return Err(HostError::Unsaved.into());
            }
            close_or_quit(host)
        });
        self.define_command("edit", |engine, host, inv| {
            if !inv.force && host.is_modified() {
                return Err(HostError::Unsaved.into());
            }
            host.open_file(inv.arg())?;
            engine.enter_normal(host);
            Ok(EngineAction::None)
        });
        for name in ["exit", "x"] {
            self.define_command(name, |_, host, _| {
                if host.is_modified() {
                    host.save(None)?;
                }
                close_or_quit(host)
            });
        }
        self.define_command("close", |_, host, _| {
            host.close_view()?;
            Ok(EngineAction::None)
        });
        self.define_command("new", |engine, host, _| {
            host.split_view(SplitDirection::Horizontal);
            host.new_file()?;
            engine.enter_normal(host);
            Ok(EngineAction::None)
        });
        self.define_command("colorscheme", |_, host, inv| {
            host.change_theme(inv.arg())?;
            Ok(EngineAction::None)
        });
        for (name, direction) in [
            ("vs", SplitDirection::Vertical),
            ("vsplit", SplitDirection::Vertical),
            ("sp", SplitDirection::Horizontal),
            ("split", SplitDirection::Horizontal),
        ] {
            self.define_command(name, move |engine, host, inv| {
                host.split_view(direction);
                if let Some(path) = inv.arg() {
                    host.open_file(Some(path))?;
                    engine.enter_normal(host);
                }
                Ok(EngineAction::None)
            });
        }
        self.define_command("set", |engine, host, inv| {
            if inv.arg().is_none() {
                host.show_message(&engine.settings.display_all());
                return Ok(EngineAction::None);
            }
            let mut shown = Vec::new();
            for arg in inv.args.split_whitespace() {
                shown.push(engine.settings.parse_set_option(arg)?);
            }
            engine.chord.set_capacity(engine.settings.chord_capacity);
            host.show_message(&shown.join("  "));
            Ok(EngineAction::None)
        });
        self.define_command("registers", |engine, host, _| {
            let listing = engine.registers.listing();
            host.show_message(listing.trim_end());
            Ok(EngineAction::None)
        });
        self.define_command("nohlsearch", |engine, host, _| {
            if !engine.mode.is_visual() {
                host.set_highlight(None);
            }
            Ok(EngineAction::None)
        });
    }
}

/// Close the active view; closing the last one ends the session.
fn close_or_quit(host: &mut dyn Host) -> Result<EngineAction, CommandError> {
    match host.close_view() {
        Ok(()) => Ok(EngineAction::None),
        Err(HostError::LastView) => Ok(EngineAction::Quit),
        Err(e) => Err(e.into()),
    }
}
