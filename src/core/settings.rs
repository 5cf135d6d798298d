use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::SettingsError;

/// User settings loaded from ~/.config/vimchord/settings.json
///
/// IMPORTANT: When adding new settings fields:
/// 1. Add the field with #[serde(default = "default_function_name")]
/// 2. Create a default function that returns a sensible default value
/// 3. Update the Default impl to include the new field
/// 4. Teach `set_bool_option`/`set_value_option`/`query_option` its `:set` names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Columns added/removed per line by the indent operators (`>` / `<`)
    #[serde(default = "default_shift_width")]
    pub shift_width: usize,

    /// Display width of a tab; also how many columns a tab counts for when
    /// shifting left
    #[serde(default = "default_tabstop")]
    pub tabstop: usize,

    /// Insert spaces instead of a literal tab (Tab key and `>`)
    #[serde(default = "default_expand_tab")]
    pub expand_tab: bool,

    /// Indent width handed to the host's auto-indent by the `=` operator
    #[serde(default = "default_format_indent_width")]
    pub format_indent_width: usize,

    /// Maximum number of chars kept in the chord display
    #[serde(default = "default_chord_capacity")]
    pub chord_capacity: usize,

    /// Searches wrap around the buffer boundary
    #[serde(default = "default_wrap_scan")]
    pub wrap_scan: bool,

    /// Searches ignore case
    #[serde(default)]
    pub ignore_case: bool,
}

fn default_shift_width() -> usize {
    4
}

fn default_tabstop() -> usize {
    4
}

fn default_expand_tab() -> bool {
    true
}

fn default_format_indent_width() -> usize {
    4
}

fn default_chord_capacity() -> usize {
    16
}

fn default_wrap_scan() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            shift_width: default_shift_width(),
            tabstop: default_tabstop(),
            expand_tab: default_expand_tab(),
            format_indent_width: default_format_indent_width(),
            chord_capacity: default_chord_capacity(),
            wrap_scan: default_wrap_scan(),
            ignore_case: false,
        }
    }
}

impl Settings {
    /// Load settings from ~/.config/vimchord/settings.json.
    /// Falls back to defaults if the file doesn't exist or is invalid.
    ///
    /// A file that loads is written back so fields added since it was last
    /// saved show up with their defaults.
    pub fn load() -> Self {
        let path = Self::settings_path();
        if !path.exists() {
            return Settings::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => {
                if let Err(e) = settings.save_to(&path) {
                    warn!("Failed to update settings file: {e}");
                }
                settings
            }
            Err(e) => {
                warn!("{e}. Using defaults.");
                Settings::default()
            }
        }
    }

    /// Load and validate settings from `path`.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Save settings to ~/.config/vimchord/settings.json
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn settings_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Apply a single vim `:set` argument and update `self` in place.
    ///
    /// Does **not** persist to disk.
    ///
    /// Supported forms:
    /// - `option` enables a boolean option (e.g. `expandtab`)
    /// - `nooption` disables it (e.g. `nowrapscan`)
    /// - `option?` queries the current value without changing it
    /// - `option=N` sets a numeric option (e.g. `shiftwidth=2`)
    ///
    /// Returns the message to display.
    pub fn parse_set_option(&mut self, arg: &str) -> Result<String, SettingsError> {
        if let Some(opt) = arg.strip_suffix('?') {
            return self.query_option(opt.trim());
        }

        if let Some(eq_pos) = arg.find('=') {
            let name = arg[..eq_pos].trim();
            let value = arg[eq_pos + 1..].trim();
            self.set_value_option(name, value)?;
            return Ok(format!("{name}={value}"));
        }

        // A numeric option named bare reports its value, as in vim.
        if self.is_value_option(arg) {
            return self.query_option(arg);
        }

        if let Some(opt) = arg.strip_prefix("no") {
            self.set_bool_option(opt, false)?;
            return Ok(format!("no{opt}"));
        }

        self.set_bool_option(arg, true)?;
        Ok(arg.to_string())
    }

    /// One-line summary of every option, shown by `:set` with no arguments.
    pub fn display_all(&self) -> String {
        let flag = |on: bool, name: &str| {
            if on {
                name.to_string()
            } else {
                format!("no{name}")
            }
        };
        format!(
            "sw={}  ts={}  {}  fiw={}  chord={}  {}  {}",
            self.shift_width,
            self.tabstop,
            flag(self.expand_tab, "expandtab"),
            self.format_indent_width,
            self.chord_capacity,
            flag(self.wrap_scan, "wrapscan"),
            flag(self.ignore_case, "ignorecase"),
        )
    }

    fn is_value_option(&self, name: &str) -> bool {
        matches!(
            name,
            "shiftwidth" | "sw" | "tabstop" | "ts" | "formatindent" | "fiw" | "chordlen"
        )
    }

    fn set_bool_option(&mut self, opt: &str, enable: bool) -> Result<(), SettingsError> {
        match opt {
            "expandtab" | "et" => self.expand_tab = enable,
            "wrapscan" | "ws" => self.wrap_scan = enable,
            "ignorecase" | "ic" => self.ignore_case = enable,
            _ => return Err(SettingsError::UnknownOption(opt.to_string())),
        }
        Ok(())
    }

    fn set_value_option(&mut self, name: &str, value: &str) -> Result<(), SettingsError> {
        let invalid = || SettingsError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let n: usize = match name {
            "shiftwidth" | "sw" | "tabstop" | "ts" | "formatindent" | "fiw" | "chordlen" => {
                value.parse().map_err(|_| invalid())?
            }
            _ => return Err(SettingsError::UnknownOption(name.to_string())),
        };
        match name {
            "shiftwidth" | "sw" => self.shift_width = n,
            "tabstop" | "ts" if n > 0 => self.tabstop = n,
            "formatindent" | "fiw" => self.format_indent_width = n,
            "chordlen" if n > 0 => self.chord_capacity = n,
            _ => return Err(invalid()),
        }
        Ok(())
    }

    fn query_option(&self, opt: &str) -> Result<String, SettingsError> {
        let flag = |on: bool, name: &str| {
            Ok(if on {
                name.to_string()
            } else {
                format!("no{name}")
            })
        };
        match opt {
            "shiftwidth" | "sw" => Ok(format!("shiftwidth={}", self.shift_width)),
            "tabstop" | "ts" => Ok(format!("tabstop={}", self.tabstop)),
            "formatindent" | "fiw" => Ok(format!("formatindent={}", self.format_indent_width)),
            "chordlen" => Ok(format!("chordlen={}", self.chord_capacity)),
            "expandtab" | "et" => flag(self.expand_tab, "expandtab"),
            "wrapscan" | "ws" => flag(self.wrap_scan, "wrapscan"),
            "ignorecase" | "ic" => flag(self.ignore_case, "ignorecase"),
            _ => Err(SettingsError::UnknownOption(opt.to_string())),
        }
    }
}

/// `~/.config/vimchord`, falling back to the working directory without `$HOME`.
pub fn config_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config").join("vimchord")
}
