pub mod buffer;
pub mod buffer_manager;
pub mod chord;
pub mod command;
pub mod command_line;
pub mod cursor;
mod dispatch;
pub mod engine;
pub mod error;
pub mod host;
pub mod key;
pub mod keymap;
pub mod mode;
pub mod motion;
pub mod operator;
pub mod register;
pub mod rope_host;
pub mod search;
pub mod selection;
pub mod settings;
pub mod view;

pub use command::Command;
pub use command_line::{CommandLine, Invocation};
pub use cursor::Cursor;
pub use engine::{Engine, EngineAction};
pub use error::{CommandError, HostError, SettingsError};
pub use host::{Host, SplitDirection, ViewId};
pub use key::{Key, KeyCode, Modifiers};
pub use keymap::{KeymapId, Keymaps};
pub use mode::{Mode, ModeHook};
pub use operator::PendingOperator;
pub use register::{Register, RegisterId, Registers};
pub use rope_host::RopeHost;
pub use search::{SearchDirection, SearchState};
pub use selection::SelectionState;
pub use settings::Settings;
