pub mod core;
pub mod log;
pub mod tui_main;
