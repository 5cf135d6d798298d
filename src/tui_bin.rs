//! `vchord [FILE]`: modal editing in the terminal.

use std::path::PathBuf;

use vimchord_core::{log, tui_main};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let file_path = args.get(1).map(PathBuf::from);

    // Logging is best-effort; the editor runs without it.
    let _log_guard = match log::init() {
        Ok(guard) => {
            tracing::info!(log_file = %guard.log_file.display(), "vchord starting");
            Some(guard)
        }
        Err(e) => {
            eprintln!("vchord: logging disabled: {e}");
            None
        }
    };

    if let Err(e) = tui_main::run(file_path) {
        tracing::error!("vchord exited with error: {e}");
        eprintln!("vchord: {e}");
        std::process::exit(1);
    }
}
