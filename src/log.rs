//! Logging setup for `vchord`.
//!
//! The terminal belongs to the editor, so logs only ever go to a file:
//! `~/.config/vimchord/logs/vchord-<pid>.log`.
//!
//! ## Environment Variables
//!
//! 1. **`VCHORD_LOG`** (highest priority): a level (`debug`) applied to the
//!    engine crates, or a full filter (`vimchord_core::core::dispatch=trace`)
//! 2. **`RUST_LOG`**: standard tracing filter, used as-is
//! 3. **Default**: `warn`

use std::env;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::core::settings::config_dir;

/// Returned from [`init`]; hold it for the life of the program so buffered
/// lines reach the file.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

/// Install the file subscriber.
///
/// Fails only if a global subscriber is already set.
pub fn init() -> Result<LogGuard, Box<dyn std::error::Error + Send + Sync>> {
    let log_dir = config_dir().join("logs");
    let filename = format!("vchord-{}.log", std::process::id());
    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter());

    tracing_subscriber::registry().with(file_layer).try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// `VCHORD_LOG` > `RUST_LOG` > `warn`.
fn create_filter() -> EnvFilter {
    if let Ok(level) = env::var("VCHORD_LOG") {
        return expand_vchord_log(&level);
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new("warn")
}

/// A bare level applies to our crates only; anything with filter syntax is
/// passed through.
fn expand_vchord_log(value: &str) -> EnvFilter {
    if value.contains('=') || value.contains(':') || value.contains(',') {
        return EnvFilter::new(value);
    }
    EnvFilter::new(format!("warn,vimchord_core={value},vchord={value}"))
}
