//! Session log for `frame`.
//!
//! Each launch truncates the previous log, so the file only describes the
//! current session:
//!
//!   Windows:  `%APPDATA%\frame\frame.log`
//!   Linux:    `$XDG_DATA_HOME/frame/frame.log` or `~/.local/share/frame/frame.log`
//!   macOS:    `~/Library/Application Support/frame/frame.log`
//!
//! Log through `log_info!` / `log_warn!` / `log_err!`. Before [`init`] (unit
//! tests, embedding the editor elsewhere) the macros do nothing.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

struct Session {
    path: PathBuf,
    out: Mutex<File>,
}

static SESSION: OnceLock<Session> = OnceLock::new();

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        })
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::record($crate::logger::Level::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::record($crate::logger::Level::Warn, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::record($crate::logger::Level::Error, format_args!($($arg)*))
    };
}

/// Where this session logs, once [`init`] has opened it.
pub fn log_path() -> Option<&'static Path> {
    SESSION.get().map(|s| s.path.as_path())
}

/// Append one timestamped line. I/O errors are dropped.
pub fn record(level: Level, args: fmt::Arguments<'_>) {
    let Some(session) = SESSION.get() else { return };
    let Ok(mut out) = session.out.lock() else { return };
    let _ = writeln!(out, "[{}] [{}] {}", clock(), level, args);
}

/// Open the session log and route panics into it. Safe to call twice; the
/// second call is ignored.
pub fn init() {
    if SESSION.get().is_some() {
        return;
    }
    let path = data_dir().join("frame").join("frame.log");
    if let Some(dir) = path.parent()
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("[logger] cannot create {}: {}", dir.display(), e);
        return;
    }
    let mut file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[logger] cannot open {}: {}", path.display(), e);
            return;
        }
    };

    let _ = writeln!(file, "=== frame session {} ===", epoch_secs());
    let _ = SESSION.set(Session {
        path,
        out: Mutex::new(file),
    });

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        record(Level::Error, format_args!("panic: {}", info));
        default_hook(info);
    }));
}

fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    let base = std::env::var("APPDATA").ok().map(PathBuf::from);
    #[cfg(target_os = "macos")]
    let base = std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join("Library").join("Application Support"));
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))
        .ok();

    base.unwrap_or_else(|| PathBuf::from("."))
}

/// HH:MM:SS (UTC).
fn clock() -> String {
    let secs = epoch_secs();
    format!("{:02}:{:02}:{:02}", (secs % 86400) / 3600, (secs % 3600) / 60, secs % 60)
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_before_init_is_silent() {
        log_info!("nothing {}", 1);
        log_err!("still nothing");
        assert!(log_path().is_none());
    }

    #[test]
    fn levels_render_as_tags() {
        assert_eq!(Level::Info.to_string(), "INFO");
        assert_eq!(Level::Error.to_string(), "ERROR");
    }
}
