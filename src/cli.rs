// ============================================================================
// CLI: command-line overrides and files to preload
// ============================================================================
//
// Usage examples:
//   frame                                   (empty canvas, settings from disk)
//   frame a.png b.jpg --width 1024
//   frame "shots/*.png" --lock-order --no-clipboard
//   frame sprites/ --title "level 3"        (directories are walked)

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::settings::{AppSettings, ClipboardMode};

/// Interactive sprite composition on a single canvas.
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "frame", about = "Arrange, crop and reshape image sprites on one canvas")]
pub struct CliArgs {
    /// Image files, directories or glob patterns to load as sprites.
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Canvas width in pixels (overrides the settings file).
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..=16384))]
    pub width: Option<u32>,

    /// Canvas height in pixels (overrides the settings file).
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..=16384))]
    pub height: Option<u32>,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,

    /// Start with Move's bring-to-front disabled.
    #[arg(long)]
    pub lock_order: bool,

    /// Disable clipboard operations entirely.
    #[arg(long)]
    pub no_clipboard: bool,
}

impl CliArgs {
    /// Fold the command-line overrides into `settings`.
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(w) = self.width {
            settings.canvas_width = w;
        }
        if let Some(h) = self.height {
            settings.canvas_height = h;
        }
        if let Some(t) = &self.title {
            settings.title = t.clone();
        }
        if self.lock_order {
            settings.lock_order = true;
        }
        if self.no_clipboard {
            settings.clipboard = ClipboardMode::Off;
        }
    }

    pub fn expand_files(&self) -> Vec<PathBuf> {
        resolve_inputs(&self.files)
    }
}

/// Literal paths are kept as given; anything else is treated as a glob.
/// Duplicates are dropped, first occurrence wins.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);
        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    log_warn!("Pattern '{}' matched no files", pattern);
                }
            }
            Err(e) => {
                log_warn!("Invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("frame").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_settings() {
        let args = parse(&["--width", "320", "--height", "200", "--lock-order", "--no-clipboard", "--title", "x"]);
        let mut s = AppSettings::default();
        args.apply(&mut s);
        assert_eq!((s.canvas_width, s.canvas_height), (320, 200));
        assert!(s.lock_order);
        assert_eq!(s.clipboard, ClipboardMode::Off);
        assert_eq!(s.title, "x");
    }

    #[test]
    fn no_flags_leave_settings_alone() {
        let mut s = AppSettings::default();
        parse(&[]).apply(&mut s);
        assert_eq!(s, AppSettings::default());
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(CliArgs::try_parse_from(["frame", "--width", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["frame", "--height", "abc"]).is_err());
    }

    #[test]
    fn files_expand_literals_and_globs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let literal = dir.path().join("c.txt").to_string_lossy().into_owned();
        let pattern = dir.path().join("*.png").to_string_lossy().into_owned();
        let args = parse(&[&literal, &pattern, &literal]);
        let files = args.expand_files();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], dir.path().join("c.txt"));
        assert!(files.contains(&dir.path().join("a.png")));
        assert!(files.contains(&dir.path().join("b.png")));
    }

    #[test]
    fn unmatched_glob_is_dropped() {
        let args = parse(&["/definitely/not/here/*.png"]);
        assert!(args.expand_files().is_empty());
    }
}
