// ============================================================================
// SETTINGS: key=value config file in the platform config directory
// ============================================================================

use std::path::PathBuf;

use crate::raster::Interpolation;

/// Where clipboard operations read and write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClipboardMode {
    /// OS clipboard through arboard, falling back to `Internal` if it cannot
    /// be opened.
    #[default]
    System,
    /// In-process buffer only.
    Internal,
    /// Clipboard operations finish without effect.
    Off,
}

impl ClipboardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipboardMode::System => "system",
            ClipboardMode::Internal => "internal",
            ClipboardMode::Off => "off",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(ClipboardMode::System),
            "internal" => Some(ClipboardMode::Internal),
            "off" => Some(ClipboardMode::Off),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Initial canvas (and window) width in pixels.
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub title: String,
    /// Start with Move's bring-to-front disabled.
    pub lock_order: bool,
    /// Resampling used by reshape and carve previews.
    pub interpolation: Interpolation,
    /// Vertical drag distance that maps to a full opacity step.
    pub opacity_drag_pixels: f32,
    pub clipboard: ClipboardMode,
    pub show_status: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 800,
            title: "frame".to_string(),
            lock_order: false,
            interpolation: Interpolation::Nearest,
            opacity_drag_pixels: 200.0,
            clipboard: ClipboardMode::System,
            show_status: true,
        }
    }
}

impl AppSettings {
    /// Linux:   `$XDG_CONFIG_HOME/frame/frame_settings.cfg` (or `~/.config/...`)
    /// Windows: `%APPDATA%\frame\frame_settings.cfg`
    /// macOS:   `~/Library/Application Support/frame/frame_settings.cfg`
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        let base = std::env::var("APPDATA")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);
        #[cfg(target_os = "macos")]
        let base = std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library").join("Application Support"));
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let base = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok();

        base.map(|b| b.join("frame").join("frame_settings.cfg"))
    }

    /// Load from disk; defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                log_info!("Loaded settings from {}", path.display());
                Self::from_config_str(&content)
            }
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::settings_path().ok_or_else(|| "no settings directory".to_string())?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
        }
        std::fs::write(&path, self.to_config_string()).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Parse `key=value` lines. Unknown keys are ignored and malformed values
    /// keep their default.
    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "canvas_width" => {
                    if let Some(v) = parse_dim(val) {
                        s.canvas_width = v;
                    }
                }
                "canvas_height" => {
                    if let Some(v) = parse_dim(val) {
                        s.canvas_height = v;
                    }
                }
                "title" => {
                    if !val.is_empty() {
                        s.title = val.to_string();
                    }
                }
                "lock_order" => s.lock_order = val == "true",
                "interpolation" => {
                    if let Some(i) = Interpolation::from_label(val) {
                        s.interpolation = i;
                    }
                }
                "opacity_drag_pixels" => {
                    if let Ok(v) = val.parse::<f32>()
                        && v.is_finite()
                        && v > 0.0
                    {
                        s.opacity_drag_pixels = v;
                    }
                }
                "clipboard" => {
                    if let Some(m) = ClipboardMode::parse(val) {
                        s.clipboard = m;
                    }
                }
                "show_status" => s.show_status = val != "false",
                _ => {}
            }
        }
        s
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "canvas_width={}\n\
             canvas_height={}\n\
             title={}\n\
             lock_order={}\n\
             interpolation={}\n\
             opacity_drag_pixels={}\n\
             clipboard={}\n\
             show_status={}\n",
            self.canvas_width,
            self.canvas_height,
            self.title,
            self.lock_order,
            self.interpolation.label(),
            self.opacity_drag_pixels,
            self.clipboard.as_str(),
            self.show_status,
        )
    }
}

fn parse_dim(val: &str) -> Option<u32> {
    val.parse::<u32>().ok().filter(|v| (1..=16384).contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_known_keys() {
        let s = AppSettings {
            canvas_width: 1024,
            canvas_height: 600,
            title: "board".into(),
            lock_order: true,
            interpolation: Interpolation::Bilinear,
            opacity_drag_pixels: 150.0,
            clipboard: ClipboardMode::Internal,
            show_status: false,
        };
        assert_eq!(AppSettings::from_config_str(&s.to_config_string()), s);
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let s = AppSettings::from_config_str(
            "canvas_width=wide\ncanvas_height=0\nopacity_drag_pixels=-3\nclipboard=cloud\ninterpolation=lanczos\n",
        );
        assert_eq!(s, AppSettings::default());
    }

    #[test]
    fn unknown_keys_and_comments_ignored() {
        let s = AppSettings::from_config_str("# comment\nfoo=bar\nno equals here\nlock_order=true\n");
        assert!(s.lock_order);
        assert_eq!(s.canvas_width, 800);
    }
}
