// ============================================================================
// CLIPBOARD OPERATIONS: flatten a region out, float an image in
// ============================================================================

use std::borrow::Cow;
use std::path::Path;

use image::RgbaImage;

use super::transform::flatten_region;
use super::{BLACK, BLUE, DrawContext, OpContext, OpError};
use crate::input::MouseDrag;
use crate::raster;
use crate::settings::ClipboardMode;
use crate::sprite::{Sprite, SpriteId};

// ---------------------------------------------------------------------------
//  Backends
// ---------------------------------------------------------------------------

/// Where clipboard images go. `read_image` returns `Ok(None)` when the
/// clipboard holds nothing usable.
pub trait ClipboardBackend {
    fn write_image(&mut self, img: &RgbaImage) -> Result<(), OpError>;
    fn read_image(&mut self) -> Result<Option<RgbaImage>, OpError>;
}

/// OS clipboard through arboard.
pub struct SystemClipboard {
    clip: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, OpError> {
        arboard::Clipboard::new()
            .map(|clip| Self { clip })
            .map_err(|e| OpError::Clipboard(e.to_string()))
    }

    /// Text on the clipboard that names an image file on disk.
    fn read_path_fallback(&mut self) -> Result<Option<RgbaImage>, OpError> {
        let Ok(text) = self.clip.get_text() else { return Ok(None) };
        let path = Path::new(text.trim());
        if !path.is_file() || !crate::io::is_supported_path(path) {
            return Ok(None);
        }
        log_info!("Clipboard text is an image path: {}", path.display());
        crate::io::decode_file(path).map(Some).map_err(OpError::Decode)
    }
}

impl ClipboardBackend for SystemClipboard {
    fn write_image(&mut self, img: &RgbaImage) -> Result<(), OpError> {
        let data = arboard::ImageData {
            width: img.width() as usize,
            height: img.height() as usize,
            bytes: Cow::Borrowed(img.as_raw()),
        };
        self.clip.set_image(data).map_err(|e| OpError::Clipboard(e.to_string()))
    }

    fn read_image(&mut self) -> Result<Option<RgbaImage>, OpError> {
        match self.clip.get_image() {
            Ok(data) => {
                let (w, h) = (data.width as u32, data.height as u32);
                RgbaImage::from_raw(w, h, data.bytes.into_owned())
                    .map(Some)
                    .ok_or_else(|| OpError::Decode(format!("{}x{} clipboard image has the wrong byte count", w, h)))
            }
            Err(arboard::Error::ContentNotAvailable) => self.read_path_fallback(),
            Err(e) => Err(OpError::Clipboard(e.to_string())),
        }
    }
}

/// In-process clipboard, used when the OS one is unavailable or disabled.
#[derive(Default)]
pub struct MemoryClipboard {
    image: Option<RgbaImage>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(image: RgbaImage) -> Self {
        Self { image: Some(image) }
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn write_image(&mut self, img: &RgbaImage) -> Result<(), OpError> {
        self.image = Some(img.clone());
        Ok(())
    }

    fn read_image(&mut self) -> Result<Option<RgbaImage>, OpError> {
        Ok(self.image.clone())
    }
}

/// Backend for the configured mode. `System` degrades to the in-process
/// clipboard when the OS one cannot be opened.
pub fn backend_for_mode(mode: ClipboardMode) -> Option<Box<dyn ClipboardBackend>> {
    match mode {
        ClipboardMode::System => match SystemClipboard::new() {
            Ok(cb) => Some(Box::new(cb)),
            Err(e) => {
                log_warn!("System clipboard unavailable ({}), using internal clipboard", e);
                Some(Box::new(MemoryClipboard::new()))
            }
        },
        ClipboardMode::Internal => Some(Box::new(MemoryClipboard::new())),
        ClipboardMode::Off => None,
    }
}

// ---------------------------------------------------------------------------
//  Copy to clipboard
// ---------------------------------------------------------------------------

/// Drag a region (or click for the whole canvas); its composited pixels go to
/// the clipboard. The canvas is left as it was.
#[derive(Default)]
pub struct ClipboardCopyOp {
    drag: MouseDrag,
}

impl ClipboardCopyOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> Result<bool, OpError> {
        if ctx.clipboard.is_none() {
            return Ok(true);
        }
        if !self.drag.update(ctx.input) {
            return Ok(false);
        }
        let Some(flat) = flatten_region(ctx.canvas, &self.drag) else {
            return Ok(true);
        };
        if let Some(cb) = ctx.clipboard.as_mut() {
            cb.write_image(&flat.image)?;
            log_info!("Copied {}x{} to clipboard", flat.image.width(), flat.image.height());
        }
        Ok(true)
    }

    pub fn draw(&self, dst: &mut RgbaImage, _dc: &DrawContext) {
        if self.drag.started {
            raster::stroke_rect(dst, self.drag.rect(), BLUE, 1, 1);
        }
    }
}

// ---------------------------------------------------------------------------
//  Paste from clipboard
// ---------------------------------------------------------------------------

enum PastePhase {
    Start,
    /// Sprite already on the canvas, following the pointer.
    Floating(SpriteId),
}

/// Adds the clipboard image as a new top sprite that follows the pointer
/// until a primary press drops it. Cancelling removes it again.
pub struct ClipboardPasteOp {
    phase: PastePhase,
}

impl Default for ClipboardPasteOp {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardPasteOp {
    pub fn new() -> Self {
        Self {
            phase: PastePhase::Start,
        }
    }

    pub fn floating(&self) -> Option<SpriteId> {
        match self.phase {
            PastePhase::Floating(id) => Some(id),
            PastePhase::Start => None,
        }
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> Result<bool, OpError> {
        match self.phase {
            PastePhase::Start => {
                let Some(cb) = ctx.clipboard.as_mut() else { return Ok(true) };
                let Some(img) = cb.read_image()? else {
                    log_info!("Clipboard holds no image");
                    return Ok(true);
                };
                if img.width() == 0 || img.height() == 0 {
                    return Ok(true);
                }
                let id = ctx.canvas.add_sprite(Sprite::new(img, ctx.input.pointer));
                self.phase = PastePhase::Floating(id);
                Ok(false)
            }
            PastePhase::Floating(id) => {
                let Some(s) = ctx.canvas.sprite_mut(id) else { return Ok(true) };
                s.pos = ctx.input.pointer;
                Ok(ctx.input.primary.just_pressed)
            }
        }
    }

    pub fn cancel(&mut self, canvas: &mut crate::canvas::Canvas) {
        if let PastePhase::Floating(id) = self.phase {
            canvas.remove_sprite(id);
            self.phase = PastePhase::Start;
        }
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        if let Some(s) = self.floating().and_then(|id| dc.canvas.sprite(id)) {
            s.outline(dst, BLACK, 1, -1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn memory_clipboard_round_trip() {
        let mut cb = MemoryClipboard::new();
        assert_eq!(cb.read_image().unwrap(), None);
        let img = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        cb.write_image(&img).unwrap();
        assert_eq!(cb.read_image().unwrap(), Some(img));
    }

    #[test]
    fn off_mode_has_no_backend() {
        assert!(backend_for_mode(ClipboardMode::Off).is_none());
        assert!(backend_for_mode(ClipboardMode::Internal).is_some());
    }
}
