// ============================================================================
// TEXT: measure and rasterize single lines for menus and the status line
// ============================================================================

use ab_glyph::{Font, FontArc, GlyphId, ScaleFont, point};
use image::{Rgba, RgbaImage};

use crate::raster;

/// Pixel size used for menu and status text.
pub const DEFAULT_TEXT_SIZE: f32 = 14.0;

/// Advance used per character when no font could be loaded.
const FALLBACK_ADVANCE: f32 = 8.0;

/// Name of egui's bundled monospace face.
const BUNDLED_FONT: &str = "Hack";

/// Line rasterizer over a single ab_glyph face.
///
/// Without a font every character advances by a fixed width and nothing is
/// drawn, which keeps layout deterministic in headless runs.
#[derive(Clone)]
pub struct TextRenderer {
    font: Option<FontArc>,
    px_size: f32,
    fallback_advance: f32,
}

impl TextRenderer {
    /// Load the monospace face that ships with egui.
    pub fn load_default(px_size: f32) -> Self {
        let defs = egui::FontDefinitions::default();
        let font = match defs.font_data.get(BUNDLED_FONT) {
            Some(data) => match FontArc::try_from_vec(data.font.to_vec()) {
                Ok(f) => Some(f),
                Err(e) => {
                    log_warn!("Bundled font {} failed to parse: {}", BUNDLED_FONT, e);
                    None
                }
            },
            None => {
                log_warn!("Bundled font {} not available, text will not render", BUNDLED_FONT);
                None
            }
        };
        Self {
            font,
            px_size,
            fallback_advance: FALLBACK_ADVANCE,
        }
    }

    /// Fixed-advance metrics, no glyph output.
    pub fn without_font(advance: f32, px_size: f32) -> Self {
        Self {
            font: None,
            px_size,
            fallback_advance: advance,
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Width in pixels of `text` laid out on one line.
    pub fn measure(&self, text: &str) -> i32 {
        let Some(font) = &self.font else {
            return (text.chars().count() as f32 * self.fallback_advance).ceil() as i32;
        };
        let scaled = font.as_scaled(self.px_size);
        let mut width = 0.0f32;
        let mut last: Option<GlyphId> = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = last {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            last = Some(id);
        }
        width.ceil() as i32
    }

    /// Rasterize `text` into a `width`×`height` buffer filled with `bg`.
    /// The baseline sits `padding` pixels above the bottom edge.
    pub fn render_box(
        &self,
        text: &str,
        width: u32,
        height: u32,
        padding: i32,
        fg: Rgba<u8>,
        bg: Rgba<u8>,
    ) -> Option<RgbaImage> {
        if width == 0 || height == 0 {
            return None;
        }
        let mut img = RgbaImage::new(width, height);
        raster::fill(&mut img, bg);
        if let Some(font) = &self.font {
            draw_glyphs(&mut img, font, self.px_size, text, padding as f32, height as f32 - padding as f32, fg);
        }
        Some(img)
    }

    /// Rasterize a single line sized to fit its text plus padding.
    pub fn render_line(&self, text: &str, height: u32, padding: i32, fg: Rgba<u8>, bg: Rgba<u8>) -> Option<RgbaImage> {
        let width = self.measure(text) + 2 * padding;
        self.render_box(text, width.max(0) as u32, height, padding, fg, bg)
    }
}

fn draw_glyphs(img: &mut RgbaImage, font: &FontArc, px_size: f32, text: &str, x: f32, baseline: f32, fg: Rgba<u8>) {
    let scaled = font.as_scaled(px_size);
    let (w, h) = (img.width() as i32, img.height() as i32);
    let mut cursor = x;
    let mut last: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(px_size, point(cursor, baseline));
        cursor += scaled.h_advance(id);
        last = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else { continue };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i32 + gx as i32;
            let py = bounds.min.y as i32 + gy as i32;
            if px < 0 || py < 0 || px >= w || py >= h || coverage <= 0.0 {
                return;
            }
            let dst = img.get_pixel_mut(px as u32, py as u32);
            let a = coverage.clamp(0.0, 1.0) * (fg[3] as f32 / 255.0);
            for c in 0..3 {
                dst[c] = (fg[c] as f32 * a + dst[c] as f32 * (1.0 - a)).round() as u8;
            }
            dst[3] = dst[3].max((a * 255.0).round() as u8);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn fallback_metrics_are_per_char() {
        let text = TextRenderer::without_font(7.0, 14.0);
        assert_eq!(text.measure("abc"), 21);
        assert_eq!(text.measure(""), 0);
    }

    #[test]
    fn render_line_pads_width() {
        let text = TextRenderer::without_font(7.0, 14.0);
        let img = text.render_line("move", 18, 4, BLACK, WHITE).unwrap();
        assert_eq!(img.dimensions(), (28 + 8, 18));
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn render_box_rejects_zero_size() {
        let text = TextRenderer::without_font(7.0, 14.0);
        assert!(text.render_box("x", 0, 18, 4, BLACK, WHITE).is_none());
    }

    #[test]
    fn bundled_font_draws_ink() {
        let text = TextRenderer::load_default(DEFAULT_TEXT_SIZE);
        if !text.has_font() {
            return;
        }
        assert!(text.measure("crop") > 0);
        let img = text.render_line("crop", 18, 4, BLACK, WHITE).unwrap();
        assert!(img.pixels().any(|p| p[0] < 128), "expected dark glyph pixels");
    }
}
