// ============================================================================
// SPRITE: positioned image layer with hit testing and spatial edits
// ============================================================================

use std::fmt;

use image::{Rgba, RgbaImage};
use uuid::Uuid;

use crate::geom::{IRect, Point, ReshapeTransform};
use crate::raster::{self, Interpolation};

/// Stable handle into the canvas sprite arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteId(Uuid);

impl SpriteId {
    pub fn new() -> Self {
        SpriteId(Uuid::new_v4())
    }
}

impl Default for SpriteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to tell sprites apart in the log.
        let s = self.0.simple().to_string();
        f.write_str(&s[..8])
    }
}

/// A positioned, independently movable image layer.
///
/// An empty (0×0) image counts as absent: it never hit-tests and draws
/// nothing.
#[derive(Clone, Debug)]
pub struct Sprite {
    pub image: RgbaImage,
    pub pos: Point,
    opacity_offset: f32,
}

impl Sprite {
    pub fn new(image: RgbaImage, pos: Point) -> Self {
        Self {
            image,
            pos,
            opacity_offset: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Image bounds at the origin.
    pub fn bounds(&self) -> IRect {
        raster::image_rect(&self.image)
    }

    /// Absolute rect on the canvas.
    pub fn rect(&self) -> IRect {
        self.bounds().translate(self.pos)
    }

    pub fn contains(&self, p: Point) -> bool {
        !self.is_empty() && self.bounds().contains(p - self.pos)
    }

    pub fn overlaps(&self, r: &IRect) -> bool {
        !self.is_empty() && self.rect().overlaps(&r.canon())
    }

    pub fn opacity_offset(&self) -> f32 {
        self.opacity_offset
    }

    /// Clamped to `[-1, 0]`; effective alpha is `1 + offset`.
    pub fn set_opacity_offset(&mut self, v: f32) {
        self.opacity_offset = if v.is_nan() { 0.0 } else { v.clamp(-1.0, 0.0) };
    }

    pub fn alpha(&self) -> f32 {
        1.0 + self.opacity_offset
    }

    pub fn move_by(&mut self, v: Point) {
        self.pos += v;
    }

    /// Resample in place. Degenerate sizes leave the sprite untouched.
    pub fn resize(&mut self, width: u32, height: u32, interp: Interpolation) -> bool {
        match raster::resize_image(&self.image, width, height, interp) {
            Some(img) => {
                self.image = img;
                true
            }
            None => false,
        }
    }

    /// Resize to `r`'s size and move to its top-left corner, or do nothing.
    pub fn reshape(&mut self, r: IRect, interp: Interpolation) -> bool {
        let r = r.canon();
        if r.width() < 1 || r.height() < 1 {
            return false;
        }
        if !self.resize(r.width() as u32, r.height() as u32, interp) {
            return false;
        }
        self.pos = r.min;
        true
    }

    /// New sprite holding the part of this one under the absolute rect `r`.
    pub fn crop(&self, r: IRect) -> Option<Sprite> {
        if self.is_empty() {
            return None;
        }
        let (image, placed) = raster::crop_image(&self.image, r, -self.pos)?;
        let mut out = Sprite::new(image, placed.min);
        out.opacity_offset = self.opacity_offset;
        Some(out)
    }

    /// Make the pixels under the absolute rect `r` transparent.
    pub fn cut(&mut self, r: IRect) -> bool {
        raster::cut_rect(&mut self.image, r.canon().translate(-self.pos))
    }

    // ---- drawing ----

    pub fn draw(&self, dst: &mut RgbaImage, offset: Point, alpha: f32) {
        if self.is_empty() {
            return;
        }
        raster::composite(dst, &self.image, self.pos + offset, alpha * self.alpha());
    }

    pub fn draw_inverted(&self, dst: &mut RgbaImage, offset: Point, alpha: f32) {
        if self.is_empty() {
            return;
        }
        raster::composite_inverted(dst, &self.image, self.pos + offset, alpha * self.alpha());
    }

    /// Preview this sprite stretched into `r` without changing it.
    pub fn draw_reshaped(&self, dst: &mut RgbaImage, r: IRect, alpha: f32) {
        if self.is_empty() {
            return;
        }
        if let Some(t) = ReshapeTransform::between(self.bounds(), r) {
            raster::composite_transformed(dst, &self.image, &t, alpha * self.alpha());
        }
    }

    pub fn outline(&self, dst: &mut RgbaImage, color: Rgba<u8>, width: i32, outset: i32) {
        if self.is_empty() {
            return;
        }
        raster::stroke_rect(dst, self.rect(), color, width, outset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn solid(w: u32, h: u32, pos: Point) -> Sprite {
        Sprite::new(RgbaImage::from_pixel(w, h, RED), pos)
    }

    #[test]
    fn hit_test_uses_position() {
        let s = solid(10, 10, Point::new(5, 5));
        assert!(s.contains(Point::new(5, 5)));
        assert!(s.contains(Point::new(14, 14)));
        assert!(!s.contains(Point::new(15, 5)));
        assert!(!s.contains(Point::new(4, 10)));
    }

    #[test]
    fn empty_sprite_never_hits() {
        let s = Sprite::new(RgbaImage::new(0, 0), Point::ZERO);
        assert!(!s.contains(Point::ZERO));
        assert!(!s.overlaps(&IRect::new(-10, -10, 10, 10)));
    }

    #[test]
    fn opacity_is_clamped() {
        let mut s = solid(1, 1, Point::ZERO);
        s.set_opacity_offset(-3.0);
        assert_eq!(s.opacity_offset(), -1.0);
        s.set_opacity_offset(0.5);
        assert_eq!(s.opacity_offset(), 0.0);
        s.set_opacity_offset(-0.25);
        assert_eq!(s.alpha(), 0.75);
    }

    #[test]
    fn crop_keeps_absolute_position() {
        let mut s = solid(20, 20, Point::new(10, 10));
        s.set_opacity_offset(-0.5);
        let c = s.crop(IRect::new(0, 0, 15, 18)).unwrap();
        assert_eq!(c.pos, Point::new(10, 10));
        assert_eq!(c.image.dimensions(), (5, 8));
        assert_eq!(c.opacity_offset(), -0.5);
    }

    #[test]
    fn hit_test_follows_the_sprite_when_moved() {
        let mut s = solid(10, 6, Point::new(3, -2));
        let v = Point::new(-7, 11);
        let probes = [(3, -2), (12, 3), (13, 3), (0, 0), (8, 4), (2, -2)];
        let before: Vec<bool> = probes.iter().map(|&(x, y)| s.contains(Point::new(x, y))).collect();
        s.move_by(v);
        let after: Vec<bool> = probes.iter().map(|&(x, y)| s.contains(Point::new(x, y) + v)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn crop_to_own_rect_is_identity() {
        let mut s = solid(6, 4, Point::new(9, 7));
        s.image.put_pixel(2, 1, Rgba([0, 255, 0, 128]));
        let c = s.crop(s.rect()).unwrap();
        assert_eq!(c.pos, s.pos);
        assert_eq!(c.image, s.image);
    }

    #[test]
    fn crop_outside_or_degenerate_is_none() {
        let s = solid(10, 10, Point::ZERO);
        assert!(s.crop(IRect::new(20, 20, 30, 30)).is_none());
        assert!(s.crop(IRect::new(2, 2, 2, 9)).is_none());
    }

    #[test]
    fn degenerate_resize_and_reshape_leave_sprite_untouched() {
        let mut s = solid(10, 10, Point::new(3, 4));
        assert!(!s.resize(0, 5, Interpolation::Nearest));
        assert!(!s.reshape(IRect::new(50, 50, 50, 80), Interpolation::Nearest));
        assert_eq!(s.image.dimensions(), (10, 10));
        assert_eq!(s.pos, Point::new(3, 4));
    }

    #[test]
    fn reshape_moves_and_resizes() {
        let mut s = solid(10, 10, Point::ZERO);
        assert!(s.reshape(IRect::new(40, 30, 20, 20), Interpolation::Bilinear));
        assert_eq!(s.pos, Point::new(20, 20));
        assert_eq!(s.image.dimensions(), (20, 10));
    }

    #[test]
    fn cut_is_relative_to_position() {
        let mut s = solid(10, 10, Point::new(100, 100));
        assert!(s.cut(IRect::new(100, 100, 102, 102)));
        assert_eq!(s.image.get_pixel(0, 0)[3], 0);
        assert_eq!(s.image.get_pixel(2, 2)[3], 255);
        assert!(!s.cut(IRect::new(0, 0, 10, 10)));
    }

    #[test]
    fn clone_is_independent() {
        let a = solid(4, 4, Point::ZERO);
        let mut b = a.clone();
        b.cut(IRect::new(0, 0, 4, 4));
        assert_eq!(a.image.get_pixel(1, 1)[3], 255);
        assert_eq!(b.image.get_pixel(1, 1)[3], 0);
    }

    #[test]
    fn draw_applies_opacity() {
        let mut s = solid(2, 2, Point::new(1, 1));
        s.set_opacity_offset(-1.0);
        let mut dst = RgbaImage::new(4, 4);
        s.draw(&mut dst, Point::ZERO, 1.0);
        assert_eq!(dst.get_pixel(1, 1)[3], 0);

        s.set_opacity_offset(0.0);
        s.draw(&mut dst, Point::ZERO, 1.0);
        assert_eq!(*dst.get_pixel(2, 2), RED);
        assert_eq!(dst.get_pixel(0, 0)[3], 0);
    }
}
