// ============================================================================
// RASTER PRIMITIVES: blits, strokes and resampling on RgbaImage surfaces
// ============================================================================
//
// All surfaces are straight (non-premultiplied) RGBA8. Blits clip against the
// destination; coordinates outside the surface are silently dropped.

use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use crate::geom::{IRect, Point, ReshapeTransform, crop_region};

/// Interpolation method for resize operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
}

impl Interpolation {
    pub fn label(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
        }
    }

    pub fn all() -> &'static [Interpolation] {
        &[Interpolation::Nearest, Interpolation::Bilinear]
    }

    pub fn from_label(s: &str) -> Option<Interpolation> {
        Self::all().iter().copied().find(|i| i.label() == s)
    }

    pub fn to_filter(&self) -> imageops::FilterType {
        match self {
            Interpolation::Nearest => imageops::FilterType::Nearest,
            Interpolation::Bilinear => imageops::FilterType::Triangle,
        }
    }
}

/// Full bounds of an image as a rect at the origin.
pub fn image_rect(img: &RgbaImage) -> IRect {
    IRect::from_pos_size(Point::ZERO, img.width(), img.height())
}

// ---------------------------------------------------------------------------
//  Fills
// ---------------------------------------------------------------------------

/// Reset every pixel to fully transparent.
pub fn clear(dst: &mut RgbaImage) {
    dst.fill(0);
}

/// Overwrite every pixel with `color` (no blending).
pub fn fill(dst: &mut RgbaImage, color: Rgba<u8>) {
    dst.pixels_mut().for_each(|p| *p = color);
}

/// Blend `color` over the pixels of `rect`.
pub fn fill_rect(dst: &mut RgbaImage, rect: IRect, color: Rgba<u8>) {
    let area = rect.canon().intersect(&image_rect(dst));
    if area.is_empty() {
        return;
    }
    for y in area.min.y..area.max.y {
        for x in area.min.x..area.max.x {
            let px = dst.get_pixel_mut(x as u32, y as u32);
            blend_pixel(&mut px.0, color, 1.0);
        }
    }
}

/// Outline `rect` with bands `width` pixels thick, drawn inside the rect after
/// it has been grown by `outset` on every side (negative shrinks it).
pub fn stroke_rect(dst: &mut RgbaImage, rect: IRect, color: Rgba<u8>, width: i32, outset: i32) {
    let r = rect.canon().inflate(outset);
    if r.is_empty() || width < 1 {
        return;
    }
    let w = width.min(r.width()).min(r.height()).max(1);
    fill_rect(dst, IRect::new(r.min.x, r.min.y, r.max.x, r.min.y + w), color);
    fill_rect(dst, IRect::new(r.min.x, r.max.y - w, r.max.x, r.max.y), color);
    fill_rect(dst, IRect::new(r.min.x, r.min.y + w, r.min.x + w, r.max.y - w), color);
    fill_rect(dst, IRect::new(r.max.x - w, r.min.y + w, r.max.x, r.max.y - w), color);
}

/// Destructive punch-out: pixels under `rect` become fully transparent.
/// Returns false when the rect misses the image.
pub fn cut_rect(dst: &mut RgbaImage, rect: IRect) -> bool {
    let area = rect.canon().intersect(&image_rect(dst));
    if area.is_empty() {
        return false;
    }
    for y in area.min.y..area.max.y {
        for x in area.min.x..area.max.x {
            dst.put_pixel(x as u32, y as u32, Rgba([0, 0, 0, 0]));
        }
    }
    true
}

// ---------------------------------------------------------------------------
//  Blits
// ---------------------------------------------------------------------------

/// Source-over composite of `src` at `pos`, with the source alpha scaled by
/// `alpha`.
pub fn composite(dst: &mut RgbaImage, src: &RgbaImage, pos: Point, alpha: f32) {
    composite_mapped(dst, src, pos, alpha, |p| p);
}

/// Like [`composite`] but with the colour channels inverted (hover highlight).
pub fn composite_inverted(dst: &mut RgbaImage, src: &RgbaImage, pos: Point, alpha: f32) {
    composite_mapped(dst, src, pos, alpha, invert_pixel);
}

fn invert_pixel(p: Rgba<u8>) -> Rgba<u8> {
    Rgba([255 - p[0], 255 - p[1], 255 - p[2], p[3]])
}

fn composite_mapped<F>(dst: &mut RgbaImage, src: &RgbaImage, pos: Point, alpha: f32, map: F)
where
    F: Fn(Rgba<u8>) -> Rgba<u8> + Sync,
{
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let src_rect = IRect::from_pos_size(pos, src.width(), src.height());
    let area = image_rect(dst).intersect(&src_rect);
    if area.is_empty() {
        return;
    }
    let row_len = dst.width() as usize * 4;
    let src_w = src.width() as usize;
    let src_raw = src.as_raw();
    let (x0, x1) = (area.min.x, area.max.x);

    // Rows are independent, so split the destination by row across the pool.
    let rows: &mut [u8] = dst;
    rows.par_chunks_mut(row_len)
        .enumerate()
        .skip(area.min.y as usize)
        .take(area.height() as usize)
        .for_each(|(y, row)| {
            let sy = (y as i32 - pos.y) as usize;
            for x in x0..x1 {
                let sx = (x - pos.x) as usize;
                let si = (sy * src_w + sx) * 4;
                let s = map(Rgba([src_raw[si], src_raw[si + 1], src_raw[si + 2], src_raw[si + 3]]));
                let di = x as usize * 4;
                blend_pixel(&mut row[di..di + 4], s, alpha);
            }
        });
}

/// Draw `src` through a scale+translate transform (nearest sampling).
pub fn composite_transformed(dst: &mut RgbaImage, src: &RgbaImage, t: &ReshapeTransform, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let (ax, ay) = t.apply(0.0, 0.0);
    let (bx, by) = t.apply(src.width() as f32, src.height() as f32);
    let target = IRect::new(
        ax.min(bx).floor() as i32,
        ay.min(by).floor() as i32,
        ax.max(bx).ceil() as i32,
        ay.max(by).ceil() as i32,
    );
    let area = target.intersect(&image_rect(dst));
    if area.is_empty() {
        return;
    }
    let row_len = dst.width() as usize * 4;
    let (src_w, src_h) = (src.width() as i32, src.height() as i32);

    let rows: &mut [u8] = dst;
    rows.par_chunks_mut(row_len)
        .enumerate()
        .skip(area.min.y as usize)
        .take(area.height() as usize)
        .for_each(|(y, row)| {
            for x in area.min.x..area.max.x {
                let (fx, fy) = t.invert(x as f32 + 0.5, y as f32 + 0.5);
                let (sx, sy) = (fx.floor() as i32, fy.floor() as i32);
                if sx < 0 || sy < 0 || sx >= src_w || sy >= src_h {
                    continue;
                }
                let s = *src.get_pixel(sx as u32, sy as u32);
                let di = x as usize * 4;
                blend_pixel(&mut row[di..di + 4], s, alpha);
            }
        });
}

// ---------------------------------------------------------------------------
//  Extraction / resampling
// ---------------------------------------------------------------------------

/// Extract the part of `src` under `r` (shifted by `offset` into image space).
/// Returns the sub-image and its rect in the caller's space.
pub fn crop_image(src: &RgbaImage, r: IRect, offset: Point) -> Option<(RgbaImage, IRect)> {
    let (local, placed) = crop_region(image_rect(src), r, offset)?;
    let sub = imageops::crop_imm(
        src,
        local.min.x as u32,
        local.min.y as u32,
        local.width() as u32,
        local.height() as u32,
    )
    .to_image();
    Some((sub, placed))
}

/// Resample to `width`×`height`. `None` for degenerate sizes.
pub fn resize_image(src: &RgbaImage, width: u32, height: u32, interp: Interpolation) -> Option<RgbaImage> {
    if width == 0 || height == 0 || src.width() == 0 || src.height() == 0 {
        return None;
    }
    Some(imageops::resize(src, width, height, interp.to_filter()))
}

/// Straight-alpha source-over of `s` (alpha scaled by `alpha`) onto `d`.
fn blend_pixel(d: &mut [u8], s: Rgba<u8>, alpha: f32) {
    let sa = s[3] as f32 / 255.0 * alpha;
    if sa <= 0.0 {
        return;
    }
    let da = d[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        d.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let v = (s[c] as f32 * sa + d[c] as f32 * da * (1.0 - sa)) / out_a;
        d[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    d[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn composite_clips_and_places() {
        let mut dst = RgbaImage::new(10, 10);
        let src = RgbaImage::from_pixel(4, 4, RED);
        composite(&mut dst, &src, Point::new(8, -2), 1.0);
        assert_eq!(*dst.get_pixel(8, 0), RED);
        assert_eq!(*dst.get_pixel(9, 1), RED);
        assert_eq!(*dst.get_pixel(7, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*dst.get_pixel(8, 2), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn composite_alpha_blends() {
        let mut dst = RgbaImage::from_pixel(1, 1, BLUE);
        let src = RgbaImage::from_pixel(1, 1, RED);
        composite(&mut dst, &src, Point::ZERO, 0.5);
        let p = dst.get_pixel(0, 0);
        assert_eq!(p[3], 255);
        assert!((p[0] as i32 - 128).abs() <= 1, "red half blended: {:?}", p);
        assert!((p[2] as i32 - 128).abs() <= 1, "blue half kept: {:?}", p);
    }

    #[test]
    fn zero_alpha_draws_nothing() {
        let mut dst = RgbaImage::new(2, 2);
        composite(&mut dst, &RgbaImage::from_pixel(2, 2, RED), Point::ZERO, 0.0);
        assert!(dst.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn inverted_composite_flips_colour() {
        let mut dst = RgbaImage::new(1, 1);
        composite_inverted(&mut dst, &RgbaImage::from_pixel(1, 1, RED), Point::ZERO, 1.0);
        assert_eq!(*dst.get_pixel(0, 0), Rgba([0, 255, 255, 255]));
    }

    #[test]
    fn transformed_blit_scales() {
        let mut dst = RgbaImage::new(20, 20);
        let src = RgbaImage::from_pixel(2, 2, RED);
        let t = ReshapeTransform::between(IRect::new(0, 0, 2, 2), IRect::new(5, 5, 15, 9)).unwrap();
        composite_transformed(&mut dst, &src, &t, 1.0);
        assert_eq!(*dst.get_pixel(5, 5), RED);
        assert_eq!(*dst.get_pixel(14, 8), RED);
        assert_eq!(dst.get_pixel(15, 8)[3], 0);
        assert_eq!(dst.get_pixel(4, 5)[3], 0);
    }

    #[test]
    fn stroke_leaves_interior() {
        let mut dst = RgbaImage::new(10, 10);
        stroke_rect(&mut dst, IRect::new(2, 2, 8, 8), RED, 1, 0);
        assert_eq!(*dst.get_pixel(2, 2), RED);
        assert_eq!(*dst.get_pixel(7, 5), RED);
        assert_eq!(dst.get_pixel(4, 4)[3], 0);
        assert_eq!(dst.get_pixel(8, 8)[3], 0);
    }

    #[test]
    fn cut_punches_out() {
        let mut img = RgbaImage::from_pixel(4, 4, RED);
        assert!(cut_rect(&mut img, IRect::new(1, 1, 3, 3)));
        assert_eq!(img.get_pixel(1, 1)[3], 0);
        assert_eq!(img.get_pixel(0, 0)[3], 255);
        assert!(!cut_rect(&mut img, IRect::new(10, 10, 12, 12)));
    }

    #[test]
    fn crop_image_extracts_sub_region() {
        let mut src = RgbaImage::from_pixel(10, 10, RED);
        src.put_pixel(3, 4, BLUE);
        let (sub, placed) = crop_image(&src, IRect::new(3, 4, 6, 8), Point::ZERO).unwrap();
        assert_eq!(sub.dimensions(), (3, 4));
        assert_eq!(*sub.get_pixel(0, 0), BLUE);
        assert_eq!(placed, IRect::new(3, 4, 6, 8));
    }

    #[test]
    fn resize_rejects_zero() {
        let src = RgbaImage::from_pixel(4, 4, RED);
        assert!(resize_image(&src, 0, 4, Interpolation::Nearest).is_none());
        let out = resize_image(&src, 8, 2, Interpolation::Bilinear).unwrap();
        assert_eq!(out.dimensions(), (8, 2));
    }

    #[test]
    fn interpolation_labels_round_trip() {
        for i in Interpolation::all() {
            assert_eq!(Interpolation::from_label(i.label()), Some(*i));
        }
        assert_eq!(Interpolation::from_label("lanczos"), None);
    }
}
