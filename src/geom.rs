// ============================================================================
// GEOMETRY: integer points/rects and rect-to-rect transforms
// ============================================================================

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Integer point in canvas pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Half-open integer rectangle `[min, max)`.
///
/// A rect built with [`IRect::new`] may be non-canonical (min > max on an
/// axis); call [`IRect::canon`] before measuring it. Every constructor other
/// than `new` returns a canonical rect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IRect {
    pub min: Point,
    pub max: Point,
}

impl IRect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    /// Canonical rect spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        IRect { min: a, max: b }.canon()
    }

    /// Rect of the given size with its top-left corner at `pos`.
    pub fn from_pos_size(pos: Point, width: u32, height: u32) -> Self {
        IRect {
            min: pos,
            max: Point::new(pos.x + width as i32, pos.y + height as i32),
        }
    }

    /// Swap coordinates where needed so `min <= max` on both axes.
    pub fn canon(self) -> Self {
        IRect::new(
            self.min.x.min(self.max.x),
            self.min.y.min(self.max.y),
            self.min.x.max(self.max.x),
            self.min.y.max(self.max.y),
        )
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Point {
        self.max - self.min
    }

    /// True when the rect covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Largest rect contained in both; empty (but canonical-sized) when
    /// they do not intersect.
    pub fn intersect(&self, other: &IRect) -> IRect {
        let r = IRect::new(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
        );
        if r.is_empty() { IRect::default() } else { r }
    }

    pub fn overlaps(&self, other: &IRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    pub fn translate(&self, v: Point) -> IRect {
        IRect {
            min: self.min + v,
            max: self.max + v,
        }
    }

    /// Grow (positive) or shrink (negative) by `d` on every side.
    pub fn inflate(&self, d: i32) -> IRect {
        IRect::new(self.min.x - d, self.min.y - d, self.max.x + d, self.max.y + d)
    }
}

impl fmt::Display for IRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

// ============================================================================
// RECT-TO-RECT TRANSFORMS
// ============================================================================

/// Scale followed by translation, mapping image-local coordinates of a
/// source rect onto a destination rect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReshapeTransform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl ReshapeTransform {
    /// Transform that draws content occupying `src` so it fills `dst`.
    ///
    /// The input point is image-local (0,0 = top-left of `src`); the output is
    /// absolute. Returns `None` when either rect is degenerate.
    pub fn between(src: IRect, dst: IRect) -> Option<Self> {
        let src = src.canon();
        let dst = dst.canon();
        if dst.width() < 1 || dst.height() < 1 || src.width() < 1 || src.height() < 1 {
            return None;
        }
        Some(Self {
            scale_x: dst.width() as f32 / src.width() as f32,
            scale_y: dst.height() as f32 / src.height() as f32,
            translate_x: dst.min.x as f32,
            translate_y: dst.min.y as f32,
        })
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale_x + self.translate_x, y * self.scale_y + self.translate_y)
    }

    pub fn invert(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.translate_x) / self.scale_x, (y - self.translate_y) / self.scale_y)
    }
}

/// Locate `r` inside an image with the given `bounds`.
///
/// `r` is canonicalized and shifted by `offset` into the image's local space.
/// Returns the local sub-rect to extract and the same region in the caller's
/// space (`local - offset`), or `None` when the region is degenerate or misses
/// the image.
pub fn crop_region(bounds: IRect, r: IRect, offset: Point) -> Option<(IRect, IRect)> {
    let r = r.canon().translate(offset);
    if r.width() < 1 || r.height() < 1 {
        return None;
    }
    if !r.overlaps(&bounds) {
        return None;
    }
    let local = r.intersect(&bounds);
    Some((local, local.translate(-offset)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canon_orders_corners() {
        let r = IRect::new(10, 20, 0, 5).canon();
        assert_eq!(r, IRect::new(0, 5, 10, 20));
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 15);
    }

    #[test]
    fn intersect_and_overlap() {
        let a = IRect::new(0, 0, 10, 10);
        let b = IRect::new(5, 5, 20, 20);
        assert!(a.overlaps(&b));
        assert_eq!(a.intersect(&b), IRect::new(5, 5, 10, 10));

        // Touching edges share no pixel.
        let c = IRect::new(10, 0, 20, 10);
        assert!(!a.overlaps(&c));
        assert!(a.intersect(&c).is_empty());
    }

    #[test]
    fn contains_is_half_open() {
        let r = IRect::new(0, 0, 4, 4);
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(3, 3)));
        assert!(!r.contains(Point::new(4, 3)));
        assert!(!r.contains(Point::new(-1, 0)));
    }

    #[test]
    fn reshape_transform_maps_corners() {
        let src = IRect::new(10, 10, 20, 30);
        let dst = IRect::new(100, 50, 140, 70);
        let t = ReshapeTransform::between(src, dst).unwrap();
        assert_eq!(t.apply(0.0, 0.0), (100.0, 50.0));
        assert_eq!(t.apply(10.0, 20.0), (140.0, 70.0));
        assert_eq!(t.invert(140.0, 70.0), (10.0, 20.0));
    }

    #[test]
    fn reshape_transform_rejects_degenerate() {
        let src = IRect::new(0, 0, 10, 10);
        assert!(ReshapeTransform::between(src, IRect::new(5, 5, 5, 20)).is_none());
        assert!(ReshapeTransform::between(IRect::new(3, 3, 3, 3), src).is_none());
    }

    #[test]
    fn crop_region_offsets() {
        let bounds = IRect::new(0, 0, 100, 100);
        // Image sits at (50, 50); crop an absolute region overlapping its corner.
        let (local, abs) =
            crop_region(bounds, IRect::new(120, 130, 40, 40), Point::new(-50, -50)).unwrap();
        assert_eq!(local, IRect::new(0, 0, 70, 80));
        assert_eq!(abs, IRect::new(50, 50, 120, 130));
    }

    #[test]
    fn crop_region_rejects_miss_and_degenerate() {
        let bounds = IRect::new(0, 0, 10, 10);
        assert!(crop_region(bounds, IRect::new(20, 20, 30, 30), Point::ZERO).is_none());
        assert!(crop_region(bounds, IRect::new(2, 2, 2, 8), Point::ZERO).is_none());
    }
}
