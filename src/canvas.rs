use std::collections::HashMap;

use image::RgbaImage;

use crate::geom::{IRect, Point};
use crate::raster;
use crate::sprite::{Sprite, SpriteId};
use crate::sprite_list::{ReorderCommand, SpriteList};

// ============================================================================
// CANVAS: sprite arena, z-order and the composited surface
// ============================================================================

pub struct Canvas {
    pub width: u32,
    pub height: u32,
    /// Composited output, rebuilt from scratch by `draw_sprites`.
    pub image: RgbaImage,
    sprites: HashMap<SpriteId, Sprite>,
    order: SpriteList,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            image: RgbaImage::new(width, height),
            sprites: HashMap::new(),
            order: SpriteList::new(),
        }
    }

    pub fn full_rect(&self) -> IRect {
        IRect::from_pos_size(Point::ZERO, self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &SpriteList {
        &self.order
    }

    // ---- arena ------------------------------------------------------------

    /// Insert at the front (topmost) and return the new handle.
    pub fn add_sprite(&mut self, sprite: Sprite) -> SpriteId {
        let id = SpriteId::new();
        self.sprites.insert(id, sprite);
        self.order.push_front(id);
        id
    }

    /// Wrap an image as a sprite at the origin.
    pub fn add_image(&mut self, image: RgbaImage) -> SpriteId {
        self.add_sprite(Sprite::new(image, Point::ZERO))
    }

    pub fn remove_sprite(&mut self, id: SpriteId) -> Option<Sprite> {
        self.order.remove(id);
        self.sprites.remove(&id)
    }

    /// Swap in `sprite` for `id`, keeping its z slot. The returned id is new.
    pub fn replace_sprite(&mut self, id: SpriteId, sprite: Sprite) -> Option<SpriteId> {
        if !self.order.contains(id) {
            return None;
        }
        let fresh = SpriteId::new();
        self.sprites.remove(&id);
        self.sprites.insert(fresh, sprite);
        self.order.replace(id, fresh);
        Some(fresh)
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.get(&id)
    }

    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.get_mut(&id)
    }

    pub fn contains(&self, id: SpriteId) -> bool {
        self.sprites.contains_key(&id)
    }

    /// Front-most sprite under `p`.
    pub fn sprite_at(&self, p: Point) -> Option<SpriteId> {
        self.order
            .front_to_back()
            .find(|id| self.sprites.get(id).is_some_and(|s| s.contains(p)))
    }

    /// Every sprite overlapping `r`, front to back.
    pub fn sprites_overlapping(&self, r: IRect) -> Vec<SpriteId> {
        self.order
            .front_to_back()
            .filter(|id| self.sprites.get(id).is_some_and(|s| s.overlaps(&r)))
            .collect()
    }

    /// Sort `ids` into z-order (front first), dropping unknown ones.
    pub fn in_z_order(&self, ids: &[SpriteId]) -> Vec<SpriteId> {
        self.order.front_to_back().filter(|id| ids.contains(id)).collect()
    }

    pub fn reorder(&mut self, cmd: ReorderCommand, id: SpriteId) -> bool {
        self.order.reorder(cmd, id)
    }

    pub fn bring_to_front(&mut self, id: SpriteId) -> bool {
        self.order.bring_to_front(id)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.sprites.clear();
    }

    /// Resize the surface, keeping existing pixels in the overlap.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        let mut image = RgbaImage::new(width, height);
        raster::composite(&mut image, &self.image, Point::ZERO, 1.0);
        self.image = image;
        self.width = width;
        self.height = height;
    }

    /// New top sprite holding the composited pixels under `r`.
    pub fn new_sprite_from_region(&mut self, r: IRect) -> Option<SpriteId> {
        let sprite = self.region_sprite(r)?;
        Some(self.add_sprite(sprite))
    }

    /// Composited pixels under `r` as a detached sprite.
    pub fn region_sprite(&self, r: IRect) -> Option<Sprite> {
        let (image, placed) = raster::crop_image(&self.image, r, Point::ZERO)?;
        Some(Sprite::new(image, placed.min))
    }

    // ---- compositing ------------------------------------------------------

    pub fn draw_sprites(&mut self) {
        self.draw_sprites_with(|_, s| s.alpha());
    }

    /// Clear and repaint back to front. `alpha` yields the effective alpha of
    /// each sprite, overriding its own opacity.
    pub fn draw_sprites_with<F>(&mut self, alpha: F)
    where
        F: Fn(SpriteId, &Sprite) -> f32,
    {
        raster::clear(&mut self.image);
        for id in self.order.back_to_front() {
            if let Some(s) = self.sprites.get(&id)
                && !s.is_empty()
            {
                raster::composite(&mut self.image, &s.image, s.pos, alpha(id, s));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn solid(c: Rgba<u8>, w: u32, h: u32, x: i32, y: i32) -> Sprite {
        Sprite::new(RgbaImage::from_pixel(w, h, c), Point::new(x, y))
    }

    #[test]
    fn front_sprite_is_hit_and_painted_on_top() {
        let mut c = Canvas::new(20, 20);
        let back = c.add_sprite(solid(RED, 10, 10, 0, 0));
        let front = c.add_sprite(solid(BLUE, 10, 10, 5, 5));
        assert_eq!(c.order().get(0), Some(front));
        assert_eq!(c.sprite_at(Point::new(7, 7)), Some(front));
        assert_eq!(c.sprite_at(Point::new(2, 2)), Some(back));
        c.draw_sprites();
        assert_eq!(*c.image.get_pixel(7, 7), BLUE);
        assert_eq!(*c.image.get_pixel(2, 2), RED);

        c.bring_to_front(back);
        c.draw_sprites();
        assert_eq!(c.sprite_at(Point::new(7, 7)), Some(back));
        assert_eq!(*c.image.get_pixel(7, 7), RED);
    }

    #[test]
    fn replace_keeps_slot() {
        let mut c = Canvas::new(20, 20);
        let a = c.add_sprite(solid(RED, 4, 4, 0, 0));
        let b = c.add_sprite(solid(RED, 4, 4, 0, 0));
        let _top = c.add_sprite(solid(RED, 4, 4, 0, 0));
        let fresh = c.replace_sprite(b, solid(BLUE, 2, 2, 1, 1)).unwrap();
        assert_eq!(c.order().index_of(fresh), Some(1));
        assert!(c.sprite(b).is_none());
        assert_eq!(c.order().index_of(a), Some(2));
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn overlapping_lists_front_first() {
        let mut c = Canvas::new(50, 50);
        let a = c.add_sprite(solid(RED, 10, 10, 0, 0));
        let b = c.add_sprite(solid(RED, 10, 10, 20, 0));
        let _far = c.add_sprite(solid(RED, 5, 5, 40, 40));
        assert_eq!(c.sprites_overlapping(IRect::new(25, 5, 5, 8)), vec![b, a]);
    }

    #[test]
    fn region_sprite_reads_composite() {
        let mut c = Canvas::new(10, 10);
        c.add_sprite(solid(RED, 4, 4, 2, 2));
        c.draw_sprites();
        let id = c.new_sprite_from_region(IRect::new(0, 0, 4, 4)).unwrap();
        let s = c.sprite(id).unwrap();
        assert_eq!(s.pos, Point::ZERO);
        assert_eq!(*s.image.get_pixel(3, 3), RED);
        assert_eq!(s.image.get_pixel(0, 0)[3], 0);
        assert_eq!(c.order().get(0), Some(id));
    }

    #[test]
    fn resize_keeps_pixels() {
        let mut c = Canvas::new(4, 4);
        c.add_sprite(solid(RED, 4, 4, 0, 0));
        c.draw_sprites();
        c.resize(8, 2);
        assert_eq!(c.image.dimensions(), (8, 2));
        assert_eq!(*c.image.get_pixel(3, 1), RED);
        assert_eq!(c.image.get_pixel(6, 1)[3], 0);
    }
}
