// ============================================================================
// TRANSFORM OPERATIONS: move, crop, reshape and flatten sprites
// ============================================================================

use image::RgbaImage;

use super::select::{SelectRegionOp, Selection, TargetStep, Targets, outline_all};
use super::{BLACK, BLUE, DrawContext, GREEN, OpContext, Operation};
use crate::canvas::Canvas;
use crate::geom::Point;
use crate::input::MouseDrag;
use crate::raster;
use crate::sprite::{Sprite, SpriteId};

// ---------------------------------------------------------------------------
//  Shared helpers
// ---------------------------------------------------------------------------

/// Composited pixels under a finished drag, or the whole canvas for a click.
pub fn flatten_region(canvas: &Canvas, drag: &MouseDrag) -> Option<Sprite> {
    let rect = if drag.moved() { drag.rect() } else { canvas.full_rect() };
    canvas.region_sprite(rect)
}

/// Turn a sprite-or-region pick into a single target. A region is lifted
/// off the composite as a new top sprite.
pub(crate) fn resolve_selection(canvas: &mut Canvas, sel: Selection) -> Option<SpriteId> {
    match sel {
        Selection::Sprite(id) => id,
        Selection::Region(r) => {
            let id = canvas.new_sprite_from_region(r);
            if let Some(id) = id {
                log_info!("Lifted region {} as sprite {}", r, id);
            }
            id
        }
    }
}

/// Translate `ids` by `diff`. Unless the order is locked the targets are
/// brought to the front, keeping their order relative to each other.
fn apply_move(canvas: &mut Canvas, ids: &[SpriteId], diff: Point, lock_order: bool) {
    let ordered = canvas.in_z_order(ids);
    if !lock_order {
        for id in ordered.iter().rev() {
            canvas.bring_to_front(*id);
        }
    }
    for id in &ordered {
        if let Some(s) = canvas.sprite_mut(*id) {
            s.move_by(diff);
        }
    }
}

// ---------------------------------------------------------------------------
//  Move
// ---------------------------------------------------------------------------

pub struct MoveOp {
    targets: Targets,
    drag: MouseDrag,
}

impl Default for MoveOp {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveOp {
    pub fn new() -> Self {
        Self {
            targets: Targets::select(BLACK),
            drag: MouseDrag::new(),
        }
    }

    /// Skip selection; the next primary press starts the drag.
    pub fn with_targets(ids: Vec<SpriteId>) -> Self {
        Self {
            targets: Targets::chosen(ids),
            drag: MouseDrag::new(),
        }
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        match self.targets.update(ctx) {
            TargetStep::Selecting => return false,
            TargetStep::Empty => return true,
            TargetStep::Ready => {}
        }
        if !self.drag.update(ctx.input) {
            return false;
        }
        apply_move(ctx.canvas, self.targets.ids(), self.drag.diff(), *ctx.lock_order);
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        self.targets.draw(dst, dc, BLACK);
        if !self.drag.started {
            return;
        }
        for id in self.targets.ids() {
            if let Some(s) = dc.canvas.sprite(*id) {
                s.draw(dst, self.drag.diff(), 1.0);
            }
        }
    }
}

// ---------------------------------------------------------------------------
//  Drag (implicit: primary press on a sprite)
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DragOp;

impl DragOp {
    pub fn new() -> Self {
        DragOp
    }

    /// Finishes on its first frame. A press over a sprite hands off to a
    /// [`MoveOp`] that is advanced right away, so the same press starts the
    /// move's drag.
    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        if !ctx.input.primary.just_pressed {
            return true;
        }
        let Some(id) = ctx.canvas.sprite_at(ctx.input.pointer) else {
            return true;
        };
        let mut mv = MoveOp::with_targets(vec![id]);
        if !mv.update(ctx) {
            ctx.spawn.push(Operation::Move(mv));
        }
        true
    }
}

// ---------------------------------------------------------------------------
//  Crop
// ---------------------------------------------------------------------------

pub struct CropOp {
    targets: Targets,
    drag: MouseDrag,
}

impl Default for CropOp {
    fn default() -> Self {
        Self::new()
    }
}

impl CropOp {
    pub fn new() -> Self {
        Self {
            targets: Targets::select(BLACK),
            drag: MouseDrag::new(),
        }
    }

    /// Each target is replaced in place by its part under the dragged rect,
    /// or removed when nothing of it is left.
    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        match self.targets.update(ctx) {
            TargetStep::Selecting => return false,
            TargetStep::Empty => return true,
            TargetStep::Ready => {}
        }
        if !self.drag.update(ctx.input) {
            return false;
        }
        if !self.drag.moved() {
            return true;
        }
        let rect = self.drag.rect();
        for &id in self.targets.ids() {
            let cropped = ctx.canvas.sprite(id).and_then(|s| s.crop(rect));
            match cropped {
                Some(s) => {
                    ctx.canvas.replace_sprite(id, s);
                }
                None => {
                    ctx.canvas.remove_sprite(id);
                    log_info!("Crop {} left nothing of sprite {}", rect, id);
                }
            }
        }
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        self.targets.draw(dst, dc, GREEN);
        if self.drag.started {
            raster::stroke_rect(dst, self.drag.rect(), GREEN, 2, 2);
        }
    }
}

// ---------------------------------------------------------------------------
//  Reshape
// ---------------------------------------------------------------------------

enum ReshapePhase {
    Resolving(SelectRegionOp),
    Target { id: SpriteId, drag: MouseDrag },
}

pub struct ReshapeOp {
    phase: ReshapePhase,
}

impl Default for ReshapeOp {
    fn default() -> Self {
        Self::new()
    }
}

impl ReshapeOp {
    pub fn new() -> Self {
        Self {
            phase: ReshapePhase::Resolving(SelectRegionOp::new(BLUE)),
        }
    }

    pub fn target(&self) -> Option<SpriteId> {
        match &self.phase {
            ReshapePhase::Target { id, .. } => Some(*id),
            ReshapePhase::Resolving(_) => None,
        }
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        match &mut self.phase {
            ReshapePhase::Resolving(sel) => {
                if !sel.update(ctx) {
                    return false;
                }
                let picked = sel.result().and_then(|s| resolve_selection(ctx.canvas, s));
                match picked {
                    Some(id) => {
                        self.phase = ReshapePhase::Target { id, drag: MouseDrag::new() };
                        false
                    }
                    None => true,
                }
            }
            ReshapePhase::Target { id, drag } => {
                if !ctx.canvas.contains(*id) {
                    return true;
                }
                if !drag.update(ctx.input) {
                    return false;
                }
                if !drag.moved() {
                    return true;
                }
                let rect = drag.rect();
                let interp = ctx.settings.interpolation;
                if let Some(s) = ctx.canvas.sprite_mut(*id)
                    && !s.reshape(rect, interp)
                {
                    log_warn!("Reshape of {} to {} had no effect", id, rect);
                }
                true
            }
        }
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        match &self.phase {
            ReshapePhase::Resolving(sel) => sel.draw(dst, dc),
            ReshapePhase::Target { id, drag } => draw_reshape_preview(dst, dc, *id, drag),
        }
    }
}

/// Outline the target and, once the destination drag has moved, show the
/// target stretched into it.
pub(crate) fn draw_reshape_preview(dst: &mut RgbaImage, dc: &DrawContext, id: SpriteId, drag: &MouseDrag) {
    outline_all(dst, dc, &[id], BLUE);
    if !drag.started {
        return;
    }
    if drag.moved()
        && let Some(s) = dc.canvas.sprite(id)
    {
        s.draw_reshaped(dst, drag.rect(), 1.0);
    }
    raster::stroke_rect(dst, drag.rect(), BLUE, 2, -2);
}

// ---------------------------------------------------------------------------
//  Flatten
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FlattenOp {
    drag: MouseDrag,
}

impl FlattenOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        if !self.drag.update(ctx.input) {
            return false;
        }
        if let Some(s) = flatten_region(ctx.canvas, &self.drag) {
            let rect = s.rect();
            let id = ctx.canvas.add_sprite(s);
            log_info!("Flattened {} into sprite {}", rect, id);
        }
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, _dc: &DrawContext) {
        if self.drag.started {
            raster::stroke_rect(dst, self.drag.rect(), BLUE, 1, 1);
        }
    }
}
