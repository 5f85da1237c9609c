// ============================================================================
// EDIT OPERATIONS: duplicate sprites, punch holes in them
// ============================================================================

use image::{Rgba, RgbaImage};

use super::select::{TargetStep, Targets};
use super::{BLACK, DrawContext, OpContext};
use crate::input::MouseDrag;
use crate::raster;

const CUT_COLOR: Rgba<u8> = Rgba([255, 128, 0, 255]);

// ---------------------------------------------------------------------------
//  Copy
// ---------------------------------------------------------------------------

/// Select, then drag: deep copies of the targets land offset by the drag and
/// become the new top sprites, in the same relative order.
pub struct CopyOp {
    targets: Targets,
    drag: MouseDrag,
}

impl Default for CopyOp {
    fn default() -> Self {
        Self::new()
    }
}

impl CopyOp {
    pub fn new() -> Self {
        Self {
            targets: Targets::select(BLACK),
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
        let diff = self.drag.diff();
        // Back-most first so the front-most copy ends on top.
        let ordered = ctx.canvas.in_z_order(self.targets.ids());
        for id in ordered.iter().rev() {
            if let Some(mut copy) = ctx.canvas.sprite(*id).cloned() {
                copy.move_by(diff);
                ctx.canvas.add_sprite(copy);
            }
        }
        log_info!("Copied {} sprite(s) by {}", ordered.len(), diff);
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        self.targets.draw(dst, dc, BLACK);
        if !self.drag.started {
            return;
        }
        for id in self.targets.ids() {
            if let Some(s) = dc.canvas.sprite(*id) {
                s.draw(dst, self.drag.diff(), 0.5);
            }
        }
    }
}

// ---------------------------------------------------------------------------
//  Cut
// ---------------------------------------------------------------------------

/// Select, then drag a rect: its pixels are cleared from every target's own
/// image. Geometry is unchanged.
pub struct CutOp {
    targets: Targets,
    drag: MouseDrag,
}

impl Default for CutOp {
    fn default() -> Self {
        Self::new()
    }
}

impl CutOp {
    pub fn new() -> Self {
        Self {
            targets: Targets::select(BLACK),
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
        if !self.drag.moved() {
            return true;
        }
        let rect = self.drag.rect();
        let mut hit = 0;
        for id in self.targets.ids() {
            if let Some(s) = ctx.canvas.sprite_mut(*id)
                && s.cut(rect)
            {
                hit += 1;
            }
        }
        log_info!("Cut {} out of {} sprite(s)", rect, hit);
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        self.targets.draw(dst, dc, CUT_COLOR);
        if self.drag.started {
            raster::stroke_rect(dst, self.drag.rect(), CUT_COLOR, 1, 0);
        }
    }
}
