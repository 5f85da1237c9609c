// ============================================================================
// LAYER OPERATIONS: delete, z-order and opacity
// ============================================================================

use image::RgbaImage;

use super::select::{SelectOp, SingleSelectOp, TargetStep, Targets, outline_all};
use super::{BLACK, DrawContext, OpContext, RED};
use crate::canvas::Canvas;
use crate::input::MouseDrag;
use crate::sprite::SpriteId;
use crate::sprite_list::ReorderCommand;

// ---------------------------------------------------------------------------
//  Delete
// ---------------------------------------------------------------------------

pub struct DeleteOp {
    select: SelectOp,
}

impl Default for DeleteOp {
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteOp {
    pub fn new() -> Self {
        Self {
            select: SelectOp::new(RED),
        }
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        if !self.select.update(ctx) {
            return false;
        }
        let ids = self.select.take_targets();
        for id in &ids {
            ctx.canvas.remove_sprite(*id);
        }
        if !ids.is_empty() {
            log_info!("Deleted {} sprite(s)", ids.len());
        }
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        self.select.draw(dst, dc);
    }
}

pub struct DeleteAllOp;

impl DeleteAllOp {
    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        let n = ctx.canvas.len();
        ctx.canvas.clear();
        log_info!("Deleted all {} sprite(s)", n);
        true
    }
}

// ---------------------------------------------------------------------------
//  Reorder / lock order
// ---------------------------------------------------------------------------

pub struct ReorderOp {
    command: ReorderCommand,
    select: SingleSelectOp,
}

impl ReorderOp {
    pub fn new(command: ReorderCommand) -> Self {
        Self {
            command,
            select: SingleSelectOp::new(),
        }
    }

    pub fn command(&self) -> ReorderCommand {
        self.command
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        if !self.select.update(ctx) {
            return false;
        }
        if let Some(id) = self.select.target() {
            ctx.canvas.reorder(self.command, id);
        }
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        self.select.draw(dst, dc);
    }
}

/// Flip whether Move brings its targets to the front.
pub struct LockOrderOp;

impl LockOrderOp {
    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        *ctx.lock_order = !*ctx.lock_order;
        log_info!("Order lock {}", if *ctx.lock_order { "on" } else { "off" });
        true
    }
}

// ---------------------------------------------------------------------------
//  Opacity
// ---------------------------------------------------------------------------

/// Vertical drag adjusts the opacity of the selected sprites. Dragging up
/// makes them more transparent. Nothing is written until release; the
/// preview comes from [`OpacityOp::redraw`].
pub struct OpacityOp {
    targets: Targets,
    drag: MouseDrag,
    /// Offset applied per target on release, recomputed every frame.
    preview: Vec<(SpriteId, f32)>,
}

impl Default for OpacityOp {
    fn default() -> Self {
        Self::new()
    }
}

impl OpacityOp {
    pub fn new() -> Self {
        Self {
            targets: Targets::select(BLACK),
            drag: MouseDrag::new(),
            preview: Vec::new(),
        }
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        match self.targets.update(ctx) {
            TargetStep::Selecting => return false,
            TargetStep::Empty => return true,
            TargetStep::Ready => {}
        }
        let released = self.drag.update(ctx.input);
        if !self.drag.started {
            return false;
        }

        let step = ctx.settings.opacity_drag_pixels.max(1.0);
        let delta = self.drag.diff().y as f32 / step;
        let canvas = &*ctx.canvas;
        self.preview = self
            .targets
            .ids()
            .iter()
            .filter_map(|id| canvas.sprite(*id).map(|s| (*id, (s.opacity_offset() + delta).clamp(-1.0, 0.0))))
            .collect();

        if !released {
            return false;
        }
        for (id, offset) in &self.preview {
            if let Some(s) = ctx.canvas.sprite_mut(*id) {
                s.set_opacity_offset(*offset);
            }
        }
        true
    }

    /// Full recomposite with the previewed alpha on targets.
    pub fn redraw(&self, canvas: &mut Canvas) -> bool {
        if !self.drag.started || self.drag.released || self.preview.is_empty() {
            return false;
        }
        let preview = &self.preview;
        canvas.draw_sprites_with(|id, s| match preview.iter().find(|(p, _)| *p == id) {
            Some((_, offset)) => 1.0 + offset,
            None => s.alpha(),
        });
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        match &self.targets {
            Targets::Selecting(_) => self.targets.draw(dst, dc, BLACK),
            Targets::Chosen(ids) => {
                if !self.drag.started {
                    outline_all(dst, dc, ids, BLACK);
                }
            }
        }
    }
}
