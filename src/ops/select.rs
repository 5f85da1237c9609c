// ============================================================================
// SELECTION: helper operations that resolve targets for other operations
// ============================================================================

use image::{Rgba, RgbaImage};

use super::{BLACK, DrawContext, OpContext};
use crate::geom::IRect;
use crate::input::MouseDrag;
use crate::raster;
use crate::sprite::SpriteId;

// ----------------------------------------------------------------------------
//  Multi select
// ----------------------------------------------------------------------------

/// Click a sprite, or drag a rectangle over several.
///
/// A press on a sprite finishes at once with that sprite. A press on empty
/// space starts a rubber band; once it has moved, everything overlapping it
/// is selected. Releasing an unmoved band selects whatever is under the
/// release point.
pub struct SelectOp {
    color: Rgba<u8>,
    drag: MouseDrag,
    targets: Vec<SpriteId>,
    moved: bool,
}

impl SelectOp {
    pub fn new(color: Rgba<u8>) -> Self {
        Self {
            color,
            drag: MouseDrag::new(),
            targets: Vec::new(),
            moved: false,
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn targets(&self) -> &[SpriteId] {
        &self.targets
    }

    pub fn take_targets(&mut self) -> Vec<SpriteId> {
        std::mem::take(&mut self.targets)
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        self.drag.update(ctx.input);
        let canvas = &*ctx.canvas;

        if !self.drag.started {
            // hover preview
            self.targets = canvas.sprite_at(ctx.input.pointer).into_iter().collect();
            return false;
        }
        if self.drag.just_started {
            self.targets.clear();
            if let Some(id) = canvas.sprite_at(self.drag.start) {
                self.targets.push(id);
                return true;
            }
        }
        if !self.moved {
            self.moved = self.drag.moved();
        }
        if self.moved {
            self.targets = canvas.sprites_overlapping(self.drag.rect());
        }
        if self.drag.released {
            if !self.moved {
                self.targets = canvas.sprite_at(self.drag.end).into_iter().collect();
            }
            return true;
        }
        false
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        outline_all(dst, dc, &self.targets, self.color);
        if self.drag.started {
            raster::stroke_rect(dst, self.drag.rect(), self.color, 1, 0);
        }
    }
}

// ----------------------------------------------------------------------------
//  Single select
// ----------------------------------------------------------------------------

/// Whatever sprite is under the pointer when the primary button goes down.
#[derive(Default)]
pub struct SingleSelectOp {
    target: Option<SpriteId>,
}

impl SingleSelectOp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<SpriteId> {
        self.target
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        self.target = ctx.canvas.sprite_at(ctx.input.pointer);
        ctx.input.primary.just_pressed
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        if let Some(id) = self.target {
            outline_all(dst, dc, &[id], BLACK);
        }
    }
}

// ----------------------------------------------------------------------------
//  Sprite or region
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A click; the sprite under the release point, if any.
    Sprite(Option<SpriteId>),
    /// A drag that moved.
    Region(IRect),
}

pub struct SelectRegionOp {
    color: Rgba<u8>,
    drag: MouseDrag,
    hover: Option<SpriteId>,
    result: Option<Selection>,
}

impl SelectRegionOp {
    pub fn new(color: Rgba<u8>) -> Self {
        Self {
            color,
            drag: MouseDrag::new(),
            hover: None,
            result: None,
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn result(&self) -> Option<Selection> {
        self.result
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        self.drag.update(ctx.input);
        self.hover = ctx.canvas.sprite_at(ctx.input.pointer);
        if !self.drag.released {
            return false;
        }
        self.result = Some(if self.drag.moved() {
            Selection::Region(self.drag.rect())
        } else {
            Selection::Sprite(ctx.canvas.sprite_at(self.drag.end))
        });
        true
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        if !self.drag.started
            && let Some(id) = self.hover
        {
            outline_all(dst, dc, &[id], self.color);
        }
        if self.drag.moved() {
            raster::stroke_rect(dst, self.drag.rect(), self.color, 1, 0);
        }
    }
}

// ----------------------------------------------------------------------------
//  Select-then-act phases
// ----------------------------------------------------------------------------

/// First phase of the multi-target operations: run a [`SelectOp`], then hold
/// on to its result.
pub enum Targets {
    Selecting(SelectOp),
    Chosen(Vec<SpriteId>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetStep {
    /// Still selecting, or the selection finished on this frame.
    Selecting,
    /// Nothing was selected, or every target has since disappeared.
    Empty,
    /// Targets are available.
    Ready,
}

impl Targets {
    pub fn select(color: Rgba<u8>) -> Self {
        Targets::Selecting(SelectOp::new(color))
    }

    pub fn chosen(ids: Vec<SpriteId>) -> Self {
        Targets::Chosen(ids)
    }

    /// The frame on which the selection completes is reported as
    /// `Selecting`, so the click that picked the targets is never reused as
    /// the next phase's press.
    pub fn update(&mut self, ctx: &mut OpContext) -> TargetStep {
        match self {
            Targets::Selecting(sel) => {
                if !sel.update(ctx) {
                    return TargetStep::Selecting;
                }
                let ids = sel.take_targets();
                if ids.is_empty() {
                    return TargetStep::Empty;
                }
                *self = Targets::Chosen(ids);
                TargetStep::Selecting
            }
            Targets::Chosen(ids) => {
                ids.retain(|id| ctx.canvas.contains(*id));
                if ids.is_empty() { TargetStep::Empty } else { TargetStep::Ready }
            }
        }
    }

    pub fn ids(&self) -> &[SpriteId] {
        match self {
            Targets::Selecting(_) => &[],
            Targets::Chosen(ids) => ids,
        }
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext, color: Rgba<u8>) {
        match self {
            Targets::Selecting(sel) => sel.draw(dst, dc),
            Targets::Chosen(ids) => outline_all(dst, dc, ids, color),
        }
    }
}

/// 1px outline just inside each sprite's rect.
pub fn outline_all(dst: &mut RgbaImage, dc: &DrawContext, ids: &[SpriteId], color: Rgba<u8>) {
    for id in ids {
        if let Some(s) = dc.canvas.sprite(*id) {
            s.outline(dst, color, 1, -1);
        }
    }
}
