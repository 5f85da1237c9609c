// ============================================================================
// OPERATIONS: multi-frame editing gestures driven by the editor
// ============================================================================
//
// Every gesture is one `Operation` variant carrying its own phase state.
// The editor advances each active operation once per frame through
// `update`; operations never block and never hold references into the
// canvas, only `SpriteId`s.

pub mod carve;
pub mod clipboard;
pub mod edit;
pub mod layers;
pub mod menu;
pub mod select;
pub mod transform;

use std::fmt;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::canvas::Canvas;
use crate::geom::Point;
use crate::input::InputFrame;
use crate::settings::AppSettings;
use crate::text::TextRenderer;

use carve::{CarveOp, CarveProgressOp, Carver};
use clipboard::{ClipboardBackend, ClipboardCopyOp, ClipboardPasteOp};
use edit::{CopyOp, CutOp};
use layers::{DeleteAllOp, DeleteOp, LockOrderOp, OpacityOp, ReorderOp};
use menu::Menu;
use select::{SelectOp, SelectRegionOp, SingleSelectOp};
use transform::{CropOp, DragOp, FlattenOp, MoveOp, ReshapeOp};

// Overlay colours
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum OpError {
    /// The clipboard backend refused a read or write.
    Clipboard(String),
    /// A payload could not be turned into an image.
    Decode(String),
    /// The carve worker failed or went away without a result.
    Carve(String),
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpError::Clipboard(e) => write!(f, "clipboard: {}", e),
            OpError::Decode(e) => write!(f, "decode: {}", e),
            OpError::Carve(e) => write!(f, "carve: {}", e),
        }
    }
}

impl std::error::Error for OpError {}

// ============================================================================
// CONTEXTS
// ============================================================================

/// Engine state an operation may read or mutate during `update`.
pub struct OpContext<'a> {
    pub canvas: &'a mut Canvas,
    pub input: &'a InputFrame,
    pub lock_order: &'a mut bool,
    pub clipboard: Option<&'a mut Box<dyn ClipboardBackend>>,
    pub carver: &'a Arc<dyn Carver>,
    pub text: &'a TextRenderer,
    pub settings: &'a AppSettings,
    /// Visible area in pixels, used to keep menus on screen.
    pub viewport: (u32, u32),
    /// Operations to start alongside the current one.
    pub spawn: &'a mut Vec<Operation>,
    /// Follow-up picked from a menu.
    pub chosen: &'a mut Option<Operation>,
}

impl OpContext<'_> {
    pub fn pointer(&self) -> Point {
        self.input.pointer
    }
}

/// Read-only state for overlay drawing.
pub struct DrawContext<'a> {
    pub canvas: &'a Canvas,
    pub pointer: Point,
}

// ============================================================================
// OPERATION
// ============================================================================

pub enum Operation {
    Select(SelectOp),
    SingleSelect(SingleSelectOp),
    SelectRegion(SelectRegionOp),
    Move(MoveOp),
    Drag(DragOp),
    Crop(CropOp),
    Reshape(ReshapeOp),
    Flatten(FlattenOp),
    Carve(CarveOp),
    CarveProgress(CarveProgressOp),
    Delete(DeleteOp),
    DeleteAll(DeleteAllOp),
    Reorder(ReorderOp),
    LockOrder(LockOrderOp),
    Opacity(OpacityOp),
    Copy(CopyOp),
    Cut(CutOp),
    ClipboardCopy(ClipboardCopyOp),
    ClipboardPaste(ClipboardPasteOp),
    Menu(Menu),
}

impl Operation {
    /// Advance one frame. `Ok(true)` means finished.
    pub fn update(&mut self, ctx: &mut OpContext) -> Result<bool, OpError> {
        match self {
            Operation::Select(op) => Ok(op.update(ctx)),
            Operation::SingleSelect(op) => Ok(op.update(ctx)),
            Operation::SelectRegion(op) => Ok(op.update(ctx)),
            Operation::Move(op) => Ok(op.update(ctx)),
            Operation::Drag(op) => Ok(op.update(ctx)),
            Operation::Crop(op) => Ok(op.update(ctx)),
            Operation::Reshape(op) => Ok(op.update(ctx)),
            Operation::Flatten(op) => Ok(op.update(ctx)),
            Operation::Carve(op) => Ok(op.update(ctx)),
            Operation::CarveProgress(op) => op.update(ctx),
            Operation::Delete(op) => Ok(op.update(ctx)),
            Operation::DeleteAll(op) => Ok(op.update(ctx)),
            Operation::Reorder(op) => Ok(op.update(ctx)),
            Operation::LockOrder(op) => Ok(op.update(ctx)),
            Operation::Opacity(op) => Ok(op.update(ctx)),
            Operation::Copy(op) => Ok(op.update(ctx)),
            Operation::Cut(op) => Ok(op.update(ctx)),
            Operation::ClipboardCopy(op) => op.update(ctx),
            Operation::ClipboardPaste(op) => op.update(ctx),
            Operation::Menu(op) => Ok(op.update(ctx)),
        }
    }

    /// Overlay for the current frame, drawn above the canvas.
    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        match self {
            Operation::Select(op) => op.draw(dst, dc),
            Operation::SingleSelect(op) => op.draw(dst, dc),
            Operation::SelectRegion(op) => op.draw(dst, dc),
            Operation::Move(op) => op.draw(dst, dc),
            Operation::Crop(op) => op.draw(dst, dc),
            Operation::Reshape(op) => op.draw(dst, dc),
            Operation::Flatten(op) => op.draw(dst, dc),
            Operation::Carve(op) => op.draw(dst, dc),
            Operation::CarveProgress(op) => op.draw(dst, dc),
            Operation::Delete(op) => op.draw(dst, dc),
            Operation::Reorder(op) => op.draw(dst, dc),
            Operation::Opacity(op) => op.draw(dst, dc),
            Operation::Copy(op) => op.draw(dst, dc),
            Operation::Cut(op) => op.draw(dst, dc),
            Operation::ClipboardCopy(op) => op.draw(dst, dc),
            Operation::ClipboardPaste(op) => op.draw(dst, dc),
            Operation::Menu(op) => op.draw(dst, dc),
            Operation::Drag(_) | Operation::DeleteAll(_) | Operation::LockOrder(_) => {}
        }
    }

    /// Replace the normal canvas composite for this frame. Returns false when
    /// the operation has nothing special to draw.
    pub fn redraw(&self, canvas: &mut Canvas) -> bool {
        match self {
            Operation::Opacity(op) => op.redraw(canvas),
            _ => false,
        }
    }

    /// Abandon hook, run before the editor drops a cancelled operation.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        if let Operation::ClipboardPaste(op) = self {
            op.cancel(canvas);
        }
    }

    pub fn label(&self) -> String {
        match self {
            Operation::Select(_) => "select".into(),
            Operation::SingleSelect(_) => "select(single)".into(),
            Operation::SelectRegion(_) => "select sprite or rect".into(),
            Operation::Move(_) => "move".into(),
            Operation::Drag(_) => "drag".into(),
            Operation::Crop(_) => "crop".into(),
            Operation::Reshape(_) => "reshape".into(),
            Operation::Flatten(_) => "flatten".into(),
            Operation::Carve(_) => "carve".into(),
            Operation::CarveProgress(op) => format!("carving: {:.0}%", op.progress() * 100.0),
            Operation::Delete(_) => "delete".into(),
            Operation::DeleteAll(_) => "delete all".into(),
            Operation::Reorder(op) => format!("reorder: {}", op.command().label()),
            Operation::LockOrder(_) => "(un)lock order".into(),
            Operation::Opacity(_) => "opacity".into(),
            Operation::Copy(_) => "copy".into(),
            Operation::Cut(_) => "cut".into(),
            Operation::ClipboardCopy(_) => "copy to clipboard".into(),
            Operation::ClipboardPaste(_) => "paste from clipboard".into(),
            Operation::Menu(_) => "menu".into(),
        }
    }

    /// Fresh instance of the same kind and configuration, with no captured
    /// targets. Menus and in-flight carve jobs cannot be repeated.
    pub fn repeat(&self) -> Option<Operation> {
        Some(match self {
            Operation::Select(op) => Operation::Select(SelectOp::new(op.color())),
            Operation::SingleSelect(_) => Operation::SingleSelect(SingleSelectOp::new()),
            Operation::SelectRegion(op) => Operation::SelectRegion(SelectRegionOp::new(op.color())),
            Operation::Move(_) => Operation::Move(MoveOp::new()),
            Operation::Drag(_) => Operation::Drag(DragOp::new()),
            Operation::Crop(_) => Operation::Crop(CropOp::new()),
            Operation::Reshape(_) => Operation::Reshape(ReshapeOp::new()),
            Operation::Flatten(_) => Operation::Flatten(FlattenOp::new()),
            Operation::Carve(_) => Operation::Carve(CarveOp::new()),
            Operation::Delete(_) => Operation::Delete(DeleteOp::new()),
            Operation::DeleteAll(_) => Operation::DeleteAll(DeleteAllOp),
            Operation::Reorder(op) => Operation::Reorder(ReorderOp::new(op.command())),
            Operation::LockOrder(_) => Operation::LockOrder(LockOrderOp),
            Operation::Opacity(_) => Operation::Opacity(OpacityOp::new()),
            Operation::Copy(_) => Operation::Copy(CopyOp::new()),
            Operation::Cut(_) => Operation::Cut(CutOp::new()),
            Operation::ClipboardCopy(_) => Operation::ClipboardCopy(ClipboardCopyOp::new()),
            Operation::ClipboardPaste(_) => Operation::ClipboardPaste(ClipboardPasteOp::new()),
            Operation::CarveProgress(_) | Operation::Menu(_) => return None,
        })
    }

    pub fn is_menu(&self) -> bool {
        matches!(self, Operation::Menu(_))
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Operation({})", self.label())
    }
}
