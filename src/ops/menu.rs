// ============================================================================
// MENU: transient operation that picks the next operation
// ============================================================================

use image::{Rgba, RgbaImage};

use super::carve::CarveOp;
use super::clipboard::{ClipboardCopyOp, ClipboardPasteOp};
use super::edit::{CopyOp, CutOp};
use super::layers::{DeleteAllOp, DeleteOp, LockOrderOp, OpacityOp, ReorderOp};
use super::transform::{CropOp, FlattenOp, MoveOp, ReshapeOp};
use super::{BLACK, DrawContext, OpContext, Operation};
use crate::geom::{IRect, Point};
use crate::input::MouseButton;
use crate::raster;
use crate::sprite::Sprite;
use crate::sprite_list::ReorderCommand;
use crate::text::TextRenderer;

pub const ITEM_HEIGHT: i32 = 18;
pub const PADDING: i32 = 4;
/// Border drawn around the whole menu.
pub const BORDER: i32 = 2;

const MENU_FG: Rgba<u8> = Rgba([0, 0, 0, 255]);
const MENU_BG: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub struct MenuOption {
    pub label: String,
    pub operation: Option<Operation>,
    button: Option<Sprite>,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, operation: Operation) -> Self {
        Self {
            label: label.into(),
            operation: Some(operation),
            button: None,
        }
    }

    fn contains(&self, p: Point) -> bool {
        self.button.as_ref().is_some_and(|b| b.contains(p))
    }
}

pub struct Menu {
    options: Vec<MenuOption>,
    button: MouseButton,
    /// Whether the trigger button was held when the menu opened. `None`
    /// until the first update samples it.
    start_pressed: Option<bool>,
    rect: Option<IRect>,
}

impl Menu {
    pub fn new(options: Vec<MenuOption>, button: MouseButton) -> Self {
        Self {
            options,
            button,
            start_pressed: None,
            rect: None,
        }
    }

    /// Opened by a press that is still held: choose on release.
    pub fn opened_pressed(mut self) -> Self {
        self.start_pressed = Some(true);
        self
    }

    pub fn rect(&self) -> Option<IRect> {
        self.rect
    }

    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }

    /// First update lays the menu out at the pointer. Afterwards it waits for
    /// the release of the held trigger (or a fresh press when it was opened
    /// idle) and hands the option under the pointer to the editor.
    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        let state = ctx.input.button(self.button);
        if self.rect.is_none() {
            if self.start_pressed.is_none() {
                self.start_pressed = Some(state.down);
            }
            self.layout(ctx.text, ctx.input.pointer, ctx.viewport);
            return false;
        }
        let edge = if self.start_pressed.unwrap_or(false) {
            state.just_released
        } else {
            state.just_pressed
        };
        if !edge {
            return false;
        }
        let pointer = ctx.input.pointer;
        if let Some(opt) = self.options.iter_mut().find(|o| o.contains(pointer)) {
            *ctx.chosen = opt.operation.take();
        }
        true
    }

    fn layout(&mut self, text: &TextRenderer, anchor: Point, viewport: (u32, u32)) {
        let widest = self.options.iter().map(|o| text.measure(&o.label)).max().unwrap_or(0);
        let width = widest + PADDING * 2;
        let height = ITEM_HEIGHT * self.options.len() as i32;

        let mut rect = IRect::new(anchor.x, anchor.y, anchor.x + width, anchor.y + height);
        let dx = rect.max.x - viewport.0 as i32 + BORDER;
        if dx > 0 {
            rect = rect.translate(Point::new(-dx, 0));
        }
        let dy = rect.max.y - viewport.1 as i32 + BORDER;
        if dy > 0 {
            rect = rect.translate(Point::new(0, -dy));
        }
        let shift = Point::new((-rect.min.x).max(0), (-rect.min.y).max(0));
        rect = rect.translate(shift);

        for (i, opt) in self.options.iter_mut().enumerate() {
            let pos = Point::new(rect.min.x, rect.min.y + i as i32 * ITEM_HEIGHT);
            opt.button = text
                .render_box(&opt.label, width.max(1) as u32, ITEM_HEIGHT as u32, PADDING, MENU_FG, MENU_BG)
                .map(|img| Sprite::new(img, pos));
        }
        self.rect = Some(rect);
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        let Some(rect) = self.rect else { return };
        for opt in &self.options {
            let Some(b) = &opt.button else { continue };
            if b.contains(dc.pointer) {
                b.draw_inverted(dst, Point::ZERO, 1.0);
            } else {
                b.draw(dst, Point::ZERO, 1.0);
            }
        }
        raster::stroke_rect(dst, rect, BLACK, BORDER, BORDER);
    }
}

/// The context menu opened by a secondary press. `last` adds a repeat entry
/// at the top.
pub fn main_menu(last: Option<&Operation>) -> Menu {
    let reorder = Menu::new(
        ReorderCommand::all()
            .iter()
            .map(|cmd| MenuOption::new(cmd.label(), Operation::Reorder(ReorderOp::new(*cmd))))
            .collect(),
        MouseButton::Primary,
    );
    let util = Menu::new(
        vec![
            MenuOption::new("copy to clipboard", Operation::ClipboardCopy(ClipboardCopyOp::new())),
            MenuOption::new("paste from clipboard", Operation::ClipboardPaste(ClipboardPasteOp::new())),
            MenuOption::new("(un)lock order", Operation::LockOrder(LockOrderOp)),
            MenuOption::new("delete all", Operation::DeleteAll(DeleteAllOp)),
        ],
        MouseButton::Primary,
    );

    let mut options = Vec::new();
    if let Some(op) = last.and_then(|l| l.repeat()) {
        options.push(MenuOption::new(format!("({})", op.label()), op));
    }
    options.extend([
        MenuOption::new("move", Operation::Move(MoveOp::new())),
        MenuOption::new("copy", Operation::Copy(CopyOp::new())),
        MenuOption::new("crop", Operation::Crop(CropOp::new())),
        MenuOption::new("cut", Operation::Cut(CutOp::new())),
        MenuOption::new("reshape", Operation::Reshape(ReshapeOp::new())),
        MenuOption::new("carve", Operation::Carve(CarveOp::new())),
        MenuOption::new("flatten", Operation::Flatten(FlattenOp::new())),
        MenuOption::new("opacity", Operation::Opacity(OpacityOp::new())),
        MenuOption::new("delete", Operation::Delete(DeleteOp::new())),
        MenuOption::new("reorder", Operation::Menu(reorder)),
        MenuOption::new("util", Operation::Menu(util)),
    ]);
    Menu::new(options, MouseButton::Secondary).opened_pressed()
}
