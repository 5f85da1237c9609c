// ============================================================================
// EDITOR: per-frame scheduler for operations
// ============================================================================
//
// One `update` per frame:
//   1. apply finished file decodes
//   2. cancel everything, or start at most one root operation when idle
//   3. advance every active operation once, dropping finished ones
//   4. queue spawned operations and a menu's chosen follow-up
//   5. recomposite the canvas (or let an operation do a custom redraw)

use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::canvas::Canvas;
use crate::geom::Point;
use crate::input::InputFrame;
use crate::io::{FileIngest, IngestEvent};
use crate::ops::carve::{Carver, ScaleCarver};
use crate::ops::clipboard::{ClipboardBackend, ClipboardPasteOp};
use crate::ops::menu::main_menu;
use crate::ops::transform::DragOp;
use crate::ops::{DrawContext, OpContext, Operation};
use crate::raster;
use crate::settings::AppSettings;
use crate::text::TextRenderer;

const STATUS_HEIGHT: u32 = 18;
const STATUS_PADDING: i32 = 4;
const STATUS_FG: Rgba<u8> = Rgba([0, 0, 0, 255]);
const STATUS_BG: Rgba<u8> = Rgba([255, 255, 255, 200]);

pub struct Editor {
    pub canvas: Canvas,
    ops: Vec<Operation>,
    last_op: Option<Operation>,
    lock_order: bool,
    clipboard: Option<Box<dyn ClipboardBackend>>,
    carver: Arc<dyn Carver>,
    text: TextRenderer,
    settings: AppSettings,
    ingest: FileIngest,
    /// Most recent error or notice, shown on the status line.
    status: Option<String>,
}

impl Editor {
    pub fn new(settings: AppSettings, text: TextRenderer) -> Self {
        let carver: Arc<dyn Carver> = Arc::new(ScaleCarver {
            interpolation: settings.interpolation,
        });
        Self {
            canvas: Canvas::new(settings.canvas_width, settings.canvas_height),
            ops: Vec::new(),
            last_op: None,
            lock_order: settings.lock_order,
            clipboard: None,
            carver,
            text,
            settings,
            ingest: FileIngest::new(),
            status: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardBackend>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn with_carver(mut self, carver: Arc<dyn Carver>) -> Self {
        self.carver = carver;
        self
    }

    // ---- accessors --------------------------------------------------------

    pub fn active_ops(&self) -> &[Operation] {
        &self.ops
    }

    pub fn is_idle(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn last_op(&self) -> Option<&Operation> {
        self.last_op.as_ref()
    }

    pub fn lock_order(&self) -> bool {
        self.lock_order
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    /// Start a root operation directly, as if it had been picked from a menu.
    pub fn start(&mut self, op: Operation) {
        if !op.is_menu() {
            self.last_op = op.repeat();
        }
        log_info!("Start {}", op.label());
        self.ops.push(op);
    }

    // ---- ingestion --------------------------------------------------------

    pub fn submit_paths(&mut self, paths: Vec<PathBuf>) {
        self.ingest.submit_paths(paths);
    }

    pub fn submit_bytes(&mut self, name: String, bytes: Vec<u8>) {
        self.ingest.submit_bytes(name, bytes);
    }

    pub fn pending_files(&self) -> usize {
        self.ingest.pending()
    }

    /// Block until every submitted file is decoded and on the canvas.
    pub fn finish_ingest(&mut self) {
        let events = self.ingest.wait_all();
        self.apply_ingest(events);
        self.canvas.draw_sprites();
    }

    fn apply_ingest(&mut self, events: Vec<IngestEvent>) {
        for event in events {
            match event {
                IngestEvent::Loaded { name, image } => {
                    let (w, h) = image.dimensions();
                    let id = self.canvas.add_image(image);
                    log_info!("Loaded {} ({}x{}) as sprite {}", name, w, h, id);
                }
                IngestEvent::Failed { name, error } => {
                    log_err!("Failed to load {}: {}", name, error);
                    self.status = Some(format!("{}: {}", name, error));
                }
            }
        }
    }

    // ---- frame ------------------------------------------------------------

    pub fn update(&mut self, input: &InputFrame) {
        let events = self.ingest.drain();
        self.apply_ingest(events);

        if !self.ops.is_empty() && input.cancel() {
            self.cancel_all();
        } else if self.ops.is_empty() {
            self.start_root(input);
        }

        self.sweep(input);

        let mut redrawn = false;
        for op in &self.ops {
            if op.redraw(&mut self.canvas) {
                redrawn = true;
                break;
            }
        }
        if !redrawn {
            self.canvas.draw_sprites();
        }
    }

    pub fn cancel_all(&mut self) {
        for op in self.ops.iter_mut() {
            op.cancel(&mut self.canvas);
        }
        log_info!("Cancelled {} operation(s)", self.ops.len());
        self.ops.clear();
    }

    fn start_root(&mut self, input: &InputFrame) {
        let op = if input.secondary.just_pressed {
            Some(Operation::Menu(main_menu(self.last_op.as_ref())))
        } else if input.primary.just_pressed {
            Some(Operation::Drag(DragOp::new()))
        } else if input.repeat {
            self.last_op.as_ref().and_then(|op| op.repeat())
        } else if input.paste {
            Some(Operation::ClipboardPaste(ClipboardPasteOp::new()))
        } else {
            None
        };
        if let Some(op) = op {
            self.ops.push(op);
        }
    }

    fn sweep(&mut self, input: &InputFrame) {
        let mut spawned = Vec::new();
        let mut chosen = None;
        let viewport = (self.canvas.width, self.canvas.height);

        let mut i = 0;
        while i < self.ops.len() {
            let mut ctx = OpContext {
                canvas: &mut self.canvas,
                input,
                lock_order: &mut self.lock_order,
                clipboard: self.clipboard.as_mut(),
                carver: &self.carver,
                text: &self.text,
                settings: &self.settings,
                viewport,
                spawn: &mut spawned,
                chosen: &mut chosen,
            };
            match self.ops[i].update(&mut ctx) {
                Ok(false) => i += 1,
                Ok(true) => {
                    self.ops.remove(i);
                }
                Err(e) => {
                    let op = self.ops.remove(i);
                    log_err!("{} failed: {}", op.label(), e);
                    self.status = Some(e.to_string());
                }
            }
        }

        self.ops.extend(spawned);
        if let Some(op) = chosen {
            self.start(op);
        }
    }

    // ---- rendering --------------------------------------------------------

    /// Overlays of every active operation, drawn onto `dst`.
    pub fn draw_overlays(&self, dst: &mut RgbaImage, pointer: Point) {
        let dc = DrawContext {
            canvas: &self.canvas,
            pointer,
        };
        for op in &self.ops {
            op.draw(dst, &dc);
        }
    }

    /// Text for the status line: active operations, the order lock and the
    /// latest notice.
    pub fn status_text(&self) -> String {
        let mut parts: Vec<String> = self.ops.iter().map(|op| op.label()).collect();
        if self.lock_order {
            parts.push("order locked".into());
        }
        if let Some(s) = &self.status {
            parts.push(s.clone());
        }
        parts.join(" | ")
    }

    /// Canvas, overlays and status line in one buffer.
    pub fn compose_frame(&self, pointer: Point) -> RgbaImage {
        let mut frame = self.canvas.image.clone();
        self.draw_overlays(&mut frame, pointer);
        if self.settings.show_status {
            let text = self.status_text();
            if !text.is_empty()
                && let Some(line) = self.text.render_line(&text, STATUS_HEIGHT, STATUS_PADDING, STATUS_FG, STATUS_BG)
            {
                let y = frame.height() as i32 - STATUS_HEIGHT as i32;
                raster::composite(&mut frame, &line, Point::new(0, y), 1.0);
            }
        }
        frame
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.canvas.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::layers::DeleteAllOp;
    use crate::ops::menu::main_menu;

    fn editor() -> Editor {
        let settings = AppSettings {
            canvas_width: 120,
            canvas_height: 60,
            ..AppSettings::default()
        };
        Editor::new(settings, TextRenderer::without_font(7.0, 14.0))
    }

    #[test]
    fn menus_are_not_remembered_for_repeat() {
        let mut ed = editor();
        ed.start(Operation::Menu(main_menu(None)));
        assert!(ed.last_op().is_none());
        ed.cancel_all();
        ed.start(Operation::DeleteAll(DeleteAllOp));
        assert_eq!(ed.last_op().map(|op| op.label()), Some("delete all".to_string()));
    }

    #[test]
    fn status_text_lists_ops_and_lock() {
        let mut ed = editor();
        assert_eq!(ed.status_text(), "");
        ed.lock_order = true;
        ed.start(Operation::DeleteAll(DeleteAllOp));
        assert_eq!(ed.status_text(), "delete all | order locked");
    }

    #[test]
    fn compose_frame_paints_status_line_at_bottom() {
        let mut ed = editor();
        ed.status = Some("x".into());
        let frame = ed.compose_frame(Point::ZERO);
        assert_eq!(frame.dimensions(), (120, 60));
        assert_eq!(frame.get_pixel(1, 59)[3], 200);
        assert_eq!(frame.get_pixel(1, 1)[3], 0);

        ed.clear_status();
        let frame = ed.compose_frame(Point::ZERO);
        assert_eq!(frame.get_pixel(1, 59)[3], 0);
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut ed = editor();
        ed.resize_canvas(0, 10);
        assert_eq!((ed.canvas.width, ed.canvas.height), (120, 60));
        ed.resize_canvas(30, 40);
        assert_eq!(ed.canvas.image.dimensions(), (30, 40));
    }
}
