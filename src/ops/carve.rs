// ============================================================================
// CARVE: content-aware resize dispatched to the rayon pool
// ============================================================================

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use image::{Rgba, RgbaImage};

use super::select::SelectRegionOp;
use super::transform::{draw_reshape_preview, resolve_selection};
use super::{BLUE, DrawContext, OpContext, OpError, Operation};
use crate::geom::IRect;
use crate::input::MouseDrag;
use crate::raster::{self, Interpolation};
use crate::sprite::{Sprite, SpriteId};

/// Targets smaller than this on either axis are not carved.
pub const MIN_CARVE_SIZE: i32 = 5;

const PROGRESS_BAR_HEIGHT: i32 = 5;
const PROGRESS_FILL: Rgba<u8> = Rgba([0, 0, 255, 128]);

/// A resize that may take a while. Runs off the UI thread; `progress` is
/// called with values in `0..=1`.
pub trait Carver: Send + Sync {
    fn carve(&self, src: &RgbaImage, width: u32, height: u32, progress: &dyn Fn(f32)) -> Result<RgbaImage, String>;
}

/// Plain resampling stand-in. Scales width then height in two passes and
/// reports after each.
pub struct ScaleCarver {
    pub interpolation: Interpolation,
}

impl Default for ScaleCarver {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Bilinear,
        }
    }
}

impl Carver for ScaleCarver {
    fn carve(&self, src: &RgbaImage, width: u32, height: u32, progress: &dyn Fn(f32)) -> Result<RgbaImage, String> {
        let failed = || format!("cannot carve {}x{} to {}x{}", src.width(), src.height(), width, height);
        progress(0.0);
        let wide = raster::resize_image(src, width, src.height(), self.interpolation).ok_or_else(failed)?;
        progress(0.5);
        let out = raster::resize_image(&wide, width, height, self.interpolation).ok_or_else(failed)?;
        progress(1.0);
        Ok(out)
    }
}

/// Start `carver` on a copy of `src`. Results come back through the returned
/// channels; dropping the receivers abandons the job.
pub fn dispatch(
    carver: Arc<dyn Carver>,
    src: RgbaImage,
    width: u32,
    height: u32,
) -> (Receiver<f32>, Receiver<Result<RgbaImage, String>>) {
    let (progress_tx, progress_rx) = mpsc::channel();
    let (result_tx, result_rx) = mpsc::channel();
    rayon::spawn(move || {
        let report = |p: f32| {
            let _ = progress_tx.send(p.clamp(0.0, 1.0));
        };
        let result = carver.carve(&src, width, height, &report);
        let _ = result_tx.send(result);
    });
    (progress_rx, result_rx)
}

// ---------------------------------------------------------------------------
//  Carve
// ---------------------------------------------------------------------------

enum CarvePhase {
    Resolving(SelectRegionOp),
    Target { id: SpriteId, drag: MouseDrag },
}

/// Pick a sprite (or lift a region), drag the destination rect, then carve
/// the target to that size in the background. The target is kept; the
/// result is added as a new sprite.
pub struct CarveOp {
    phase: CarvePhase,
}

impl Default for CarveOp {
    fn default() -> Self {
        Self::new()
    }
}

impl CarveOp {
    pub fn new() -> Self {
        Self {
            phase: CarvePhase::Resolving(SelectRegionOp::new(BLUE)),
        }
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> bool {
        match &mut self.phase {
            CarvePhase::Resolving(sel) => {
                if !sel.update(ctx) {
                    return false;
                }
                let picked = sel.result().and_then(|s| resolve_selection(ctx.canvas, s));
                match picked {
                    Some(id) => {
                        self.phase = CarvePhase::Target { id, drag: MouseDrag::new() };
                        false
                    }
                    None => true,
                }
            }
            CarvePhase::Target { id, drag } => {
                let Some(target) = ctx.canvas.sprite(*id) else { return true };
                let r = target.rect();
                if r.width() < MIN_CARVE_SIZE || r.height() < MIN_CARVE_SIZE {
                    log_info!("Sprite {} too small to carve ({}x{})", id, r.width(), r.height());
                    return true;
                }
                if !drag.update(ctx.input) {
                    return false;
                }
                if !drag.moved() {
                    return true;
                }
                let dest = drag.rect();
                let (progress, result) = dispatch(
                    Arc::clone(ctx.carver),
                    target.image.clone(),
                    dest.width() as u32,
                    dest.height() as u32,
                );
                log_info!("Carving {} into {}", id, dest);
                ctx.spawn.push(Operation::CarveProgress(CarveProgressOp::new(dest, progress, result)));
                true
            }
        }
    }

    pub fn draw(&self, dst: &mut RgbaImage, dc: &DrawContext) {
        match &self.phase {
            CarvePhase::Resolving(sel) => sel.draw(dst, dc),
            CarvePhase::Target { id, drag } => draw_reshape_preview(dst, dc, *id, drag),
        }
    }
}

// ---------------------------------------------------------------------------
//  Progress
// ---------------------------------------------------------------------------

/// Polls a running carve job and places its result.
pub struct CarveProgressOp {
    dest: IRect,
    progress: f32,
    progress_rx: Receiver<f32>,
    result_rx: Receiver<Result<RgbaImage, String>>,
}

impl CarveProgressOp {
    pub fn new(dest: IRect, progress_rx: Receiver<f32>, result_rx: Receiver<Result<RgbaImage, String>>) -> Self {
        Self {
            dest,
            progress: 0.0,
            progress_rx,
            result_rx,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn update(&mut self, ctx: &mut OpContext) -> Result<bool, OpError> {
        while let Ok(p) = self.progress_rx.try_recv() {
            self.progress = p;
        }
        match self.result_rx.try_recv() {
            Ok(Ok(img)) => {
                self.progress = 1.0;
                let id = ctx.canvas.add_sprite(Sprite::new(img, self.dest.min));
                log_info!("Carve finished as sprite {}", id);
                Ok(true)
            }
            Ok(Err(e)) => Err(OpError::Carve(e)),
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(OpError::Carve("worker exited without a result".into())),
        }
    }

    pub fn draw(&self, dst: &mut RgbaImage, _dc: &DrawContext) {
        let d = self.dest;
        let x1 = d.min.x + (d.width() as f32 * self.progress) as i32;
        raster::fill_rect(dst, IRect::new(d.min.x, d.min.y, x1, d.min.y + PROGRESS_BAR_HEIGHT), PROGRESS_FILL);
        raster::stroke_rect(dst, d, BLUE, 1, -1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn scale_carver_reports_progress() {
        let src = RgbaImage::from_pixel(10, 10, Rgba([9, 9, 9, 255]));
        let seen = std::cell::RefCell::new(Vec::new());
        let out = ScaleCarver::default()
            .carve(&src, 4, 7, &|p| seen.borrow_mut().push(p))
            .unwrap();
        assert_eq!(out.dimensions(), (4, 7));
        assert_eq!(seen.into_inner(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn scale_carver_rejects_zero_size() {
        let src = RgbaImage::new(3, 3);
        assert!(ScaleCarver::default().carve(&src, 0, 3, &|_| {}).is_err());
    }

    #[test]
    fn dispatch_delivers_result() {
        let src = RgbaImage::new(8, 8);
        let (_progress, result) = dispatch(Arc::new(ScaleCarver::default()), src, 3, 5);
        let img = result.recv_timeout(Duration::from_secs(10)).unwrap().unwrap();
        assert_eq!(img.dimensions(), (3, 5));
    }
}
