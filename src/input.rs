// ============================================================================
// INPUT: per-frame input snapshot and the mouse drag gesture
// ============================================================================

use crate::geom::{IRect, Point};

/// Canonical drag rects narrower than this on either axis count as a click.
pub const MOVE_THRESHOLD: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Secondary,
}

/// Level and edge state of one button for the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub down: bool,
    pub just_pressed: bool,
    pub just_released: bool,
}

impl ButtonState {
    pub const IDLE: ButtonState = ButtonState {
        down: false,
        just_pressed: false,
        just_released: false,
    };
    pub const PRESSED: ButtonState = ButtonState {
        down: true,
        just_pressed: true,
        just_released: false,
    };
    pub const HELD: ButtonState = ButtonState {
        down: true,
        just_pressed: false,
        just_released: false,
    };
    pub const RELEASED: ButtonState = ButtonState {
        down: false,
        just_pressed: false,
        just_released: true,
    };
    /// Pressed and released within one frame.
    pub const CLICKED: ButtonState = ButtonState {
        down: false,
        just_pressed: true,
        just_released: true,
    };
}

/// Everything the engine reads from the host in one frame. Edges are
/// reported once, on the frame they happen.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct InputFrame {
    pub pointer: Point,
    pub primary: ButtonState,
    pub secondary: ButtonState,
    pub escape: bool,
    /// Repeat-last-operation key.
    pub repeat: bool,
    /// Paste shortcut or a host paste event.
    pub paste: bool,
}

impl InputFrame {
    pub fn button(&self, b: MouseButton) -> ButtonState {
        match b {
            MouseButton::Primary => self.primary,
            MouseButton::Secondary => self.secondary,
        }
    }

    /// Abort request: secondary click or Escape.
    pub fn cancel(&self) -> bool {
        self.secondary.just_pressed || self.escape
    }

    // ---- scripted frames --------------------------------------------------

    pub fn hover(x: i32, y: i32) -> Self {
        Self {
            pointer: Point::new(x, y),
            ..Self::default()
        }
    }

    pub fn press(x: i32, y: i32) -> Self {
        Self {
            primary: ButtonState::PRESSED,
            ..Self::hover(x, y)
        }
    }

    pub fn hold(x: i32, y: i32) -> Self {
        Self {
            primary: ButtonState::HELD,
            ..Self::hover(x, y)
        }
    }

    pub fn release(x: i32, y: i32) -> Self {
        Self {
            primary: ButtonState::RELEASED,
            ..Self::hover(x, y)
        }
    }

    pub fn click(x: i32, y: i32) -> Self {
        Self {
            primary: ButtonState::CLICKED,
            ..Self::hover(x, y)
        }
    }

    pub fn secondary_press(x: i32, y: i32) -> Self {
        Self {
            secondary: ButtonState::PRESSED,
            ..Self::hover(x, y)
        }
    }

    pub fn secondary_hold(x: i32, y: i32) -> Self {
        Self {
            secondary: ButtonState::HELD,
            ..Self::hover(x, y)
        }
    }

    pub fn secondary_release(x: i32, y: i32) -> Self {
        Self {
            secondary: ButtonState::RELEASED,
            ..Self::hover(x, y)
        }
    }

    pub fn escape() -> Self {
        Self {
            escape: true,
            ..Self::default()
        }
    }

    pub fn repeat_key(x: i32, y: i32) -> Self {
        Self {
            repeat: true,
            ..Self::hover(x, y)
        }
    }

    pub fn paste_key(x: i32, y: i32) -> Self {
        Self {
            paste: true,
            ..Self::hover(x, y)
        }
    }
}

/// Press, move, release on one button.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseDrag {
    pub start: Point,
    pub end: Point,
    pub button: MouseButton,
    pub started: bool,
    /// True only on the frame the press arrived.
    pub just_started: bool,
    pub released: bool,
}

impl MouseDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_button(button: MouseButton) -> Self {
        Self {
            button,
            ..Self::default()
        }
    }

    /// Advance one frame. Returns true once the drag has been released; a
    /// released drag ignores all further input.
    pub fn update(&mut self, input: &InputFrame) -> bool {
        self.just_started = false;
        if self.released {
            return true;
        }
        let state = input.button(self.button);
        if !self.started {
            if !state.just_pressed {
                return false;
            }
            self.started = true;
            self.just_started = true;
            self.start = input.pointer;
            self.end = input.pointer;
        } else {
            self.end = input.pointer;
        }
        if state.just_released {
            self.released = true;
        }
        self.released
    }

    pub fn diff(&self) -> Point {
        self.end - self.start
    }

    pub fn rect(&self) -> IRect {
        IRect::from_corners(self.start, self.end)
    }

    pub fn moved(&self) -> bool {
        if !self.started {
            return false;
        }
        let r = self.rect();
        r.width() >= MOVE_THRESHOLD && r.height() >= MOVE_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_gesture() {
        let mut d = MouseDrag::new();
        assert!(!d.update(&InputFrame::hover(1, 1)));
        assert!(!d.started);

        assert!(!d.update(&InputFrame::press(10, 10)));
        assert!(d.started && d.just_started);
        assert_eq!(d.rect(), IRect::new(10, 10, 10, 10));

        assert!(!d.update(&InputFrame::hold(4, 30)));
        assert!(!d.just_started);
        assert_eq!(d.rect(), IRect::new(4, 10, 10, 30));
        assert_eq!(d.diff(), Point::new(-6, 20));

        assert!(d.update(&InputFrame::release(5, 30)));
        assert!(d.released);
        assert!(d.moved());

        // Terminal: later input changes nothing.
        assert!(d.update(&InputFrame::press(100, 100)));
        assert_eq!(d.end, Point::new(5, 30));
    }

    #[test]
    fn click_in_one_frame() {
        let mut d = MouseDrag::new();
        assert!(d.update(&InputFrame::click(3, 3)));
        assert!(d.started && d.released);
        assert!(!d.moved());
    }

    #[test]
    fn moved_needs_both_axes() {
        let mut d = MouseDrag::new();
        d.update(&InputFrame::press(0, 0));
        d.update(&InputFrame::hold(50, 1));
        assert!(!d.moved());
        d.update(&InputFrame::hold(2, 2));
        assert!(d.moved());
    }

    #[test]
    fn not_started_is_not_moved() {
        let d = MouseDrag::new();
        assert!(!d.moved());
    }

    #[test]
    fn secondary_drag_ignores_primary() {
        let mut d = MouseDrag::with_button(MouseButton::Secondary);
        d.update(&InputFrame::press(1, 1));
        assert!(!d.started);
        d.update(&InputFrame::secondary_press(1, 1));
        assert!(d.started);
        assert!(d.update(&InputFrame::secondary_release(9, 9)));
    }

    #[test]
    fn cancel_sources() {
        assert!(InputFrame::escape().cancel());
        assert!(InputFrame::secondary_press(0, 0).cancel());
        assert!(!InputFrame::press(0, 0).cancel());
    }
}
