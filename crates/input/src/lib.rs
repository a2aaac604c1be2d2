#![warn(missing_docs)]
//! Pointer input handling: cursor tracking, clicks, drags and wheel.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Cursor travel (pixels) beyond which a press/release is a drag, not a click.
pub const CLICK_SLOP: f64 = 4.0;

/// Discrete pointer event in client-space pixels, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Cursor moved to `(x, y)`.
    Move {
        /// Horizontal pixel coordinate.
        x: f64,
        /// Vertical pixel coordinate, growing downward.
        y: f64,
    },
    /// Primary button clicked at `(x, y)`.
    Click {
        /// Horizontal pixel coordinate.
        x: f64,
        /// Vertical pixel coordinate, growing downward.
        y: f64,
    },
}

impl PointerEvent {
    /// Pixel position carried by the event.
    pub fn position(&self) -> (f64, f64) {
        match *self {
            PointerEvent::Move { x, y } | PointerEvent::Click { x, y } => (x, y),
        }
    }
}

/// Pointer state tracked across a frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Last known cursor position in pixels.
    pub cursor: (f64, f64),
    /// Mouse buttons currently pressed.
    mouse_buttons: HashSet<MouseButton>,
    /// Where the primary button went down, and how far it has travelled since.
    press: Option<((f64, f64), f64)>,
    /// Drag delta accumulated this frame while the primary button is held.
    pub drag_delta: (f64, f64),
    /// Wheel notches accumulated this frame (positive = away from the user).
    pub wheel_delta: f32,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a window event, returning the pointer event it produced, if any.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                Some(self.cursor_moved(position.x, position.y))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.button(*button, *state == ElementState::Pressed)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.wheel(match delta {
                    MouseScrollDelta::LineDelta(_x, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                });
                None
            }
            _ => None,
        }
    }

    /// Record a cursor move.
    pub fn cursor_moved(&mut self, x: f64, y: f64) -> PointerEvent {
        let (dx, dy) = (x - self.cursor.0, y - self.cursor.1);
        self.cursor = (x, y);
        if let Some((_, travelled)) = self.press.as_mut() {
            *travelled += (dx * dx + dy * dy).sqrt();
            self.drag_delta.0 += dx;
            self.drag_delta.1 += dy;
        }
        PointerEvent::Move { x, y }
    }

    /// Record a button transition; a primary release close to its press is a click.
    pub fn button(&mut self, button: MouseButton, pressed: bool) -> Option<PointerEvent> {
        if pressed {
            self.mouse_buttons.insert(button);
            if button == MouseButton::Left {
                self.press = Some((self.cursor, 0.0));
            }
            return None;
        }

        self.mouse_buttons.remove(&button);
        if button != MouseButton::Left {
            return None;
        }
        match self.press.take() {
            Some((_, travelled)) if travelled <= CLICK_SLOP => Some(PointerEvent::Click {
                x: self.cursor.0,
                y: self.cursor.1,
            }),
            _ => None,
        }
    }

    /// Accumulate wheel notches.
    pub fn wheel(&mut self, notches: f32) {
        self.wheel_delta += notches;
    }

    /// Check if a mouse button is currently pressed.
    pub fn mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Take and reset the per-frame drag and wheel accumulators.
    pub fn take_frame_deltas(&mut self) -> ((f64, f64), f32) {
        let deltas = (self.drag_delta, self.wheel_delta);
        self.drag_delta = (0.0, 0.0);
        self.wheel_delta = 0.0;
        deltas
    }
}
