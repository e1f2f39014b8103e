//! Frame-coherent pointer state for orbit dragging.
//!
//! [`PointerState`] accumulates winit events during a frame. Motion is kept
//! in viewport-normalised units (pixels divided by the viewport width and
//! height), so one full-width drag moves the pointer by 1.0 on X.

use glam::Vec2;
use winit::event::{ElementState, MouseButton};

/// What the orbit camera reads from the pointer each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSnapshot {
    /// Primary button held.
    pub down: bool,
    /// Pointer lock engaged.
    pub locked: bool,
    /// Normalised motion since the last [`PointerState::end_frame`].
    pub delta: Vec2,
}

impl PointerSnapshot {
    /// Whether the motion of this frame should steer the camera.
    pub fn is_dragging(&self) -> bool {
        self.down || self.locked
    }
}

#[derive(Debug, Clone)]
pub struct PointerState {
    position: Vec2,
    viewport: Vec2,
    delta: Vec2,
    down: bool,
    locked: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl PointerState {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        let mut state = Self {
            position: Vec2::ZERO,
            viewport: Vec2::ONE,
            delta: Vec2::ZERO,
            down: false,
            locked: false,
        };
        state.set_viewport(viewport_width, viewport_height);
        state
    }

    /// Track a viewport resize. Zero extents are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = Vec2::new(width as f32, height as f32);
        }
    }

    /// Process a `WindowEvent::CursorMoved`. Ignored for motion while locked.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if !self.locked {
            self.delta += (position - self.position) / self.viewport;
        }
        self.position = position;
    }

    /// Process a `DeviceEvent::MouseMotion`. Only counted while locked.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.locked {
            self.delta += Vec2::new(dx as f32, dy as f32) / self.viewport;
        }
    }

    /// Process a `WindowEvent::MouseInput`. Only the primary button matters.
    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.down = state == ElementState::Pressed;
        }
    }

    /// Grab and hide the cursor (or release it) and record the lock state.
    pub fn set_locked(&mut self, window: &winit::window::Window, locked: bool) {
        use winit::window::CursorGrabMode;
        if locked {
            // Locked first, Confined as the fallback.
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                tracing::warn!("Pointer lock unavailable: {err}");
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
                tracing::debug!("Pointer release failed: {err}");
            }
            window.set_cursor_visible(true);
        }
        self.locked = locked;
    }

    /// Record the lock state without touching a window.
    pub fn set_locked_flag(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Clear the per-frame delta.
    pub fn end_frame(&mut self) {
        self.delta = Vec2::ZERO;
    }

    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot {
            down: self.down,
            locked: self.locked,
            delta: self.delta,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn is_down(&self) -> bool {
        self.down
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
