//! Scripted pointer input for runs without a window.

use vista_player::{PointerSnapshot, PointerState};
use winit::event::{ElementState, MouseButton};

/// Frames per script cycle. The primary button is held for the second
/// quarter of each cycle while the cursor drifts right and down.
pub const DRAG_CYCLE: u64 = 240;

/// Cursor motion per frame while dragging, in pixels.
const DRAG_STEP: (f64, f64) = (4.0, 1.0);

/// Feeds synthetic winit-style events into a [`PointerState`].
#[derive(Debug, Clone)]
pub struct ScriptedPointer {
    state: PointerState,
    cursor: (f64, f64),
}

impl ScriptedPointer {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        let cursor = (viewport_width as f64 * 0.5, viewport_height as f64 * 0.5);
        let mut state = PointerState::new(viewport_width, viewport_height);
        state.on_cursor_moved(cursor.0, cursor.1);
        state.end_frame();
        Self { state, cursor }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.state.set_viewport(width, height);
    }

    /// Events for `frame`, returned as the snapshot the camera reads. The
    /// per-frame delta is cleared before the next frame's events.
    pub fn frame(&mut self, frame: u64) -> PointerSnapshot {
        self.state.end_frame();

        let phase = frame % DRAG_CYCLE;
        let drag_start = DRAG_CYCLE / 4;
        let drag_end = DRAG_CYCLE / 2;
        if phase == drag_start {
            self.state.on_button(MouseButton::Left, ElementState::Pressed);
        } else if phase == drag_end {
            self.state.on_button(MouseButton::Left, ElementState::Released);
        }

        if self.state.is_down() {
            self.cursor.0 += DRAG_STEP.0;
            self.cursor.1 += DRAG_STEP.1;
            self.state.on_cursor_moved(self.cursor.0, self.cursor.1);
        }
        self.state.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_idle_frames_do_not_drag() {
        let mut pointer = ScriptedPointer::new(400, 100);
        let snapshot = pointer.frame(0);
        assert!(!snapshot.is_dragging());
        assert_eq!(snapshot.delta, Vec2::ZERO);
    }

    #[test]
    fn test_drag_window_yields_normalised_motion() {
        let mut pointer = ScriptedPointer::new(400, 100);
        let snapshot = pointer.frame(DRAG_CYCLE / 4);
        assert!(snapshot.down);
        assert!((snapshot.delta - Vec2::new(0.01, 0.01)).length() < 1e-6);

        // Delta is per frame, not accumulated.
        let next = pointer.frame(DRAG_CYCLE / 4 + 1);
        assert!((next.delta - Vec2::new(0.01, 0.01)).length() < 1e-6);
    }

    #[test]
    fn test_release_ends_the_drag() {
        let mut pointer = ScriptedPointer::new(400, 100);
        pointer.frame(DRAG_CYCLE / 4);
        let snapshot = pointer.frame(DRAG_CYCLE / 2);
        assert!(!snapshot.down);
        assert_eq!(snapshot.delta, Vec2::ZERO);
        assert!(!pointer.state().is_down());
    }
}
