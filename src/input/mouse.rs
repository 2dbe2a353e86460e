use glam::Vec2;

/// Result of a primary-button release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ClickResult {
    /// The press travelled past the drag threshold, or there was no press.
    NoAction,
    /// A click at the release position.
    Click { position: Vec2 },
}

/// Tracks the pointer and tells clicks apart from orbit drags.
#[derive(Debug, Clone)]
pub(crate) struct PointerState {
    pub position: Vec2,
    press_origin: Option<Vec2>,
    is_dragging: bool,
    drag_threshold: f32,
}

impl PointerState {
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            press_origin: None,
            is_dragging: false,
            drag_threshold,
        }
    }

    pub fn set_drag_threshold(&mut self, drag_threshold: f32) {
        self.drag_threshold = drag_threshold;
    }

    pub fn is_pressed(&self) -> bool {
        self.press_origin.is_some()
    }

    pub fn handle_press(&mut self) {
        self.press_origin = Some(self.position);
        self.is_dragging = false;
    }

    /// Move the pointer; returns the delta from the previous position.
    pub fn handle_move(&mut self, position: Vec2) -> Vec2 {
        let delta = position - self.position;
        self.position = position;
        if let Some(origin) = self.press_origin {
            if origin.distance(position) > self.drag_threshold {
                self.is_dragging = true;
            }
        }
        delta
    }

    pub fn handle_release(&mut self) -> ClickResult {
        let was_pressed = self.press_origin.take().is_some();
        let was_dragging = std::mem::take(&mut self.is_dragging);
        if was_pressed && !was_dragging {
            ClickResult::Click {
                position: self.position,
            }
        } else {
            ClickResult::NoAction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_jitter_is_still_a_click() {
        let mut state = PointerState::new(4.0);
        let _ = state.handle_move(Vec2::new(10.0, 10.0));
        state.handle_press();
        let _ = state.handle_move(Vec2::new(12.0, 11.0));
        assert_eq!(
            state.handle_release(),
            ClickResult::Click {
                position: Vec2::new(12.0, 11.0)
            }
        );
    }

    #[test]
    fn travel_past_threshold_is_a_drag() {
        let mut state = PointerState::new(4.0);
        state.handle_press();
        let _ = state.handle_move(Vec2::new(30.0, 0.0));
        // Returning to the origin does not turn the drag back into a click.
        let _ = state.handle_move(Vec2::ZERO);
        assert_eq!(state.handle_release(), ClickResult::NoAction);
        assert!(!state.is_pressed());
    }

    #[test]
    fn release_without_press_does_nothing() {
        let mut state = PointerState::new(4.0);
        assert_eq!(state.handle_release(), ClickResult::NoAction);
    }
}
