//! Converts raw platform events into viewer commands.
//!
//! The `InputProcessor` owns all transient input state (pointer position,
//! press tracking, click-vs-drag detection). It is the only thing that sits
//! between raw window events and [`Viewer::execute`](crate::viewer::Viewer::execute).

use glam::Vec2;

use super::command::ViewerCommand;
use super::event::{InputEvent, MouseButton};
use super::mouse::{ClickResult, PointerState};

/// Converts raw window events into [`ViewerCommand`]s.
///
/// # Usage
///
/// ```ignore
/// // In the event loop:
/// if let Some(cmd) = processor.handle_event(event) {
///     viewer.execute(cmd);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InputProcessor {
    pointer: PointerState,
}

impl InputProcessor {
    /// Processor treating presses that travel more than `drag_threshold`
    /// physical pixels as drags.
    #[must_use]
    pub fn new(drag_threshold: f32) -> Self {
        Self {
            pointer: PointerState::new(drag_threshold),
        }
    }

    /// Change the click/drag threshold. Pointer state is kept.
    pub fn set_drag_threshold(&mut self, drag_threshold: f32) {
        self.pointer.set_drag_threshold(drag_threshold);
    }

    /// Current cursor position in physical pixels.
    #[must_use]
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer.position
    }

    /// Whether the primary button is held.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pointer.is_pressed()
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<ViewerCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => {
                let delta = self.pointer.handle_move(Vec2::new(x, y));
                (self.pointer.is_pressed() && delta != Vec2::ZERO)
                    .then_some(ViewerCommand::RotateCamera { delta })
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            } => {
                self.pointer.handle_press();
                None
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: false,
            } => match self.pointer.handle_release() {
                ClickResult::Click { position } => {
                    Some(ViewerCommand::ToggleBloomAt { position })
                }
                ClickResult::NoAction => None,
            },
            InputEvent::MouseButton { .. } => None,
            InputEvent::Scroll { delta } => {
                (delta != 0.0).then_some(ViewerCommand::Zoom { delta })
            }
        }
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        let controls = crate::options::ControlOptions::default();
        Self::new(controls.click_drag_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left(pressed: bool) -> InputEvent {
        InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        }
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::CursorMoved { x, y }
    }

    #[test]
    fn click_toggles_at_release_position() {
        let mut p = InputProcessor::new(4.0);
        assert_eq!(p.handle_event(moved(50.0, 60.0)), None);
        assert_eq!(p.handle_event(left(true)), None);
        assert_eq!(
            p.handle_event(left(false)),
            Some(ViewerCommand::ToggleBloomAt {
                position: Vec2::new(50.0, 60.0)
            })
        );
    }

    #[test]
    fn drag_rotates_and_does_not_toggle() {
        let mut p = InputProcessor::new(4.0);
        let _ = p.handle_event(moved(0.0, 0.0));
        let _ = p.handle_event(left(true));
        assert_eq!(
            p.handle_event(moved(20.0, -5.0)),
            Some(ViewerCommand::RotateCamera {
                delta: Vec2::new(20.0, -5.0)
            })
        );
        assert_eq!(p.handle_event(left(false)), None);
        // Hovering after release no longer rotates.
        assert_eq!(p.handle_event(moved(40.0, 0.0)), None);
    }

    #[test]
    fn raised_threshold_turns_a_drag_into_a_click() {
        let mut p = InputProcessor::new(4.0);
        let _ = p.handle_event(moved(10.0, 10.0));
        p.set_drag_threshold(50.0);
        assert_eq!(p.pointer_position(), Vec2::new(10.0, 10.0));
        let _ = p.handle_event(left(true));
        let _ = p.handle_event(moved(30.0, 10.0));
        assert_eq!(
            p.handle_event(left(false)),
            Some(ViewerCommand::ToggleBloomAt {
                position: Vec2::new(30.0, 10.0)
            })
        );
    }

    #[test]
    fn scroll_zooms() {
        let mut p = InputProcessor::default();
        assert_eq!(
            p.handle_event(InputEvent::Scroll { delta: 2.0 }),
            Some(ViewerCommand::Zoom { delta: 2.0 })
        );
        assert_eq!(p.handle_event(InputEvent::Scroll { delta: 0.0 }), None);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut p = InputProcessor::new(4.0);
        let right = InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: true,
        };
        assert_eq!(p.handle_event(right), None);
        assert!(!p.is_pressed());
    }
}
