use glam::Vec2;

/// Discrete actions the [`Viewer`](crate::viewer::Viewer) executes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerCommand {
    /// Orbit the camera by a pointer delta in physical pixels.
    RotateCamera {
        /// Pointer movement since the last event.
        delta: Vec2,
    },
    /// Zoom by a number of scroll lines (positive = in).
    Zoom {
        /// Scroll amount.
        delta: f32,
    },
    /// Toggle bloom on the nearest object under a client-space point.
    ToggleBloomAt {
        /// Client-space pointer position.
        position: Vec2,
    },
}
