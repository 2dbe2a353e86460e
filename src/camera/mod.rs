//! Camera system: perspective camera, damped orbit rotation, and
//! trackball-style zoom sharing one look-at target.

/// Core camera struct.
pub mod core;
/// Damped orbit (rotate-only) control.
pub mod orbit;
/// Camera plus its controls.
pub mod rig;
/// Zoom-only trackball control.
pub mod zoom;

pub use self::core::Camera;
pub use orbit::OrbitControls;
pub use rig::CameraRig;
pub use zoom::ZoomControls;
