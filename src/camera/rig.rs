use glam::Vec2;

use super::core::Camera;
use super::orbit::OrbitControls;
use super::zoom::ZoomControls;
use crate::options::{CameraOptions, ControlOptions};

/// Camera plus the two controls that drive it: a damped orbit for
/// rotation and a trackball-style zoom. Both look at the same target.
#[derive(Debug, Clone)]
pub struct CameraRig {
    /// The driven camera.
    pub camera: Camera,
    /// Rotation control (owns the shared target).
    pub orbit: OrbitControls,
    /// Zoom control (target copied from the orbit every update).
    pub zoom: ZoomControls,
}

impl CameraRig {
    /// Build a rig from options for a viewport of the given size.
    #[must_use]
    pub fn new(
        camera: &CameraOptions,
        controls: &ControlOptions,
        width: u32,
        height: u32,
    ) -> Self {
        let mut camera = Camera::from_options(camera, 1.0);
        camera.set_viewport(width, height);
        Self {
            orbit: OrbitControls::new(camera.target, controls),
            zoom: ZoomControls::new(camera.target, controls),
            camera,
        }
    }

    /// Advance both controls by one frame. Returns whether the camera
    /// moved.
    pub fn update(&mut self) -> bool {
        let rotated = self.orbit.update(&mut self.camera);
        self.zoom.target = self.orbit.target;
        let zoomed = self.zoom.update(&mut self.camera);
        rotated || zoomed
    }

    /// Queue a rotation from a pointer drag.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        self.orbit.rotate_by_pixels(delta.x, delta.y, viewport_height);
    }

    /// Queue a zoom; positive zooms in.
    pub fn scroll(&mut self, lines: f32) {
        self.zoom.scroll(lines);
    }

    /// Retune projection and both controls without moving the camera.
    pub fn apply_options(
        &mut self,
        camera: &CameraOptions,
        controls: &ControlOptions,
    ) {
        self.camera.apply_options(camera);
        self.orbit.apply_options(controls);
        self.zoom.apply_options(controls);
    }

    /// Recompute projection for new viewport dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn zoom_tracks_orbit_target() {
        let mut rig = CameraRig::new(
            &CameraOptions::default(),
            &ControlOptions::default(),
            800,
            600,
        );
        rig.orbit.target = Vec3::new(5.0, 0.0, 0.0);
        let _ = rig.update();
        assert_eq!(rig.zoom.target, rig.orbit.target);
        assert_eq!(rig.camera.target, rig.orbit.target);
    }

    #[test]
    fn rotate_and_zoom_both_apply_in_one_update() {
        let mut rig = CameraRig::new(
            &CameraOptions::default(),
            &ControlOptions::default(),
            800,
            600,
        );
        let start = rig.camera.eye;
        let start_dist = start.length();
        rig.rotate(Vec2::new(50.0, 0.0), 600.0);
        rig.scroll(2.0);
        assert!(rig.update());
        assert!(rig.camera.eye != start);
        assert!(rig.camera.eye.length() < start_dist);
    }

    #[test]
    fn new_options_retune_without_moving() {
        let mut rig = CameraRig::new(
            &CameraOptions::default(),
            &ControlOptions::default(),
            800,
            600,
        );
        let eye = rig.camera.eye;
        let camera = CameraOptions {
            fovy: 70.0,
            znear: 0.5,
            zfar: 50.0,
            eye: [100.0, 0.0, 0.0],
            ..CameraOptions::default()
        };
        let controls = ControlOptions {
            enable_damping: false,
            damping_factor: 0.5,
            zoom_speed: 3.0,
            ..ControlOptions::default()
        };
        rig.apply_options(&camera, &controls);

        assert_eq!(rig.camera.eye, eye);
        assert!((rig.camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(
            (rig.camera.fovy, rig.camera.znear, rig.camera.zfar),
            (70.0, 0.5, 50.0)
        );
        assert!(!rig.orbit.enable_damping);
        assert_eq!(rig.orbit.damping_factor, 0.5);
        assert_eq!(rig.zoom.zoom_speed, 3.0);
    }

    #[test]
    fn resize_sets_aspect() {
        let mut rig = CameraRig::new(
            &CameraOptions::default(),
            &ControlOptions::default(),
            800,
            600,
        );
        rig.resize(1000, 250);
        assert!((rig.camera.aspect - 4.0).abs() < 1e-6);
    }
}
