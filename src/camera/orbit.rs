//! Damped orbit control: drag to rotate the eye around a target on a
//! sphere. Zoom is handled separately by [`ZoomControls`](super::ZoomControls).

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::core::Camera;
use crate::options::ControlOptions;

const EPS: f32 = 1e-6;

/// Pending rotation in spherical coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Orbit controls rotating the camera around [`target`](Self::target).
///
/// With damping enabled, each [`update`](Self::update) applies
/// `damping_factor` of the pending rotation and keeps the rest, so motion
/// eases out over several frames after the pointer stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Point the camera orbits around and looks at.
    pub target: Vec3,
    /// Whether pending rotation decays over several frames.
    pub enable_damping: bool,
    /// Fraction of pending rotation applied per update.
    pub damping_factor: f32,
    /// Rotation sensitivity multiplier.
    pub rotate_speed: f32,
    /// Smallest polar angle (radians from +Y).
    pub min_polar_angle: f32,
    /// Largest polar angle (radians from +Y).
    pub max_polar_angle: f32,
    delta: SphericalDelta,
}

impl OrbitControls {
    /// Controls orbiting `target` with tuning from `options`.
    #[must_use]
    pub fn new(target: Vec3, options: &ControlOptions) -> Self {
        let mut controls = Self {
            target,
            enable_damping: true,
            damping_factor: 1.0,
            rotate_speed: 1.0,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            delta: SphericalDelta::default(),
        };
        controls.apply_options(options);
        controls
    }

    /// Retune damping and speed. Target and pending rotation are kept.
    pub fn apply_options(&mut self, options: &ControlOptions) {
        self.enable_damping = options.enable_damping;
        self.damping_factor = options.damping_factor.clamp(EPS, 1.0);
        self.rotate_speed = options.rotate_speed;
    }

    /// Queue a rotation from a pointer drag of `(dx, dy)` physical pixels.
    /// A drag across the full viewport height is one full turn.
    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.rotate_left(TAU * dx / viewport_height * self.rotate_speed);
        self.rotate_up(TAU * dy / viewport_height * self.rotate_speed);
    }

    /// Queue an azimuthal rotation.
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    /// Queue a polar rotation.
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    /// Whether rotation is still pending.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.delta.theta.abs() > EPS || self.delta.phi.abs() > EPS
    }

    /// Apply pending rotation to `camera`. Returns whether the eye moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.eye - self.target;
        let radius = offset.length();
        if radius <= EPS {
            return false;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.delta.theta * step;
        phi += self.delta.phi * step;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        let new_eye = self.target + new_offset;
        let moved = new_eye.distance_squared(camera.eye) > EPS;
        camera.eye = new_eye;
        camera.target = self.target;

        if self.enable_damping {
            self.delta.theta *= 1.0 - self.damping_factor;
            self.delta.phi *= 1.0 - self.damping_factor;
        } else {
            self.delta = SphericalDelta::default();
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CameraOptions;

    fn setup() -> (Camera, OrbitControls) {
        let cam = Camera::from_options(&CameraOptions::default(), 1.0);
        let orbit = OrbitControls::new(cam.target, &ControlOptions::default());
        (cam, orbit)
    }

    #[test]
    fn idle_update_keeps_eye() {
        let (mut cam, mut orbit) = setup();
        let before = cam.eye;
        assert!(!orbit.update(&mut cam));
        assert!((cam.eye - before).length() < 1e-4);
    }

    #[test]
    fn damping_converges_and_preserves_radius() {
        let (mut cam, mut orbit) = setup();
        let radius = (cam.eye - orbit.target).length();
        orbit.rotate_by_pixels(100.0, 0.0, 800.0);

        let first = cam.eye;
        assert!(orbit.update(&mut cam));
        let first_step = (cam.eye - first).length();

        let mut last_step = first_step;
        for _ in 0..200 {
            let prev = cam.eye;
            let _ = orbit.update(&mut cam);
            let step = (cam.eye - prev).length();
            assert!(step <= last_step + 1e-4);
            last_step = step;
            assert!(((cam.eye - orbit.target).length() - radius).abs() < 1e-3);
        }
        assert!(!orbit.is_moving());
    }

    #[test]
    fn undamped_rotation_applies_in_one_step() {
        let (mut cam, _) = setup();
        let opts = ControlOptions {
            enable_damping: false,
            ..ControlOptions::default()
        };
        let mut orbit = OrbitControls::new(cam.target, &opts);
        // Quarter of the viewport height is a quarter turn.
        orbit.rotate_by_pixels(-200.0, 0.0, 800.0);
        let _ = orbit.update(&mut cam);
        assert!(!orbit.is_moving());
        assert!(cam.eye.x > 17.9 && cam.eye.z.abs() < 1e-3);
    }

    #[test]
    fn polar_angle_never_flips_over_the_pole() {
        let (mut cam, mut orbit) = setup();
        let radius = (cam.eye - orbit.target).length();
        orbit.rotate_by_pixels(0.0, 10_000.0, 100.0);
        for _ in 0..100 {
            let _ = orbit.update(&mut cam);
            assert!(cam.eye.y > 0.0);
        }
        let offset = cam.eye - orbit.target;
        assert!(offset.is_finite());
        assert!((offset.length() - radius).abs() < 1e-3);
    }
}
