use glam::{Vec2, Vec3};

use crate::camera::Camera;

/// Half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction` (normalized here).
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from the camera eye through a normalized-device-coordinate
    /// point.
    #[must_use]
    pub fn from_camera(camera: &Camera, ndc: Vec2) -> Self {
        let through = camera.unproject(ndc.extend(0.5));
        Self::new(camera.eye, through - camera.eye)
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// On-screen rectangle of the render surface, in the same coordinate
/// space as pointer events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl ViewportRect {
    /// Rectangle anchored at the origin.
    #[must_use]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Map a pointer position into normalized device coordinates: `[-1, 1]`
    /// on both axes across the rectangle, Y up. `None` for an empty
    /// rectangle or a pointer outside it (edges count as inside).
    #[must_use]
    pub fn to_ndc(&self, pointer: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            (pointer.x - self.left) / self.width * 2.0 - 1.0,
            -(pointer.y - self.top) / self.height * 2.0 + 1.0,
        );
        (ndc.abs().max_element() <= 1.0).then_some(ndc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CameraOptions;

    #[test]
    fn ndc_corners_and_center() {
        let rect = ViewportRect {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 200.0,
        };
        let ndc = |x, y| rect.to_ndc(Vec2::new(x, y));
        assert_eq!(ndc(100.0, 50.0), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(ndc(500.0, 250.0), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(ndc(300.0, 150.0), Some(Vec2::ZERO));
    }

    #[test]
    fn pointer_outside_rect_has_no_ndc() {
        let rect = ViewportRect {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 200.0,
        };
        assert_eq!(rect.to_ndc(Vec2::new(99.0, 100.0)), None);
        assert_eq!(rect.to_ndc(Vec2::new(300.0, 251.0)), None);
        assert_eq!(rect.to_ndc(Vec2::new(50.0, 10.0)), None);
    }

    #[test]
    fn empty_rect_has_no_ndc() {
        assert_eq!(ViewportRect::from_size(0.0, 10.0).to_ndc(Vec2::ZERO), None);
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = Camera::from_options(&CameraOptions::default(), 1.6);
        let ray = Ray::from_camera(&cam, Vec2::ZERO);
        assert_eq!(ray.origin, cam.eye);
        let expected = (cam.target - cam.eye).normalize();
        assert!((ray.direction - expected).length() < 1e-4);
    }
}
