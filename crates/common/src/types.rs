use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// Largest allowed magnitude for camera pitch and object tilt (radians).
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.1;

/// Clamp a pitch angle into `[-PITCH_LIMIT, PITCH_LIMIT]`.
pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Size of the output surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, guarding against a zero-height surface.
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Center of the surface, where the pointer rests before any event arrives.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Axis-aligned cube centered on the origin that constrains camera translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingCube {
    half_extent: f32,
}

impl BoundingCube {
    pub fn new(half_extent: f32) -> Self {
        Self {
            half_extent: half_extent.max(0.0),
        }
    }

    /// Interior of a box of edge `box_size`, shrunk by `margin` on every side.
    pub fn from_box(box_size: f32, margin: f32) -> Self {
        Self::new(box_size / 2.0 - margin)
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }

    pub fn clamp(&self, point: Vec3) -> Vec3 {
        let h = Vec3::splat(self.half_extent);
        point.clamp(-h, h)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.abs().max_element() <= self.half_extent
    }
}

/// Accumulated rotation of the object currently being dragged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ManipulationTarget {
    pub angle_x: f32,
    pub angle_y: f32,
}

impl ManipulationTarget {
    /// Add to both angles; `angle_x` stays inside the pitch limit.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.angle_y += delta_y;
        self.angle_x = clamp_pitch(self.angle_x + delta_x);
    }

    /// Object orientation: tilt about X applied after spin about Y.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.angle_x) * Quat::from_rotation_y(self.angle_y)
    }
}

/// Per-frame translation request built from held movement keys.
///
/// Each axis is the signed count of held keys on that axis, so opposite keys
/// cancel out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.right == 0.0 && self.up == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_clamp_is_symmetric() {
        assert_eq!(clamp_pitch(10.0), PITCH_LIMIT);
        assert_eq!(clamp_pitch(-10.0), -PITCH_LIMIT);
        assert_eq!(clamp_pitch(0.25), 0.25);
    }

    #[test]
    fn cube_from_box_applies_margin() {
        let cube = BoundingCube::from_box(20.0, 0.5);
        assert_eq!(cube.half_extent(), 9.5);
        let clamped = cube.clamp(Vec3::new(12.0, -30.0, 4.0));
        assert_eq!(clamped, Vec3::new(9.5, -9.5, 4.0));
        assert!(cube.contains(clamped));
        assert!(!cube.contains(Vec3::new(0.0, 9.6, 0.0)));
    }

    #[test]
    fn negative_extent_collapses_to_origin() {
        let cube = BoundingCube::from_box(1.0, 2.0);
        assert_eq!(cube.half_extent(), 0.0);
        assert_eq!(cube.clamp(Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn manipulation_tilt_is_clamped() {
        let mut target = ManipulationTarget::default();
        target.rotate(5.0, 5.0);
        assert_eq!(target.angle_x, PITCH_LIMIT);
        assert_eq!(target.angle_y, 5.0);
        target.rotate(-20.0, 0.0);
        assert_eq!(target.angle_x, -PITCH_LIMIT);
    }

    #[test]
    fn viewport_aspect_and_center() {
        let vp = Viewport::new(800.0, 400.0);
        assert_eq!(vp.aspect(), 2.0);
        assert_eq!(vp.center(), Vec2::new(400.0, 200.0));
        assert_eq!(Viewport::new(10.0, 0.0).aspect(), 10.0);
    }
}
