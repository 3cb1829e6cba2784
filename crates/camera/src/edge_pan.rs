use crate::rig::CameraRig;
use fishbowl_common::{ControllerConfig, Viewport};
use glam::Vec2;

/// Yaw and pitch increments requested by auto-look for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookNudge {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookNudge {
    pub fn is_zero(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0
    }
}

/// Turns the camera while the pointer rests near a screen edge.
///
/// Intensity ramps linearly from 0 at the inner border of the edge band to 1
/// at the screen edge. The left and top edges turn positively, the right and
/// bottom edges negatively.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePan {
    pub edge_size: f32,
    pub speed: f32,
}

impl Default for EdgePan {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

impl EdgePan {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            edge_size: config.edge_size,
            speed: config.auto_look_speed,
        }
    }

    /// Increment for a pointer at `pointer`. Pure: the same inputs always give
    /// the same nudge.
    pub fn nudge(&self, pointer: Vec2, viewport: Viewport, manipulating: bool) -> LookNudge {
        if manipulating || !pointer.is_finite() {
            return LookNudge::default();
        }
        LookNudge {
            yaw: self.axis(pointer.x, viewport.width),
            pitch: self.axis(pointer.y, viewport.height),
        }
    }

    /// Apply one frame of auto-look to `rig`.
    pub fn apply(&self, rig: &mut CameraRig, pointer: Vec2, viewport: Viewport, manipulating: bool) {
        let nudge = self.nudge(pointer, viewport, manipulating);
        if !nudge.is_zero() {
            tracing::trace!(yaw = nudge.yaw, pitch = nudge.pitch, "auto-look");
            rig.rotate(nudge.yaw, nudge.pitch);
        }
    }

    fn axis(&self, coordinate: f32, extent: f32) -> f32 {
        let far_band = extent - self.edge_size;
        if coordinate < self.edge_size {
            self.speed * self.intensity(self.edge_size - coordinate)
        } else if coordinate > far_band {
            -self.speed * self.intensity(coordinate - far_band)
        } else {
            0.0
        }
    }

    /// Depth into the edge band as a fraction, capped at full intensity for a
    /// pointer reported outside the surface.
    fn intensity(&self, depth: f32) -> f32 {
        (depth / self.edge_size).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbowl_common::PITCH_LIMIT;

    const EPS: f32 = 1e-6;

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 800.0)
    }

    #[test]
    fn deadzone_is_still() {
        let pan = EdgePan::default();
        assert!(pan.nudge(Vec2::new(500.0, 400.0), viewport(), false).is_zero());
        assert!(pan.nudge(Vec2::new(150.0, 650.0), viewport(), false).is_zero());
    }

    #[test]
    fn edges_turn_toward_the_opposite_side() {
        let pan = EdgePan::default();
        let left = pan.nudge(Vec2::new(0.0, 400.0), viewport(), false);
        assert!((left.yaw - 0.02).abs() < EPS);
        assert_eq!(left.pitch, 0.0);

        let right = pan.nudge(Vec2::new(925.0, 400.0), viewport(), false);
        assert!((right.yaw + 0.01).abs() < EPS);

        let top = pan.nudge(Vec2::new(500.0, 75.0), viewport(), false);
        assert!((top.pitch - 0.01).abs() < EPS);

        let bottom = pan.nudge(Vec2::new(500.0, 800.0), viewport(), false);
        assert!((bottom.pitch + 0.02).abs() < EPS);
    }

    #[test]
    fn corner_nudges_both_axes() {
        let pan = EdgePan::default();
        let corner = pan.nudge(Vec2::new(0.0, 0.0), viewport(), false);
        assert!(corner.yaw > 0.0 && corner.pitch > 0.0);
    }

    #[test]
    fn manipulation_suppresses_auto_look() {
        let pan = EdgePan::default();
        assert!(pan.nudge(Vec2::new(0.0, 0.0), viewport(), true).is_zero());
    }

    #[test]
    fn repeated_calls_add_the_same_increment() {
        let pan = EdgePan::default();
        let mut rig = CameraRig::default();
        let pointer = Vec2::new(30.0, 400.0);
        let start = rig.yaw();
        pan.apply(&mut rig, pointer, viewport(), false);
        let once = rig.yaw() - start;
        pan.apply(&mut rig, pointer, viewport(), false);
        let twice = rig.yaw() - start;
        assert!((twice - 2.0 * once).abs() < EPS);
    }

    #[test]
    fn auto_look_respects_pitch_limit() {
        let pan = EdgePan::default();
        let mut rig = CameraRig::default();
        for _ in 0..500 {
            pan.apply(&mut rig, Vec2::new(500.0, 0.0), viewport(), false);
        }
        assert_eq!(rig.pitch(), PITCH_LIMIT);
    }

    #[test]
    fn outside_pointer_is_capped() {
        let pan = EdgePan::default();
        let nudge = pan.nudge(Vec2::new(-300.0, 400.0), viewport(), false);
        assert!((nudge.yaw - 0.02).abs() < EPS);
    }
}
