use fishbowl_common::{BoundingCube, ControllerConfig, MoveIntent, clamp_pitch};
use glam::{Mat4, Vec3};

/// Camera with a spherical look direction and a position that eases toward a
/// target clamped inside the fishbowl.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    position: Vec3,
    position_target: Vec3,
    yaw: f32,
    pitch: f32,
    bounds: BoundingCube,
    move_speed: f32,
    ease: f32,
    /// Vertical field of view in radians.
    fov: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default(), 16.0 / 9.0)
    }
}

impl CameraRig {
    /// Build the rig in its starting pose. The target is clamped immediately,
    /// so a start outside the cube eases inside over the first frames.
    pub fn from_config(config: &ControllerConfig, aspect: f32) -> Self {
        let bounds = config.bounds();
        Self {
            position: config.initial_position,
            position_target: bounds.clamp(config.initial_position),
            yaw: config.initial_yaw,
            pitch: clamp_pitch(config.initial_pitch),
            bounds,
            move_speed: config.move_speed,
            ease: config.position_ease,
            fov: config.fov_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn position_target(&self) -> Vec3 {
        self.position_target
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn bounds(&self) -> BoundingCube {
        self.bounds
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Unit vector the camera looks along.
    pub fn look_direction(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    /// Look direction flattened onto the horizontal plane.
    pub fn level_forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            0.0,
            self.pitch.cos() * self.yaw.cos(),
        )
        .normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.level_forward().cross(Vec3::Y).normalize_or_zero()
    }

    /// Point the camera looks at.
    pub fn look_target(&self) -> Vec3 {
        self.position + self.look_direction()
    }

    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        if !d_yaw.is_finite() || !d_pitch.is_finite() {
            tracing::warn!(d_yaw, d_pitch, "ignoring non-finite camera rotation");
            return;
        }
        self.yaw += d_yaw;
        self.pitch = clamp_pitch(self.pitch + d_pitch);
    }

    /// Move the target `amount` units along the look direction.
    pub fn zoom(&mut self, amount: f32) {
        if !amount.is_finite() {
            tracing::warn!(amount, "ignoring non-finite zoom");
            return;
        }
        self.translate_target(self.look_direction() * amount);
    }

    /// Shift the target by `move_speed` per held key: level forward, right,
    /// then world up.
    pub fn apply_keyboard_translation(&mut self, intent: MoveIntent) {
        let delta = self.level_forward() * intent.forward
            + self.right() * intent.right
            + Vec3::Y * intent.up;
        self.translate_target(delta * self.move_speed);
    }

    /// Ease the position a fixed fraction of the way toward the target.
    pub fn advance(&mut self) {
        self.position = self.position.lerp(self.position_target, self.ease);
    }

    /// Replace the target outright; it is clamped like every other mutation.
    pub fn set_position_target(&mut self, target: Vec3) {
        if target.is_finite() {
            self.position_target = self.bounds.clamp(target);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_target(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn translate_target(&mut self, delta: Vec3) {
        self.position_target = self.bounds.clamp(self.position_target + delta);
    }
}
