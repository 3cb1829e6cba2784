use crate::types::{BoundingCube, PITCH_LIMIT};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// Errors from loading or validating a [`ControllerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Every tunable of the camera, gesture, auto-look and surface controllers.
///
/// Missing fields in a JSON file fall back to the defaults, so a file may
/// override a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Edge length of the fishbowl cube.
    pub box_size: f32,
    /// Distance kept between the camera and the fishbowl walls.
    pub box_margin: f32,
    /// Target translation per frame for each held movement key.
    pub move_speed: f32,
    /// Fraction of the remaining distance covered by `advance` each frame.
    pub position_ease: f32,
    /// Radians of yaw/pitch per pixel when orbiting.
    pub camera_sensitivity: f32,
    /// Radians of object rotation per pixel when dragging with a mouse.
    pub object_sensitivity: f32,
    /// Multiplier applied to `object_sensitivity` for touch drags.
    pub touch_sensitivity_scale: f32,
    /// World units of zoom per pixel of pinch distance change.
    pub pinch_zoom_scale: f32,
    /// World units of zoom per wheel delta unit.
    pub wheel_zoom_speed: f32,
    /// Width in pixels of the edge band that triggers auto-look.
    pub edge_size: f32,
    /// Radians per frame of auto-look at full intensity.
    pub auto_look_speed: f32,
    /// Peak radial offset of the surface ripple.
    pub ripple_amplitude: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub initial_position: Vec3,
    pub initial_yaw: f32,
    pub initial_pitch: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            box_size: 20.0,
            box_margin: 0.5,
            move_speed: 0.1,
            position_ease: 0.1,
            camera_sensitivity: 0.002,
            object_sensitivity: 0.005,
            touch_sensitivity_scale: 2.0,
            pinch_zoom_scale: 0.01,
            wheel_zoom_speed: 0.005,
            edge_size: 150.0,
            auto_look_speed: 0.02,
            ripple_amplitude: 0.3,
            fov_degrees: 60.0,
            initial_position: Vec3::new(0.0, 0.0, 10.0),
            initial_yaw: PI,
            initial_pitch: 0.0,
        }
    }
}

impl ControllerConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The cube that camera translation targets are clamped into.
    pub fn bounds(&self) -> BoundingCube {
        BoundingCube::from_box(self.box_size, self.box_margin)
    }

    /// Reject values that would break the camera or gesture invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("box_size", self.box_size),
            ("move_speed", self.move_speed),
            ("position_ease", self.position_ease),
            ("camera_sensitivity", self.camera_sensitivity),
            ("object_sensitivity", self.object_sensitivity),
            ("touch_sensitivity_scale", self.touch_sensitivity_scale),
            ("pinch_zoom_scale", self.pinch_zoom_scale),
            ("wheel_zoom_speed", self.wheel_zoom_speed),
            ("edge_size", self.edge_size),
            ("auto_look_speed", self.auto_look_speed),
            ("fov_degrees", self.fov_degrees),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("expected a positive number, got {value}")));
            }
        }

        if self.position_ease > 1.0 {
            return Err(invalid(
                "position_ease",
                format!("must not exceed 1.0 or the camera overshoots, got {}", self.position_ease),
            ));
        }
        if self.fov_degrees >= 180.0 {
            return Err(invalid(
                "fov_degrees",
                format!("must be below 180, got {}", self.fov_degrees),
            ));
        }
        if !self.box_margin.is_finite() || self.box_margin < 0.0 {
            return Err(invalid(
                "box_margin",
                format!("expected a non-negative number, got {}", self.box_margin),
            ));
        }
        if self.box_size / 2.0 - self.box_margin <= 0.0 {
            return Err(invalid(
                "box_margin",
                format!(
                    "margin {} leaves no interior in a box of size {}",
                    self.box_margin, self.box_size
                ),
            ));
        }
        if !self.ripple_amplitude.is_finite() || self.ripple_amplitude < 0.0 {
            return Err(invalid(
                "ripple_amplitude",
                format!("expected a non-negative number, got {}", self.ripple_amplitude),
            ));
        }
        if !self.initial_position.is_finite() {
            return Err(invalid("initial_position", "must be finite".into()));
        }
        if !self.initial_yaw.is_finite() {
            return Err(invalid("initial_yaw", "must be finite".into()));
        }
        if !self.initial_pitch.is_finite() || self.initial_pitch.abs() > PITCH_LIMIT {
            return Err(invalid(
                "initial_pitch",
                format!("must lie within ±{PITCH_LIMIT}, got {}", self.initial_pitch),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
