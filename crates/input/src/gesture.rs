use crate::event::InputEvent;
use crate::state::{DragSource, InputState, tracked};
use fishbowl_common::ControllerConfig;

/// What a single input event asks the controller to do.
///
/// Exactly one interpretation applies per event; orbit, manipulation and zoom
/// are never produced together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Add to camera yaw and pitch (radians, already signed).
    Orbit { yaw: f32, pitch: f32 },
    /// Add to the focused object's rotation angles (radians).
    Manipulate { angle_x: f32, angle_y: f32 },
    /// Move the camera target along the look direction (world units).
    Zoom { amount: f32 },
}

/// Sensitivities used to turn pixel deltas into gestures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTuning {
    pub camera_sensitivity: f32,
    pub object_sensitivity: f32,
    pub touch_sensitivity_scale: f32,
    pub pinch_zoom_scale: f32,
    pub wheel_zoom_speed: f32,
}

impl From<&ControllerConfig> for GestureTuning {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            camera_sensitivity: config.camera_sensitivity,
            object_sensitivity: config.object_sensitivity,
            touch_sensitivity_scale: config.touch_sensitivity_scale,
            pinch_zoom_scale: config.pinch_zoom_scale,
            wheel_zoom_speed: config.wheel_zoom_speed,
        }
    }
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self::from(&ControllerConfig::default())
    }
}

/// Decide what `event` means given the state *before* the event is applied.
pub fn interpret(state: &InputState, event: &InputEvent, tuning: &GestureTuning) -> Option<Gesture> {
    match event {
        InputEvent::PointerMove { x, y } => {
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            let last = state.last_pointer_position()?;
            let dx = x - last.x;
            let dy = y - last.y;
            if state.drag_source() == Some(DragSource::Pointer) {
                Some(Gesture::Manipulate {
                    angle_x: dy * tuning.object_sensitivity,
                    angle_y: dx * tuning.object_sensitivity,
                })
            } else {
                Some(Gesture::Orbit {
                    yaw: -dx * tuning.camera_sensitivity,
                    pitch: -dy * tuning.camera_sensitivity,
                })
            }
        }
        InputEvent::TouchMove(touches) => {
            if touches.iter().any(|t| !t.position.is_finite()) {
                return None;
            }
            match tracked(touches) {
                [touch] if state.drag_source() == Some(DragSource::Touch) => {
                    let last = state.last_pointer_position()?;
                    let delta = touch.position - last;
                    let sensitivity = tuning.object_sensitivity * tuning.touch_sensitivity_scale;
                    Some(Gesture::Manipulate {
                        angle_x: delta.y * sensitivity,
                        angle_y: delta.x * sensitivity,
                    })
                }
                [a, b] => {
                    // The first move after the pinch began only seeds the distance.
                    let pinch = state.pinch()?;
                    let distance = a.position.distance(b.position);
                    Some(Gesture::Zoom {
                        amount: (distance - pinch.last_distance) * tuning.pinch_zoom_scale,
                    })
                }
                _ => None,
            }
        }
        InputEvent::Wheel { delta_y } if delta_y.is_finite() => Some(Gesture::Zoom {
            amount: -delta_y * tuning.wheel_zoom_speed,
        }),
        _ => None,
    }
}
