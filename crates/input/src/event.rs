use crate::key::Key;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One contact point of a touch event, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub id: u64,
    pub position: Vec2,
}

impl Touch {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
        }
    }
}

/// Host-agnostic input events, delivered in the order the host saw them.
///
/// Touch events carry every contact still on the surface after the event,
/// so `TouchEnd` lists the contacts that remain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    PointerUp,
    PointerLeave,
    TouchStart(Vec<Touch>),
    TouchMove(Vec<Touch>),
    TouchEnd(Vec<Touch>),
    /// Vertical wheel delta; negative values scroll up and zoom in.
    Wheel { delta_y: f32 },
    /// The host surface lost keyboard focus; key-up events may never arrive.
    FocusLost,
}
