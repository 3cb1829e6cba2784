//! Camera motion for the fishbowl: a yaw/pitch rig whose position eases
//! toward a bounded target, plus edge-of-screen auto-look.
//!
//! # Invariants
//! - Pitch lies within `±PITCH_LIMIT` after every mutation.
//! - The position target lies inside the bounding cube after every mutation.
//! - The camera never rolls.

mod edge_pan;
mod rig;

pub use edge_pan::{EdgePan, LookNudge};
pub use rig::CameraRig;
