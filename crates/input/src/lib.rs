//! Input aggregation: host key, pointer, touch and wheel events folded into
//! one [`InputState`], and interpreted as camera or object [`Gesture`]s.
//!
//! # Invariants
//! - At most two touch contacts are tracked; extra contacts are ignored.
//! - Pinch state exists only while exactly two contacts are down.
//! - Each event yields at most one gesture.

pub mod event;
pub mod gesture;
pub mod key;
pub mod processor;
pub mod state;

pub use event::{InputEvent, Touch};
pub use gesture::{Gesture, GestureTuning, interpret};
pub use key::{Key, move_intent};
pub use processor::InputProcessor;
pub use state::{DragSource, InputState, MAX_TOUCHES, PinchState};
