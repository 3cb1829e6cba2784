//! Fishbowl kernel: scene catalogue, scene lifecycle and the frame driver.
//!
//! # Invariants
//! - Exactly one scene is active at a time.
//! - A scene's resources are released exactly once, after its pending frame
//!   request has been cancelled.
//! - Each tick runs displacement, keyboard translation, auto-look, position
//!   advance and orientation, in that order.

pub mod context;
pub mod resources;
pub mod scene;
pub mod scenes;
pub mod session;

pub use context::SceneContext;
pub use resources::{LifecycleEvent, ResourceError, ResourceHandle, ResourceKind, ResourceLedger};
pub use scene::{Scene, SceneKind, SceneObject, UnknownScene};
pub use scenes::{CubeScene, EmptyScene, PlaneScene, SphereScene};
pub use session::{FrameHandle, Session, SessionError};
