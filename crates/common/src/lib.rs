//! Shared types for the fishbowl controller: viewport, bounding cube, pitch
//! limits, manipulation targets, and the tunable controller configuration.
//!
//! # Invariants
//! - Every pitch-like angle passes through [`clamp_pitch`] when mutated.
//! - Camera translation targets are always clamped by a [`BoundingCube`].

pub mod config;
pub mod types;

pub use config::{ConfigError, ControllerConfig};
pub use types::{
    BoundingCube, ManipulationTarget, MoveIntent, PITCH_LIMIT, Viewport, clamp_pitch,
};
