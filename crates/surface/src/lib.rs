//! Surface geometry for the fishbowl: primitive generators, wireframe edge
//! extraction, and the per-frame ripple displacement of deformable meshes.
//!
//! # Invariants
//! - A deformable mesh's base positions never change after construction.
//! - The live buffer always has exactly as many vertices as the base buffer.
//! - Displacement is a pure function of base position and time.

pub mod deform;
pub mod geometry;
pub mod primitives;

pub use deform::{DeformableMesh, Ripple, SurfaceError, displace};
pub use geometry::Geometry;
pub use primitives::{fishbowl_box, plane, subdivided_box, uv_sphere};
