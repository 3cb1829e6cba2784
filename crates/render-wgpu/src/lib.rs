//! wgpu render backend for the fishbowl.
//!
//! Draws every scene item as a coloured line list, one instance per item
//! carrying its model matrix.
//!
//! # Invariants
//! - The renderer never mutates scene state.
//! - GPU buffers are rebuilt only when the graph generation changes, and
//!   vertex data is re-uploaded only for items flagged `needs_upload`.

mod gpu;
mod shaders;

pub use gpu::{WgpuFrame, WgpuRenderer};
