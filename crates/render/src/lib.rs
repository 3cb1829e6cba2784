//! Rendering boundary: the per-frame scene graph and view handed to any
//! renderer, plus a text renderer for headless use.
//!
//! # Invariants
//! - Renderers only read the scene graph; they never mutate scene state.
//! - `needs_upload` is the only signal that an item's vertices changed.

mod graph;
mod renderer;

pub use graph::{SceneGraph, SceneItem, Shading};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
