use crate::graph::SceneGraph;
use glam::{Mat4, Vec3};
use std::fmt::Write;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::new(0.0, 0.0, 9.0),
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl RenderView {
    /// Y-up, roll-free view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and a view, then produces output. It
/// never mutates scene state.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, graph: &SceneGraph<'_>, view: &RenderView) -> Self::Output;

    /// The output surface was resized.
    fn set_viewport(&mut self, _width: u32, _height: u32) {}
}

/// Produces a human-readable description of a frame.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    viewport: Option<(u32, u32)>,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, graph: &SceneGraph<'_>, view: &RenderView) -> String {
        tracing::trace!(generation = graph.generation, items = graph.items.len(), "debug frame");
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame (generation={}, items={}) ===",
            graph.generation,
            graph.items.len()
        );
        if let Some((width, height)) = self.viewport {
            let _ = writeln!(out, "Viewport: {width}x{height}");
        }
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );
        for item in &graph.items {
            let (_, rotation, _) = item.transform.to_scale_rotation_translation();
            let (rx, ry, _) = rotation.to_euler(glam::EulerRot::XYZ);
            let _ = writeln!(
                out,
                "  [{}] vertices={} edges={} rotation=({:.3}, {:.3}){}",
                item.name,
                item.positions.len(),
                item.edges.len(),
                rx,
                ry,
                if item.needs_upload { " dirty" } else { "" }
            );
        }
        out
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
    }
}
