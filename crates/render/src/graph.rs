use glam::{Mat4, Vec3};

/// How an item's lines are coloured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shading {
    /// Magenta at `x = -extent` blending to cyan at `x = +extent`, evaluated
    /// on the item's live vertex positions.
    Gradient { extent: f32 },
    Solid([f32; 4]),
}

impl Shading {
    pub const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
    pub const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Colour of a vertex at `position`.
    pub fn color_at(&self, position: Vec3) -> [f32; 4] {
        match *self {
            Shading::Solid(color) => color,
            Shading::Gradient { extent } => {
                let t = if extent > 0.0 {
                    ((position.x + extent) / (2.0 * extent)).clamp(0.0, 1.0)
                } else {
                    0.5
                };
                let mut out = [0.0; 4];
                for (i, channel) in out.iter_mut().enumerate() {
                    *channel = Self::MAGENTA[i] + (Self::CYAN[i] - Self::MAGENTA[i]) * t;
                }
                out
            }
        }
    }
}

/// One wireframe object as the renderer sees it.
#[derive(Debug, Clone)]
pub struct SceneItem<'a> {
    pub name: &'a str,
    /// Vertex positions in object space.
    pub positions: &'a [Vec3],
    /// Line list indexing into `positions`.
    pub edges: &'a [[u32; 2]],
    pub transform: Mat4,
    pub shading: Shading,
    /// True when `positions` changed since the renderer last consumed them.
    pub needs_upload: bool,
}

/// Everything drawn in one frame.
///
/// `generation` changes whenever the set of items is rebuilt (a scene switch),
/// so renderers caching GPU buffers know to start over.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph<'a> {
    pub generation: u64,
    pub items: Vec<SceneItem<'a>>,
}

impl SceneGraph<'_> {
    pub fn vertex_count(&self) -> usize {
        self.items.iter().map(|item| item.positions.len()).sum()
    }

    pub fn edge_count(&self) -> usize {
        self.items.iter().map(|item| item.edges.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_runs_magenta_to_cyan() {
        let shading = Shading::Gradient { extent: 3.0 };
        assert_eq!(shading.color_at(Vec3::new(-3.0, 0.0, 0.0)), Shading::MAGENTA);
        assert_eq!(shading.color_at(Vec3::new(3.0, 1.0, 0.0)), Shading::CYAN);
        assert_eq!(shading.color_at(Vec3::ZERO), [0.5, 0.5, 1.0, 1.0]);
        // Displaced vertices past the extent saturate.
        assert_eq!(shading.color_at(Vec3::new(9.0, 0.0, 0.0)), Shading::CYAN);
    }

    #[test]
    fn solid_ignores_position() {
        let shading = Shading::Solid(Shading::WHITE);
        assert_eq!(shading.color_at(Vec3::new(5.0, -2.0, 1.0)), Shading::WHITE);
    }

    #[test]
    fn graph_counts() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let edges = [[0, 1], [1, 2]];
        let graph = SceneGraph {
            generation: 1,
            items: vec![SceneItem {
                name: "tri",
                positions: &positions,
                edges: &edges,
                transform: Mat4::IDENTITY,
                shading: Shading::Solid(Shading::WHITE),
                needs_upload: true,
            }],
        };
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
    }
}
