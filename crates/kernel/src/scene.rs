use crate::resources::{ResourceError, ResourceHandle, ResourceKind, ResourceLedger};
use crate::scenes::{CubeScene, EmptyScene, PlaneScene, SphereScene};
use fishbowl_common::{ControllerConfig, ManipulationTarget};
use fishbowl_render::{SceneGraph, SceneItem, Shading};
use fishbowl_surface::{DeformableMesh, Geometry, Ripple, SurfaceError};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The scenes a session can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    Sphere,
    Cube,
    Plane,
    Empty,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] = [Self::Sphere, Self::Cube, Self::Plane, Self::Empty];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Cube => "cube",
            Self::Plane => "plane",
            Self::Empty => "empty",
        }
    }

    /// Scene for a zero-based selector index, as used by number keys.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Construct a fresh scene of this kind, acquiring its resources in
    /// `ledger`.
    pub fn build(
        self,
        config: &ControllerConfig,
        ledger: &mut ResourceLedger,
    ) -> Result<Box<dyn Scene>, SurfaceError> {
        Ok(match self {
            Self::Sphere => Box::new(SphereScene::new(config, ledger)?),
            Self::Cube => Box::new(CubeScene::new(config, ledger)?),
            Self::Plane => Box::new(PlaneScene::new(config, ledger)),
            Self::Empty => Box::new(EmptyScene::new(config, ledger)),
        })
    }
}

impl std::fmt::Display for SceneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown scene `{0}` (expected sphere, cube, plane or empty)")]
pub struct UnknownScene(pub String);

impl FromStr for SceneKind {
    type Err = UnknownScene;

    /// Accepts the English names and the selector values `esfera`, `cubo`
    /// and `cuadrado`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sphere" | "esfera" => Ok(Self::Sphere),
            "cube" | "cubo" => Ok(Self::Cube),
            "plane" | "square" | "cuadrado" => Ok(Self::Plane),
            "empty" | "none" => Ok(Self::Empty),
            _ => Err(UnknownScene(s.to_string())),
        }
    }
}

enum Positions {
    Fixed { positions: Vec<Vec3>, uploaded: bool },
    Deformable(DeformableMesh),
}

/// A wireframe object owned by a scene, with the resources it holds.
pub struct SceneObject {
    name: &'static str,
    edges: Vec<[u32; 2]>,
    positions: Positions,
    shading: Shading,
    follows_target: bool,
    handles: [ResourceHandle; 2],
}

impl SceneObject {
    /// Object whose vertices never change.
    pub fn fixed(
        name: &'static str,
        geometry: Geometry,
        shading: Shading,
        ledger: &mut ResourceLedger,
    ) -> Self {
        let edges = geometry.wireframe_edges();
        let handles = acquire(name, ledger);
        Self {
            name,
            edges,
            positions: Positions::Fixed {
                positions: geometry.positions,
                uploaded: false,
            },
            shading,
            follows_target: false,
            handles,
        }
    }

    /// Object whose vertices ripple over time. Nothing is acquired if the
    /// geometry is rejected.
    pub fn deformable(
        name: &'static str,
        geometry: Geometry,
        radius: f32,
        ripple: Ripple,
        shading: Shading,
        ledger: &mut ResourceLedger,
    ) -> Result<Self, SurfaceError> {
        let mesh = DeformableMesh::new(&geometry, radius, ripple)?;
        let edges = geometry.wireframe_edges();
        let handles = acquire(name, ledger);
        Ok(Self {
            name,
            edges,
            positions: Positions::Deformable(mesh),
            shading,
            follows_target: false,
            handles,
        })
    }

    /// Rotate this object with the scene's manipulation target.
    pub fn following_target(mut self) -> Self {
        self.follows_target = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        match &self.positions {
            Positions::Fixed { positions, .. } => positions,
            Positions::Deformable(mesh) => mesh.live_positions(),
        }
    }

    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.positions().len()
    }

    pub fn mesh(&self) -> Option<&DeformableMesh> {
        match &self.positions {
            Positions::Deformable(mesh) => Some(mesh),
            Positions::Fixed { .. } => None,
        }
    }

    pub fn follows_target(&self) -> bool {
        self.follows_target
    }

    pub fn handles(&self) -> [ResourceHandle; 2] {
        self.handles
    }

    pub fn needs_upload(&self) -> bool {
        match &self.positions {
            Positions::Fixed { uploaded, .. } => !uploaded,
            Positions::Deformable(mesh) => mesh.is_dirty(),
        }
    }

    /// Recompute displaced vertices for `time` seconds.
    pub fn update(&mut self, time: f32) {
        if let Positions::Deformable(mesh) = &mut self.positions {
            mesh.compute_frame(time);
        }
    }

    pub fn mark_uploaded(&mut self) {
        match &mut self.positions {
            Positions::Fixed { uploaded, .. } => *uploaded = true,
            Positions::Deformable(mesh) => {
                mesh.take_dirty();
            }
        }
    }

    fn item(&self, target: Option<&ManipulationTarget>) -> SceneItem<'_> {
        let transform = match target {
            Some(target) if self.follows_target => Mat4::from_quat(target.rotation()),
            _ => Mat4::IDENTITY,
        };
        SceneItem {
            name: self.name,
            positions: self.positions(),
            edges: &self.edges,
            transform,
            shading: self.shading,
            needs_upload: self.needs_upload(),
        }
    }
}

fn acquire(name: &str, ledger: &mut ResourceLedger) -> [ResourceHandle; 2] {
    [
        ledger.acquire(ResourceKind::Geometry, name),
        ledger.acquire(ResourceKind::Material, name),
    ]
}

/// A constructed scene: objects, an optional draggable target, and the
/// resources they hold until [`Scene::dispose`].
pub trait Scene {
    fn kind(&self) -> SceneKind;

    fn objects(&self) -> &[SceneObject];

    fn objects_mut(&mut self) -> &mut [SceneObject];

    /// The object rotation driven by drags, if the scene has one.
    fn manipulation_target(&self) -> Option<&ManipulationTarget> {
        None
    }

    fn manipulation_target_mut(&mut self) -> Option<&mut ManipulationTarget> {
        None
    }

    fn is_manipulable(&self) -> bool {
        self.manipulation_target().is_some()
    }

    /// Advance time-driven geometry to `time` seconds.
    fn update(&mut self, time: f32) {
        for object in self.objects_mut() {
            object.update(time);
        }
    }

    fn graph(&self, generation: u64) -> SceneGraph<'_> {
        let target = self.manipulation_target();
        SceneGraph {
            generation,
            items: self.objects().iter().map(|o| o.item(target)).collect(),
        }
    }

    /// Clear upload flags once a renderer has consumed the graph.
    fn mark_uploaded(&mut self) {
        for object in self.objects_mut() {
            object.mark_uploaded();
        }
    }

    fn vertex_count(&self) -> usize {
        self.objects().iter().map(SceneObject::vertex_count).sum()
    }

    /// Release every resource the scene acquired. Consumes the scene, so it
    /// cannot be ticked or rendered afterwards.
    fn dispose(self: Box<Self>, ledger: &mut ResourceLedger) -> Result<usize, ResourceError> {
        let handles: Vec<ResourceHandle> =
            self.objects().iter().flat_map(SceneObject::handles).collect();
        ledger.release_all(handles)
    }
}
