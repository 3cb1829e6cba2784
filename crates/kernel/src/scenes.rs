use crate::resources::ResourceLedger;
use crate::scene::{Scene, SceneKind, SceneObject};
use fishbowl_common::{ControllerConfig, ManipulationTarget};
use fishbowl_render::Shading;
use fishbowl_surface::{Ripple, SurfaceError, fishbowl_box, plane, subdivided_box, uv_sphere};

fn fishbowl(config: &ControllerConfig, ledger: &mut ResourceLedger) -> SceneObject {
    SceneObject::fixed(
        "fishbowl",
        fishbowl_box(config.box_size),
        Shading::Solid(Shading::WHITE),
        ledger,
    )
}

/// A rippling sphere of radius 3 that can be dragged around.
pub struct SphereScene {
    objects: Vec<SceneObject>,
    target: ManipulationTarget,
}

impl SphereScene {
    pub const RADIUS: f32 = 3.0;
    pub const SEGMENTS: u32 = 100;

    pub fn new(config: &ControllerConfig, ledger: &mut ResourceLedger) -> Result<Self, SurfaceError> {
        let surface = SceneObject::deformable(
            "sphere",
            uv_sphere(Self::RADIUS, Self::SEGMENTS, Self::SEGMENTS),
            Self::RADIUS,
            Ripple::with_amplitude(config.ripple_amplitude),
            Shading::Gradient {
                extent: Self::RADIUS,
            },
            ledger,
        )?
        .following_target();
        Ok(Self {
            objects: vec![surface, fishbowl(config, ledger)],
            target: ManipulationTarget::default(),
        })
    }
}

impl Scene for SphereScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Sphere
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    fn manipulation_target(&self) -> Option<&ManipulationTarget> {
        Some(&self.target)
    }

    fn manipulation_target_mut(&mut self) -> Option<&mut ManipulationTarget> {
        Some(&mut self.target)
    }
}

/// A finely subdivided cube whose vertices ripple around a sphere of half
/// its edge length.
pub struct CubeScene {
    objects: Vec<SceneObject>,
    target: ManipulationTarget,
}

impl CubeScene {
    pub const SIZE: f32 = 6.0;
    pub const SEGMENTS: u32 = 50;

    pub fn new(config: &ControllerConfig, ledger: &mut ResourceLedger) -> Result<Self, SurfaceError> {
        let surface = SceneObject::deformable(
            "cube",
            subdivided_box(Self::SIZE, Self::SEGMENTS),
            Self::SIZE / 2.0,
            Ripple::with_amplitude(config.ripple_amplitude),
            Shading::Gradient {
                extent: Self::SIZE / 2.0,
            },
            ledger,
        )?
        .following_target();
        Ok(Self {
            objects: vec![surface, fishbowl(config, ledger)],
            target: ManipulationTarget::default(),
        })
    }
}

impl Scene for CubeScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Cube
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    fn manipulation_target(&self) -> Option<&ManipulationTarget> {
        Some(&self.target)
    }

    fn manipulation_target_mut(&mut self) -> Option<&mut ManipulationTarget> {
        Some(&mut self.target)
    }
}

/// A flat cyan square. It can be dragged but does not ripple; its centre
/// vertex sits on the origin.
pub struct PlaneScene {
    objects: Vec<SceneObject>,
    target: ManipulationTarget,
}

impl PlaneScene {
    pub const SIZE: f32 = 6.0;
    pub const SEGMENTS: u32 = 20;

    pub fn new(config: &ControllerConfig, ledger: &mut ResourceLedger) -> Self {
        let surface = SceneObject::fixed(
            "plane",
            plane(Self::SIZE, Self::SEGMENTS),
            Shading::Solid(Shading::CYAN),
            ledger,
        )
        .following_target();
        Self {
            objects: vec![surface, fishbowl(config, ledger)],
            target: ManipulationTarget::default(),
        }
    }
}

impl Scene for PlaneScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Plane
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    fn manipulation_target(&self) -> Option<&ManipulationTarget> {
        Some(&self.target)
    }

    fn manipulation_target_mut(&mut self) -> Option<&mut ManipulationTarget> {
        Some(&mut self.target)
    }
}

/// Just the fishbowl. Nothing to drag, so pointer drags always orbit.
pub struct EmptyScene {
    objects: Vec<SceneObject>,
}

impl EmptyScene {
    pub fn new(config: &ControllerConfig, ledger: &mut ResourceLedger) -> Self {
        Self {
            objects: vec![fishbowl(config, ledger)],
        }
    }
}

impl Scene for EmptyScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Empty
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn sphere_scene_layout() {
        let mut ledger = ResourceLedger::new();
        let scene = SphereScene::new(&ControllerConfig::default(), &mut ledger).unwrap();
        assert!(scene.is_manipulable());
        assert_eq!(scene.objects().len(), 2);
        assert_eq!(scene.vertex_count(), 101 * 101 + 24);
        // Two objects, each holding a geometry and a material.
        assert_eq!(ledger.live_count(), 4);
    }

    #[test]
    fn cube_scene_ripples_around_half_size() {
        let mut ledger = ResourceLedger::new();
        let mut scene = CubeScene::new(&ControllerConfig::default(), &mut ledger).unwrap();
        scene.update(0.5);
        let mesh = scene.objects()[0].mesh().unwrap();
        assert_eq!(mesh.radius(), 3.0);
        assert!(
            mesh.live_positions()
                .iter()
                .all(|p| (p.length() - 3.0).abs() <= 0.3 + 1e-4)
        );
    }

    #[test]
    fn plane_scene_is_static() {
        let mut ledger = ResourceLedger::new();
        let mut scene = PlaneScene::new(&ControllerConfig::default(), &mut ledger);
        let before = scene.objects()[0].positions().to_vec();
        scene.update(3.0);
        assert_eq!(before, scene.objects()[0].positions());
        assert!(scene.objects()[0].mesh().is_none());
    }

    #[test]
    fn empty_scene_has_only_the_fishbowl() {
        let mut ledger = ResourceLedger::new();
        let scene = EmptyScene::new(&ControllerConfig::default(), &mut ledger);
        assert!(!scene.is_manipulable());
        let graph = scene.graph(1);
        assert_eq!(graph.items.len(), 1);
        assert_eq!(graph.items[0].name, "fishbowl");
    }

    #[test]
    fn graph_rotates_only_the_target_object() {
        let mut ledger = ResourceLedger::new();
        let mut scene = SphereScene::new(&ControllerConfig::default(), &mut ledger).unwrap();
        scene.manipulation_target_mut().unwrap().rotate(0.2, 0.4);
        let graph = scene.graph(7);
        assert_eq!(graph.generation, 7);
        assert_ne!(graph.items[0].transform, Mat4::IDENTITY);
        assert_eq!(graph.items[1].transform, Mat4::IDENTITY);
        let moved = graph.items[0].transform.transform_point3(Vec3::Z);
        assert!((moved.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn dispose_releases_everything_once() {
        let mut ledger = ResourceLedger::new();
        let scene: Box<dyn Scene> = Box::new(CubeScene::new(&ControllerConfig::default(), &mut ledger).unwrap());
        assert_eq!(scene.dispose(&mut ledger), Ok(4));
        assert_eq!(ledger.live_count(), 0);
        assert_eq!(ledger.released_count(), 4);
    }

    #[test]
    fn fishbowl_follows_configured_size() {
        let config = ControllerConfig {
            box_size: 30.0,
            ..ControllerConfig::default()
        };
        let mut ledger = ResourceLedger::new();
        let scene = EmptyScene::new(&config, &mut ledger);
        let extent = scene.objects()[0]
            .positions()
            .iter()
            .map(|p| p.abs().max_element())
            .fold(0.0_f32, f32::max);
        assert_eq!(extent, 15.0);
    }
}
