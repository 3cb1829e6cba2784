use fishbowl_common::ManipulationTarget;
use fishbowl_kernel::{SceneKind, Session};
use glam::Vec3;

/// Read-only queries against a [`Session`] for debugging and CLI output.
pub struct SessionInspector;

impl SessionInspector {
    /// Summary of the active scene, or `None` if no scene is active.
    pub fn summary(session: &Session) -> Option<SessionSummary> {
        let scene = session.scene()?;
        let camera = session.camera()?;
        Some(SessionSummary {
            tick: session.tick_count(),
            generation: session.scene_generation(),
            scene: scene.kind(),
            position: camera.position(),
            position_target: camera.position_target(),
            yaw: camera.yaw(),
            pitch: camera.pitch(),
            object_count: scene.objects().len(),
            vertex_count: scene.vertex_count(),
            manipulation: session.manipulation_target(),
            live_resources: session.ledger().live_count(),
            pending_events: session.events().len(),
        })
    }

    /// One entry per object in the active scene.
    pub fn inspect_objects(session: &Session) -> Vec<ObjectInfo> {
        let Some(scene) = session.scene() else {
            return Vec::new();
        };
        scene
            .objects()
            .iter()
            .map(|object| ObjectInfo {
                name: object.name(),
                vertex_count: object.vertex_count(),
                edge_count: object.edges().len(),
                deformable: object.mesh().is_some(),
                follows_target: object.follows_target(),
            })
            .collect()
    }
}

/// Snapshot of session state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub tick: u64,
    pub generation: u64,
    pub scene: SceneKind,
    pub position: Vec3,
    pub position_target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub object_count: usize,
    pub vertex_count: usize,
    pub manipulation: Option<ManipulationTarget>,
    pub live_resources: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Session: scene={} generation={} tick={} objects={} vertices={}",
            self.scene, self.generation, self.tick, self.object_count, self.vertex_count
        )?;
        writeln!(
            f,
            "Camera: pos=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.position_target.x,
            self.position_target.y,
            self.position_target.z,
            self.yaw,
            self.pitch,
        )?;
        match self.manipulation {
            Some(m) => writeln!(f, "Target: angle_x={:.3} angle_y={:.3}", m.angle_x, m.angle_y)?,
            None => writeln!(f, "Target: none")?,
        }
        write!(
            f,
            "Resources: live={} pending_events={}",
            self.live_resources, self.pending_events
        )
    }
}

/// Detailed info about a single scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub name: &'static str,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub deformable: bool,
    pub follows_target: bool,
}

impl std::fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Object [{}] vertices={} edges={}",
            self.name, self.vertex_count, self.edge_count
        )?;
        if self.deformable {
            f.write_str(" deformable")?;
        }
        if self.follows_target {
            f.write_str(" manipulable")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbowl_common::{ControllerConfig, Viewport};
    use fishbowl_kernel::SceneKind;

    fn session(kind: SceneKind) -> Session {
        let mut session = Session::new(ControllerConfig::default(), Viewport::default());
        session.switch_scene(kind).unwrap();
        session
    }

    #[test]
    fn summary_without_scene() {
        let session = Session::new(ControllerConfig::default(), Viewport::default());
        assert!(SessionInspector::summary(&session).is_none());
        assert!(SessionInspector::inspect_objects(&session).is_empty());
    }

    #[test]
    fn summary_of_fresh_sphere() {
        let session = session(SceneKind::Sphere);
        let summary = SessionInspector::summary(&session).unwrap();
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.scene, SceneKind::Sphere);
        assert_eq!(summary.object_count, 2);
        assert_eq!(summary.live_resources, 4);
        assert_eq!(summary.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(summary.manipulation, Some(ManipulationTarget::default()));
    }

    #[test]
    fn summary_follows_ticks() {
        let mut session = session(SceneKind::Empty);
        let frame = session.pending_frame().unwrap();
        let frame = session.tick(frame, 0.0).unwrap();
        session.tick(frame, 16.0).unwrap();
        let summary = SessionInspector::summary(&session).unwrap();
        assert_eq!(summary.tick, 2);
        assert!(summary.manipulation.is_none());
        assert!(summary.position.z < 10.0);
    }

    #[test]
    fn objects_listed_with_flags() {
        let session = session(SceneKind::Cube);
        let objects = SessionInspector::inspect_objects(&session);
        let cube = objects.iter().find(|o| o.name == "cube").unwrap();
        assert!(cube.deformable);
        assert!(cube.follows_target);
        let bowl = objects.iter().find(|o| o.name == "fishbowl").unwrap();
        assert!(!bowl.deformable);
        assert_eq!(bowl.edge_count, 6 * 5);
    }

    #[test]
    fn summary_display() {
        let session = session(SceneKind::Plane);
        let text = SessionInspector::summary(&session).unwrap().to_string();
        assert!(text.contains("scene=plane"));
        assert!(text.contains("tick=0"));
        assert!(text.contains("Target: angle_x=0.000"));
    }
}
