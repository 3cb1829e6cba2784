use crate::context::SceneContext;
use crate::resources::{LifecycleEvent, ResourceError, ResourceLedger};
use crate::scene::{Scene, SceneKind};
use fishbowl_camera::CameraRig;
use fishbowl_common::{ControllerConfig, ManipulationTarget, Viewport};
use fishbowl_input::{Gesture, InputEvent, InputState};
use fishbowl_render::{RenderView, Renderer};
use fishbowl_surface::SurfaceError;

/// Ticket for one scheduled frame.
///
/// Only the most recently issued handle is accepted by [`Session::tick`];
/// switching scenes or cancelling revokes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("frame request {requested} is stale")]
    StaleFrame { requested: u64 },
    #[error("no scene is active")]
    NoActiveScene,
    #[error("scene construction failed: {0}")]
    Surface(#[from] SurfaceError),
    #[error("scene disposal failed: {0}")]
    Resource(#[from] ResourceError),
}

struct ActiveScene {
    scene: Box<dyn Scene>,
    context: SceneContext,
    generation: u64,
}

/// The frame driver: owns the active scene and runs its tick in fixed order.
///
/// One scene is active at a time. Input events mutate it between ticks and
/// are visible to the very next tick.
pub struct Session {
    config: ControllerConfig,
    viewport: Viewport,
    ledger: ResourceLedger,
    active: Option<ActiveScene>,
    pending_frame: Option<FrameHandle>,
    next_frame_id: u64,
    scene_generation: u64,
    tick: u64,
    /// Time of the last tick in seconds.
    last_time: Option<f32>,
    view: RenderView,
    /// Surface size not yet forwarded to a renderer.
    pending_resize: Option<(u32, u32)>,
}

impl Session {
    /// A session with no scene yet; call [`Session::switch_scene`] to start.
    pub fn new(config: ControllerConfig, viewport: Viewport) -> Self {
        let camera = CameraRig::from_config(&config, viewport.aspect());
        Self {
            view: view_of(&camera),
            config,
            viewport,
            ledger: ResourceLedger::new(),
            active: None,
            pending_frame: None,
            next_frame_id: 0,
            scene_generation: 0,
            tick: 0,
            last_time: None,
            pending_resize: Some(surface_size(viewport)),
        }
    }

    /// Tear down the active scene and construct `kind` in its place.
    ///
    /// The pending frame is cancelled before any resource is released, so a
    /// handle issued for the old scene can never run against the new one.
    pub fn switch_scene(&mut self, kind: SceneKind) -> Result<FrameHandle, SessionError> {
        let _span = tracing::info_span!("switch_scene", %kind).entered();
        self.cancel_frame();
        self.dispose_active()?;

        let scene = kind.build(&self.config, &mut self.ledger)?;
        self.scene_generation += 1;
        let context = SceneContext::new(&self.config, self.viewport, scene.is_manipulable());
        self.view = view_of(&context.camera);
        self.ledger.record(LifecycleEvent::SceneConstructed {
            kind,
            generation: self.scene_generation,
        });
        tracing::info!(
            generation = self.scene_generation,
            vertices = scene.vertex_count(),
            "scene constructed"
        );
        self.active = Some(ActiveScene {
            scene,
            context,
            generation: self.scene_generation,
        });
        self.tick = 0;
        self.last_time = None;
        self.request_frame()
    }

    /// Issue a handle for the next frame, replacing any pending one.
    pub fn request_frame(&mut self) -> Result<FrameHandle, SessionError> {
        if self.active.is_none() {
            return Err(SessionError::NoActiveScene);
        }
        self.next_frame_id += 1;
        let handle = FrameHandle(self.next_frame_id);
        self.pending_frame = Some(handle);
        Ok(handle)
    }

    /// Revoke the pending frame request, if any.
    pub fn cancel_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            tracing::debug!(frame = handle.0, "frame request cancelled");
            self.ledger
                .record(LifecycleEvent::FrameCancelled { frame: handle.0 });
        }
    }

    /// Run one frame at host time `time_ms` (milliseconds) and return the
    /// handle for the next one.
    ///
    /// Order: displacement, keyboard translation, auto-look, position
    /// advance, orientation.
    pub fn tick(&mut self, frame: FrameHandle, time_ms: f64) -> Result<FrameHandle, SessionError> {
        if self.pending_frame != Some(frame) {
            tracing::warn!(frame = frame.0, "rejecting stale frame request");
            return Err(SessionError::StaleFrame { requested: frame.0 });
        }
        let Some(active) = self.active.as_mut() else {
            return Err(SessionError::NoActiveScene);
        };
        self.pending_frame = None;

        let _span = tracing::debug_span!("tick", tick = self.tick).entered();
        let time = if time_ms.is_finite() {
            (time_ms * 0.001) as f32
        } else {
            tracing::warn!(time_ms, "non-finite frame time, reusing the previous one");
            self.last_time.unwrap_or(0.0)
        };
        if let Some(last) = self.last_time {
            if time < last {
                tracing::warn!(time, last, "frame time went backwards");
            }
        }

        let ActiveScene { scene, context, .. } = active;
        scene.update(time);

        let state = context.input.state();
        let intent = state.move_intent();
        let pointer = state.pointer_position();
        let manipulating = state.manipulation_active();

        context.camera.apply_keyboard_translation(intent);
        context
            .edge_pan
            .apply(&mut context.camera, pointer, context.viewport, manipulating);
        context.camera.advance();
        self.view = view_of(&context.camera);

        tracing::trace!(
            time,
            position = ?context.camera.position(),
            yaw = context.camera.yaw(),
            pitch = context.camera.pitch(),
            "tick complete"
        );
        self.tick += 1;
        self.last_time = Some(time);
        self.request_frame()
    }

    /// Hand the current frame to `renderer` and clear upload flags.
    ///
    /// A viewport change since the previous render reaches the renderer first.
    pub fn render<R: Renderer>(&mut self, renderer: &mut R) -> Result<R::Output, SessionError> {
        let active = self.active.as_mut().ok_or(SessionError::NoActiveScene)?;
        if let Some((width, height)) = self.pending_resize.take() {
            renderer.set_viewport(width, height);
        }
        let output = {
            let graph = active.scene.graph(active.generation);
            renderer.render(&graph, &self.view)
        };
        active.scene.mark_uploaded();
        Ok(output)
    }

    /// [`Session::tick`] followed by [`Session::render`].
    pub fn frame<R: Renderer>(
        &mut self,
        frame: FrameHandle,
        time_ms: f64,
        renderer: &mut R,
    ) -> Result<(FrameHandle, R::Output), SessionError> {
        let next = self.tick(frame, time_ms)?;
        let output = self.render(renderer)?;
        Ok((next, output))
    }

    /// Feed one host input event and apply the gesture it produces.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<Gesture> {
        let active = self.active.as_mut()?;
        let gesture = active.context.input.handle_event(event)?;
        match gesture {
            Gesture::Orbit { yaw, pitch } => active.context.camera.rotate(yaw, pitch),
            Gesture::Manipulate { angle_x, angle_y } => {
                if let Some(target) = active.scene.manipulation_target_mut() {
                    target.rotate(angle_x, angle_y);
                }
            }
            Gesture::Zoom { amount } => active.context.camera.zoom(amount),
        }
        Some(gesture)
    }

    /// The output surface changed size.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            tracing::warn!(width, height, "ignoring degenerate viewport");
            return;
        }
        self.viewport = Viewport::new(width, height);
        self.pending_resize = Some(surface_size(self.viewport));
        if let Some(active) = self.active.as_mut() {
            active.context.viewport = self.viewport;
            active.context.camera.set_aspect(self.viewport.aspect());
            self.view = view_of(&active.context.camera);
        } else {
            self.view.aspect = self.viewport.aspect();
        }
        tracing::debug!(width, height, "viewport resized");
    }

    /// Cancel scheduling and release the active scene.
    pub fn shutdown(&mut self) -> Result<(), SessionError> {
        self.cancel_frame();
        self.dispose_active()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scene_kind(&self) -> Option<SceneKind> {
        self.active.as_ref().map(|a| a.scene.kind())
    }

    pub fn scene(&self) -> Option<&dyn Scene> {
        self.active.as_ref().map(|a| a.scene.as_ref())
    }

    pub fn context(&self) -> Option<&SceneContext> {
        self.active.as_ref().map(|a| &a.context)
    }

    pub fn camera(&self) -> Option<&CameraRig> {
        self.context().map(|c| &c.camera)
    }

    pub fn input_state(&self) -> Option<&InputState> {
        self.context().map(|c| c.input.state())
    }

    pub fn manipulation_target(&self) -> Option<ManipulationTarget> {
        self.scene()?.manipulation_target().copied()
    }

    /// View derived at the end of the last tick.
    pub fn view(&self) -> RenderView {
        self.view
    }

    /// Ticks run since the active scene was constructed.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn last_time(&self) -> Option<f32> {
        self.last_time
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn scene_generation(&self) -> u64 {
        self.scene_generation
    }

    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    pub fn events(&self) -> &[LifecycleEvent] {
        self.ledger.events()
    }

    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        self.ledger.drain_events()
    }

    fn dispose_active(&mut self) -> Result<(), SessionError> {
        let Some(ActiveScene {
            scene, generation, ..
        }) = self.active.take()
        else {
            return Ok(());
        };
        let kind = scene.kind();
        let released = scene.dispose(&mut self.ledger)?;
        self.ledger
            .record(LifecycleEvent::SceneDisposed { kind, generation });
        tracing::debug!(%kind, generation, released, "scene disposed");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(%err, "session shutdown failed");
        }
    }
}

fn surface_size(viewport: Viewport) -> (u32, u32) {
    (viewport.width.round() as u32, viewport.height.round() as u32)
}

fn view_of(camera: &CameraRig) -> RenderView {
    RenderView {
        eye: camera.position(),
        target: camera.look_target(),
        fov_degrees: camera.fov().to_degrees(),
        aspect: camera.aspect(),
        near: camera.near(),
        far: camera.far(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fishbowl_common::PITCH_LIMIT;
    use fishbowl_input::{Key, Touch};
    use fishbowl_render::DebugTextRenderer;
    use glam::Vec3;

    const EPS: f32 = 1e-5;

    fn session(kind: SceneKind) -> (Session, FrameHandle) {
        let mut s = Session::new(ControllerConfig::default(), Viewport::new(1280.0, 720.0));
        let frame = s.switch_scene(kind).unwrap();
        (s, frame)
    }

    #[test]
    fn pointer_orbit_turns_yaw() {
        let (mut s, _) = session(SceneKind::Sphere);
        s.handle_event(&InputEvent::PointerMove { x: 600.0, y: 360.0 });
        let before = s.camera().unwrap().yaw();
        let g = s.handle_event(&InputEvent::PointerMove { x: 610.0, y: 360.0 });
        assert!(matches!(g, Some(Gesture::Orbit { .. })));
        assert!((before - s.camera().unwrap().yaw() - 0.02).abs() < EPS);
    }

    #[test]
    fn forward_key_for_one_tick() {
        let (mut s, frame) = session(SceneKind::Sphere);
        let before = s.camera().unwrap().position_target();
        s.handle_event(&InputEvent::KeyDown(Key::parse("w")));
        s.tick(frame, 16.0).unwrap();
        let camera = s.camera().unwrap();
        let moved = camera.position_target() - before;
        assert!((moved - camera.level_forward() * 0.1).length() < EPS);
        // yaw = π, pitch = 0 faces -z.
        assert!((moved.z + 0.1).abs() < EPS);
    }

    #[test]
    fn wheel_zooms_along_look_direction() {
        let (mut s, _) = session(SceneKind::Empty);
        let before = s.camera().unwrap().position_target();
        s.handle_event(&InputEvent::Wheel { delta_y: -100.0 });
        let camera = s.camera().unwrap();
        let expected = before + camera.look_direction() * 0.5;
        assert!((camera.position_target() - expected).length() < EPS);
    }

    #[test]
    fn wheel_zoom_is_clamped() {
        let (mut s, _) = session(SceneKind::Empty);
        for _ in 0..20 {
            s.handle_event(&InputEvent::Wheel { delta_y: -1000.0 });
        }
        let target = s.camera().unwrap().position_target();
        assert!((target.z + 9.5).abs() < EPS);
    }

    #[test]
    fn drag_rotates_object_not_camera() {
        let (mut s, _) = session(SceneKind::Sphere);
        s.handle_event(&InputEvent::PointerDown { x: 600.0, y: 300.0 });
        let yaw = s.camera().unwrap().yaw();
        s.handle_event(&InputEvent::PointerMove { x: 640.0, y: 300.0 });
        assert_eq!(s.camera().unwrap().yaw(), yaw);
        let target = s.manipulation_target().unwrap();
        assert!((target.angle_y - 0.2).abs() < EPS);
    }

    #[test]
    fn empty_scene_drags_orbit() {
        let (mut s, _) = session(SceneKind::Empty);
        s.handle_event(&InputEvent::PointerDown { x: 600.0, y: 300.0 });
        let g = s.handle_event(&InputEvent::PointerMove { x: 640.0, y: 300.0 });
        assert!(matches!(g, Some(Gesture::Orbit { .. })));
        assert!(s.manipulation_target().is_none());
    }

    #[test]
    fn two_touches_cancel_rotation() {
        let (mut s, _) = session(SceneKind::Cube);
        s.handle_event(&InputEvent::TouchStart(vec![Touch::new(1, 500.0, 300.0)]));
        s.handle_event(&InputEvent::TouchMove(vec![Touch::new(1, 510.0, 300.0)]));
        let after_drag = s.manipulation_target().unwrap();
        s.handle_event(&InputEvent::TouchStart(vec![
            Touch::new(1, 510.0, 300.0),
            Touch::new(2, 700.0, 300.0),
        ]));
        s.handle_event(&InputEvent::TouchMove(vec![
            Touch::new(1, 480.0, 300.0),
            Touch::new(2, 760.0, 300.0),
        ]));
        s.handle_event(&InputEvent::TouchEnd(vec![Touch::new(2, 760.0, 300.0)]));
        s.handle_event(&InputEvent::TouchMove(vec![Touch::new(2, 900.0, 300.0)]));
        assert_eq!(s.manipulation_target().unwrap(), after_drag);
    }

    #[test]
    fn auto_look_pauses_while_dragging() {
        let (mut s, frame) = session(SceneKind::Sphere);
        s.handle_event(&InputEvent::PointerMove { x: 0.0, y: 360.0 });
        let yaw = s.camera().unwrap().yaw();
        let frame = s.tick(frame, 16.0).unwrap();
        assert!((s.camera().unwrap().yaw() - yaw - 0.02).abs() < EPS);

        s.handle_event(&InputEvent::PointerDown { x: 0.0, y: 360.0 });
        let yaw = s.camera().unwrap().yaw();
        s.tick(frame, 32.0).unwrap();
        assert_eq!(s.camera().unwrap().yaw(), yaw);
    }

    #[test]
    fn pitch_survives_long_edge_hold() {
        let (mut s, mut frame) = session(SceneKind::Empty);
        s.handle_event(&InputEvent::PointerMove { x: 640.0, y: 0.0 });
        for i in 0..200 {
            frame = s.tick(frame, i as f64 * 16.0).unwrap();
            assert!(s.camera().unwrap().pitch() <= PITCH_LIMIT);
        }
        assert_eq!(s.camera().unwrap().pitch(), PITCH_LIMIT);
    }

    #[test]
    fn tick_displaces_then_advances() {
        let (mut s, frame) = session(SceneKind::Sphere);
        s.tick(frame, 1500.0).unwrap();
        assert_eq!(s.last_time(), Some(1.5));
        let camera = s.camera().unwrap();
        // Position eased 10% of the way from z = 10 toward the clamped 9.5.
        assert!((camera.position().z - 9.95).abs() < EPS);
        assert_eq!(s.view().eye, camera.position());
        assert_eq!(s.view().target, camera.look_target());
        let sphere = s
            .scene()
            .unwrap()
            .objects()
            .iter()
            .find(|o| o.name() == "sphere")
            .unwrap();
        assert!(sphere.mesh().unwrap().is_dirty());
    }

    #[test]
    fn stale_frame_is_rejected_after_switch() {
        let (mut s, frame) = session(SceneKind::Sphere);
        let fresh = s.switch_scene(SceneKind::Plane).unwrap();
        assert!(matches!(
            s.tick(frame, 0.0),
            Err(SessionError::StaleFrame { .. })
        ));
        assert!(s.tick(fresh, 0.0).is_ok());
    }

    #[test]
    fn consumed_frame_cannot_run_twice() {
        let (mut s, frame) = session(SceneKind::Empty);
        let next = s.tick(frame, 0.0).unwrap();
        assert!(s.tick(frame, 16.0).is_err());
        s.cancel_frame();
        assert!(s.tick(next, 16.0).is_err());
    }

    #[test]
    fn switch_releases_previous_resources_once() {
        let (mut s, _) = session(SceneKind::Sphere);
        assert_eq!(s.ledger().live_count(), 4);
        s.switch_scene(SceneKind::Empty).unwrap();
        assert_eq!(s.ledger().live_count(), 2);
        assert_eq!(s.ledger().released_count(), 4);

        let events = s.drain_events();
        let cancelled = events
            .iter()
            .position(|e| matches!(e, LifecycleEvent::FrameCancelled { .. }))
            .unwrap();
        let first_release = events
            .iter()
            .position(|e| matches!(e, LifecycleEvent::Released { .. }))
            .unwrap();
        assert!(cancelled < first_release);
        assert!(events.iter().any(|e| matches!(
            e,
            LifecycleEvent::SceneDisposed {
                kind: SceneKind::Sphere,
                ..
            }
        )));

        s.shutdown().unwrap();
        assert_eq!(s.ledger().live_count(), 0);
        assert!(s.scene_kind().is_none());
    }

    #[test]
    fn switching_resets_camera_and_input() {
        let (mut s, _) = session(SceneKind::Sphere);
        s.handle_event(&InputEvent::KeyDown(Key::Character('w')));
        s.handle_event(&InputEvent::Wheel { delta_y: -400.0 });
        s.switch_scene(SceneKind::Cube).unwrap();
        assert!(s.input_state().unwrap().held_keys().is_empty());
        assert_eq!(s.camera().unwrap().position_target(), Vec3::new(0.0, 0.0, 9.5));
        assert_eq!(s.tick_count(), 0);
    }

    #[test]
    fn render_clears_upload_flags() {
        let (mut s, frame) = session(SceneKind::Sphere);
        s.tick(frame, 16.0).unwrap();
        let mut renderer = DebugTextRenderer::new();
        let first = s.render(&mut renderer).unwrap();
        assert!(first.contains("[sphere]"));
        assert!(first.contains("dirty"));
        let second = s.render(&mut renderer).unwrap();
        assert!(!second.contains("dirty"));
    }

    #[test]
    fn resize_updates_aspect() {
        let (mut s, _) = session(SceneKind::Empty);
        s.set_viewport(1000.0, 500.0);
        assert_eq!(s.camera().unwrap().aspect(), 2.0);
        assert_eq!(s.view().aspect, 2.0);
        s.set_viewport(0.0, 500.0);
        assert_eq!(s.viewport().width, 1000.0);
    }

    #[test]
    fn no_scene_means_no_frames() {
        let mut s = Session::new(ControllerConfig::default(), Viewport::default());
        assert!(matches!(s.request_frame(), Err(SessionError::NoActiveScene)));
        assert!(s.handle_event(&InputEvent::Wheel { delta_y: 1.0 }).is_none());
        assert!(s.render(&mut DebugTextRenderer::new()).is_err());
    }

    #[test]
    fn reentry_after_leave_does_not_jump() {
        let (mut s, _) = session(SceneKind::Empty);
        s.handle_event(&InputEvent::PointerMove { x: 1270.0, y: 360.0 });
        s.handle_event(&InputEvent::PointerLeave);
        let yaw = s.camera().unwrap().yaw();
        let g = s.handle_event(&InputEvent::PointerMove { x: 5.0, y: 360.0 });
        assert!(g.is_none());
        assert_eq!(s.camera().unwrap().yaw(), yaw);

        let g = s.handle_event(&InputEvent::PointerMove { x: 15.0, y: 360.0 });
        assert!(matches!(g, Some(Gesture::Orbit { .. })));
        assert!((yaw - s.camera().unwrap().yaw() - 0.02).abs() < EPS);
    }

    #[test]
    fn new_touch_after_release_does_not_jump() {
        let (mut s, _) = session(SceneKind::Empty);
        s.handle_event(&InputEvent::TouchStart(vec![Touch::new(1, 100.0, 100.0)]));
        s.handle_event(&InputEvent::TouchEnd(Vec::new()));
        let yaw = s.camera().unwrap().yaw();
        let g = s.handle_event(&InputEvent::PointerMove { x: 900.0, y: 100.0 });
        assert!(g.is_none());
        assert_eq!(s.camera().unwrap().yaw(), yaw);
    }

    #[test]
    fn focus_loss_stops_held_movement() {
        let (mut s, frame) = session(SceneKind::Sphere);
        s.handle_event(&InputEvent::KeyDown(Key::parse("w")));
        let frame = s.tick(frame, 16.0).unwrap();
        s.handle_event(&InputEvent::FocusLost);
        let target = s.camera().unwrap().position_target();
        s.tick(frame, 32.0).unwrap();
        assert!(s.input_state().unwrap().held_keys().is_empty());
        assert_eq!(s.camera().unwrap().position_target(), target);
    }

    #[test]
    fn first_render_receives_the_viewport() {
        let (mut s, frame) = session(SceneKind::Empty);
        s.tick(frame, 16.0).unwrap();
        let mut renderer = DebugTextRenderer::new();
        let first = s.render(&mut renderer).unwrap();
        assert!(first.contains("Viewport: 1280x720"));

        s.set_viewport(1000.0, 500.0);
        let resized = s.render(&mut renderer).unwrap();
        assert!(resized.contains("Viewport: 1000x500"));

        s.set_viewport(-1.0, 500.0);
        let ignored = s.render(&mut renderer).unwrap();
        assert!(ignored.contains("Viewport: 1000x500"));
    }

    #[test]
    fn non_finite_time_reuses_previous() {
        let (mut s, frame) = session(SceneKind::Sphere);
        let frame = s.tick(frame, 1000.0).unwrap();
        s.tick(frame, f64::NAN).unwrap();
        assert_eq!(s.tick_count(), 2);
        assert_eq!(s.last_time(), Some(1.0));
        let camera = s.camera().unwrap();
        assert!(camera.position().is_finite());
        assert!(camera.look_target().is_finite());
        let sphere = s
            .scene()
            .unwrap()
            .objects()
            .iter()
            .find(|o| o.name() == "sphere")
            .unwrap();
        assert!(
            sphere
                .mesh()
                .unwrap()
                .live_positions()
                .iter()
                .all(|p| p.is_finite())
        );
    }

    #[test]
    fn backwards_time_still_ticks() {
        let (mut s, frame) = session(SceneKind::Empty);
        let frame = s.tick(frame, 1000.0).unwrap();
        s.tick(frame, 500.0).unwrap();
        assert_eq!(s.tick_count(), 2);
        assert_eq!(s.last_time(), Some(0.5));
    }
}
