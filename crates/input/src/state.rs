use crate::event::{InputEvent, Touch};
use crate::key::{self, Key};
use fishbowl_common::MoveIntent;
use glam::Vec2;
use std::collections::HashSet;

/// Number of simultaneous touch contacts that are tracked.
pub const MAX_TOUCHES: usize = 2;

/// Which device started the current object drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Pointer,
    Touch,
}

/// Distance and midpoint of the two tracked contacts at the previous sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    pub last_distance: f32,
    pub last_midpoint: Vec2,
}

impl PinchState {
    pub fn between(a: &Touch, b: &Touch) -> Self {
        Self {
            last_distance: a.position.distance(b.position),
            last_midpoint: (a.position + b.position) * 0.5,
        }
    }
}

/// The contacts that are tracked out of a host touch list.
pub fn tracked(touches: &[Touch]) -> &[Touch] {
    &touches[..touches.len().min(MAX_TOUCHES)]
}

/// Current state of every input device, mutated only by edge-triggered events.
#[derive(Debug, Clone)]
pub struct InputState {
    held_keys: HashSet<Key>,
    pointer_position: Vec2,
    /// Anchor for the next pointer or touch delta. `None` until the first sample.
    last_pointer_position: Option<Vec2>,
    active_touches: Vec<Touch>,
    drag: Option<DragSource>,
    pinch: Option<PinchState>,
    manipulable: bool,
}

impl InputState {
    /// Fresh state with the pointer resting at `pointer_origin`.
    pub fn new(pointer_origin: Vec2, manipulable: bool) -> Self {
        Self {
            held_keys: HashSet::new(),
            pointer_position: pointer_origin,
            last_pointer_position: None,
            active_touches: Vec::with_capacity(MAX_TOUCHES),
            drag: None,
            pinch: None,
            manipulable,
        }
    }

    pub fn held_keys(&self) -> &HashSet<Key> {
        &self.held_keys
    }

    pub fn is_held(&self, key: &Key) -> bool {
        self.held_keys.contains(key)
    }

    pub fn move_intent(&self) -> MoveIntent {
        key::move_intent(&self.held_keys)
    }

    /// Where the pointer (or the active touch gesture) was last seen.
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    pub fn last_pointer_position(&self) -> Option<Vec2> {
        self.last_pointer_position
    }

    pub fn active_touches(&self) -> &[Touch] {
        &self.active_touches
    }

    pub fn drag_source(&self) -> Option<DragSource> {
        self.drag
    }

    /// True while the focused object is being dragged instead of the camera.
    pub fn manipulation_active(&self) -> bool {
        self.drag.is_some()
    }

    pub fn pinch(&self) -> Option<PinchState> {
        self.pinch
    }

    pub fn is_manipulable(&self) -> bool {
        self.manipulable
    }

    /// Whether pointer and touch drags may grab the focused object.
    pub fn set_manipulable(&mut self, manipulable: bool) {
        self.manipulable = manipulable;
        if !manipulable {
            self.drag = None;
        }
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.on_key_down(key.clone()),
            InputEvent::KeyUp(key) => self.on_key_up(key),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(*x, *y),
            InputEvent::PointerDown { x, y } => self.on_pointer_down(*x, *y),
            InputEvent::PointerUp => self.on_pointer_up(),
            InputEvent::PointerLeave => self.on_pointer_leave(),
            InputEvent::TouchStart(touches) => self.on_touch_start(touches),
            InputEvent::TouchMove(touches) => self.on_touch_move(touches),
            InputEvent::TouchEnd(touches) => self.on_touch_end(touches),
            InputEvent::Wheel { delta_y } => self.on_wheel(*delta_y),
            InputEvent::FocusLost => self.on_focus_lost(),
        }
    }

    pub fn on_key_down(&mut self, key: Key) {
        self.held_keys.insert(key);
    }

    pub fn on_key_up(&mut self, key: &Key) {
        self.held_keys.remove(key);
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        let Some(position) = finite_point(x, y) else {
            return;
        };
        self.pointer_position = position;
        self.last_pointer_position = Some(position);
    }

    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        let Some(position) = finite_point(x, y) else {
            return;
        };
        self.pointer_position = position;
        self.last_pointer_position = Some(position);
        if self.manipulable {
            tracing::trace!("pointer drag started");
            self.drag = Some(DragSource::Pointer);
        }
    }

    pub fn on_pointer_up(&mut self) {
        if self.drag == Some(DragSource::Pointer) {
            tracing::trace!("pointer drag released");
            self.drag = None;
        }
    }

    /// Leaving the surface releases a pointer drag and drops the delta
    /// anchor, so re-entry starts from a fresh sample. The pointer keeps its
    /// last position.
    pub fn on_pointer_leave(&mut self) {
        self.on_pointer_up();
        self.last_pointer_position = None;
    }

    /// Forget held keys and release any pointer drag.
    pub fn on_focus_lost(&mut self) {
        if !self.held_keys.is_empty() {
            tracing::debug!(keys = self.held_keys.len(), "focus lost, releasing held keys");
        }
        self.held_keys.clear();
        self.on_pointer_leave();
    }

    pub fn on_touch_start(&mut self, touches: &[Touch]) {
        if !self.track(touches) {
            return;
        }
        match self.active_touches.len() {
            1 => {
                let position = self.active_touches[0].position;
                self.last_pointer_position = Some(position);
                if self.manipulable {
                    self.drag = Some(DragSource::Touch);
                }
            }
            2 => {
                if self.drag == Some(DragSource::Touch) {
                    tracing::trace!("second contact cancels touch rotation");
                    self.drag = None;
                }
                self.pinch = Some(PinchState::between(
                    &self.active_touches[0],
                    &self.active_touches[1],
                ));
            }
            _ => {}
        }
    }

    pub fn on_touch_move(&mut self, touches: &[Touch]) {
        if !self.track(touches) {
            return;
        }
        match self.active_touches.len() {
            1 if self.drag == Some(DragSource::Touch) => {
                let position = self.active_touches[0].position;
                self.last_pointer_position = Some(position);
                self.pointer_position = position;
            }
            2 => {
                let pinch = PinchState::between(&self.active_touches[0], &self.active_touches[1]);
                self.pointer_position = pinch.last_midpoint;
                self.pinch = Some(pinch);
            }
            _ => {}
        }
    }

    pub fn on_touch_end(&mut self, remaining: &[Touch]) {
        if !self.track(remaining) {
            return;
        }
        if self.active_touches.is_empty() {
            if self.drag == Some(DragSource::Touch) {
                self.drag = None;
            }
            self.last_pointer_position = None;
        }
    }

    /// Wheel input carries no persistent state; the zoom it produces is
    /// applied by the gesture layer.
    pub fn on_wheel(&mut self, delta_y: f32) {
        tracing::trace!(delta_y, "wheel");
    }

    /// Replace the tracked contacts. Returns false when the list is rejected.
    fn track(&mut self, touches: &[Touch]) -> bool {
        if touches.iter().any(|t| !t.position.is_finite()) {
            tracing::warn!("ignoring touch event with non-finite coordinates");
            return false;
        }
        if touches.len() > MAX_TOUCHES {
            tracing::warn!(
                contacts = touches.len(),
                "tracking only the first two touch contacts"
            );
        }
        self.active_touches.clear();
        self.active_touches.extend_from_slice(tracked(touches));
        if self.active_touches.len() < MAX_TOUCHES {
            self.pinch = None;
        }
        true
    }
}

fn finite_point(x: f32, y: f32) -> Option<Vec2> {
    let point = Vec2::new(x, y);
    if point.is_finite() {
        Some(point)
    } else {
        tracing::warn!(x, y, "ignoring pointer event with non-finite coordinates");
        None
    }
}
