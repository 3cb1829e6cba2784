//! Pairs the input state with gesture interpretation.
//!
//! The `InputProcessor` is the only thing between host events and the
//! session: it interprets each event against the state as it was, then folds
//! the event into the state.

use crate::event::InputEvent;
use crate::gesture::{Gesture, GestureTuning, interpret};
use crate::state::InputState;
use glam::Vec2;

pub struct InputProcessor {
    state: InputState,
    tuning: GestureTuning,
}

impl InputProcessor {
    pub fn new(tuning: GestureTuning, pointer_origin: Vec2, manipulable: bool) -> Self {
        Self {
            state: InputState::new(pointer_origin, manipulable),
            tuning,
        }
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut InputState {
        &mut self.state
    }

    pub fn tuning(&self) -> &GestureTuning {
        &self.tuning
    }

    /// Process one host event and return the gesture it triggers, if any.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<Gesture> {
        let gesture = interpret(&self.state, event, &self.tuning);
        self.state.apply(event);
        if let Some(gesture) = &gesture {
            tracing::trace!(?gesture, "gesture");
        }
        gesture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Touch;

    fn processor() -> InputProcessor {
        InputProcessor::new(GestureTuning::default(), Vec2::new(640.0, 360.0), true)
    }

    #[test]
    fn abandoned_touch_drag_leaves_no_residue() {
        let mut p = processor();
        p.handle_event(&InputEvent::TouchStart(vec![Touch::new(1, 100.0, 100.0)]));
        let first = p.handle_event(&InputEvent::TouchMove(vec![Touch::new(1, 110.0, 100.0)]));
        assert!(matches!(first, Some(Gesture::Manipulate { .. })));

        // A second finger lands: rotation is cancelled and a pinch begins.
        p.handle_event(&InputEvent::TouchStart(vec![
            Touch::new(1, 110.0, 100.0),
            Touch::new(2, 300.0, 100.0),
        ]));
        assert!(!p.state().manipulation_active());

        // One finger lifts and the other keeps moving: nothing rotates.
        p.handle_event(&InputEvent::TouchEnd(vec![Touch::new(2, 300.0, 100.0)]));
        let stray = p.handle_event(&InputEvent::TouchMove(vec![Touch::new(2, 400.0, 100.0)]));
        assert_eq!(stray, None);
        p.handle_event(&InputEvent::TouchEnd(vec![]));

        // A new single touch re-anchors, so the first delta starts from zero.
        p.handle_event(&InputEvent::TouchStart(vec![Touch::new(3, 500.0, 500.0)]));
        let resumed = p.handle_event(&InputEvent::TouchMove(vec![Touch::new(3, 500.0, 500.0)]));
        assert_eq!(resumed, Some(Gesture::Manipulate { angle_x: 0.0, angle_y: 0.0 }));
    }

    #[test]
    fn drag_then_release_returns_to_orbit() {
        let mut p = processor();
        p.handle_event(&InputEvent::PointerDown { x: 10.0, y: 10.0 });
        let drag = p.handle_event(&InputEvent::PointerMove { x: 20.0, y: 10.0 });
        assert!(matches!(drag, Some(Gesture::Manipulate { .. })));
        p.handle_event(&InputEvent::PointerUp);
        let orbit = p.handle_event(&InputEvent::PointerMove { x: 30.0, y: 10.0 });
        assert!(matches!(orbit, Some(Gesture::Orbit { .. })));
    }

    #[test]
    fn consecutive_pinch_moves_use_previous_distance() {
        let mut p = processor();
        p.handle_event(&InputEvent::TouchStart(vec![
            Touch::new(1, 0.0, 0.0),
            Touch::new(2, 100.0, 0.0),
        ]));
        p.handle_event(&InputEvent::TouchMove(vec![
            Touch::new(1, 0.0, 0.0),
            Touch::new(2, 200.0, 0.0),
        ]));
        let second = p.handle_event(&InputEvent::TouchMove(vec![
            Touch::new(1, 0.0, 0.0),
            Touch::new(2, 150.0, 0.0),
        ]));
        match second {
            Some(Gesture::Zoom { amount }) => assert!((amount + 0.5).abs() < 1e-6),
            other => panic!("expected zoom, got {other:?}"),
        }
    }
}
