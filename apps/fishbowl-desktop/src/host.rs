//! Translation from winit window events to host-agnostic input events.

use fishbowl_input::{InputEvent, Key, Touch};
use glam::Vec2;
use std::collections::BTreeMap;
use winit::event::{MouseScrollDelta, TouchPhase};
use winit::keyboard::{Key as WinitKey, NamedKey};

/// Wheel pixels per scrolled line, matching browser `deltaY` in line mode.
const LINE_HEIGHT: f32 = 100.0;

pub fn translate_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Character(text) => Some(Key::parse(text.as_str())),
        WinitKey::Named(NamedKey::Space) => Some(Key::Space),
        WinitKey::Named(NamedKey::Shift) => Some(Key::Shift),
        WinitKey::Named(named) => Some(Key::Named(format!("{named:?}").to_lowercase())),
        _ => None,
    }
}

/// Wheel delta in the browser convention: positive scrolls down, away from
/// the scene.
pub fn wheel_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(p) => -p.y as f32,
    }
}

/// Remembers live touch contacts, since winit reports them one at a time
/// while the input layer expects every contact still down.
#[derive(Debug, Default)]
pub struct TouchTracker {
    contacts: BTreeMap<u64, Vec2>,
}

impl TouchTracker {
    pub fn update(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> InputEvent {
        match phase {
            TouchPhase::Started => {
                self.contacts.insert(id, position);
                InputEvent::TouchStart(self.touches())
            }
            TouchPhase::Moved => {
                self.contacts.insert(id, position);
                InputEvent::TouchMove(self.touches())
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.contacts.remove(&id);
                InputEvent::TouchEnd(self.touches())
            }
        }
    }

    fn touches(&self) -> Vec<Touch> {
        self.contacts
            .iter()
            .map(|(&id, p)| Touch::new(id, p.x, p.y))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_map_to_movement_keys() {
        assert_eq!(translate_key(&WinitKey::Named(NamedKey::Space)), Some(Key::Space));
        assert_eq!(translate_key(&WinitKey::Named(NamedKey::Shift)), Some(Key::Shift));
        assert_eq!(
            translate_key(&WinitKey::Named(NamedKey::Escape)),
            Some(Key::Named("escape".into()))
        );
    }

    #[test]
    fn wheel_up_zooms_in() {
        assert_eq!(wheel_delta(MouseScrollDelta::LineDelta(0.0, 1.0)), -100.0);
        let pixels = winit::dpi::PhysicalPosition::new(0.0, -40.0);
        assert_eq!(wheel_delta(MouseScrollDelta::PixelDelta(pixels)), 40.0);
    }

    #[test]
    fn touches_report_all_live_contacts() {
        let mut tracker = TouchTracker::default();
        tracker.update(1, TouchPhase::Started, Vec2::new(10.0, 10.0));
        let event = tracker.update(2, TouchPhase::Started, Vec2::new(50.0, 10.0));
        assert_eq!(
            event,
            InputEvent::TouchStart(vec![Touch::new(1, 10.0, 10.0), Touch::new(2, 50.0, 10.0)])
        );
        let event = tracker.update(1, TouchPhase::Ended, Vec2::new(10.0, 10.0));
        assert_eq!(event, InputEvent::TouchEnd(vec![Touch::new(2, 50.0, 10.0)]));
        let event = tracker.update(2, TouchPhase::Cancelled, Vec2::ZERO);
        assert_eq!(event, InputEvent::TouchEnd(Vec::new()));
    }
}
