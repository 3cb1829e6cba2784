use fishbowl_common::MoveIntent;
use serde::{Deserialize, Serialize};

/// A key identifier as delivered by the host, normalized to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Character(char),
    Space,
    Shift,
    /// Any other named key (`"escape"`, `"arrowup"`, ...).
    Named(String),
}

impl Key {
    /// Parse a host key name. Matching is case-insensitive, and `" "` is the
    /// space bar.
    pub fn parse(name: &str) -> Self {
        if name == " " {
            return Self::Space;
        }
        let lower = name.to_lowercase();
        match lower.as_str() {
            "space" => Self::Space,
            "shift" => Self::Shift,
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Named(lower),
                }
            }
        }
    }
}

/// Build the translation request for the currently held keys.
///
/// `w`/`s` move along the level forward axis, `d`/`a` along the right axis,
/// space and shift along world up.
pub fn move_intent<'a>(held: impl IntoIterator<Item = &'a Key>) -> MoveIntent {
    let mut intent = MoveIntent::default();
    for key in held {
        match key {
            Key::Character('w') => intent.forward += 1.0,
            Key::Character('s') => intent.forward -= 1.0,
            Key::Character('d') => intent.right += 1.0,
            Key::Character('a') => intent.right -= 1.0,
            Key::Space => intent.up += 1.0,
            Key::Shift => intent.up -= 1.0,
            _ => {}
        }
    }
    intent
}
