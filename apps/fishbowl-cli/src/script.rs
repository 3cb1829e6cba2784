//! Command-line notation for scripted input.
//!
//! ```text
//! keydown:w  keyup:space  move:600,360  down:600,360  up  leave
//! wheel:-100  touchstart:1=500,300;2=700,300  touchmove:1=510,300
//! touchend:2=700,300  touchend:  blur  tick  tick:30
//! ```

use anyhow::{Context, Result, anyhow, bail};
use fishbowl_input::{InputEvent, Key, Touch};

/// One step of a simulation script.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Event(InputEvent),
    Ticks(u32),
}

pub fn parse_step(text: &str) -> Result<Step> {
    let (verb, arg) = match text.split_once(':') {
        Some((verb, arg)) => (verb.trim(), Some(arg.trim())),
        None => (text.trim(), None),
    };
    let event = match (verb.to_lowercase().as_str(), arg) {
        ("tick", None) => return Ok(Step::Ticks(1)),
        ("tick", Some(n)) => {
            return Ok(Step::Ticks(
                n.parse().with_context(|| format!("bad tick count `{n}`"))?,
            ));
        }
        ("keydown", Some(key)) => InputEvent::KeyDown(Key::parse(key)),
        ("keyup", Some(key)) => InputEvent::KeyUp(Key::parse(key)),
        ("move", Some(xy)) => {
            let (x, y) = point(xy)?;
            InputEvent::PointerMove { x, y }
        }
        ("down", Some(xy)) => {
            let (x, y) = point(xy)?;
            InputEvent::PointerDown { x, y }
        }
        ("up", None) => InputEvent::PointerUp,
        ("leave", None) => InputEvent::PointerLeave,
        ("blur", None) => InputEvent::FocusLost,
        ("wheel", Some(dy)) => InputEvent::Wheel {
            delta_y: number(dy)?,
        },
        ("touchstart", Some(list)) => InputEvent::TouchStart(touches(list)?),
        ("touchmove", Some(list)) => InputEvent::TouchMove(touches(list)?),
        ("touchend", Some(list)) => InputEvent::TouchEnd(touches(list)?),
        _ => bail!("unrecognised script step `{text}`"),
    };
    Ok(Step::Event(event))
}

fn number(text: &str) -> Result<f32> {
    text.trim()
        .parse()
        .with_context(|| format!("bad number `{text}`"))
}

fn point(text: &str) -> Result<(f32, f32)> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| anyhow!("expected `x,y`, got `{text}`"))?;
    Ok((number(x)?, number(y)?))
}

fn touches(text: &str) -> Result<Vec<Touch>> {
    text.split(';')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| {
            let (id, xy) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("expected `id=x,y`, got `{entry}`"))?;
            let id = id
                .trim()
                .parse()
                .with_context(|| format!("bad touch id `{id}`"))?;
            let (x, y) = point(xy)?;
            Ok(Touch::new(id, x, y))
        })
        .collect()
}
