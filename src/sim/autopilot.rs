//! Idle/demo mode steering
//!
//! Picks a direction that moves the ship out from under the nearest meteor.
//! Used by the headless native runner and the in-browser demo toggle.

use super::collision::Rect;
use super::state::{Control, InputState, Session};
use super::tick::KeyEvent;
use crate::settings::Settings;

/// How far above the ship a meteor has to be before we react (pixels)
const LOOKAHEAD: f32 = 260.0;
/// Extra clearance kept on each side of the ship
const MARGIN: f32 = 6.0;

/// Direction to hold this tick, or `None` to stay put
pub fn steer(session: &Session, settings: &Settings) -> Option<Control> {
    let ship = session.ship_rect(settings);
    let lane = Rect::from_edges(
        ship.left - MARGIN,
        ship.right + MARGIN,
        ship.top - LOOKAHEAD,
        ship.bottom,
    );
    let size = settings.obstacle_size;

    // Lowest threatening meteor is the most urgent one
    let threat = session
        .obstacles
        .iter()
        .map(|o| o.rect(size))
        .filter(|r| lane.overlaps(r))
        .max_by(|a, b| a.bottom.total_cmp(&b.bottom))?;

    let ship_center = ship.center().x;

    // Distance the ship has to travel to clear the meteor on each side
    let go_left = (ship.right - threat.left + MARGIN).max(0.0);
    let go_right = (threat.right - ship.left + MARGIN).max(0.0);
    let can_left = ship.left - go_left >= 0.0;
    let can_right = ship.left + go_right <= settings.ship_max_x();

    match (can_left, can_right) {
        (true, true) if go_left < go_right => Some(Control::Left),
        (true, true) => Some(Control::Right),
        (true, false) => Some(Control::Left),
        (false, true) => Some(Control::Right),
        // Boxed in: move away from the meteor's center
        (false, false) => {
            if threat.center().x > ship_center {
                Some(Control::Left)
            } else {
                Some(Control::Right)
            }
        }
    }
}

/// Key transitions that turn the held controls into `desired`
pub fn keys_for(current: InputState, desired: Option<Control>) -> Vec<KeyEvent> {
    let mut keys = Vec::new();
    let want_left = desired == Some(Control::Left);
    let want_right = desired == Some(Control::Right);

    if current.left != want_left {
        keys.push(if want_left {
            KeyEvent::Down(Control::Left)
        } else {
            KeyEvent::Up(Control::Left)
        });
    }
    if current.right != want_right {
        keys.push(if want_right {
            KeyEvent::Down(Control::Right)
        } else {
            KeyEvent::Up(Control::Right)
        });
    }
    keys
}
