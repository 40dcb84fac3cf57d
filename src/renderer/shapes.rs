//! Shape generation for 2D primitives
//!
//! Everything here works in playfield coordinates (origin top-left, y down)
//! and is a pure function of the session, so it can be tested without a GPU.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::settings::Settings;
use crate::sim::{Rect, Session};

/// Segments used for meteor outlines
const METEOR_SEGMENTS: u32 = 14;

/// Generate vertices for a filled axis-aligned box
pub fn quad(rect: &Rect, color: [f32; 4]) -> [Vertex; 6] {
    let (l, r, t, b) = (rect.left, rect.right, rect.top, rect.bottom);
    [
        Vertex::new(l, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(r, b, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Ship: a nose-up hull filling its box, cockpit, and an engine flame while steering
pub fn ship(rect: &Rect, thrusting: bool, wrecked: bool) -> Vec<Vertex> {
    let hull = if wrecked {
        colors::SHIP_WRECKED
    } else {
        colors::SHIP_HULL
    };
    let w = rect.width();
    let h = rect.height();
    let cx = rect.center().x;

    let mut vertices = vec![
        Vertex::new(cx, rect.top, hull),
        Vertex::new(rect.left, rect.bottom, hull),
        Vertex::new(rect.right, rect.bottom, hull),
    ];

    let cockpit = Rect::new(cx - w * 0.1, rect.top + h * 0.4, w * 0.2, h * 0.25);
    vertices.extend_from_slice(&quad(&cockpit, colors::SHIP_COCKPIT));

    if thrusting && !wrecked {
        // Drawn inside the box, along the bottom edge
        let flame = Rect::new(cx - w * 0.15, rect.bottom - h * 0.1, w * 0.3, h * 0.1);
        vertices.extend_from_slice(&quad(&flame, colors::SHIP_FLAME));
    }

    vertices
}

/// Meteor: a round rock inscribed in its box with one crater
pub fn meteor(rect: &Rect) -> Vec<Vertex> {
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.5;
    let mut vertices = circle(center, radius, colors::METEOR, METEOR_SEGMENTS);
    let crater = center + Vec2::new(-radius * 0.3, -radius * 0.25);
    vertices.extend(circle(crater, radius * 0.3, colors::METEOR_CRATER, METEOR_SEGMENTS));
    vertices
}

/// Project a session onto vertices: meteors first, ship on top
pub fn session_vertices(session: &Session, settings: &Settings) -> Vec<Vertex> {
    let size = settings.obstacle_size;
    let mut vertices = Vec::with_capacity(session.obstacles.len() * METEOR_SEGMENTS as usize * 6 + 16);

    for obstacle in &session.obstacles {
        vertices.extend(meteor(&obstacle.rect(size)));
    }

    let thrusting = session.input.left != session.input.right;
    vertices.extend(ship(
        &session.ship_rect(settings),
        thrusting,
        session.is_over(),
    ));

    vertices
}
