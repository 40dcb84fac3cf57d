//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Geometry comes from `Settings`, never from the page
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, first_overlap};
pub use state::{
    Control, InputState, Obstacle, PeriodicTimer, Session, SessionPhase, SessionTimers,
};
pub use tick::{KeyEvent, SessionEvent, TickInput, tick};
