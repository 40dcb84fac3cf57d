//! Meteor Dodge - steer a ship left and right under a shower of meteors
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (input, motion, spawning, collisions, score)
//! - `renderer`: WebGPU rendering of a session snapshot
//! - `settings`: Explicit game geometry and tuning

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{Session, SessionEvent, SessionPhase, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Simulation rate. Per-tick steps (ship, meteors) are tuned for 60 Hz.
    pub const TICK_HZ: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_HZ as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield defaults (pixels)
    pub const CONTAINER_WIDTH: f32 = 400.0;
    pub const CONTAINER_HEIGHT: f32 = 600.0;

    /// Ship defaults
    pub const SHIP_WIDTH: f32 = 40.0;
    pub const SHIP_HEIGHT: f32 = 40.0;
    /// Gap between the ship's bottom edge and the bottom of the playfield
    pub const SHIP_BOTTOM_MARGIN: f32 = 60.0;
    pub const SHIP_START_X: f32 = 180.0;
    /// Horizontal movement per tick while a direction is held
    pub const SHIP_STEP: f32 = 5.0;

    /// Meteors are square
    pub const OBSTACLE_SIZE: f32 = 50.0;
    /// Spawn height, just above the visible area
    pub const OBSTACLE_SPAWN_Y: f32 = -50.0;
    /// Downward movement per tick
    pub const OBSTACLE_STEP: f32 = 3.0;

    /// Periodic processes
    pub const SPAWN_PERIOD_MS: u32 = 1500;
    pub const SCORE_PERIOD_MS: u32 = 1000;
    pub const CREEP_PERIOD_MS: u32 = 3000;
    /// Extra downward nudge applied on every creep firing
    pub const CREEP_STEP: f32 = 0.1;

    /// Batch size grows by one each time the score reaches a multiple of this
    pub const BATCH_SCORE_THRESHOLD: u64 = 10;
}

/// Convert a millisecond period to whole simulation ticks (never zero)
#[inline]
pub fn ms_to_ticks(ms: u32) -> u32 {
    let ticks = (ms as u64 * consts::TICK_HZ as u64 + 500) / 1000;
    (ticks as u32).max(1)
}
