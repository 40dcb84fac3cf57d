//! Session state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::settings::Settings;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for the first Start
    #[default]
    NotStarted,
    /// Ship moving, meteors falling, clocks running
    Active,
    /// Ship hit a meteor; Start goes straight back to Active
    GameOver,
}

/// One of the two logical movement controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    Left,
    Right,
}

impl Control {
    /// Map a DOM `KeyboardEvent.key` value to a control
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Control::Left),
            "ArrowRight" | "d" | "D" => Some(Control::Right),
            _ => None,
        }
    }
}

/// Held state of the movement controls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Left => self.left = held,
            Control::Right => self.right = held,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A falling meteor. `pos` is its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
}

impl Obstacle {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }

    /// Rendered bounding box
    pub fn rect(&self, size: f32) -> Rect {
        Rect::new(self.pos.x, self.pos.y, size, size)
    }
}

/// A repeating timer counted in simulation ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTimer {
    period_ticks: u32,
    elapsed: u32,
}

impl PeriodicTimer {
    pub fn new(period_ticks: u32) -> Self {
        Self {
            period_ticks: period_ticks.max(1),
            elapsed: 0,
        }
    }

    /// Count one tick; true when the period completes
    pub fn advance(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.period_ticks {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }

    pub fn period_ticks(&self) -> u32 {
        self.period_ticks
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }
}

/// The three periodic processes of an active session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimers {
    pub spawn: PeriodicTimer,
    pub score: PeriodicTimer,
    pub creep: PeriodicTimer,
}

impl SessionTimers {
    pub fn new(settings: &Settings) -> Self {
        Self {
            spawn: PeriodicTimer::new(settings.spawn_period_ticks()),
            score: PeriodicTimer::new(settings.score_period_ticks()),
            creep: PeriodicTimer::new(settings.creep_period_ticks()),
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct Session {
    /// Left edge of the ship
    pub ship_x: f32,
    /// Live meteors in spawn order
    pub obstacles: Vec<Obstacle>,
    pub score: u64,
    /// Meteors created per spawn firing
    pub batch_size: u32,
    pub phase: SessionPhase,
    pub input: InputState,
    pub timers: SessionTimers,
    /// Ticks simulated in the current session
    pub time_ticks: u64,
    rng: Pcg32,
}

impl Session {
    /// Create a session waiting for Start
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            ship_x: settings.ship_start_x,
            obstacles: Vec::new(),
            score: 0,
            batch_size: 1,
            phase: SessionPhase::NotStarted,
            input: InputState::default(),
            timers: SessionTimers::new(settings),
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_started(&self) -> bool {
        self.phase != SessionPhase::NotStarted
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Start (or restart) play. Returns false if already active.
    pub fn start(&mut self, settings: &Settings) -> bool {
        if self.is_active() {
            log::debug!("Start ignored: session already active");
            return false;
        }

        let restart = self.is_over();
        self.ship_x = settings.ship_start_x;
        self.obstacles.clear();
        self.score = 0;
        self.batch_size = 1;
        self.input.clear();
        self.timers = SessionTimers::new(settings);
        self.time_ticks = 0;
        self.phase = SessionPhase::Active;

        if restart {
            log::info!("Session restarted");
        } else {
            log::info!("Session started");
        }
        true
    }

    /// End play. Held controls are released so a restart never resumes old movement.
    pub fn finish(&mut self) {
        self.phase = SessionPhase::GameOver;
        self.input.clear();
        log::info!("Game over - score {}", self.score);
    }

    /// Ship bounding box
    pub fn ship_rect(&self, settings: &Settings) -> Rect {
        Rect::new(
            self.ship_x,
            settings.ship_top(),
            settings.ship_width,
            settings.ship_height,
        )
    }

    /// Append a meteor at a random x just above the playfield
    pub fn spawn_obstacle(&mut self, settings: &Settings) {
        let x = self.rng.random_range(0..=settings.spawn_max_x()) as f32;
        self.obstacles
            .push(Obstacle::new(x, settings.obstacle_spawn_y));
    }
}
