//! Game geometry and tuning
//!
//! The simulation never measures the page. Everything it needs to know about
//! the playfield comes in through `Settings`, which the shell fills from the
//! canvas size (web) or a JSON file (native).

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::ms_to_ticks;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub container_width: f32,
    pub container_height: f32,

    // === Ship ===
    pub ship_width: f32,
    pub ship_height: f32,
    pub ship_bottom_margin: f32,
    /// Position the ship returns to on every start
    pub ship_start_x: f32,
    pub ship_step: f32,

    // === Meteors ===
    pub obstacle_size: f32,
    pub obstacle_spawn_y: f32,
    pub obstacle_step: f32,

    // === Timing ===
    pub spawn_period_ms: u32,
    pub score_period_ms: u32,
    pub creep_period_ms: u32,
    /// Extra fall distance per creep firing (0 disables creep)
    pub creep_step: f32,
    pub batch_score_threshold: u64,

    /// Fixed RNG seed; the shell picks one from the clock when absent
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            container_width: CONTAINER_WIDTH,
            container_height: CONTAINER_HEIGHT,

            ship_width: SHIP_WIDTH,
            ship_height: SHIP_HEIGHT,
            ship_bottom_margin: SHIP_BOTTOM_MARGIN,
            ship_start_x: SHIP_START_X,
            ship_step: SHIP_STEP,

            obstacle_size: OBSTACLE_SIZE,
            obstacle_spawn_y: OBSTACLE_SPAWN_Y,
            obstacle_step: OBSTACLE_STEP,

            spawn_period_ms: SPAWN_PERIOD_MS,
            score_period_ms: SCORE_PERIOD_MS,
            creep_period_ms: CREEP_PERIOD_MS,
            creep_step: CREEP_STEP,
            batch_score_threshold: BATCH_SCORE_THRESHOLD,

            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Settings>(json).map(Settings::sanitized)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Replace the playfield size with a measured one
    pub fn with_container(mut self, width: f32, height: f32) -> Self {
        self.container_width = width;
        self.container_height = height;
        self.sanitized()
    }

    /// Clamp values that would give the simulation empty or negative ranges.
    /// Non-finite values (JSON overflow like `1e39` parses as infinity) fall back to defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Settings::default();
        let fields = [
            (&mut self.container_width, defaults.container_width),
            (&mut self.container_height, defaults.container_height),
            (&mut self.ship_width, defaults.ship_width),
            (&mut self.ship_height, defaults.ship_height),
            (&mut self.ship_bottom_margin, defaults.ship_bottom_margin),
            (&mut self.ship_start_x, defaults.ship_start_x),
            (&mut self.ship_step, defaults.ship_step),
            (&mut self.obstacle_size, defaults.obstacle_size),
            (&mut self.obstacle_spawn_y, defaults.obstacle_spawn_y),
            (&mut self.obstacle_step, defaults.obstacle_step),
            (&mut self.creep_step, defaults.creep_step),
        ];
        for (value, fallback) in fields {
            if !value.is_finite() {
                *value = fallback;
            }
        }

        self.ship_width = self.ship_width.max(1.0);
        self.ship_height = self.ship_height.max(1.0);
        self.obstacle_size = self.obstacle_size.max(1.0);
        self.container_width = self
            .container_width
            .max(self.ship_width)
            .max(self.obstacle_size);
        self.container_height = self.container_height.max(self.ship_height);
        self.ship_bottom_margin = self
            .ship_bottom_margin
            .clamp(0.0, self.container_height - self.ship_height);
        self.ship_start_x = self.ship_start_x.clamp(0.0, self.ship_max_x());
        self.ship_step = self.ship_step.max(0.0);
        self.obstacle_step = self.obstacle_step.max(0.0);
        self.creep_step = self.creep_step.max(0.0);
        self.batch_score_threshold = self.batch_score_threshold.max(1);
        self
    }

    /// Rightmost resting position of the ship's left edge
    #[inline]
    pub fn ship_max_x(&self) -> f32 {
        self.container_width - self.ship_width
    }

    /// Top edge of the ship (it only moves horizontally)
    #[inline]
    pub fn ship_top(&self) -> f32 {
        self.container_height - self.ship_bottom_margin - self.ship_height
    }

    /// Largest whole-pixel x a meteor can spawn at
    #[inline]
    pub fn spawn_max_x(&self) -> u32 {
        (self.container_width - self.obstacle_size).floor().max(0.0) as u32
    }

    pub fn spawn_period_ticks(&self) -> u32 {
        ms_to_ticks(self.spawn_period_ms)
    }

    pub fn score_period_ticks(&self) -> u32 {
        ms_to_ticks(self.score_period_ms)
    }

    pub fn creep_period_ticks(&self) -> u32 {
        ms_to_ticks(self.creep_period_ms)
    }

    /// Load settings from the page's `#game-config` JSON block (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        const CONFIG_ELEMENT_ID: &str = "game-config";

        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from #{}", CONFIG_ELEMENT_ID);
                    return settings;
                }
                Err(e) => log::warn!("Ignoring invalid #{}: {}", CONFIG_ELEMENT_ID, e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from a JSON file (native)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| Self::from_json(&json).map_err(|e| e.to_string()));

        match parsed {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }
}
