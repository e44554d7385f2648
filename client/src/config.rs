//! Page-level configuration and the fixed tuning constants of the client.

use crate::speed::{DEFAULT_SPEED_STEP, SPEED_STEPS_MICROS};

pub const WS_PATH: &str = "/ws";

pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const RECONNECT_BASE_MS: u32 = 1000;
pub const RECONNECT_CAP_MS: u32 = 10_000;

/// Margin kept between the polygon's bounding box and the surface edge.
pub const VIEWPORT_PADDING: f64 = 50.0;

pub const GRID_GAP: f64 = 10.0;
/// Horizontal and vertical space the container spends on its own padding.
pub const CONTAINER_INSET: f64 = 40.0;
pub const SURFACE_ASPECT: f64 = 4.0 / 3.0;
pub const MIN_SURFACE_WIDTH: f64 = 150.0;
pub const MIN_SURFACE_HEIGHT: f64 = 112.5;

pub const FPS_WINDOW: usize = 60;
pub const MAX_LOG_ENTRIES: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub debug: bool,
    pub cores: usize,
    pub speed_step: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            debug: false,
            cores: 1,
            speed_step: DEFAULT_SPEED_STEP,
        }
    }
}

impl ClientConfig {
    /// Reads `debug`/`log`, `cores` and `speed` from a `location.search`
    /// string. Unknown keys and unparsable values fall back to defaults.
    pub fn from_query(search: &str) -> Self {
        let mut config = Self::default();
        for pair in search.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "debug" | "log" => {
                    if value == "1" || value == "true" {
                        config.debug = true;
                    }
                }
                "cores" => {
                    if let Ok(cores) = value.parse::<usize>() {
                        config.cores = cores.max(1);
                    }
                }
                "speed" => {
                    if let Ok(step) = value.parse::<usize>() {
                        config.speed_step = step.min(SPEED_STEPS_MICROS.len() - 1);
                    }
                }
                _ => {}
            }
        }
        config
    }

    pub fn log_level(&self) -> log::Level {
        if self.debug {
            log::Level::Debug
        } else {
            log::Level::Info
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
