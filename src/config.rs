//! Tuning configuration
//!
//! Every physics and layout constant lives here so trajectories are
//! reproducible and tunable. Persisted in LocalStorage on the web.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Linear map from normalized power (0..=1) to a launch speed component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    /// Speed at zero power (px/tick)
    pub at_zero: f32,
    /// Speed at full power (px/tick)
    pub at_full: f32,
}

impl SpeedRange {
    #[inline]
    pub fn at(&self, factor: f32) -> f32 {
        self.at_zero + factor * (self.at_full - self.at_zero)
    }
}

/// Flight and charge physics. Units are px and render ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration applied to vy after each position update
    pub gravity: f32,
    pub max_power: f32,
    /// Power gained per tick while charging
    pub power_charge_rate: f32,
    /// Wind is sampled uniformly from [-wind_max, wind_max]
    pub wind_max: f32,
    /// vx gained per tick per unit of wind
    pub wind_coefficient: f32,
    pub horizontal_speed: SpeedRange,
    pub vertical_speed: SpeedRange,
    /// Catch band extends this far past each side of the basket
    pub catch_margin_x: f32,
    pub catch_margin_above: f32,
    pub catch_margin_below: f32,
    /// Slack past the left/right canvas edges before a miss
    pub offscreen_margin: f32,
    pub trail_capacity: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_power: MAX_POWER,
            power_charge_rate: POWER_CHARGE_RATE,
            wind_max: WIND_MAX,
            wind_coefficient: WIND_COEFFICIENT,
            horizontal_speed: SpeedRange {
                at_zero: LAUNCH_VX_MIN,
                at_full: LAUNCH_VX_MAX,
            },
            vertical_speed: SpeedRange {
                at_zero: LAUNCH_VY_MIN,
                at_full: LAUNCH_VY_MAX,
            },
            catch_margin_x: CATCH_MARGIN_X,
            catch_margin_above: CATCH_MARGIN_ABOVE,
            catch_margin_below: CATCH_MARGIN_BELOW,
            offscreen_margin: OFFSCREEN_MARGIN,
            trail_capacity: TRAIL_LENGTH,
        }
    }
}

/// Scene geometry, as offsets from the canvas edges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_ground_offset: f32,
    pub release_offset_y: f32,
    pub basket_width: f32,
    pub basket_height: f32,
    pub basket_right_offset: f32,
    pub basket_ground_offset: f32,
    pub disc_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            player_x: PLAYER_X,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_ground_offset: PLAYER_GROUND_OFFSET,
            release_offset_y: RELEASE_OFFSET_Y,
            basket_width: BASKET_WIDTH,
            basket_height: BASKET_HEIGHT,
            basket_right_offset: BASKET_RIGHT_OFFSET,
            basket_ground_offset: BASKET_GROUND_OFFSET,
            disc_radius: DISC_RADIUS,
        }
    }
}

/// Wall-clock delays for deferred actions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub launch_delay_ms: u32,
    pub miss_recovery_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            launch_delay_ms: LAUNCH_DELAY_MS,
            miss_recovery_ms: MISS_RECOVERY_MS,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TossConfig {
    pub physics: PhysicsConfig,
    pub layout: LayoutConfig,
    pub timing: TimingConfig,
}

/// Largest accepted wind magnitude
pub const WIND_MAX_LIMIT: f32 = 1000.0;
/// Largest accepted trail buffer
pub const TRAIL_CAPACITY_LIMIT: usize = 1024;

/// Why a configuration was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    NotFinite { field: &'static str },
    NonPositive { field: &'static str, value: f32 },
    Negative { field: &'static str, value: f32 },
    TooLarge { field: &'static str, value: f32, max: f32 },
    ZeroTrailCapacity,
    TrailCapacityTooLarge { value: usize, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid config json: {msg}"),
            Self::NotFinite { field } => write!(f, "{field} must be a finite number"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::TooLarge { field, value, max } => {
                write!(f, "{field} must be at most {max}, got {value}")
            }
            Self::ZeroTrailCapacity => write!(f, "trail_capacity must be at least 1"),
            Self::TrailCapacityTooLarge { value, max } => {
                write!(f, "trail_capacity must be at most {max}, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl TossConfig {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "disc_toss_config";

    /// Environment variable naming a JSON config file (native only)
    pub const ENV_PATH: &'static str = "DISC_TOSS_CONFIG";

    /// Parse and validate. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Reject values that would break the game's invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        let l = &self.layout;
        let all = [
            ("gravity", p.gravity),
            ("max_power", p.max_power),
            ("power_charge_rate", p.power_charge_rate),
            ("wind_max", p.wind_max),
            ("wind_coefficient", p.wind_coefficient),
            ("horizontal_speed.at_zero", p.horizontal_speed.at_zero),
            ("horizontal_speed.at_full", p.horizontal_speed.at_full),
            ("vertical_speed.at_zero", p.vertical_speed.at_zero),
            ("vertical_speed.at_full", p.vertical_speed.at_full),
            ("catch_margin_x", p.catch_margin_x),
            ("catch_margin_above", p.catch_margin_above),
            ("catch_margin_below", p.catch_margin_below),
            ("offscreen_margin", p.offscreen_margin),
            ("player_x", l.player_x),
            ("player_width", l.player_width),
            ("player_height", l.player_height),
            ("player_ground_offset", l.player_ground_offset),
            ("release_offset_y", l.release_offset_y),
            ("basket_width", l.basket_width),
            ("basket_height", l.basket_height),
            ("basket_right_offset", l.basket_right_offset),
            ("basket_ground_offset", l.basket_ground_offset),
            ("disc_radius", l.disc_radius),
        ];
        for (field, value) in all {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }

        if p.max_power <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "max_power",
                value: p.max_power,
            });
        }
        let non_negative = [
            ("gravity", p.gravity),
            ("power_charge_rate", p.power_charge_rate),
            ("wind_max", p.wind_max),
            ("catch_margin_x", p.catch_margin_x),
            ("catch_margin_above", p.catch_margin_above),
            ("catch_margin_below", p.catch_margin_below),
            ("offscreen_margin", p.offscreen_margin),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if p.wind_max > WIND_MAX_LIMIT {
            return Err(ConfigError::TooLarge {
                field: "wind_max",
                value: p.wind_max,
                max: WIND_MAX_LIMIT,
            });
        }

        if p.trail_capacity == 0 {
            return Err(ConfigError::ZeroTrailCapacity);
        }
        if p.trail_capacity > TRAIL_CAPACITY_LIMIT {
            return Err(ConfigError::TrailCapacityTooLarge {
                value: p.trail_capacity,
                max: TRAIL_CAPACITY_LIMIT,
            });
        }
        Ok(())
    }

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {e}"),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.to_json());
            log::info!("Config saved");
        }
    }

    /// Load config from the file named by `DISC_TOSS_CONFIG`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_PATH) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {path}");
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring config {path}: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read config {path}: {e}");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
