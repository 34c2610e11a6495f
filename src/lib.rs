//! Disc Toss - a disc golf mini-game and story engine for a personal site
//!
//! Core modules:
//! - `sim`: Throw simulation (phase machine, physics step, deferred actions)
//! - `config`: Tuning constants, loadable from JSON
//! - `story`: Choose-your-own-adventure passage traversal
//! - `web`: Browser bindings (wasm32 only)

pub mod config;
pub mod sim;
pub mod story;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, TossConfig};
pub use story::{Story, StoryEngine, StoryError};

/// Default tuning constants.
///
/// Distances are canvas pixels, time is measured in render ticks unless the
/// name says otherwise.
pub mod consts {
    /// Downward acceleration (px/tick²)
    pub const GRAVITY: f32 = 0.4;
    /// Full charge value
    pub const MAX_POWER: f32 = 100.0;
    /// Power gained per tick while charging
    pub const POWER_CHARGE_RATE: f32 = 2.0;

    /// Wind is sampled from [-WIND_MAX, WIND_MAX]
    pub const WIND_MAX: f32 = 3.0;
    /// Horizontal acceleration per unit of wind (px/tick²)
    pub const WIND_COEFFICIENT: f32 = 0.05;
    /// Wind above this magnitude displays as strong
    pub const WIND_STRONG: f32 = 0.5;
    /// Wind at or below this magnitude displays as calm
    pub const WIND_CALM: f32 = 0.2;

    /// Launch horizontal speed at zero and full power (px/tick)
    pub const LAUNCH_VX_MIN: f32 = 9.0;
    pub const LAUNCH_VX_MAX: f32 = 15.0;
    /// Launch vertical speed at zero and full power (px/tick, negative is up)
    pub const LAUNCH_VY_MIN: f32 = -5.0;
    pub const LAUNCH_VY_MAX: f32 = -8.0;

    /// Catch band tolerance beyond the basket's left/right edges
    pub const CATCH_MARGIN_X: f32 = 10.0;
    /// Catch band tolerance above the basket opening
    pub const CATCH_MARGIN_ABOVE: f32 = 5.0;
    /// Catch band tolerance below the basket opening
    pub const CATCH_MARGIN_BELOW: f32 = 30.0;
    /// How far past the left/right canvas edge a disc may travel before it misses
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Trail ring buffer capacity
    pub const TRAIL_LENGTH: usize = 15;

    /// Delay between release and the disc leaving the hand
    pub const LAUNCH_DELAY_MS: u32 = 100;
    /// Delay before a missed throw returns to Ready
    pub const MISS_RECOVERY_MS: u32 = 1000;

    /// Player layout
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 80.0;
    /// Distance from the canvas bottom to the player's top edge
    pub const PLAYER_GROUND_OFFSET: f32 = 100.0;
    /// Release point below the player's top edge
    pub const RELEASE_OFFSET_Y: f32 = 20.0;

    /// Basket layout
    pub const BASKET_WIDTH: f32 = 50.0;
    pub const BASKET_HEIGHT: f32 = 80.0;
    /// Distance from the canvas right edge to the basket's left edge
    pub const BASKET_RIGHT_OFFSET: f32 = 150.0;
    /// Distance from the canvas bottom to the basket opening
    pub const BASKET_GROUND_OFFSET: f32 = 100.0;

    pub const DISC_RADIUS: f32 = 8.0;
}
