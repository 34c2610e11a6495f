//! Game state and core simulation types
//!
//! One `GameState` lives for the whole page. It is only ever reset, never
//! rebuilt, so cumulative counters survive every throw.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::TossConfig;
use crate::consts::{WIND_CALM, WIND_STRONG};

/// Current phase of the throw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Waiting for press-start
    Ready,
    /// Button held, power building
    Charging,
    /// Released, disc about to leave the hand
    Throwing,
    /// Disc in the air
    Flying,
    /// Disc landed in the basket; waits for reset
    Scored,
    /// Disc left the screen; returns to Ready on its own
    Missed,
}

/// Wind display band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindBand {
    StrongLeft,
    Left,
    Calm,
    Right,
    StrongRight,
}

impl WindBand {
    pub fn from_wind(wind: f32) -> Self {
        if wind > WIND_STRONG {
            WindBand::StrongRight
        } else if wind > WIND_CALM {
            WindBand::Right
        } else if wind < -WIND_STRONG {
            WindBand::StrongLeft
        } else if wind < -WIND_CALM {
            WindBand::Left
        } else {
            WindBand::Calm
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            WindBand::StrongLeft => "←←",
            WindBand::Left => "←",
            WindBand::Calm => "–",
            WindBand::Right => "→",
            WindBand::StrongRight => "→→",
        }
    }
}

/// Notifications for the UI layer (counters, meters, banners)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    PowerMeter { visible: bool },
    Power { percent: f32 },
    Counters { attempts: u32, made: u32 },
    Wind { band: WindBand, value: f32 },
    Scored,
    Missed,
    WinMessage { visible: bool },
}

/// The thrower, anchored to the left side of the canvas
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Player {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Player {
    /// Point the disc leaves the hand from
    pub fn release_point(&self, release_offset_y: f32) -> Vec2 {
        Vec2::new(self.pos.x + self.width, self.pos.y + release_offset_y)
    }
}

/// The target, anchored to the right side of the canvas
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Basket {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Top of the basket opening
    pub opening_y: f32,
}

/// The projectile
#[derive(Debug, Clone, Serialize)]
pub struct Disc {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
    /// Recent positions for rendering, oldest first
    pub trail: VecDeque<Vec2>,
}

impl Disc {
    fn new(radius: f32, trail_capacity: usize) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius,
            active: false,
            trail: VecDeque::with_capacity(trail_capacity + 1),
        }
    }

    /// Record current position, evicting the oldest beyond `capacity`
    pub fn record_trail(&mut self, capacity: usize) {
        self.trail.push_back(self.pos);
        while self.trail.len() > capacity {
            self.trail.pop_front();
        }
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }
}

/// Complete game state
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub phase: Phase,
    pub attempts: u32,
    pub made: u32,
    pub power: f32,
    pub wind: f32,
    pub player: Player,
    pub disc: Disc,
    pub basket: Basket,
    /// Canvas size from the last resize, `None` until the first one
    pub bounds: Option<Vec2>,
    /// Generation token for deferred actions; bumped on reset and new throws
    pub epoch: u64,
    /// Integration steps taken during the current flight
    pub flight_ticks: u32,
    pub power_meter_visible: bool,
    pub win_visible: bool,
    #[serde(skip)]
    pub config: TossConfig,
    #[serde(skip)]
    events: Vec<GameEvent>,
    #[serde(skip)]
    rng: Pcg32,
}

impl GameState {
    /// Create a game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_config(TossConfig::default(), seed)
    }

    /// Create a game with placeholder geometry. Call `set_positions` before play.
    ///
    /// A config that fails validation is replaced by the defaults.
    pub fn with_config(config: TossConfig, seed: u64) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Invalid config ({e}), using defaults");
                TossConfig::default()
            }
        };
        let layout = &config.layout;
        let player = Player {
            pos: Vec2::new(layout.player_x, 0.0),
            width: layout.player_width,
            height: layout.player_height,
        };
        let basket = Basket {
            pos: Vec2::ZERO,
            width: layout.basket_width,
            height: layout.basket_height,
            opening_y: 0.0,
        };
        let disc = Disc::new(layout.disc_radius, config.physics.trail_capacity);

        let mut state = Self {
            phase: Phase::Ready,
            attempts: 0,
            made: 0,
            power: 0.0,
            wind: 0.0,
            player,
            disc,
            basket,
            bounds: None,
            epoch: 0,
            flight_ticks: 0,
            power_meter_visible: false,
            win_visible: false,
            config,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.disc.pos = state.throw_origin();
        state.randomize_wind();
        state.publish_counters();
        state
    }

    /// Recompute scene geometry for a new canvas size
    pub fn set_positions(&mut self, width: f32, height: f32) {
        let layout = &self.config.layout;
        self.player.pos = Vec2::new(layout.player_x, height - layout.player_ground_offset);

        let basket_y = height - layout.basket_ground_offset;
        self.basket.pos = Vec2::new(width - layout.basket_right_offset, basket_y);
        self.basket.opening_y = basket_y;

        self.bounds = Some(Vec2::new(width, height));
        if !self.disc.active {
            self.disc.pos = self.throw_origin();
        }
        log::debug!("Layout set for {width}x{height}");
    }

    /// Where the disc starts every throw
    pub fn throw_origin(&self) -> Vec2 {
        self.player.release_point(self.config.layout.release_offset_y)
    }

    /// Return to Ready with fresh wind; counters are kept
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.phase = Phase::Ready;
        self.power = 0.0;
        self.flight_ticks = 0;
        self.disc.active = false;
        self.disc.vel = Vec2::ZERO;
        self.disc.clear_trail();
        self.disc.pos = self.throw_origin();
        if self.power_meter_visible {
            self.set_power_meter(false);
        }
        self.win_visible = false;
        self.publish(GameEvent::WinMessage { visible: false });
        self.randomize_wind();
        self.publish_counters();
        log::info!(
            "Reset (epoch {}, wind {:.2}, {}/{} made)",
            self.epoch,
            self.wind,
            self.made,
            self.attempts
        );
    }

    /// Sample a new wind uniformly from [-wind_max, wind_max]
    pub fn randomize_wind(&mut self) {
        let max = self.config.physics.wind_max;
        self.wind = self.rng.random_range(-max..=max);
        self.publish(GameEvent::Wind {
            band: self.wind_band(),
            value: self.wind,
        });
    }

    pub fn wind_band(&self) -> WindBand {
        WindBand::from_wind(self.wind)
    }

    /// Charge as a percentage of full power
    pub fn power_percent(&self) -> f32 {
        self.power / self.config.physics.max_power * 100.0
    }

    /// Take all pending UI events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn publish(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn publish_counters(&mut self) {
        self.publish(GameEvent::Counters {
            attempts: self.attempts,
            made: self.made,
        });
    }

    pub(crate) fn set_power_meter(&mut self, visible: bool) {
        self.power_meter_visible = visible;
        self.publish(GameEvent::PowerMeter { visible });
    }
}
