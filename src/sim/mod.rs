//! Throw simulation
//!
//! All gameplay logic lives here. Nothing in this module touches the DOM or
//! the clock:
//! - One step per render tick, driven from outside
//! - Seeded RNG only
//! - Delays are returned as `Deferred` values for the driver to schedule

pub mod input;
pub mod state;
pub mod tick;
pub mod timers;

pub use input::{Deferred, DeferredAction, fire, press_end, press_start};
pub use state::{Basket, Disc, GameEvent, GameState, Phase, Player, WindBand};
pub use tick::{Command, apply, in_catch_band, is_off_screen, launch, launch_velocity, step};
pub use timers::TimerQueue;
