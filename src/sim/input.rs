//! Press/release gating and deferred actions
//!
//! Out-of-phase input is ignored rather than reported: a stray release or a
//! double press simply does nothing.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState, Phase};
use super::tick::launch;

/// Action to run after a delay, tagged with the epoch it was scheduled in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeferredAction {
    /// Throwing -> Flying with the power captured at release
    Launch { epoch: u64, power: f32 },
    /// Missed -> Ready
    Recover { epoch: u64 },
}

impl DeferredAction {
    pub fn epoch(&self) -> u64 {
        match *self {
            DeferredAction::Launch { epoch, .. } | DeferredAction::Recover { epoch } => epoch,
        }
    }
}

/// A request for the driver to fire `action` after `delay_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deferred {
    pub delay_ms: u32,
    pub action: DeferredAction,
}

/// Start charging. Ignored unless Ready and the canvas has been sized.
pub fn press_start(state: &mut GameState) {
    if state.phase != Phase::Ready {
        log::debug!("press_start ignored in {:?}", state.phase);
        return;
    }
    if state.bounds.is_none() {
        log::debug!("press_start ignored before first layout");
        return;
    }

    state.epoch += 1;
    state.phase = Phase::Charging;
    state.power = 0.0;
    state.set_power_meter(true);
    state.publish(GameEvent::Power { percent: 0.0 });
}

/// Release the disc. Ignored unless Charging.
///
/// Counts the attempt immediately; the launch itself is returned for the
/// driver to schedule.
pub fn press_end(state: &mut GameState) -> Option<Deferred> {
    if state.phase != Phase::Charging {
        log::debug!("press_end ignored in {:?}", state.phase);
        return None;
    }

    state.phase = Phase::Throwing;
    state.set_power_meter(false);
    state.attempts += 1;
    state.publish_counters();
    log::debug!("Released at {:.0}% power", state.power_percent());

    Some(Deferred {
        delay_ms: state.config.timing.launch_delay_ms,
        action: DeferredAction::Launch {
            epoch: state.epoch,
            power: state.power,
        },
    })
}

/// Run a deferred action. Stale or out-of-phase actions are dropped.
pub fn fire(state: &mut GameState, action: DeferredAction) {
    if action.epoch() != state.epoch {
        log::debug!(
            "Dropping stale {:?} (current epoch {})",
            action,
            state.epoch
        );
        return;
    }

    match action {
        DeferredAction::Launch { power, .. } => {
            if state.phase == Phase::Throwing {
                launch(state, power);
            }
        }
        DeferredAction::Recover { .. } => {
            if state.phase == Phase::Missed {
                state.phase = Phase::Ready;
            }
        }
    }
}
