//! Per-tick simulation step
//!
//! Advances charge and flight once per render tick. The integration order
//! (wind, position, gravity) is what makes trajectories reproducible.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::{Deferred, DeferredAction, fire, press_end, press_start};
use super::state::{GameEvent, GameState, Phase};
use crate::config::PhysicsConfig;

/// Every external signal the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// One render tick
    Tick,
    /// Pointer/touch down
    PressStart,
    /// Pointer/touch up
    PressEnd,
    /// A previously returned deferred action has come due
    Fire(DeferredAction),
    /// Play-again button
    Reset,
    /// Canvas resized
    Resize { width: f32, height: f32 },
}

/// Apply one command. Returns an action the caller must schedule, if any.
pub fn apply(state: &mut GameState, command: Command) -> Option<Deferred> {
    match command {
        Command::Tick => step(state),
        Command::PressStart => {
            press_start(state);
            None
        }
        Command::PressEnd => press_end(state),
        Command::Fire(action) => {
            fire(state, action);
            None
        }
        Command::Reset => {
            state.reset();
            None
        }
        Command::Resize { width, height } => {
            state.set_positions(width, height);
            None
        }
    }
}

/// Initial velocity for a throw at `power`
pub fn launch_velocity(physics: &PhysicsConfig, power: f32) -> Vec2 {
    let factor = (power / physics.max_power).clamp(0.0, 1.0);
    Vec2::new(
        physics.horizontal_speed.at(factor),
        physics.vertical_speed.at(factor),
    )
}

/// Put the disc in the air
pub fn launch(state: &mut GameState, power: f32) {
    state.disc.vel = launch_velocity(&state.config.physics, power);
    state.disc.pos = state.throw_origin();
    state.disc.clear_trail();
    state.disc.active = true;
    state.flight_ticks = 0;
    state.phase = Phase::Flying;
    log::debug!(
        "Launched with velocity ({:.2}, {:.2}), wind {:.2}",
        state.disc.vel.x,
        state.disc.vel.y,
        state.wind
    );
}

/// Advance the game by one render tick
pub fn step(state: &mut GameState) -> Option<Deferred> {
    match state.phase {
        Phase::Charging => {
            charge(state);
            None
        }
        Phase::Flying => fly(state),
        _ => None,
    }
}

fn charge(state: &mut GameState) {
    let physics = &state.config.physics;
    let power = (state.power + physics.power_charge_rate).clamp(0.0, physics.max_power);
    if power == state.power {
        return;
    }
    state.power = power;
    let percent = state.power_percent();
    state.publish(GameEvent::Power { percent });
}

fn fly(state: &mut GameState) -> Option<Deferred> {
    let physics = &state.config.physics;
    let disc = &mut state.disc;

    disc.vel.x += state.wind * physics.wind_coefficient;
    disc.pos += disc.vel;
    disc.vel.y += physics.gravity;
    disc.record_trail(physics.trail_capacity);
    state.flight_ticks += 1;

    if in_catch_band(state) {
        score(state);
        None
    } else if is_off_screen(state) {
        Some(miss(state))
    } else {
        None
    }
}

/// Disc is inside the basket's catch band and not rising
pub fn in_catch_band(state: &GameState) -> bool {
    let physics = &state.config.physics;
    let basket = &state.basket;
    let pos = state.disc.pos;

    let in_x = pos.x >= basket.pos.x - physics.catch_margin_x
        && pos.x <= basket.pos.x + basket.width + physics.catch_margin_x;
    let in_y = pos.y >= basket.opening_y - physics.catch_margin_above
        && pos.y <= basket.opening_y + physics.catch_margin_below;
    let descending = state.disc.vel.y >= 0.0;

    in_x && in_y && descending
}

/// Disc has dropped below the canvas or drifted past either side
pub fn is_off_screen(state: &GameState) -> bool {
    let Some(bounds) = state.bounds else {
        return false;
    };
    let margin = state.config.physics.offscreen_margin;
    let pos = state.disc.pos;
    pos.y > bounds.y || pos.x > bounds.x + margin || pos.x < -margin
}

fn score(state: &mut GameState) {
    state.phase = Phase::Scored;
    state.disc.active = false;
    state.made += 1;
    state.win_visible = true;
    state.publish_counters();
    state.publish(GameEvent::Scored);
    state.publish(GameEvent::WinMessage { visible: true });
    log::info!(
        "Scored after {} ticks ({}/{} made)",
        state.flight_ticks,
        state.made,
        state.attempts
    );
}

fn miss(state: &mut GameState) -> Deferred {
    state.phase = Phase::Missed;
    state.disc.active = false;
    state.publish(GameEvent::Missed);
    log::info!(
        "Missed at ({:.1}, {:.1}) after {} ticks",
        state.disc.pos.x,
        state.disc.pos.y,
        state.flight_ticks
    );
    Deferred {
        delay_ms: state.config.timing.miss_recovery_ms,
        action: DeferredAction::Recover { epoch: state.epoch },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Sized game with calm air
    fn calm_state(width: f32, height: f32) -> GameState {
        let mut state = GameState::new(12345);
        state.set_positions(width, height);
        state.wind = 0.0;
        state
    }

    /// Charge to `power`, release and fire the launch
    fn throw(state: &mut GameState, power: f32) {
        apply(state, Command::PressStart);
        state.power = power;
        let deferred = apply(state, Command::PressEnd).unwrap();
        apply(state, Command::Fire(deferred.action));
    }

    /// Tick until the flight ends, returning the miss deferral if any
    fn fly_out(state: &mut GameState) -> Option<Deferred> {
        for _ in 0..1000 {
            let deferred = step(state);
            if state.phase != Phase::Flying {
                return deferred;
            }
        }
        panic!("flight never ended");
    }

    #[test]
    fn test_launch_velocity_endpoints() {
        let physics = PhysicsConfig::default();
        assert_eq!(launch_velocity(&physics, 0.0), Vec2::new(9.0, -5.0));
        assert_eq!(launch_velocity(&physics, 100.0), Vec2::new(15.0, -8.0));
        assert_eq!(launch_velocity(&physics, 50.0), Vec2::new(12.0, -6.5));
    }

    #[test]
    fn test_charging_clamps_at_max() {
        let mut state = calm_state(800.0, 450.0);
        apply(&mut state, Command::PressStart);
        for _ in 0..49 {
            step(&mut state);
        }
        assert_eq!(state.power, 98.0);
        step(&mut state);
        assert_eq!(state.power, 100.0);
        step(&mut state);
        assert_eq!(state.power, 100.0);
        assert_eq!(state.power_percent(), 100.0);
    }

    #[test]
    fn test_full_charge_stops_publishing_power() {
        let mut state = calm_state(800.0, 450.0);
        apply(&mut state, Command::PressStart);
        for _ in 0..50 {
            step(&mut state);
        }
        state.drain_events();

        for _ in 0..500 {
            step(&mut state);
        }
        assert_eq!(state.power, 100.0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_step_is_noop_when_ready() {
        let mut state = calm_state(800.0, 450.0);
        let before = state.disc.pos;
        assert!(step(&mut state).is_none());
        assert_eq!(state.phase, Phase::Ready);
        assert_eq!(state.disc.pos, before);
        assert_eq!(state.power, 0.0);
    }

    #[test]
    fn test_launch_resets_disc() {
        let mut state = calm_state(800.0, 450.0);
        state.disc.pos = Vec2::new(999.0, 999.0);
        state.disc.trail.push_back(Vec2::ONE);
        throw(&mut state, 100.0);

        assert_eq!(state.phase, Phase::Flying);
        assert!(state.disc.active);
        assert_eq!(state.disc.pos, Vec2::new(160.0, 370.0));
        assert_eq!(state.disc.vel, Vec2::new(15.0, -8.0));
        assert!(state.disc.trail.is_empty());
    }

    #[test]
    fn test_integration_order() {
        let mut state = calm_state(800.0, 450.0);
        state.wind = 2.0;
        throw(&mut state, 100.0);
        step(&mut state);

        // Wind lands in vx before the move; gravity only after it
        assert!((state.disc.pos.x - 175.1).abs() < 1e-4);
        assert_eq!(state.disc.pos.y, 362.0);
        assert!((state.disc.vel.x - 15.1).abs() < 1e-5);
        assert!((state.disc.vel.y - -7.6).abs() < 1e-6);
        assert_eq!(state.disc.trail.len(), 1);
        assert_eq!(state.flight_ticks, 1);
    }

    // Full power in calm air, origin (160, 370) on a 450-high canvas.
    // After n ticks: x = 160 + 15n, y = 370 - 8n + 0.2n(n - 1), vy = -8 + 0.4n.
    // The catch band spans y in [345, 380]. Ticks 1-3 sit in it while rising;
    // the first descending tick inside it is n = 38: (730, 347.2), vy = 7.2.
    #[test]
    fn test_full_power_scores_on_tick_38() {
        // Basket at x = 700, catch band x in [690, 760]
        let mut state = calm_state(850.0, 450.0);
        assert_eq!(state.basket.pos.x, 700.0);
        throw(&mut state, 100.0);

        assert!(fly_out(&mut state).is_none());
        assert_eq!(state.phase, Phase::Scored);
        assert_eq!(state.flight_ticks, 38);
        assert_eq!(state.disc.pos.x, 730.0);
        // Exact f32 results of the integration. 0.4 has no exact binary form,
        // so 38 accumulated gravity steps land one ulp off the real-number
        // values 347.2 and 7.2.
        assert_eq!(state.disc.pos.y, 347.19998);
        assert_eq!(state.disc.vel.y, 7.2000022);
        assert_eq!(state.made, 1);
        assert_eq!(state.attempts, 1);
        assert!(state.win_visible);
        assert!(!state.disc.active);
    }

    #[test]
    fn test_catch_band_edges_for_tick_38() {
        // Band [bx - 10, bx + 60] covers x = 730 for bx in [670, 740]
        for width in [820.0, 890.0] {
            let mut state = calm_state(width, 450.0);
            throw(&mut state, 100.0);
            fly_out(&mut state);
            assert_eq!(state.phase, Phase::Scored, "width {width}");
            assert_eq!(state.flight_ticks, 38, "width {width}");
        }

        // bx = 669: x = 730 is just past the band and x = 745 is beyond it too
        let mut state = calm_state(819.0, 450.0);
        throw(&mut state, 100.0);
        fly_out(&mut state);
        assert_eq!(state.phase, Phase::Missed);
    }

    #[test]
    fn test_full_power_misses_far_basket_on_tick_50() {
        // y first exceeds 450 at n = 50 (y = 460); x = 910 stays on screen
        let mut state = calm_state(1200.0, 450.0);
        throw(&mut state, 100.0);

        let deferred = fly_out(&mut state).unwrap();
        assert_eq!(state.phase, Phase::Missed);
        assert_eq!(state.flight_ticks, 50);
        assert_eq!(state.disc.pos.x, 910.0);
        assert_eq!(state.disc.pos.y, 460.0);
        assert_eq!(state.made, 0);
        assert_eq!(deferred.delay_ms, 1000);
        assert_eq!(
            deferred.action,
            DeferredAction::Recover { epoch: state.epoch }
        );

        apply(&mut state, Command::Fire(deferred.action));
        assert_eq!(state.phase, Phase::Ready);
    }

    #[test]
    fn test_rising_disc_cannot_score() {
        let mut state = calm_state(800.0, 450.0);
        state.phase = Phase::Flying;
        state.disc.active = true;
        // Inside the band after the move, still rising after gravity
        state.disc.pos = Vec2::new(670.0, 370.0);
        state.disc.vel = Vec2::new(0.0, -5.0);
        step(&mut state);
        assert_eq!(state.disc.pos, Vec2::new(670.0, 365.0));
        assert_eq!(state.phase, Phase::Flying);
    }

    #[test]
    fn test_off_screen_below_in_basket_column_misses() {
        let mut state = calm_state(800.0, 450.0);
        state.phase = Phase::Flying;
        state.disc.active = true;
        state.disc.pos = Vec2::new(680.0, 445.0);
        state.disc.vel = Vec2::new(0.0, 10.0);

        assert!(step(&mut state).is_some());
        assert_eq!(state.phase, Phase::Missed);
        assert_eq!(state.made, 0);
    }

    #[test]
    fn test_score_takes_priority_over_miss() {
        let mut config = crate::TossConfig::default();
        config.physics.catch_margin_below = 200.0;
        let mut state = GameState::with_config(config, 5);
        state.set_positions(800.0, 450.0);
        state.wind = 0.0;
        state.phase = Phase::Flying;
        state.disc.active = true;
        state.disc.pos = Vec2::new(680.0, 445.0);
        state.disc.vel = Vec2::new(0.0, 10.0);

        assert!(step(&mut state).is_none());
        assert!(is_off_screen(&state));
        assert_eq!(state.phase, Phase::Scored);
        assert_eq!(state.made, 1);
    }

    #[test]
    fn test_side_exits_miss() {
        let mut state = calm_state(800.0, 450.0);
        state.phase = Phase::Flying;
        state.disc.active = true;
        state.disc.pos = Vec2::new(-45.0, 100.0);
        state.disc.vel = Vec2::new(-10.0, 0.0);
        step(&mut state);
        assert_eq!(state.phase, Phase::Missed);

        let mut state = calm_state(800.0, 450.0);
        state.phase = Phase::Flying;
        state.disc.active = true;
        state.disc.pos = Vec2::new(845.0, 100.0);
        state.disc.vel = Vec2::new(10.0, 0.0);
        step(&mut state);
        assert_eq!(state.phase, Phase::Missed);
    }

    #[test]
    fn test_headwind_slows_disc() {
        let mut calm = calm_state(1200.0, 450.0);
        throw(&mut calm, 50.0);
        let mut windy = calm_state(1200.0, 450.0);
        windy.wind = -3.0;
        throw(&mut windy, 50.0);

        for _ in 0..10 {
            step(&mut calm);
            step(&mut windy);
        }
        assert!(windy.disc.pos.x < calm.disc.pos.x);
        assert_eq!(windy.disc.pos.y, calm.disc.pos.y);
    }

    #[test]
    fn test_reset_mid_flight() {
        let mut state = calm_state(800.0, 450.0);
        throw(&mut state, 80.0);
        step(&mut state);
        step(&mut state);

        apply(&mut state, Command::Reset);
        assert_eq!(state.phase, Phase::Ready);
        assert!(!state.disc.active);
        assert!(state.disc.trail.is_empty());
        assert_eq!(state.disc.pos, state.throw_origin());
        assert_eq!(state.attempts, 1);
        assert_eq!(state.made, 0);
        assert!(step(&mut state).is_none());
    }

    #[test]
    fn test_reset_after_score_hides_win() {
        let mut state = calm_state(850.0, 450.0);
        throw(&mut state, 100.0);
        fly_out(&mut state);
        assert!(state.win_visible);

        state.drain_events();
        apply(&mut state, Command::Reset);
        assert!(!state.win_visible);
        assert_eq!(state.made, 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::WinMessage { visible: false }));
    }

    #[test]
    fn test_scored_phase_ignores_input() {
        let mut state = calm_state(850.0, 450.0);
        throw(&mut state, 100.0);
        fly_out(&mut state);

        apply(&mut state, Command::PressStart);
        assert!(apply(&mut state, Command::PressEnd).is_none());
        assert_eq!(state.phase, Phase::Scored);
        assert_eq!(state.attempts, 1);
    }

    #[test]
    fn test_resize_mid_flight_keeps_disc() {
        let mut state = calm_state(800.0, 450.0);
        throw(&mut state, 100.0);
        step(&mut state);
        let pos = state.disc.pos;

        apply(
            &mut state,
            Command::Resize {
                width: 640.0,
                height: 360.0,
            },
        );
        assert_eq!(state.disc.pos, pos);
        assert_eq!(state.phase, Phase::Flying);
    }

    /// Ops for the random command sequences below
    fn command_strategy() -> impl Strategy<Value = u8> {
        0u8..6
    }

    proptest! {
        #[test]
        fn prop_launch_velocity_in_range(power in 0.0f32..=100.0) {
            let v = launch_velocity(&PhysicsConfig::default(), power);
            prop_assert!(v.x >= 9.0 && v.x <= 15.0);
            prop_assert!(v.y >= -8.0 && v.y <= -5.0);
        }

        #[test]
        fn prop_power_never_exceeds_max(ticks in 0usize..400) {
            let mut state = calm_state(800.0, 450.0);
            apply(&mut state, Command::PressStart);
            for _ in 0..ticks {
                step(&mut state);
                prop_assert!(state.power <= 100.0);
                prop_assert!(state.power >= 0.0);
            }
        }

        #[test]
        fn prop_trail_is_bounded(power in 0.0f32..=100.0, wind in -3.0f32..=3.0) {
            let mut state = calm_state(1200.0, 450.0);
            state.wind = wind;
            throw(&mut state, power);
            while state.phase == Phase::Flying {
                step(&mut state);
                prop_assert!(state.disc.trail.len() <= 15);
            }
        }

        #[test]
        fn prop_invariants_hold(
            ops in proptest::collection::vec(command_strategy(), 0..300),
            seed in any::<u64>(),
        ) {
            let mut state = GameState::new(seed);
            state.set_positions(800.0, 450.0);
            let mut pending: Vec<Deferred> = Vec::new();

            for op in ops {
                let command = match op {
                    0 | 1 => Command::Tick,
                    2 => Command::PressStart,
                    3 => Command::PressEnd,
                    4 if !pending.is_empty() => Command::Fire(pending.remove(0).action),
                    4 => Command::Tick,
                    _ => Command::Reset,
                };
                if let Some(deferred) = apply(&mut state, command) {
                    pending.push(deferred);
                }

                prop_assert!(state.made <= state.attempts);
                prop_assert_eq!(state.phase == Phase::Flying, state.disc.active);
                prop_assert!(state.power >= 0.0 && state.power <= 100.0);
                prop_assert!(state.disc.trail.len() <= 15);
            }
        }
    }
}
