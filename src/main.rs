//! Disc Toss entry point
//!
//! The game runs in the browser through the `web` bindings. Natively this
//! binary plays a scripted session headlessly and logs each throw.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use disc_toss::TossConfig;
    use disc_toss::sim::{Command, GameState, Phase, TimerQueue, apply};

    /// Roughly one display refresh
    const FRAME_MS: u64 = 16;
    const CANVAS_WIDTH: f32 = 800.0;
    const CANVAS_HEIGHT: f32 = 450.0;
    /// Frames the button is held for each scripted throw
    const HOLD_FRAMES: [u32; 6] = [10, 25, 35, 42, 50, 60];
    /// Give up on a throw that has not settled after this long
    const MAX_FRAMES_PER_THROW: u32 = 2000;

    /// Drives the game the way the page does: one tick per frame, pointer
    /// events between frames, deferred actions on a wall-clock queue.
    struct Driver {
        state: GameState,
        timers: TimerQueue,
        now_ms: u64,
    }

    impl Driver {
        fn new(config: TossConfig, seed: u64) -> Self {
            let mut driver = Self {
                state: GameState::with_config(config, seed),
                timers: TimerQueue::new(),
                now_ms: 0,
            };
            driver.send(Command::Resize {
                width: CANVAS_WIDTH,
                height: CANVAS_HEIGHT,
            });
            driver
        }

        fn send(&mut self, command: Command) {
            if let Some(deferred) = apply(&mut self.state, command) {
                self.timers.schedule(self.now_ms, deferred);
            }
        }

        fn frame(&mut self) {
            self.now_ms += FRAME_MS;
            for action in self.timers.pop_due(self.now_ms) {
                self.send(Command::Fire(action));
            }
            self.send(Command::Tick);
        }

        /// Hold for `hold_frames`, release, and run until the throw settles
        fn throw(&mut self, hold_frames: u32) -> Phase {
            self.send(Command::PressStart);
            for _ in 0..hold_frames {
                self.frame();
            }
            let power = self.state.power_percent();
            self.send(Command::PressEnd);

            for _ in 0..MAX_FRAMES_PER_THROW {
                self.frame();
                match self.state.phase {
                    Phase::Scored => {
                        self.send(Command::Reset);
                        return Phase::Scored;
                    }
                    Phase::Ready if self.timers.is_empty() => return Phase::Missed,
                    _ => {}
                }
            }
            log::warn!("Throw at {power:.0}% never settled");
            self.state.phase
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Disc Toss (native) starting...");

        let seed = std::env::args()
            .nth(1)
            .and_then(|arg| arg.parse::<u64>().ok())
            .unwrap_or(12345);
        let mut driver = Driver::new(TossConfig::load(), seed);
        log::info!(
            "Seed {seed}, wind {:.2} {}",
            driver.state.wind,
            driver.state.wind_band().arrow()
        );

        for hold in HOLD_FRAMES {
            let outcome = driver.throw(hold);
            println!(
                "hold {hold:>2} frames -> {outcome:?} ({}/{} made)",
                driver.state.made, driver.state.attempts
            );
        }

        for event in driver.state.drain_events() {
            log::debug!("{event:?}");
        }
        println!(
            "Session over: {}/{} made",
            driver.state.made, driver.state.attempts
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry points live in `disc_toss::web`, this is just to satisfy the compiler
}
