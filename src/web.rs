//! Browser bindings
//!
//! The page's JavaScript owns the canvas, the DOM and the animation frame
//! loop. It forwards pointer events and ticks here, reads back a JSON
//! snapshot to draw, and drains UI events to update counters and banners.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::TossConfig;
use crate::sim::{Command, Deferred, GameState, apply};
use crate::story::{Story, StoryEngine};

/// Install the panic hook and console logger once per page
fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Disc Toss starting...");
    }
}

fn to_js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Shared handle to the page's game
#[wasm_bindgen]
pub struct DiscToss {
    state: Rc<RefCell<GameState>>,
}

#[wasm_bindgen]
impl DiscToss {
    #[wasm_bindgen(constructor)]
    pub fn new() -> DiscToss {
        init_logging();
        let seed = js_sys::Date::now() as u64;
        let state = GameState::with_config(TossConfig::load(), seed);
        log::info!("Game initialized with seed: {}", seed);
        DiscToss {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Canvas size changed
    pub fn resize(&self, width: f32, height: f32) {
        self.dispatch(Command::Resize { width, height });
    }

    /// Mouse down / touch start
    #[wasm_bindgen(js_name = pressStart)]
    pub fn press_start(&self) {
        self.dispatch(Command::PressStart);
    }

    /// Mouse up / touch end
    #[wasm_bindgen(js_name = pressEnd)]
    pub fn press_end(&self) {
        self.dispatch(Command::PressEnd);
    }

    /// Call once per animation frame, before drawing
    pub fn update(&self) {
        self.dispatch(Command::Tick);
    }

    /// Play-again button
    pub fn reset(&self) {
        self.dispatch(Command::Reset);
    }

    /// Current state as JSON for the renderer
    pub fn snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&*self.state.borrow()).map_err(to_js_err)
    }

    /// Pending UI events as a JSON array, oldest first
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&self) -> Result<String, JsValue> {
        let events = self.state.borrow_mut().drain_events();
        serde_json::to_string(&events).map_err(to_js_err)
    }

    /// Active tuning as JSON
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> String {
        self.state.borrow().config.to_json()
    }

    /// Validate and persist a tuning config; it applies from the next page load
    #[wasm_bindgen(js_name = saveConfig)]
    pub fn save_config(&self, json: &str) -> Result<(), JsValue> {
        let config = TossConfig::from_json(json).map_err(to_js_err)?;
        config.save();
        Ok(())
    }

    /// Wind arrow for the HUD
    #[wasm_bindgen(js_name = windArrow)]
    pub fn wind_arrow(&self) -> String {
        self.state.borrow().wind_band().arrow().to_string()
    }
}

impl DiscToss {
    fn dispatch(&self, command: Command) {
        let deferred = apply(&mut self.state.borrow_mut(), command);
        if let Some(deferred) = deferred {
            schedule(self.state.clone(), deferred);
        }
    }
}

impl Default for DiscToss {
    fn default() -> Self {
        Self::new()
    }
}

/// Fire `deferred` through `setTimeout`. Each callback borrows the state only
/// for the duration of its own call.
fn schedule(state: Rc<RefCell<GameState>>, deferred: Deferred) {
    let Some(window) = web_sys::window() else {
        log::error!("No window; dropping {:?}", deferred.action);
        return;
    };
    let action = deferred.action;
    let closure = Closure::once(move || {
        let next = apply(&mut state.borrow_mut(), Command::Fire(action));
        if let Some(next) = next {
            schedule(state, next);
        }
    });
    if window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            deferred.delay_ms as i32,
        )
        .is_err()
    {
        log::error!("setTimeout failed; dropping {:?}", action);
        return;
    }
    closure.forget();
}

/// Story reader for the adventure page
#[wasm_bindgen]
pub struct StoryReader {
    engine: StoryEngine,
}

#[wasm_bindgen]
impl StoryReader {
    /// Build from the passage table JSON
    #[wasm_bindgen(constructor)]
    pub fn new(json: &str) -> Result<StoryReader, JsValue> {
        init_logging();
        let story = Story::from_json(json).map_err(to_js_err)?;
        if let Err(e) = story.validate() {
            log::warn!("Story has problems: {e}");
        }
        let engine = StoryEngine::new(story).map_err(to_js_err)?;
        Ok(StoryReader { engine })
    }

    /// Current passage as JSON
    pub fn current(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.current()).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = currentName)]
    pub fn current_name(&self) -> String {
        self.engine.current_name().to_string()
    }

    pub fn choose(&mut self, index: usize) -> Result<String, JsValue> {
        let passage = self.engine.choose(index).map_err(to_js_err)?;
        serde_json::to_string(passage).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = displayPassage)]
    pub fn display_passage(&mut self, name: &str) -> Result<String, JsValue> {
        let passage = self.engine.goto(name).map_err(to_js_err)?;
        serde_json::to_string(passage).map_err(to_js_err)
    }

    pub fn restart(&mut self) -> Result<String, JsValue> {
        let passage = self.engine.restart();
        serde_json::to_string(passage).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = isEnding)]
    pub fn is_ending(&self) -> bool {
        self.engine.is_ending()
    }

    /// Visited passage names as a JSON array
    pub fn history(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.history()).map_err(to_js_err)
    }
}
