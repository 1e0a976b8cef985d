//! Browser facade
//!
//! The page owns rendering and keyboard wiring; it forwards decoded intents
//! here and calls `frame()` from its animation loop to get a JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::Millis;
use crate::sim::{Command, GameState, Intent, TickInput, advance};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Office Bomber core loaded");
}

fn now_ms() -> Millis {
    js_sys::Date::now() as Millis
}

/// One game instance bound to the page
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    input: TickInput,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebGame {
        WebGame {
            state: GameState::with_defaults(seed),
            input: TickInput::default(),
        }
    }

    /// Start button on the title screen
    pub fn start(&mut self) {
        self.input.command = Some(Command::Start);
    }

    /// Play-again button
    pub fn reset(&mut self) {
        self.input.command = Some(Command::Reset);
    }

    /// Queue an intent ("up", "down", "left", "right", "bomb")
    pub fn intent(&mut self, name: &str) -> Result<(), JsValue> {
        let intent: Intent = name.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.input.intents.push(intent);
        Ok(())
    }

    /// Advance to the current time and return the snapshot as JSON
    pub fn frame(&mut self) -> Result<String, JsValue> {
        let now = now_ms();
        advance(&mut self.state, &self.input, now);
        self.input.clear();
        self.state
            .snapshot(now)
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
