//! WebAssembly bindings for the Forest Trail engine.
//!
//! This module exposes a game session to JavaScript through wasm-bindgen.
//! The page drives the clock by calling `advance` from its animation loop.

use wasm_bindgen::prelude::*;

use crate::actions::GameEvent;
use crate::bot::{Bot, BotDifficulty};
use crate::challenge::Answer;
use crate::config::GameConfig;
use crate::game::{GameError, GameSession};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn events_json(events: &[GameEvent]) -> String {
    serde_json::to_string(events).unwrap_or_else(|_| "[]".to_string())
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    session: GameSession,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a session sitting in the menu
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            session: GameSession::new(),
        }
    }

    /// Start a game from a JSON `GameConfig`
    #[wasm_bindgen(js_name = startGame)]
    pub fn start_game(&mut self, config_json: &str) -> Result<String, JsValue> {
        let config: GameConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        self.session
            .start_game(config)
            .map(|events| events_json(&events))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self) -> Result<String, JsValue> {
        self.session
            .roll_dice()
            .map(|events| events_json(&events))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = nextTurn)]
    pub fn next_turn(&mut self) -> Result<String, JsValue> {
        self.session
            .next_turn()
            .map(|events| events_json(&events))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = closeChallenge)]
    pub fn close_challenge(&mut self) -> String {
        events_json(&self.session.close_challenge())
    }

    #[wasm_bindgen(js_name = completeChallenge)]
    pub fn complete_challenge(&mut self, success: bool) -> String {
        events_json(&self.session.complete_challenge(success))
    }

    /// Check a JSON `Answer` against the active challenge
    #[wasm_bindgen(js_name = submitAnswer)]
    pub fn submit_answer(&mut self, answer_json: &str) -> Result<String, JsValue> {
        let answer: Answer = serde_json::from_str(answer_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid answer: {}", e)))?;
        self.session
            .submit_answer(&answer)
            .map(|events| events_json(&events))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = resetGame)]
    pub fn reset_game(&mut self) -> Result<String, JsValue> {
        self.session
            .reset_game()
            .map(|events| events_json(&events))
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = resetToMenu)]
    pub fn reset_to_menu(&mut self) -> String {
        events_json(&self.session.reset_to_menu())
    }

    /// Let `ms` milliseconds pass; returns the events that fired
    pub fn advance(&mut self, ms: u32) -> String {
        events_json(&self.session.advance(ms as u64))
    }

    /// Get the current snapshot as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Let a bot answer the active challenge (for hints); JSON `Answer`
    #[wasm_bindgen(js_name = getBotAnswer)]
    pub fn get_bot_answer(&self, difficulty: &str) -> String {
        let Some(challenge) = self.session.current_challenge() else {
            return "null".to_string();
        };
        let difficulty = BotDifficulty::from_name(difficulty).unwrap_or(BotDifficulty::Medium);
        let player = self.session.current_player().map(|p| p.id).unwrap_or_default();
        let answer = Bot::new(player, difficulty).answer(challenge);
        serde_json::to_string(&answer).unwrap_or_else(|_| "null".to_string())
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
