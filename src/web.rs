//! Browser bindings
//!
//! JS owns the canvas and the frame loop; it forwards keyboard/pointer events
//! and reads back JSON views of the HUD, the active panel and the sprites.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::sim::{Player, Shield};
use crate::ui::Sprite;
use crate::{App, Scene, Tuning};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Meteor Dodge starting...");
}

/// Sprites to draw this frame
#[derive(Serialize)]
struct Frame<'a> {
    player: &'a Player,
    shield: Option<&'a Shield>,
    sprites: Vec<Sprite>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Serialization failed: {e}");
        String::from("null")
    })
}

#[wasm_bindgen]
pub struct WebGame {
    app: App,
}

#[wasm_bindgen]
impl WebGame {
    /// Optional JSON tuning overrides; invalid tuning is reported to JS
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);
        Ok(WebGame {
            app: App::new(tuning, seed),
        })
    }

    /// Advance by one animation frame; returns the raised events as JSON
    pub fn update(&mut self, dt_ms: f64) -> String {
        let events = self.app.update(dt_ms);
        to_json(&events)
    }

    /// Forward keydown/keyup; arrow keys are swallowed
    pub fn handle_key(&mut self, event: &web_sys::KeyboardEvent, pressed: bool) -> bool {
        let handled = self.app.key(&event.code(), pressed);
        if handled {
            event.prevent_default();
        }
        handled
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.app.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.app.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.app.pointer_up(x, y);
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.app.input.autopilot = on;
        log::info!("Autopilot: {}", on);
    }

    pub fn score(&self) -> f64 {
        self.app.score() as f64
    }

    pub fn scene(&self) -> String {
        match self.app.scene {
            Scene::Login => "login",
            Scene::MainMenu => "menu",
            Scene::Playing => "playing",
        }
        .to_string()
    }

    pub fn hud_json(&self) -> String {
        to_json(&self.app.hud())
    }

    pub fn panel_json(&self) -> String {
        to_json(&self.app.active_panel())
    }

    pub fn frame_json(&self) -> String {
        match self.app.game.as_ref() {
            Some(game) => to_json(&Frame {
                player: &game.player,
                shield: game.powerups.bubble.as_ref(),
                sprites: self.app.sprites(),
            }),
            None => String::from("null"),
        }
    }
}
