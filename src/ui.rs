//! HUD, overlay panels and scene flow
//!
//! Nothing here draws: the host reads [`Hud`] and the active [`Panel`] each
//! frame and feeds pointer/keyboard events back in.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::powerup::{self, ExclusiveEffect};
use crate::sim::{BonusKind, GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scene {
    Login,
    MainMenu,
    Playing,
}

/// What a button does when clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Play,
    Retry,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ButtonState {
    #[default]
    Idle,
    Pressed,
}

/// Axis-aligned screen rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// Rounded button with pointer feedback
#[derive(Debug, Clone, Serialize)]
pub struct Button {
    pub label: &'static str,
    pub rect: Rect,
    pub corner_radius: f32,
    pub state: ButtonState,
    /// Current fill, follows `state`
    pub fill: u32,
    pub action: ButtonAction,
}

impl Button {
    pub const WIDTH: f32 = 4.5 * 50.0;
    pub const HEIGHT: f32 = 2.0 * 50.0;
    const IDLE_COLOR: u32 = 0x387155;
    const PRESSED_COLOR: u32 = 0x60BFB8;

    pub fn centered(label: &'static str, cx: f32, cy: f32, action: ButtonAction) -> Self {
        Self {
            label,
            rect: Rect {
                x: cx - Self::WIDTH / 2.0,
                y: cy - Self::HEIGHT / 2.0,
                w: Self::WIDTH,
                h: Self::HEIGHT,
            },
            corner_radius: 10.0,
            state: ButtonState::Idle,
            fill: Self::IDLE_COLOR,
            action,
        }
    }

    pub fn fill_color(&self) -> u32 {
        match self.state {
            ButtonState::Idle => Self::IDLE_COLOR,
            ButtonState::Pressed => Self::PRESSED_COLOR,
        }
    }

    fn set_state(&mut self, state: ButtonState) {
        self.state = state;
        self.fill = self.fill_color();
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.rect.contains(x, y) {
            self.set_state(ButtonState::Pressed);
        }
    }

    /// Leaving the button cancels the press highlight
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.rect.contains(x, y) {
            self.set_state(ButtonState::Idle);
        }
    }

    /// Release over the button clicks it
    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<ButtonAction> {
        self.set_state(ButtonState::Idle);
        self.rect.contains(x, y).then_some(self.action)
    }
}

/// Modal panel with a title, optional text and buttons
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub title: &'static str,
    pub body: Option<String>,
    pub rect: Rect,
    pub background: u32,
    pub buttons: Vec<Button>,
}

impl Panel {
    const RECT: Rect = Rect {
        x: 100.0,
        y: 150.0,
        w: 600.0,
        h: 300.0,
    };

    fn with_buttons(title: &'static str, body: Option<String>, buttons: &[(&'static str, ButtonAction)]) -> Self {
        let rect = Self::RECT;
        let cy = rect.y + 0.7 * rect.h;
        let n = buttons.len() as f32;
        let buttons = buttons
            .iter()
            .enumerate()
            .map(|(i, &(label, action))| {
                let cx = rect.x + rect.w * (i as f32 + 0.5) / n;
                Button::centered(label, cx, cy, action)
            })
            .collect();
        Self {
            title,
            body,
            rect,
            background: 0xFFF092,
            buttons,
        }
    }

    pub fn login() -> Self {
        Self::with_buttons(
            "LOGIN",
            None,
            &[("Play", ButtonAction::Play), ("Menu", ButtonAction::Menu)],
        )
    }

    pub fn main_menu() -> Self {
        Self::with_buttons("METEOR DODGE", None, &[("Play", ButtonAction::Play)])
    }

    pub fn results(score: u64) -> Self {
        Self::with_buttons(
            "GAME OVER",
            Some(format!("Score: {score}")),
            &[("Retry", ButtonAction::Retry), ("Menu", ButtonAction::Menu)],
        )
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        for button in &mut self.buttons {
            button.pointer_down(x, y);
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        for button in &mut self.buttons {
            button.pointer_move(x, y);
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> Option<ButtonAction> {
        let mut clicked = None;
        for button in &mut self.buttons {
            if let Some(action) = button.pointer_up(x, y) {
                clicked = Some(action);
            }
        }
        clicked
    }
}

/// Shrinking bar showing time left on a timed power-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressBar {
    /// Outline
    pub frame: Rect,
    /// Green fill, shrinking toward the right edge
    pub fill: Rect,
    pub fill_color: u32,
    pub stroke_color: u32,
}

impl ProgressBar {
    const START_X: f32 = 650.0;
    const END_X: f32 = 750.0;
    const Y: f32 = 20.0;
    const HEIGHT: f32 = 20.0;
    pub const FILL_COLOR: u32 = 0x00ff00;
    pub const STROKE_COLOR: u32 = 0x000000;

    /// Bar for an effect started at `started_ms`; None once it has run out
    pub fn at(started_ms: f64, now_ms: f64) -> Option<Self> {
        let progress = ((now_ms - started_ms) / PROGRESS_BAR_MS).max(0.0);
        if progress > 1.0 {
            return None;
        }
        let current_x = Self::START_X + (Self::END_X - Self::START_X) * progress as f32;
        Some(Self {
            frame: Rect {
                x: Self::START_X,
                y: Self::Y,
                w: Self::END_X - Self::START_X,
                h: Self::HEIGHT,
            },
            fill: Rect {
                x: current_x,
                y: Self::Y,
                w: Self::END_X - current_x,
                h: Self::HEIGHT,
            },
            fill_color: Self::FILL_COLOR,
            stroke_color: Self::STROKE_COLOR,
        })
    }
}

/// Everything the HUD shows this frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score_text: String,
    pub score_visible: bool,
    pub progress: Option<ProgressBar>,
    /// Timed effect running and the time it has left
    pub effect: Option<BonusKind>,
    pub effect_remaining_ms: Option<f64>,
    /// Reverse-clock animation after a slow-time pickup
    pub slow_time_clock: bool,
    pub player_tint: Option<u32>,
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let effect = state.powerups.exclusive;
        let progress = effect.and_then(|e| ProgressBar::at(e.started_ms(), state.now_ms));
        let slow_time_clock = matches!(
            effect,
            Some(ExclusiveEffect::SlowTime { started_ms, .. })
                if state.now_ms - started_ms < SLOW_TIME_ANIMATION_MS
        );
        Self {
            score_text: format!("Score: {}", state.session.score),
            score_visible: !state.session.results_shown,
            progress,
            effect: state.powerups.active_effect(),
            effect_remaining_ms: powerup::remaining_ms(state),
            slow_time_clock,
            player_tint: state.player.tint.color(),
        }
    }
}

/// A meteor or bonus as the renderer draws it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    pub id: u32,
    pub texture: &'static str,
    pub pos: Vec2,
    pub half_extents: Vec2,
}

impl Sprite {
    pub fn collect(state: &GameState) -> Vec<Sprite> {
        state
            .entities
            .iter()
            .filter(|e| e.active)
            .map(|e| Sprite {
                id: e.id,
                texture: e.texture(),
                pos: e.pos,
                half_extents: e.half_extents,
            })
            .collect()
    }
}

/// Scene flow around a play session
#[derive(Debug)]
pub struct App {
    pub scene: Scene,
    pub tuning: Tuning,
    pub game: Option<GameState>,
    /// Results overlay over the finished session
    pub overlay: Option<Panel>,
    pub input: TickInput,
    menu: Panel,
    login: Panel,
    seeds: Pcg32,
    accumulator: f64,
}

impl App {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            scene: Scene::Login,
            tuning,
            game: None,
            overlay: None,
            input: TickInput::default(),
            menu: Panel::main_menu(),
            login: Panel::login(),
            seeds: Pcg32::seed_from_u64(seed),
            accumulator: 0.0,
        }
    }

    /// Panel receiving pointer events, if any
    pub fn active_panel(&self) -> Option<&Panel> {
        match self.scene {
            Scene::Login => Some(&self.login),
            Scene::MainMenu => Some(&self.menu),
            Scene::Playing => self.overlay.as_ref(),
        }
    }

    fn active_panel_mut(&mut self) -> Option<&mut Panel> {
        match self.scene {
            Scene::Login => Some(&mut self.login),
            Scene::MainMenu => Some(&mut self.menu),
            Scene::Playing => self.overlay.as_mut(),
        }
    }

    pub fn start_game(&mut self) {
        let seed: u64 = self.seeds.random();
        self.game = Some(GameState::new(seed, self.tuning.clone()));
        self.overlay = None;
        self.accumulator = 0.0;
        self.input = TickInput {
            autopilot: self.input.autopilot,
            ..Default::default()
        };
        self.scene = Scene::Playing;
    }

    fn close_results(&mut self) {
        if self.overlay.take().is_some() {
            log::debug!("Results overlay closed");
        }
    }

    fn end_session(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.teardown();
        }
    }

    /// Results overlay "Retry": close it, then start a fresh session
    pub fn on_retry(&mut self) {
        if self.overlay.is_none() {
            log::debug!("Retry ignored: no results overlay");
            return;
        }
        self.close_results();
        self.end_session();
        self.start_game();
    }

    /// Results overlay "Menu": close it, then leave the session
    pub fn on_return_to_menu(&mut self) {
        self.close_results();
        self.end_session();
        self.scene = Scene::MainMenu;
    }

    fn dispatch(&mut self, action: ButtonAction) {
        log::debug!("{:?} clicked in {:?}", action, self.scene);
        match (self.scene, action) {
            (Scene::Login | Scene::MainMenu, ButtonAction::Play) => self.start_game(),
            (Scene::Login, ButtonAction::Menu) => self.scene = Scene::MainMenu,
            (Scene::Playing, ButtonAction::Retry) => self.on_retry(),
            (Scene::Playing, ButtonAction::Menu) => self.on_return_to_menu(),
            _ => {}
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if let Some(panel) = self.active_panel_mut() {
            panel.pointer_down(x, y);
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(panel) = self.active_panel_mut() {
            panel.pointer_move(x, y);
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        let action = self.active_panel_mut().and_then(|p| p.pointer_up(x, y));
        if let Some(action) = action {
            self.dispatch(action);
        }
    }

    /// Arrow keys steer; returns true if the key was handled
    pub fn key(&mut self, code: &str, pressed: bool) -> bool {
        match code {
            "ArrowLeft" => self.input.left = pressed,
            "ArrowRight" => self.input.right = pressed,
            _ => return false,
        }
        true
    }

    /// Run fixed simulation steps for a frame and return the events they raised
    pub fn update(&mut self, frame_dt_ms: f64) -> Vec<GameEvent> {
        let Some(game) = self.game.as_mut() else {
            return Vec::new();
        };
        self.accumulator += frame_dt_ms.min(100.0);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            tick(game, &self.input, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }

        let events = game.drain_events();
        for event in &events {
            if let GameEvent::GameOver { score } = *event {
                self.overlay = Some(Panel::results(score));
            }
        }
        events
    }

    pub fn hud(&self) -> Option<Hud> {
        self.game.as_ref().map(Hud::from_state)
    }

    pub fn sprites(&self) -> Vec<Sprite> {
        self.game.as_ref().map(Sprite::collect).unwrap_or_default()
    }

    pub fn score(&self) -> u64 {
        self.game.as_ref().map_or(0, |g| g.session.score)
    }
}
