//! Scene orchestration: one instance of every visual subsystem, advanced and
//! drawn once per animation frame.
//!
//! The scene never touches a canvas. [`Scene::update`] advances state by the
//! elapsed frame time and reports what happened as [`SceneEvent`]s;
//! [`Scene::draw`] returns a back-to-front [`DrawList`] that the host renders.

pub mod antagonist;
pub mod background;
pub mod confetti;
pub mod followers;
pub mod food;
pub mod player;
pub mod weather;

use glam::DVec2;

use crate::config::SceneConfig;
use crate::score::ScoreBoard;
use crate::storage::ScoreStore;

use antagonist::AntagonistSpawner;
use background::Background;
use confetti::{ConfettiBurstController, ConfettiShape};
use followers::FollowerGroupController;
use food::{FoodKind, FoodSpawner};
use player::{Parachute, Player, PlayerInput};
use weather::{WeatherController, WeatherMode};

pub const LANDING_TITLE: &str = "Time's Up!";
pub const LANDING_SUBTITLE: &str = "The kiwi has landed!";

// --- Shared types --------------------------------------------------------------

/// Drawable area in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_css(self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
    }
}

/// Hermite step from 0 at `edge0` to 1 at `edge1`.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Whether an entity stays in its manager's collection after an update.
pub trait Entity {
    fn is_alive(&self, viewport: &Viewport) -> bool;
}

/// Paint order, back to front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Sky,
    Clouds,
    Weather,
    Food,
    Antagonists,
    Parachute,
    Followers,
    Player,
    Confetti,
    LandingMessage,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Sky { top: Color, bottom: Color },
    Cloud { pos: DVec2, scale: f64, alpha: f64 },
    Raindrop { pos: DVec2, length: f64, opacity: f64 },
    Snowflake { pos: DVec2, radius: f64, opacity: f64 },
    Food { pos: DVec2, radius: f64, kind: FoodKind },
    Antagonist { pos: DVec2, facing_left: bool, flap: f64, carrying: Option<FoodKind> },
    Parachute { anchor: DVec2, billow: f64, billow_phase: f64, collapse: f64 },
    Follower { pos: DVec2, radius: f64, facing_left: bool, rotation: f64, color: Color },
    Player { pos: DVec2, radius: f64, rotation: f64 },
    Confetti {
        pos: DVec2,
        size: f64,
        rotation: f64,
        shape: ConfettiShape,
        color: Color,
        opacity: f64,
    },
    LandingMessage { center: DVec2, alpha: f64 },
}

impl DrawCommand {
    pub fn layer(&self) -> Layer {
        match self {
            DrawCommand::Sky { .. } => Layer::Sky,
            DrawCommand::Cloud { .. } => Layer::Clouds,
            DrawCommand::Raindrop { .. } | DrawCommand::Snowflake { .. } => Layer::Weather,
            DrawCommand::Food { .. } => Layer::Food,
            DrawCommand::Antagonist { .. } => Layer::Antagonists,
            DrawCommand::Parachute { .. } => Layer::Parachute,
            DrawCommand::Follower { .. } => Layer::Followers,
            DrawCommand::Player { .. } => Layer::Player,
            DrawCommand::Confetti { .. } => Layer::Confetti,
            DrawCommand::LandingMessage { .. } => Layer::LandingMessage,
        }
    }
}

pub type DrawList = Vec<DrawCommand>;

/// Something that happened during one update, for sound or UI hooks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEvent {
    FoodCollected { kind: FoodKind, points: u32 },
    FoodStolen(FoodKind),
    NewHighScore(u32),
    Landed,
    WeatherChanged(WeatherMode),
}

/// Countdown progress as the scene sees it for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    pub percent_complete: f64,
    pub total_duration_ms: f64,
    pub is_complete: bool,
}

impl FrameClock {
    /// No countdown: the scene idles as decoration.
    pub const IDLE: FrameClock =
        FrameClock { percent_complete: 0.0, total_duration_ms: 0.0, is_complete: false };
}

#[derive(Debug, Default, Clone, Copy)]
struct LandingState {
    is_landing: bool,
    message_alpha: f64,
    elapsed_ms: f64,
}

// --- Scene ---------------------------------------------------------------------

pub struct Scene {
    viewport: Viewport,
    config: SceneConfig,
    rng: fastrand::Rng,
    background: Background,
    weather: WeatherController,
    food: FoodSpawner,
    antagonists: AntagonistSpawner,
    player: Player,
    parachute: Parachute,
    confetti: ConfettiBurstController,
    followers: FollowerGroupController,
    score: ScoreBoard,
    landing: LandingState,
}

impl Scene {
    pub fn new(viewport: Viewport, config: SceneConfig, store: Box<dyn ScoreStore>, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let background = Background::new(&viewport, &config, &mut rng);
        let food = FoodSpawner::new(&viewport, &config, &mut rng);
        Self {
            viewport,
            background,
            weather: WeatherController::new(),
            food,
            antagonists: AntagonistSpawner::new(),
            player: Player::new(&viewport),
            parachute: Parachute::new(),
            confetti: ConfettiBurstController::new(),
            followers: FollowerGroupController::new(),
            score: ScoreBoard::new(store),
            landing: LandingState::default(),
            config,
            rng,
        }
    }

    /// Start a fresh run: new food, a new kiwi under a new parachute, antagonists on.
    pub fn begin_countdown(&mut self) {
        self.restart();
        self.antagonists.activate();
        log::info!("scene: countdown run started");
    }

    /// Back to an idle run. Sky, clouds and weather carry on; everything tied to
    /// the countdown run is rebuilt. The high score is kept.
    pub fn restart(&mut self) {
        self.food.reset(&self.viewport, &self.config, &mut self.rng);
        self.antagonists.reset();
        self.player = Player::new(&self.viewport);
        self.parachute = Parachute::new();
        self.confetti.reset();
        self.followers.reset();
        self.score.reset();
        self.landing = LandingState::default();
    }

    /// Advance everything by `dt_ms`.
    ///
    /// Within a frame, food moves first, then the player collects, then the
    /// antagonists act. A bird finishing a steal on food the player touched in
    /// the same frame finds it already collected and leaves empty-handed.
    pub fn update(&mut self, dt_ms: f64, clock: FrameClock, input: PlayerInput) -> Vec<SceneEvent> {
        let dt_ms = dt_ms.max(0.0);
        let mut events = Vec::new();

        let rise = self.background.update(dt_ms, clock.total_duration_ms, &self.viewport, &self.config);
        if let Some(mode) = self.weather.update(dt_ms, &self.viewport, &self.config, &mut self.rng) {
            events.push(SceneEvent::WeatherChanged(mode));
        }
        self.player.update(dt_ms, input, &self.viewport);
        self.parachute.update(dt_ms);
        self.food.update(dt_ms, rise, &self.viewport, &self.config, &mut self.rng);

        self.collect_food(&mut events);

        if !clock.is_complete {
            let stolen = self.antagonists.update(
                dt_ms,
                clock.percent_complete,
                &mut self.food,
                &self.viewport,
                &self.config,
                &mut self.rng,
            );
            for kind in stolen {
                self.score.increment_stolen();
                events.push(SceneEvent::FoodStolen(kind));
            }
        }

        if clock.is_complete && !self.landing.is_landing {
            self.start_landing();
            events.push(SceneEvent::Landed);
        }
        if self.landing.is_landing {
            self.update_landing(dt_ms);
        }

        self.confetti.update(dt_ms, &self.viewport, &self.config, &mut self.rng);
        events
    }

    fn collect_food(&mut self, events: &mut Vec<SceneEvent>) {
        let kinds = self.food.collect_touching(self.player.pos(), self.player.radius());
        if kinds.is_empty() {
            return;
        }
        let mut total = 0;
        for kind in kinds {
            let points = kind.points();
            total += points;
            events.push(SceneEvent::FoodCollected { kind, points });
        }
        if self.score.add_points(total) {
            events.push(SceneEvent::NewHighScore(self.score.high()));
        }
    }

    fn start_landing(&mut self) {
        log::info!("scene: landing (score {}, stolen {})", self.score.current(), self.score.stolen());
        self.landing = LandingState { is_landing: true, message_alpha: 0.0, elapsed_ms: 0.0 };
        self.player.land();
        self.parachute.collapse();
        self.antagonists.deactivate();
        self.confetti.activate(self.player.pos(), &self.viewport, &self.config, &mut self.rng);
    }

    fn update_landing(&mut self, dt_ms: f64) {
        self.landing.elapsed_ms += dt_ms;
        self.landing.message_alpha =
            (self.landing.message_alpha + dt_ms * self.config.landing_fade_rate).min(1.0);
        if !self.followers.is_active() && self.landing.elapsed_ms >= self.config.follower_spawn_delay_ms {
            self.followers.spawn_formation(self.player.pos(), &mut self.rng);
        }
        self.followers.update(dt_ms);
    }

    /// Back-to-front draw list for the current state.
    pub fn draw(&self) -> DrawList {
        let mut out = DrawList::new();
        self.background.draw(&self.viewport, &mut out);
        self.weather.draw(&mut out);
        self.food.draw(&mut out);
        self.antagonists.draw(&mut out);
        self.parachute.draw(self.player.attachment_point(), &mut out);
        self.followers.draw(&mut out);
        self.player.draw(&mut out);
        self.confetti.draw(&mut out);
        if self.landing.is_landing && self.landing.message_alpha > 0.0 {
            out.push(DrawCommand::LandingMessage {
                center: self.viewport.center(),
                alpha: self.landing.message_alpha,
            });
        }
        out
    }

    /// One host tick: update, then draw.
    pub fn frame(&mut self, dt_ms: f64, clock: FrameClock, input: PlayerInput) -> (Vec<SceneEvent>, DrawList) {
        let events = self.update(dt_ms, clock, input);
        (events, self.draw())
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.player.resize(&viewport);
    }

    /// Manual weather switch. Returns `false` while a cross-fade is running.
    pub fn set_weather(&mut self, mode: WeatherMode) -> bool {
        self.weather.set_mode(mode, &self.viewport, &mut self.rng)
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn is_landing(&self) -> bool {
        self.landing.is_landing
    }

    pub fn message_alpha(&self) -> f64 {
        self.landing.message_alpha
    }

    /// Time since landing began.
    pub fn landing_elapsed_ms(&self) -> f64 {
        self.landing.elapsed_ms
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn weather(&self) -> &WeatherController {
        &self.weather
    }

    pub fn food(&self) -> &FoodSpawner {
        &self.food
    }

    pub fn antagonists(&self) -> &AntagonistSpawner {
        &self.antagonists
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn parachute(&self) -> &Parachute {
        &self.parachute
    }

    pub fn confetti(&self) -> &ConfettiBurstController {
        &self.confetti
    }

    pub fn followers(&self) -> &FollowerGroupController {
        &self.followers
    }
}
