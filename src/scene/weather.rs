//! Rain and snow with a timed fade-in whenever the weather changes.

use glam::DVec2;

use super::{DrawCommand, DrawList, Entity, Viewport};
use crate::config::SceneConfig;

const FRAME_MS: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeatherMode {
    Clear,
    Rain,
    Snow,
}

impl WeatherMode {
    pub const ALL: [WeatherMode; 3] = [WeatherMode::Clear, WeatherMode::Rain, WeatherMode::Snow];

    /// Particle density target.
    pub fn cap(self) -> usize {
        match self {
            WeatherMode::Clear => 0,
            WeatherMode::Rain => 100,
            WeatherMode::Snow => 80,
        }
    }

    fn spawn_chance(self) -> f64 {
        match self {
            WeatherMode::Clear => 0.0,
            WeatherMode::Rain => 0.3,
            WeatherMode::Snow => 0.2,
        }
    }

    fn seed_count(self) -> usize {
        match self {
            WeatherMode::Clear => 0,
            WeatherMode::Rain => 50,
            WeatherMode::Snow => 40,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WeatherMode::Clear => "clear",
            WeatherMode::Rain => "rain",
            WeatherMode::Snow => "snow",
        }
    }
}

#[derive(Debug, Clone)]
pub enum WeatherParticle {
    Raindrop { pos: DVec2, speed: f64, length: f64, opacity: f64 },
    Snowflake { pos: DVec2, speed: f64, radius: f64, opacity: f64, drift: f64, wobble: f64 },
}

impl WeatherParticle {
    fn raindrop(pos: DVec2, rng: &mut fastrand::Rng) -> Self {
        WeatherParticle::Raindrop {
            pos,
            speed: 8.0 + rng.f64() * 4.0,
            length: 10.0 + rng.f64() * 10.0,
            opacity: 0.3 + rng.f64() * 0.3,
        }
    }

    fn snowflake(pos: DVec2, rng: &mut fastrand::Rng) -> Self {
        WeatherParticle::Snowflake {
            pos,
            speed: 1.0 + rng.f64() * 2.0,
            radius: 2.0 + rng.f64() * 3.0,
            opacity: 0.5 + rng.f64() * 0.5,
            drift: rng.f64() * 0.5 - 0.25,
            wobble: rng.f64() * std::f64::consts::TAU,
        }
    }

    fn spawn(mode: WeatherMode, pos: DVec2, rng: &mut fastrand::Rng) -> Option<Self> {
        match mode {
            WeatherMode::Clear => None,
            WeatherMode::Rain => Some(Self::raindrop(pos, rng)),
            WeatherMode::Snow => Some(Self::snowflake(pos, rng)),
        }
    }

    pub fn pos(&self) -> DVec2 {
        match self {
            WeatherParticle::Raindrop { pos, .. } | WeatherParticle::Snowflake { pos, .. } => *pos,
        }
    }

    /// Falls and wraps back to the top once below the canvas.
    fn update(&mut self, dt_ms: f64, height: f64) {
        let frames = dt_ms / FRAME_MS;
        match self {
            WeatherParticle::Raindrop { pos, speed, length, .. } => {
                pos.y += *speed * frames;
                if pos.y > height {
                    pos.y = -*length;
                }
            }
            WeatherParticle::Snowflake { pos, speed, radius, drift, wobble, .. } => {
                pos.y += *speed * frames;
                *wobble += 0.05 * frames;
                pos.x += wobble.sin() * *drift * frames;
                if pos.y > height {
                    pos.y = -*radius;
                }
            }
        }
    }

    fn draw(&self, fade: f64, out: &mut DrawList) {
        match *self {
            WeatherParticle::Raindrop { pos, length, opacity, .. } => {
                out.push(DrawCommand::Raindrop { pos, length, opacity: opacity * fade });
            }
            WeatherParticle::Snowflake { pos, radius, opacity, .. } => {
                out.push(DrawCommand::Snowflake { pos, radius, opacity: opacity * fade });
            }
        }
    }
}

impl Entity for WeatherParticle {
    fn is_alive(&self, viewport: &Viewport) -> bool {
        self.pos().y < viewport.height + 50.0
    }
}

#[derive(Debug)]
pub struct WeatherController {
    mode: WeatherMode,
    particles: Vec<WeatherParticle>,
    /// 0 right after a change, 1 once the new weather is fully faded in.
    transition: f64,
    change_timer: f64,
}

impl Default for WeatherController {
    fn default() -> Self {
        Self { mode: WeatherMode::Clear, particles: Vec::new(), transition: 1.0, change_timer: 0.0 }
    }
}

impl WeatherController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> WeatherMode {
        self.mode
    }

    pub fn opacity(&self) -> f64 {
        self.transition
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition < 1.0
    }

    pub fn particles(&self) -> &[WeatherParticle] {
        &self.particles
    }

    /// Switch weather: the old particles are dropped, the new set seeded across
    /// the canvas, and the fade restarts. Ignored while a fade is running or
    /// when the mode is unchanged. Returns whether a switch happened.
    pub fn set_mode(&mut self, mode: WeatherMode, viewport: &Viewport, rng: &mut fastrand::Rng) -> bool {
        if mode == self.mode || self.is_transitioning() {
            return false;
        }
        log::debug!("weather {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
        self.transition = 0.0;
        self.particles.clear();
        for _ in 0..mode.seed_count() {
            let pos = DVec2::new(rng.f64() * viewport.width, rng.f64() * viewport.height);
            self.particles.extend(WeatherParticle::spawn(mode, pos, rng));
        }
        true
    }

    /// Returns the new mode when an automatic change happened this frame.
    pub fn update(
        &mut self,
        dt_ms: f64,
        viewport: &Viewport,
        config: &SceneConfig,
        rng: &mut fastrand::Rng,
    ) -> Option<WeatherMode> {
        if self.is_transitioning() {
            self.transition = (self.transition + dt_ms / config.weather_transition_ms.max(1.0)).min(1.0);
        }

        let mut changed = None;
        if config.auto_weather {
            self.change_timer += dt_ms;
            if self.change_timer >= config.weather_change_interval_ms {
                self.change_timer = 0.0;
                let next = WeatherMode::ALL[rng.usize(0..WeatherMode::ALL.len())];
                if self.set_mode(next, viewport, rng) {
                    changed = Some(next);
                }
            }
        }

        for particle in &mut self.particles {
            particle.update(dt_ms, viewport.height);
        }

        if self.particles.len() < self.mode.cap() && rng.f64() < self.mode.spawn_chance() {
            let y = if self.mode == WeatherMode::Rain { -20.0 } else { -10.0 };
            let pos = DVec2::new(rng.f64() * viewport.width, y);
            self.particles.extend(WeatherParticle::spawn(self.mode, pos, rng));
        }

        self.particles.retain(|p| p.is_alive(viewport));
        changed
    }

    pub fn draw(&self, out: &mut DrawList) {
        for particle in &self.particles {
            particle.draw(self.transition, out);
        }
    }
}
