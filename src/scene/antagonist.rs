//! Food-stealing antagonist birds.
//!
//! Each bird is a small automaton driven only by time and distance:
//! `Flying -> Stealing -> Escaping -> removed`. A bird holds its target as a
//! [`FoodId`] and looks it up again every tick, so food collected or culled by
//! someone else is noticed on the next update.

use glam::DVec2;

use super::food::{FoodId, FoodKind, FoodSpawner};
use super::{DrawCommand, DrawList, Entity, Viewport};
use crate::config::SceneConfig;

/// Birds are removed once this far past either horizontal edge.
pub const EXIT_MARGIN: f64 = 100.0;
const HOVER_HEIGHT: f64 = 20.0;
const HOVER_BOB: f64 = 5.0;
const ESCAPE_SPEEDUP: f64 = 1.5;
const ESCAPE_CLIMB: f64 = 0.3;
const FLAP_SPEED: f64 = 0.008;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AntagonistState {
    Flying,
    Stealing,
    Escaping,
}

/// What a single update of a bird produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AntagonistSignal {
    Continue,
    StoleFood(FoodKind),
    Remove,
}

#[derive(Debug, Clone)]
pub struct AntagonistBird {
    pos: DVec2,
    from_left: bool,
    state: AntagonistState,
    target: Option<FoodId>,
    carrying: Option<FoodKind>,
    steal_timer: f64,
    flap_time: f64,
    heading: f64,
    speed: f64,
    removed: bool,
}

impl AntagonistBird {
    pub fn new(pos: DVec2, from_left: bool, speed: f64) -> Self {
        Self {
            pos,
            from_left,
            state: AntagonistState::Flying,
            target: None,
            carrying: None,
            steal_timer: 0.0,
            flap_time: 0.0,
            heading: if from_left { 1.0 } else { -1.0 },
            speed,
            removed: false,
        }
    }

    /// Enter from a random side, somewhere in the upper part of the sky.
    fn spawn(viewport: &Viewport, speed: f64, rng: &mut fastrand::Rng) -> Self {
        let from_left = rng.bool();
        let x = if from_left { -EXIT_MARGIN } else { viewport.width + EXIT_MARGIN };
        let y = 100.0 + rng.f64() * (viewport.height - 300.0).max(0.0);
        Self::new(DVec2::new(x, y), from_left, speed)
    }

    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    pub fn state(&self) -> AntagonistState {
        self.state
    }

    pub fn target(&self) -> Option<FoodId> {
        self.target
    }

    pub fn carrying(&self) -> Option<FoodKind> {
        self.carrying
    }

    fn past_exit(&self, viewport: &Viewport) -> bool {
        self.pos.x < -EXIT_MARGIN || self.pos.x > viewport.width + EXIT_MARGIN
    }

    fn live_target(&self, food: &FoodSpawner) -> Option<FoodId> {
        self.target
            .filter(|id| food.get(*id).is_some_and(|item| !item.is_collected()))
    }

    pub fn update(
        &mut self,
        dt_ms: f64,
        food: &mut FoodSpawner,
        viewport: &Viewport,
        config: &SceneConfig,
    ) -> AntagonistSignal {
        self.flap_time += dt_ms;
        let signal = match self.state {
            AntagonistState::Flying => self.fly(dt_ms, food, viewport, config),
            AntagonistState::Stealing => self.steal(dt_ms, food, config),
            AntagonistState::Escaping => self.escape(dt_ms, viewport),
        };
        if signal == AntagonistSignal::Remove {
            self.removed = true;
        }
        signal
    }

    fn fly(
        &mut self,
        dt_ms: f64,
        food: &FoodSpawner,
        viewport: &Viewport,
        config: &SceneConfig,
    ) -> AntagonistSignal {
        self.target = self.live_target(food).or_else(|| food.nearest_uncollected(self.pos));

        let Some(target_pos) = self.target.and_then(|id| food.get(id)).map(|item| item.pos())
        else {
            // Nothing to steal: leave by the nearest side.
            let dir = if self.pos.x < viewport.width / 2.0 { -1.0 } else { 1.0 };
            self.heading = dir;
            self.pos.x += dir * self.speed * dt_ms;
            return if self.past_exit(viewport) {
                AntagonistSignal::Remove
            } else {
                AntagonistSignal::Continue
            };
        };

        let delta = target_pos - self.pos;
        let distance = delta.length();
        if distance < config.steal_range {
            self.state = AntagonistState::Stealing;
            self.steal_timer = 0.0;
        } else {
            let step = (self.speed * dt_ms).min(distance);
            self.pos += delta / distance * step;
            if delta.x != 0.0 {
                self.heading = delta.x.signum();
            }
        }
        AntagonistSignal::Continue
    }

    fn steal(&mut self, dt_ms: f64, food: &mut FoodSpawner, config: &SceneConfig) -> AntagonistSignal {
        let Some(item) = self.live_target(food).and_then(|id| food.get_mut(id)) else {
            // Target collected or gone mid-steal: give up empty-handed.
            self.target = None;
            self.state = AntagonistState::Escaping;
            return AntagonistSignal::Continue;
        };

        self.steal_timer += dt_ms;
        let bob = (self.steal_timer * 0.01).sin() * HOVER_BOB;
        self.pos = item.pos() + DVec2::new(0.0, -HOVER_HEIGHT + bob);

        if self.steal_timer < config.steal_duration_ms {
            return AntagonistSignal::Continue;
        }
        item.collect();
        let kind = item.kind();
        self.carrying = Some(kind);
        self.target = None;
        self.state = AntagonistState::Escaping;
        AntagonistSignal::StoleFood(kind)
    }

    /// Back out the way it came, faster and climbing.
    fn escape(&mut self, dt_ms: f64, viewport: &Viewport) -> AntagonistSignal {
        let dir = if self.from_left { -1.0 } else { 1.0 };
        self.heading = dir;
        self.pos.x += dir * self.speed * ESCAPE_SPEEDUP * dt_ms;
        self.pos.y -= self.speed * ESCAPE_CLIMB * dt_ms;
        if self.past_exit(viewport) {
            AntagonistSignal::Remove
        } else {
            AntagonistSignal::Continue
        }
    }

    fn draw(&self, out: &mut DrawList) {
        out.push(DrawCommand::Antagonist {
            pos: self.pos,
            facing_left: self.heading < 0.0,
            flap: (self.flap_time * FLAP_SPEED).sin() * 0.6,
            carrying: self.carrying,
        });
    }
}

impl Entity for AntagonistBird {
    fn is_alive(&self, _viewport: &Viewport) -> bool {
        !self.removed
    }
}

/// Spawn interval shrinks linearly from the base toward the floor as the
/// countdown progresses.
pub fn spawn_interval(percent_complete: f64, config: &SceneConfig) -> f64 {
    let base = config.antagonist_base_interval_ms;
    let floor = config.antagonist_min_interval_ms;
    (base - percent_complete.clamp(0.0, 1.0) * (base - floor)).max(floor)
}

#[derive(Debug, Default)]
pub struct AntagonistSpawner {
    birds: Vec<AntagonistBird>,
    spawn_timer: f64,
    active: bool,
}

impl AntagonistSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stop spawning and drop every bird in flight.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.birds.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the kinds stolen during this update.
    pub fn update(
        &mut self,
        dt_ms: f64,
        percent_complete: f64,
        food: &mut FoodSpawner,
        viewport: &Viewport,
        config: &SceneConfig,
        rng: &mut fastrand::Rng,
    ) -> Vec<FoodKind> {
        if !self.active {
            return Vec::new();
        }

        self.spawn_timer += dt_ms;
        if self.spawn_timer >= spawn_interval(percent_complete, config)
            && self.birds.len() < config.antagonist_cap
        {
            self.spawn_timer = 0.0;
            self.birds.push(AntagonistBird::spawn(viewport, config.antagonist_speed, rng));
            log::debug!("antagonist spawned ({} in flight)", self.birds.len());
        }

        let mut stolen = Vec::new();
        for bird in &mut self.birds {
            if let AntagonistSignal::StoleFood(kind) = bird.update(dt_ms, food, viewport, config) {
                stolen.push(kind);
            }
        }
        self.birds.retain(|bird| bird.is_alive(viewport));
        stolen
    }

    pub fn birds(&self) -> &[AntagonistBird] {
        &self.birds
    }

    pub fn draw(&self, out: &mut DrawList) {
        for bird in &self.birds {
            bird.draw(out);
        }
    }

    pub fn reset(&mut self) {
        self.birds.clear();
        self.spawn_timer = 0.0;
        self.active = false;
    }

    #[cfg(test)]
    pub(crate) fn push_for_test(&mut self, bird: AntagonistBird) {
        self.birds.push(bird);
    }
}
