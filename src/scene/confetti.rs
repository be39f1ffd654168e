//! Landing confetti: a timed series of particle bursts.

use glam::DVec2;

use super::{Color, DrawCommand, DrawList, Entity, Viewport};
use crate::config::SceneConfig;

/// Physics constants are per 16 ms frame; updates scale by elapsed time.
const FRAME_MS: f64 = 16.0;
const GRAVITY: f64 = 0.3;
const AIR_DRAG: f64 = 0.99;
const FADE_START_MS: f64 = 2_000.0;
const FADE_MS: f64 = 1_000.0;
/// Burst locations may sit this far outside the canvas.
const BURST_MARGIN: f64 = 200.0;
const BURST_SPREAD: f64 = 150.0;

const PALETTE: [Color; 12] = [
    Color::rgb(0xFF, 0x6B, 0x6B),
    Color::rgb(0x4E, 0xCD, 0xC4),
    Color::rgb(0x45, 0xB7, 0xD1),
    Color::rgb(0xFF, 0xA0, 0x7A),
    Color::rgb(0x98, 0xD8, 0xC8),
    Color::rgb(0xF7, 0xDC, 0x6F),
    Color::rgb(0xBB, 0x8F, 0xCE),
    Color::rgb(0x85, 0xC1, 0xE2),
    Color::rgb(0xF8, 0xB7, 0x39),
    Color::rgb(0x52, 0xB7, 0x88),
    Color::rgb(0xE6, 0x39, 0x46),
    Color::rgb(0xA8, 0xDA, 0xDC),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfettiShape {
    Square,
    Circle,
    Strip,
}

#[derive(Debug, Clone)]
pub struct ConfettiParticle {
    pos: DVec2,
    vel: DVec2,
    size: f64,
    shape: ConfettiShape,
    color: Color,
    rotation: f64,
    spin: f64,
    opacity: f64,
    age_ms: f64,
}

impl ConfettiParticle {
    fn new(pos: DVec2, rng: &mut fastrand::Rng) -> Self {
        let shape = match rng.u8(0..3) {
            0 => ConfettiShape::Square,
            1 => ConfettiShape::Circle,
            _ => ConfettiShape::Strip,
        };
        Self {
            pos,
            vel: DVec2::new((rng.f64() - 0.5) * 6.0, -rng.f64() * 10.0 - 5.0),
            size: rng.f64() * 8.0 + 4.0,
            shape,
            color: PALETTE[rng.usize(0..PALETTE.len())],
            rotation: rng.f64() * std::f64::consts::TAU,
            spin: (rng.f64() - 0.5) * 0.2,
            opacity: 1.0,
            age_ms: 0.0,
        }
    }

    fn update(&mut self, dt_ms: f64, width: f64) {
        let frames = dt_ms / FRAME_MS;
        self.vel.x *= AIR_DRAG.powf(frames);
        self.vel.y += GRAVITY * frames;
        self.pos += self.vel * frames;
        self.rotation += self.spin * frames;

        self.age_ms += dt_ms;
        if self.age_ms > FADE_START_MS {
            self.opacity = (1.0 - (self.age_ms - FADE_START_MS) / FADE_MS).max(0.0);
        }

        if self.pos.x < 0.0 || self.pos.x > width {
            self.vel.x *= -0.5;
            self.pos.x = self.pos.x.clamp(0.0, width);
        }
    }
}

impl Entity for ConfettiParticle {
    fn is_alive(&self, viewport: &Viewport) -> bool {
        self.opacity > 0.0 && self.pos.y < viewport.height + 100.0
    }
}

#[derive(Debug, Default)]
pub struct ConfettiBurstController {
    particles: Vec<ConfettiParticle>,
    active: bool,
    burst_timer: f64,
    bursts_fired: u32,
    burst_locations: Vec<DVec2>,
}

impl ConfettiBurstController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the opening burst at `origin` and line up the scheduled bursts.
    pub fn activate(
        &mut self,
        origin: DVec2,
        viewport: &Viewport,
        config: &SceneConfig,
        rng: &mut fastrand::Rng,
    ) {
        self.reset();
        self.active = true;
        self.burst_locations = (0..config.confetti_bursts)
            .map(|_| {
                DVec2::new(
                    -BURST_MARGIN + rng.f64() * (viewport.width + 2.0 * BURST_MARGIN),
                    -BURST_MARGIN + rng.f64() * (viewport.height + 2.0 * BURST_MARGIN),
                )
            })
            .collect();
        self.burst(origin, rng);
    }

    /// 40 to 60 particles around one point.
    fn burst(&mut self, at: DVec2, rng: &mut fastrand::Rng) {
        let count = 40 + rng.usize(0..=20);
        self.particles.extend((0..count).map(|_| {
            let pos = DVec2::new(at.x + (rng.f64() - 0.5) * BURST_SPREAD, at.y);
            ConfettiParticle::new(pos, rng)
        }));
    }

    pub fn update(
        &mut self,
        dt_ms: f64,
        viewport: &Viewport,
        config: &SceneConfig,
        rng: &mut fastrand::Rng,
    ) {
        if !self.active {
            return;
        }

        if self.bursts_fired < config.confetti_bursts {
            self.burst_timer += dt_ms;
            if self.burst_timer >= config.confetti_burst_interval_ms {
                let at = self
                    .burst_locations
                    .get(self.bursts_fired as usize)
                    .copied()
                    .unwrap_or_else(|| viewport.center());
                self.burst(at, rng);
                self.burst_timer = 0.0;
                self.bursts_fired += 1;
            }
        }

        for particle in &mut self.particles {
            particle.update(dt_ms, viewport.width);
        }
        self.particles.retain(|p| p.is_alive(viewport));

        if self.bursts_fired >= config.confetti_bursts && self.particles.is_empty() {
            self.active = false;
            log::debug!("confetti finished");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn bursts_fired(&self) -> u32 {
        self.bursts_fired
    }

    pub fn draw(&self, out: &mut DrawList) {
        if !self.active {
            return;
        }
        for p in self.particles.iter().filter(|p| p.opacity > 0.0) {
            out.push(DrawCommand::Confetti {
                pos: p.pos,
                size: p.size,
                rotation: p.rotation,
                shape: p.shape,
                color: p.color,
                opacity: p.opacity,
            });
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.particles.clear();
        self.burst_timer = 0.0;
        self.bursts_fired = 0;
        self.burst_locations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_fades_after_two_seconds() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut p = ConfettiParticle::new(DVec2::new(100.0, 100.0), &mut rng);
        p.update(1_900.0, 800.0);
        assert_eq!(p.opacity, 1.0);
        p.age_ms = 2_400.0;
        p.update(100.0, 800.0);
        assert!((p.opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn particles_bounce_off_the_sides() {
        let mut rng = fastrand::Rng::with_seed(11);
        let mut p = ConfettiParticle::new(DVec2::new(1.0, 100.0), &mut rng);
        p.vel = DVec2::new(-4.0, 0.0);
        p.update(16.0, 800.0);
        assert_eq!(p.pos.x, 0.0);
        assert!(p.vel.x > 0.0);
    }

    #[test]
    fn activation_bursts_at_origin() {
        let vp = Viewport::new(800.0, 600.0);
        let mut rng = fastrand::Rng::with_seed(2);
        let mut confetti = ConfettiBurstController::new();
        confetti.activate(DVec2::new(400.0, 300.0), &vp, &SceneConfig::default(), &mut rng);
        assert!(confetti.is_active());
        assert!((40..=60).contains(&confetti.particle_count()));
    }

    #[test]
    fn runs_its_burst_budget_then_deactivates() {
        let vp = Viewport::new(800.0, 600.0);
        let cfg = SceneConfig::default();
        let mut rng = fastrand::Rng::with_seed(2);
        let mut confetti = ConfettiBurstController::new();
        confetti.activate(vp.center(), &vp, &cfg, &mut rng);

        let mut elapsed = 0.0;
        while confetti.is_active() {
            confetti.update(16.0, &vp, &cfg, &mut rng);
            elapsed += 16.0;
            assert!(elapsed < 20_000.0, "confetti never finished");
        }
        assert_eq!(confetti.bursts_fired(), 40);
        assert_eq!(confetti.particle_count(), 0);
        // Forty bursts at 150 ms spacing take at least six seconds.
        assert!(elapsed >= 40.0 * 150.0);
    }
}
