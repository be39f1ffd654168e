//! Sky with a day/night cycle, world scroll offset and the parallax cloud field.

use glam::DVec2;

use super::{Color, DrawCommand, DrawList, Viewport, smoothstep};
use crate::config::SceneConfig;

/// Clouds wrap this far outside the canvas.
const CLOUD_WRAP_MARGIN: f64 = 100.0;

/// (scale, horizontal speed px/s, vertical parallax factor), far to near.
const CLOUD_LAYERS: [(f64, f64, f64); 5] = [
    (0.6, 10.0, 0.15),
    (0.8, 15.0, 0.3),
    (1.0, 20.0, 0.45),
    (1.15, 26.0, 0.6),
    (1.3, 32.0, 0.75),
];

const DAY_HOURS_PER_PHASE: f64 = 24.0;

#[derive(Debug, Clone)]
pub struct Cloud {
    /// `y` is the cloud's home height before vertical scroll is applied.
    pos: DVec2,
    scale: f64,
    speed: f64,
    parallax: f64,
}

impl Cloud {
    fn update(&mut self, dt_ms: f64, width: f64, speed_multiplier: f64) {
        self.pos.x += self.speed * speed_multiplier * dt_ms / 1000.0;
        if self.pos.x > width + CLOUD_WRAP_MARGIN {
            self.pos.x = -CLOUD_WRAP_MARGIN;
        }
    }

    /// On-screen position for the given world scroll. Clouds drift upward at
    /// their layer's parallax rate and wrap back in from below.
    pub fn screen_pos(&self, scroll_offset: f64, viewport: &Viewport) -> DVec2 {
        let span = viewport.height + 2.0 * CLOUD_WRAP_MARGIN;
        let y = (self.pos.y - scroll_offset * self.parallax + CLOUD_WRAP_MARGIN).rem_euclid(span)
            - CLOUD_WRAP_MARGIN;
        DVec2::new(self.pos.x, y)
    }

    pub fn parallax(&self) -> f64 {
        self.parallax
    }
}

/// Slower multi-day countdowns get lazier clouds.
fn cloud_speed_multiplier(total_duration_ms: f64) -> f64 {
    if total_duration_ms > 86_400_000.0 {
        0.3
    } else if total_duration_ms > 3_600_000.0 {
        0.6
    } else {
        1.0
    }
}

/// Fixed set of clouds, ordered back to front.
#[derive(Debug, Clone)]
pub struct CloudField {
    clouds: Vec<Cloud>,
}

impl CloudField {
    pub fn new(count: usize, viewport: &Viewport, rng: &mut fastrand::Rng) -> Self {
        let mut clouds: Vec<Cloud> = (0..count)
            .map(|i| {
                let (scale, speed, parallax) = CLOUD_LAYERS[i % CLOUD_LAYERS.len()];
                // Small jitter so no two clouds share a depth.
                let jitter = 1.0 + (i / CLOUD_LAYERS.len()) as f64 * 0.01;
                let x = viewport.width / count.max(1) as f64 * i as f64 + rng.f64() * 100.0;
                let y = rng.f64() * (viewport.height + 2.0 * CLOUD_WRAP_MARGIN) - CLOUD_WRAP_MARGIN;
                Cloud {
                    pos: DVec2::new(x, y),
                    scale: scale * jitter,
                    speed: speed * jitter,
                    parallax: parallax * jitter,
                }
            })
            .collect();
        clouds.sort_by(|a, b| a.parallax.total_cmp(&b.parallax));
        Self { clouds }
    }

    pub fn update(&mut self, dt_ms: f64, width: f64, total_duration_ms: f64) {
        let mult = cloud_speed_multiplier(total_duration_ms);
        for cloud in &mut self.clouds {
            cloud.update(dt_ms, width, mult);
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }
}

// --- Day / night ---------------------------------------------------------------

/// Sky gradient (top, bottom) keyed by hour of a virtual day.
fn sky_colors(hour: f64) -> (Color, Color) {
    const NIGHT: (Color, Color) = (Color::rgb(12, 20, 48), Color::rgb(40, 52, 92));
    const DAWN: (Color, Color) = (Color::rgb(255, 170, 120), Color::rgb(255, 220, 180));
    const DAY: (Color, Color) = (Color::rgb(135, 206, 235), Color::rgb(224, 242, 247));
    const DUSK: (Color, Color) = (Color::rgb(250, 128, 90), Color::rgb(255, 196, 150));

    let mix = |a: (Color, Color), b: (Color, Color), t: f64| (a.0.lerp(b.0, t), a.1.lerp(b.1, t));
    if hour < 5.0 {
        NIGHT
    } else if hour < 7.0 {
        mix(NIGHT, DAWN, smoothstep(5.0, 7.0, hour))
    } else if hour < 9.0 {
        mix(DAWN, DAY, smoothstep(7.0, 9.0, hour))
    } else if hour < 17.0 {
        DAY
    } else if hour < 19.0 {
        mix(DAY, DUSK, smoothstep(17.0, 19.0, hour))
    } else if hour < 21.0 {
        mix(DUSK, NIGHT, smoothstep(19.0, 21.0, hour))
    } else {
        NIGHT
    }
}

/// 1 at full day, 0.35 at night. Dims the clouds.
fn daylight(hour: f64) -> f64 {
    let rise = smoothstep(5.0, 8.0, hour);
    let set = 1.0 - smoothstep(18.0, 21.0, hour);
    0.35 + 0.65 * rise.min(set)
}

#[derive(Debug, Clone)]
pub struct Background {
    scroll_offset: f64,
    /// Fraction of a virtual day, wrapping at 1. Starts mid-morning.
    day_phase: f64,
    clouds: CloudField,
}

impl Background {
    pub fn new(viewport: &Viewport, config: &SceneConfig, rng: &mut fastrand::Rng) -> Self {
        Self {
            scroll_offset: 0.0,
            day_phase: 10.0 / DAY_HOURS_PER_PHASE,
            clouds: CloudField::new(config.cloud_count, viewport, rng),
        }
    }

    /// Advance scroll and day phase. Returns the scroll step applied this frame,
    /// which the food layer rides on.
    pub fn update(
        &mut self,
        dt_ms: f64,
        total_duration_ms: f64,
        viewport: &Viewport,
        config: &SceneConfig,
    ) -> f64 {
        let step = (config.scroll_rate * dt_ms).clamp(0.0, config.max_scroll_step);
        self.scroll_offset += step;
        self.day_phase = (self.day_phase + config.day_night_rate * dt_ms).rem_euclid(1.0);
        self.clouds.update(dt_ms, viewport.width, total_duration_ms);
        step
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn day_phase(&self) -> f64 {
        self.day_phase
    }

    pub fn clouds(&self) -> &CloudField {
        &self.clouds
    }

    pub fn draw(&self, viewport: &Viewport, out: &mut DrawList) {
        let hour = self.day_phase * DAY_HOURS_PER_PHASE;
        let (top, bottom) = sky_colors(hour);
        out.push(DrawCommand::Sky { top, bottom });
        let alpha = 0.8 * daylight(hour);
        for cloud in self.clouds.clouds() {
            out.push(DrawCommand::Cloud {
                pos: cloud.screen_pos(self.scroll_offset, viewport),
                scale: cloud.scale,
                alpha,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn clouds_are_layered_back_to_front_at_distinct_depths() {
        let mut rng = fastrand::Rng::with_seed(7);
        let field = CloudField::new(30, &viewport(), &mut rng);
        assert_eq!(field.clouds().len(), 30);
        for pair in field.clouds().windows(2) {
            assert!(pair[0].parallax() < pair[1].parallax());
        }
    }

    #[test]
    fn clouds_wrap_horizontally() {
        let mut cloud = Cloud { pos: DVec2::new(899.0, 50.0), scale: 1.0, speed: 20.0, parallax: 0.5 };
        cloud.update(100.0, 800.0, 1.0);
        assert_eq!(cloud.pos.x, -CLOUD_WRAP_MARGIN);
    }

    #[test]
    fn long_countdowns_slow_the_clouds() {
        assert_eq!(cloud_speed_multiplier(60_000.0), 1.0);
        assert_eq!(cloud_speed_multiplier(2.0 * 3_600_000.0), 0.6);
        assert_eq!(cloud_speed_multiplier(3.0 * 86_400_000.0), 0.3);
    }

    #[test]
    fn vertical_scroll_stays_within_wrap_band() {
        let vp = viewport();
        let cloud = Cloud { pos: DVec2::new(10.0, 20.0), scale: 1.0, speed: 0.0, parallax: 0.7 };
        for offset in [0.0, 123.0, 5_000.0, 1e6] {
            let y = cloud.screen_pos(offset, &vp).y;
            assert!((-CLOUD_WRAP_MARGIN..vp.height + CLOUD_WRAP_MARGIN).contains(&y), "{y}");
        }
    }

    #[test]
    fn scroll_step_is_capped_and_day_phase_wraps() {
        let vp = viewport();
        let cfg = SceneConfig { day_night_rate: 0.001, ..SceneConfig::default() };
        let mut rng = fastrand::Rng::with_seed(1);
        let mut bg = Background::new(&vp, &cfg, &mut rng);
        let step = bg.update(10_000.0, 0.0, &vp, &cfg);
        assert_eq!(step, cfg.max_scroll_step);
        assert!((0.0..1.0).contains(&bg.day_phase()));
    }

    #[test]
    fn night_sky_is_darker_than_day() {
        let (night_top, _) = sky_colors(2.0);
        let (day_top, _) = sky_colors(12.0);
        assert!(night_top.b < day_top.b);
        assert!(daylight(2.0) < daylight(12.0));
    }
}
