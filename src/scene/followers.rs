//! Landing celebration: a formation of kiwi friends pops up and dances.

use glam::DVec2;

use super::{Color, DrawCommand, DrawList};

const ENTRY_MS: f64 = 400.0;
/// Followers rise from this far below their resting spot.
const ENTRY_DROP: f64 = 200.0;
const FOLLOWER_RADIUS: f64 = 22.0;

/// (horizontal offset from the player, appearance delay in seconds).
const FORMATION: [(f64, f64); 6] = [
    (-250.0, 0.35),
    (-150.0, 0.40),
    (-70.0, 0.45),
    (70.0, 0.45),
    (150.0, 0.50),
    (250.0, 0.55),
];

const PLUMAGE: [Color; 4] = [
    Color::rgb(0xA0, 0x52, 0x2D),
    Color::rgb(0x8B, 0x69, 0x14),
    Color::rgb(0xCD, 0x85, 0x3F),
    Color::rgb(0xD2, 0x69, 0x1E),
];

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone)]
pub struct FollowerCharacter {
    home: DVec2,
    y: f64,
    /// Seconds after the formation is created.
    delay: f64,
    facing_left: bool,
    visible: bool,
    entry_progress: f64,
    dance_time: f64,
    color: Color,
}

impl FollowerCharacter {
    fn new(home: DVec2, delay: f64, facing_left: bool, color: Color) -> Self {
        Self {
            home,
            y: home.y + ENTRY_DROP,
            delay,
            facing_left,
            visible: false,
            entry_progress: 0.0,
            dance_time: 0.0,
            color,
        }
    }

    fn update(&mut self, dt_ms: f64, elapsed_ms: f64) {
        if elapsed_ms < self.delay * 1000.0 {
            return;
        }
        self.visible = true;

        if self.entry_progress < 1.0 {
            self.entry_progress = (self.entry_progress + dt_ms / ENTRY_MS).min(1.0);
            self.y = self.home.y + ENTRY_DROP * (1.0 - ease_out_cubic(self.entry_progress));
        } else {
            self.dance_time += dt_ms;
            self.y = self.home.y + (self.dance_time * 0.014 + self.delay * 3.0).sin() * 12.0;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn pos(&self) -> DVec2 {
        DVec2::new(self.home.x, self.y)
    }

    pub fn home(&self) -> DVec2 {
        self.home
    }

    fn wiggle(&self) -> f64 {
        (self.dance_time * 0.016 + self.delay * 2.0).sin() * 0.2
    }
}

#[derive(Debug, Default)]
pub struct FollowerGroupController {
    followers: Vec<FollowerCharacter>,
    elapsed_ms: f64,
    active: bool,
}

impl FollowerGroupController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line up the formation around the landed player, everyone facing inward.
    pub fn spawn_formation(&mut self, player_pos: DVec2, rng: &mut fastrand::Rng) {
        self.followers = FORMATION
            .iter()
            .map(|&(dx, delay)| {
                let color = PLUMAGE[rng.usize(0..PLUMAGE.len())];
                FollowerCharacter::new(player_pos + DVec2::new(dx, 0.0), delay, dx > 0.0, color)
            })
            .collect();
        self.elapsed_ms = 0.0;
        self.active = true;
    }

    pub fn update(&mut self, dt_ms: f64) {
        if !self.active {
            return;
        }
        self.elapsed_ms += dt_ms;
        for follower in &mut self.followers {
            follower.update(dt_ms, self.elapsed_ms);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn followers(&self) -> &[FollowerCharacter] {
        &self.followers
    }

    pub fn draw(&self, out: &mut DrawList) {
        for f in self.followers.iter().filter(|f| f.visible) {
            out.push(DrawCommand::Follower {
                pos: f.pos(),
                radius: FOLLOWER_RADIUS,
                facing_left: f.facing_left,
                rotation: f.wiggle(),
                color: f.color,
            });
        }
    }

    pub fn reset(&mut self) {
        self.followers.clear();
        self.elapsed_ms = 0.0;
        self.active = false;
    }
}
