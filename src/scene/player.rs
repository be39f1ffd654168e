//! The parachuting kiwi and its parachute.

use glam::DVec2;

use super::{DrawCommand, DrawList, Viewport};

pub const BODY_RADIUS: f64 = 25.0;
const MOVE_SPEED: f64 = 0.3;
/// Keeps the kiwi this far from either edge.
const EDGE_PADDING: f64 = 50.0;
const SWAY_SPEED: f64 = 0.002;
const SWAY_AMPLITUDE: f64 = 15.0;
const MAX_TILT: f64 = 0.05;
const LANDING_MS: f64 = 1_000.0;
/// Share of the landing spent on the bounce.
const BOUNCE_SHARE: f64 = 0.3;
const BOUNCE_HEIGHT: f64 = 10.0;

/// Held steering buttons, from the keyboard or a pointer on either canvas half.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
}

impl PlayerInput {
    pub const NONE: PlayerInput = PlayerInput { left: false, right: false };

    /// Pointer steering: pressing left of centre steers left, otherwise right.
    pub fn from_pointer(x: f64, canvas_width: f64) -> Self {
        if x < canvas_width / 2.0 {
            PlayerInput { left: true, right: false }
        } else {
            PlayerInput { left: false, right: true }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    center: DVec2,
    user_offset: f64,
    pos: DVec2,
    sway_phase: f64,
    rotation: f64,
    landed: bool,
    landing_progress: f64,
    bounce: f64,
}

impl Player {
    pub fn new(viewport: &Viewport) -> Self {
        let center = viewport.center();
        Self {
            center,
            user_offset: 0.0,
            pos: center,
            sway_phase: 0.0,
            rotation: 0.0,
            landed: false,
            landing_progress: 0.0,
            bounce: 0.0,
        }
    }

    pub fn update(&mut self, dt_ms: f64, input: PlayerInput, viewport: &Viewport) {
        if self.landed {
            self.update_landing(dt_ms);
            return;
        }

        if input.left {
            self.user_offset -= MOVE_SPEED * dt_ms;
        }
        if input.right {
            self.user_offset += MOVE_SPEED * dt_ms;
        }
        let max_offset = (viewport.width / 2.0 - EDGE_PADDING).max(0.0);
        self.user_offset = self.user_offset.clamp(-max_offset, max_offset);

        self.sway_phase += SWAY_SPEED * dt_ms;
        let sway = self.sway_phase.sin() * SWAY_AMPLITUDE;
        self.pos = DVec2::new(self.center.x + self.user_offset + sway, self.center.y);
        self.rotation = self.sway_phase.sin() * MAX_TILT;
    }

    fn update_landing(&mut self, dt_ms: f64) {
        if self.landing_progress >= 1.0 {
            return;
        }
        self.landing_progress = (self.landing_progress + dt_ms / LANDING_MS).min(1.0);
        self.bounce = if self.landing_progress < BOUNCE_SHARE {
            let t = self.landing_progress / BOUNCE_SHARE;
            -(t * std::f64::consts::PI).sin() * BOUNCE_HEIGHT
        } else {
            0.0
        };
    }

    /// Freeze at the centre of the canvas and start the landing bounce.
    pub fn land(&mut self) {
        self.landed = true;
        self.landing_progress = 0.0;
        self.user_offset = 0.0;
        self.rotation = 0.0;
        self.pos = self.center;
    }

    pub fn is_landed(&self) -> bool {
        self.landed
    }

    /// Collision centre. Ignores the cosmetic bounce.
    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    pub fn radius(&self) -> f64 {
        BODY_RADIUS
    }

    /// Where the parachute lines meet the kiwi.
    pub fn attachment_point(&self) -> DVec2 {
        DVec2::new(self.pos.x, self.pos.y - BODY_RADIUS * 1.2 - 10.0 + self.bounce)
    }

    pub fn resize(&mut self, viewport: &Viewport) {
        self.center = viewport.center();
        let max_offset = (viewport.width / 2.0 - EDGE_PADDING).max(0.0);
        self.user_offset = self.user_offset.clamp(-max_offset, max_offset);
        if self.landed {
            self.pos = self.center;
        } else {
            self.pos.y = self.center.y;
        }
    }

    pub fn draw(&self, out: &mut DrawList) {
        out.push(DrawCommand::Player {
            pos: self.pos + DVec2::new(0.0, self.bounce),
            radius: BODY_RADIUS,
            rotation: self.rotation,
        });
    }
}

const BILLOW_SPEED: f64 = 0.003;
const BILLOW_AMPLITUDE: f64 = 5.0;
const COLLAPSE_MS: f64 = 1_000.0;

#[derive(Debug, Clone, Default)]
pub struct Parachute {
    billow_phase: f64,
    collapsed: bool,
    collapse_progress: f64,
}

impl Parachute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, dt_ms: f64) {
        self.billow_phase += BILLOW_SPEED * dt_ms;
        if self.collapsed && self.collapse_progress < 1.0 {
            self.collapse_progress = (self.collapse_progress + dt_ms / COLLAPSE_MS).min(1.0);
        }
    }

    pub fn collapse(&mut self) {
        self.collapsed = true;
        self.collapse_progress = 0.0;
    }

    pub fn collapse_progress(&self) -> f64 {
        self.collapse_progress
    }

    pub fn is_visible(&self) -> bool {
        self.collapse_progress < 1.0
    }

    pub fn draw(&self, anchor: DVec2, out: &mut DrawList) {
        if !self.is_visible() {
            return;
        }
        out.push(DrawCommand::Parachute {
            anchor,
            billow: self.billow_phase.sin() * BILLOW_AMPLITUDE,
            billow_phase: self.billow_phase,
            collapse: self.collapse_progress,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn steering_is_clamped_to_the_edges() {
        let mut player = Player::new(&vp());
        let left = PlayerInput { left: true, right: false };
        for _ in 0..1_000 {
            player.update(16.0, left, &vp());
        }
        // Offset clamps at -(400 - 50); sway adds at most 15 px.
        assert!(player.pos().x >= 400.0 - 350.0 - SWAY_AMPLITUDE - 1e-9);
        assert!(player.pos().x <= 400.0 - 350.0 + SWAY_AMPLITUDE + 1e-9);
        assert_eq!(player.pos().y, 300.0);
    }

    #[test]
    fn pointer_halves_pick_direction() {
        assert_eq!(PlayerInput::from_pointer(10.0, 800.0), PlayerInput { left: true, right: false });
        assert_eq!(PlayerInput::from_pointer(400.0, 800.0), PlayerInput { left: false, right: true });
    }

    #[test]
    fn landing_freezes_at_centre_and_bounces_once() {
        let mut player = Player::new(&vp());
        player.update(500.0, PlayerInput { left: false, right: true }, &vp());
        player.land();
        assert_eq!(player.pos(), vp().center());

        player.update(150.0, PlayerInput { left: true, right: false }, &vp());
        assert_eq!(player.pos(), vp().center());
        assert!(player.attachment_point().y < 300.0 - BODY_RADIUS * 1.2 - 10.0);

        player.update(1_000.0, PlayerInput::NONE, &vp());
        assert_eq!(player.attachment_point().y, 300.0 - BODY_RADIUS * 1.2 - 10.0);
    }

    #[test]
    fn parachute_disappears_after_collapse() {
        let mut chute = Parachute::new();
        let mut out = DrawList::new();
        chute.draw(DVec2::ZERO, &mut out);
        assert_eq!(out.len(), 1);

        chute.collapse();
        chute.update(600.0);
        assert!(chute.is_visible());
        chute.update(600.0);
        assert!(!chute.is_visible());
        out.clear();
        chute.draw(DVec2::ZERO, &mut out);
        assert!(out.is_empty());
    }
}
