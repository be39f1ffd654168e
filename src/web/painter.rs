//! Renders a scene [`DrawList`] onto a 2D canvas context.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::scene::confetti::ConfettiShape;
use crate::scene::food::FoodKind;
use crate::scene::{Color, DrawCommand, LANDING_SUBTITLE, LANDING_TITLE, Viewport};

const KIWI_BROWN: &str = "#8B6914";
const KIWI_DARK: &str = "#5C4A1E";
const BEAK: &str = "#D9C27A";
const KEA_GREEN: &str = "#4F7942";
const KEA_WING: &str = "#E86A33";
const CANOPY: [&str; 2] = ["#FF6B6B", "#FFD93D"];

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
}

fn circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, r: f64) -> Result<(), JsValue> {
    ctx.begin_path();
    ctx.arc(x, y, r.max(0.0), 0.0, TAU)?;
    ctx.fill();
    Ok(())
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}

impl CanvasPainter {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    pub fn paint(&self, viewport: &Viewport, list: &[DrawCommand]) -> Result<(), JsValue> {
        self.ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);
        for command in list {
            self.ctx.save();
            let drawn = self.command(viewport, command);
            self.ctx.restore();
            drawn?;
        }
        Ok(())
    }

    fn command(&self, viewport: &Viewport, command: &DrawCommand) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        match *command {
            DrawCommand::Sky { top, bottom } => {
                let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, viewport.height);
                gradient.add_color_stop(0.0, &top.to_css(1.0))?;
                gradient.add_color_stop(1.0, &bottom.to_css(1.0))?;
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
            }
            DrawCommand::Cloud { pos, scale, alpha } => {
                ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {alpha})"));
                let r = 20.0 * scale;
                circle(ctx, pos.x, pos.y, r)?;
                circle(ctx, pos.x + r * 0.9, pos.y - r * 0.4, r * 0.9)?;
                circle(ctx, pos.x + r * 1.8, pos.y, r * 0.8)?;
                circle(ctx, pos.x + r * 0.9, pos.y + r * 0.2, r * 0.85)?;
            }
            DrawCommand::Raindrop { pos, length, opacity } => {
                ctx.set_stroke_style_str(&format!("rgba(174, 194, 224, {opacity})"));
                ctx.set_line_width(1.5);
                line(ctx, pos.x, pos.y, pos.x - 1.0, pos.y + length);
            }
            DrawCommand::Snowflake { pos, radius, opacity } => {
                ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {opacity})"));
                circle(ctx, pos.x, pos.y, radius)?;
            }
            DrawCommand::Food { pos, radius, kind } => self.food(pos, radius, kind)?,
            DrawCommand::Antagonist { pos, facing_left, flap, carrying } => {
                self.antagonist(pos, facing_left, flap, carrying)?
            }
            DrawCommand::Parachute { anchor, billow, billow_phase, collapse } => {
                self.parachute(anchor, billow, billow_phase, collapse)?
            }
            DrawCommand::Follower { pos, radius, facing_left, rotation, color } => {
                self.kiwi(pos, radius, if facing_left { -1.0 } else { 1.0 }, rotation, &color.to_css(1.0))?
            }
            DrawCommand::Player { pos, radius, rotation } => {
                self.kiwi(pos, radius, 1.0, rotation, KIWI_BROWN)?
            }
            DrawCommand::Confetti { pos, size, rotation, shape, color, opacity } => {
                self.confetti(pos, size, rotation, shape, color, opacity)?
            }
            DrawCommand::LandingMessage { center, alpha } => self.landing_message(center, alpha)?,
        }
        Ok(())
    }

    fn food(&self, pos: DVec2, radius: f64, kind: FoodKind) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(&kind.color().to_css(1.0));
        match kind {
            FoodKind::Berry => {
                circle(ctx, pos.x, pos.y, radius * 0.8)?;
                ctx.set_fill_style_str("rgba(255, 255, 255, 0.5)");
                circle(ctx, pos.x - radius * 0.3, pos.y - radius * 0.3, radius * 0.2)?;
            }
            FoodKind::Worm => {
                for i in 0..4 {
                    let t = i as f64 / 3.0;
                    let x = pos.x - radius + t * radius * 2.0;
                    let y = pos.y + (t * PI * 2.0).sin() * radius * 0.25;
                    circle(ctx, x, y, radius * 0.35)?;
                }
            }
            FoodKind::Fruit => {
                circle(ctx, pos.x, pos.y, radius)?;
                ctx.set_fill_style_str("#2E7D32");
                ctx.begin_path();
                ctx.ellipse(pos.x + radius * 0.3, pos.y - radius, radius * 0.4, radius * 0.2, -0.5, 0.0, TAU)?;
                ctx.fill();
            }
        }
        Ok(())
    }

    fn antagonist(
        &self,
        pos: DVec2,
        facing_left: bool,
        flap: f64,
        carrying: Option<FoodKind>,
    ) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.translate(pos.x, pos.y)?;
        if facing_left {
            ctx.scale(-1.0, 1.0)?;
        }
        ctx.set_fill_style_str(KEA_GREEN);
        ctx.begin_path();
        ctx.ellipse(0.0, 0.0, 20.0, 12.0, 0.0, 0.0, TAU)?;
        ctx.fill();
        circle(ctx, 18.0, -6.0, 8.0)?;

        ctx.save();
        ctx.rotate(flap)?;
        ctx.set_fill_style_str(KEA_WING);
        ctx.begin_path();
        ctx.ellipse(-2.0, -8.0, 14.0, 6.0, -0.4, 0.0, TAU)?;
        ctx.fill();
        ctx.restore();

        ctx.set_stroke_style_str("#3A3A3A");
        ctx.set_line_width(2.0);
        ctx.begin_path();
        ctx.move_to(25.0, -7.0);
        ctx.quadratic_curve_to(32.0, -4.0, 27.0, 2.0);
        ctx.stroke();

        if let Some(kind) = carrying {
            ctx.set_fill_style_str(&kind.color().to_css(1.0));
            circle(ctx, 28.0, 6.0, 6.0)?;
        }
        Ok(())
    }

    fn parachute(&self, anchor: DVec2, billow: f64, billow_phase: f64, collapse: f64) -> Result<(), JsValue> {
        const WIDTH: f64 = 80.0;
        const HEIGHT: f64 = 50.0;
        const ROPE: f64 = 40.0;
        let ctx = &self.ctx;
        let scale = 1.0 - collapse * 0.8;
        ctx.set_global_alpha(1.0 - collapse);
        ctx.translate(anchor.x, anchor.y - ROPE + collapse * 30.0)?;
        ctx.scale(scale, scale)?;

        ctx.set_stroke_style_str("#666");
        ctx.set_line_width(1.0);
        for x in [-WIDTH / 2.0, -WIDTH / 4.0, WIDTH / 4.0, WIDTH / 2.0] {
            line(ctx, x, HEIGHT / 2.0 - 20.0, 0.0, ROPE / scale.max(0.2));
        }

        const SEGMENTS: usize = 8;
        for i in 0..SEGMENTS {
            let panel = |j: usize| {
                let t = j as f64 / SEGMENTS as f64;
                let x = -WIDTH / 2.0 + WIDTH * t;
                let y = -HEIGHT / 2.0 + ((t - 0.5) * 2.0).powi(2) * HEIGHT * 0.8
                    + (t * TAU + billow_phase).sin() * billow;
                (x, y)
            };
            let (x0, y0) = panel(i);
            let (x1, y1) = panel(i + 1);
            ctx.set_fill_style_str(CANOPY[i % CANOPY.len()]);
            ctx.begin_path();
            ctx.move_to(0.0, HEIGHT / 2.0 - 20.0);
            ctx.line_to(x0, y0);
            ctx.line_to(x1, y1);
            ctx.close_path();
            ctx.fill();
        }
        Ok(())
    }

    /// Kiwi silhouette, used for the player and the followers.
    fn kiwi(&self, pos: DVec2, radius: f64, facing: f64, rotation: f64, body: &str) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.translate(pos.x, pos.y)?;
        ctx.rotate(rotation)?;
        ctx.scale(facing, 1.0)?;

        ctx.set_fill_style_str(body);
        ctx.begin_path();
        ctx.ellipse(0.0, 0.0, radius * 1.1, radius, 0.0, 0.0, TAU)?;
        ctx.fill();
        let head = radius * 0.72;
        circle(ctx, radius * 0.8, -radius * 0.6, head)?;

        ctx.set_stroke_style_str(BEAK);
        ctx.set_line_width(3.0);
        ctx.set_line_cap("round");
        ctx.begin_path();
        ctx.move_to(radius * 0.8 + head * 0.8, -radius * 0.6);
        ctx.quadratic_curve_to(radius * 2.2, -radius * 0.3, radius * 2.6, radius * 0.2);
        ctx.stroke();

        ctx.set_fill_style_str("#111");
        circle(ctx, radius * 1.0, -radius * 0.75, 2.5)?;

        ctx.set_stroke_style_str(KIWI_DARK);
        ctx.set_line_width(2.0);
        line(ctx, -radius * 0.3, radius * 0.9, -radius * 0.4, radius * 1.4);
        line(ctx, radius * 0.3, radius * 0.9, radius * 0.4, radius * 1.4);
        Ok(())
    }

    fn confetti(
        &self,
        pos: DVec2,
        size: f64,
        rotation: f64,
        shape: ConfettiShape,
        color: Color,
        opacity: f64,
    ) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.set_global_alpha(opacity);
        ctx.translate(pos.x, pos.y)?;
        ctx.rotate(rotation)?;
        ctx.set_fill_style_str(&color.to_css(1.0));
        match shape {
            ConfettiShape::Square => ctx.fill_rect(-size / 2.0, -size / 2.0, size, size),
            ConfettiShape::Circle => circle(ctx, 0.0, 0.0, size / 2.0)?,
            ConfettiShape::Strip => ctx.fill_rect(-size / 2.0, -size / 6.0, size, size / 3.0),
        }
        Ok(())
    }

    fn landing_message(&self, center: DVec2, alpha: f64) -> Result<(), JsValue> {
        const BOX_W: f64 = 300.0;
        const BOX_H: f64 = 120.0;
        let ctx = &self.ctx;
        ctx.set_global_alpha(alpha.min(1.0));
        ctx.set_fill_style_str("rgba(255, 255, 255, 0.95)");
        ctx.set_stroke_style_str("#667eea");
        ctx.set_line_width(4.0);
        ctx.begin_path();
        ctx.rect(center.x - BOX_W / 2.0, center.y - BOX_H / 2.0, BOX_W, BOX_H);
        ctx.fill();
        ctx.stroke();

        ctx.set_fill_style_str("#333");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_font("bold 32px sans-serif");
        ctx.fill_text(LANDING_TITLE, center.x, center.y - 15.0)?;
        ctx.set_font("20px sans-serif");
        ctx.fill_text(LANDING_SUBTITLE, center.x, center.y + 20.0)?;
        Ok(())
    }
}
