//! Scene tunables. Every field has a default; a host may override any subset
//! from JSON (`{"food_cap": 10, "confetti_bursts": 20}`).

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    // --- Background ---
    pub cloud_count: usize,
    /// Vertical world scroll in px per ms.
    pub scroll_rate: f64,
    /// Upper bound on a single frame's scroll advance (px).
    pub max_scroll_step: f64,
    /// Day/night phase advance per ms (phase wraps at 1).
    pub day_night_rate: f64,

    // --- Food ---
    pub initial_food: usize,
    pub food_spawn_interval_ms: f64,
    pub food_cap: usize,

    // --- Antagonists ---
    pub antagonist_base_interval_ms: f64,
    pub antagonist_min_interval_ms: f64,
    pub antagonist_cap: usize,
    pub antagonist_speed: f64,
    pub steal_range: f64,
    pub steal_duration_ms: f64,

    // --- Celebration ---
    pub confetti_bursts: u32,
    pub confetti_burst_interval_ms: f64,
    pub follower_spawn_delay_ms: f64,
    /// Landing message alpha gained per ms.
    pub landing_fade_rate: f64,

    // --- Weather ---
    pub weather_change_interval_ms: f64,
    pub weather_transition_ms: f64,
    /// Automatic random weather changes; disable for a fixed sky.
    pub auto_weather: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            cloud_count: 30,
            scroll_rate: 0.08,
            max_scroll_step: 8.0,
            day_night_rate: 1.0 / 120_000.0,

            initial_food: 8,
            food_spawn_interval_ms: 1500.0,
            food_cap: 15,

            antagonist_base_interval_ms: 15_000.0,
            antagonist_min_interval_ms: 8_000.0,
            antagonist_cap: 3,
            antagonist_speed: 0.15,
            steal_range: 30.0,
            steal_duration_ms: 800.0,

            confetti_bursts: 40,
            confetti_burst_interval_ms: 150.0,
            follower_spawn_delay_ms: 500.0,
            landing_fade_rate: 1.0 / 1000.0,

            weather_change_interval_ms: 30_000.0,
            weather_transition_ms: 2_000.0,
            auto_weather: true,
        }
    }
}

impl SceneConfig {
    /// Parse a (possibly partial) JSON override. Invalid input falls back to the
    /// defaults with a warning.
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str::<SceneConfig>(json) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("ignoring invalid scene config: {err}");
                SceneConfig::default()
            }
        }
    }
}
