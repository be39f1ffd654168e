//! Application driver: owns the countdown clock, the scene and the persisted
//! countdown record, and turns host ticks into finished frames.

use crate::clock::{CountdownTimer, ProgressSample};
use crate::config::SceneConfig;
use crate::error::CountdownError;
use crate::scene::player::PlayerInput;
use crate::scene::{DrawList, FrameClock, Scene, SceneEvent, Viewport};
use crate::storage::{KeyValueStore, ScoreStore, TimerStore};
use crate::timefmt;

/// Longest frame step fed to the scene; a tab returning from the background
/// resumes smoothly instead of jumping.
pub const MAX_FRAME_MS: f64 = 250.0;

/// Seed for the scene's RNG from the platform entropy source.
pub fn entropy_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(err) => {
            log::warn!("no entropy source ({err}), using a fixed seed");
            0x5EED_0F_C0FFEE
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreReadout {
    pub current: u32,
    pub high: u32,
    pub stolen: u32,
}

/// Everything the host needs to present one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub draw_list: DrawList,
    pub events: Vec<SceneEvent>,
    /// `None` while idle.
    pub progress: Option<ProgressSample>,
    /// Adaptive text, e.g. `"2h 15m"`; `"--"` while idle.
    pub remaining_text: String,
    /// Clock-face text for the page title; empty while idle.
    pub compact_text: String,
    pub score: ScoreReadout,
}

pub struct App<S: KeyValueStore> {
    timer: Option<CountdownTimer>,
    scene: Scene,
    store: TimerStore<S>,
    input: PlayerInput,
    last_frame_ms: Option<f64>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(
        viewport: Viewport,
        config: SceneConfig,
        timer_backend: S,
        score_store: Box<dyn ScoreStore>,
        seed: u64,
    ) -> Self {
        Self {
            timer: None,
            scene: Scene::new(viewport, config, score_store, seed),
            store: TimerStore::new(timer_backend),
            input: PlayerInput::NONE,
            last_frame_ms: None,
        }
    }

    /// Start from the form. The target must be in the future.
    pub fn start_countdown(&mut self, target_ms: f64, now_ms: f64) -> Result<(), CountdownError> {
        if !target_ms.is_finite() {
            return Err(CountdownError::InvalidTarget(target_ms.to_string()));
        }
        if target_ms <= now_ms {
            return Err(CountdownError::TargetInPast);
        }
        self.begin(target_ms, now_ms)
    }

    /// Start from a shared link. A past target is accepted and lands at once.
    pub fn start_shared(&mut self, target_ms: f64, now_ms: f64) -> Result<(), CountdownError> {
        self.begin(target_ms, now_ms)
    }

    fn begin(&mut self, target_ms: f64, start_ms: f64) -> Result<(), CountdownError> {
        let timer = CountdownTimer::start(target_ms, start_ms)?;
        self.store.save(timer.target_ms(), timer.start_ms());
        self.timer = Some(timer);
        self.scene.begin_countdown();
        log::info!("countdown started: {} ms", target_ms - start_ms);
        Ok(())
    }

    /// Pick up a countdown saved by an earlier session, keeping its original
    /// start so progress continues where it was. Returns whether one was found.
    pub fn restore(&mut self, now_ms: f64) -> bool {
        let Some(saved) = self.store.load(now_ms) else {
            return false;
        };
        match CountdownTimer::start(saved.target_ms, saved.start_ms) {
            Ok(timer) => {
                self.timer = Some(timer);
                self.scene.begin_countdown();
                log::info!("restored saved countdown");
                true
            }
            Err(err) => {
                log::warn!("saved countdown unusable: {err}");
                self.store.clear();
                false
            }
        }
    }

    /// Pause or resume. Returns `true` if the countdown is now paused.
    pub fn toggle_pause(&mut self, now_ms: f64) -> Result<bool, CountdownError> {
        let timer = self.timer.as_mut().ok_or(CountdownError::NoCountdown)?;
        if timer.is_paused() {
            timer.resume(now_ms);
            // The target moved; keep the saved record in step.
            self.store.save(timer.target_ms(), timer.start_ms());
            log::info!("countdown resumed");
            Ok(false)
        } else {
            timer.pause(now_ms);
            log::info!("countdown paused");
            Ok(true)
        }
    }

    /// Drop the countdown and its saved record; the scene goes back to idle.
    pub fn reset(&mut self) {
        self.timer = None;
        self.store.clear();
        self.scene.restart();
        log::info!("countdown reset");
    }

    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.scene.resize(viewport);
    }

    /// Advance one animation frame. `now_ms` is wall-clock time for the
    /// countdown; `frame_ms` is the host's monotonic frame timestamp.
    pub fn tick(&mut self, now_ms: f64, frame_ms: f64) -> Frame {
        let dt = self
            .last_frame_ms
            .map_or(0.0, |last| (frame_ms - last).clamp(0.0, MAX_FRAME_MS));
        self.last_frame_ms = Some(frame_ms);

        let progress = self.timer.as_ref().map(|t| t.sample(now_ms));
        let clock = match (&self.timer, progress) {
            (Some(timer), Some(sample)) => FrameClock {
                percent_complete: sample.percent_complete,
                total_duration_ms: timer.total_duration_ms(),
                is_complete: sample.is_complete,
            },
            _ => FrameClock::IDLE,
        };

        let (events, draw_list) = self.scene.frame(dt, clock, self.input);
        if events.contains(&SceneEvent::Landed) && self.timer.is_some() {
            self.store.clear();
        }

        let (remaining_text, compact_text) = match progress {
            Some(sample) => (
                timefmt::format_remaining(sample.remaining_ms),
                timefmt::format_compact(sample.remaining_ms),
            ),
            None => ("--".to_string(), String::new()),
        };
        let board = self.scene.score();
        Frame {
            draw_list,
            events,
            progress,
            remaining_text,
            compact_text,
            score: ScoreReadout { current: board.current(), high: board.high(), stolen: board.stolen() },
        }
    }

    pub fn timer(&self) -> Option<&CountdownTimer> {
        self.timer.as_ref()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn store(&self) -> &TimerStore<S> {
        &self.store
    }
}
