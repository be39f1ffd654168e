// Native integration tests for the `kiwi-timer` crate. They drive the public
// `App` API frame by frame with an in-memory store, so they run under
// `cargo test` on the host.

use kiwi_timer::app::App;
use kiwi_timer::config::SceneConfig;
use kiwi_timer::error::CountdownError;
use kiwi_timer::scene::weather::WeatherMode;
use kiwi_timer::scene::{SceneEvent, Viewport};
use kiwi_timer::storage::{KeyValueStore, MemoryStore, TIMER_KEY};
use kiwi_timer::timefmt::TIMES_UP;

const NOW: f64 = 1_750_000_000_000.0;
const FRAME: f64 = 16.0;

fn config() -> SceneConfig {
    SceneConfig { auto_weather: false, ..SceneConfig::default() }
}

fn app_with(store: MemoryStore) -> App<MemoryStore> {
    App::new(Viewport::new(800.0, 600.0), config(), store, Box::new(MemoryStore::new()), 42)
}

#[test]
fn five_second_countdown_runs_to_a_single_landing() {
    let mut app = app_with(MemoryStore::new());
    app.start_countdown(NOW + 5_000.0, NOW).unwrap();

    let first = app.tick(NOW, 0.0);
    let progress = first.progress.unwrap();
    assert_eq!(progress.percent_complete, 0.0);
    assert!(!progress.is_complete);

    let mut landed = 0;
    let mut midway = None;
    let mut confetti_seen = false;
    let mut t = 0.0;
    while t < 25_000.0 {
        t += FRAME;
        let frame = app.tick(NOW + t, t);
        landed += frame.events.iter().filter(|e| **e == SceneEvent::Landed).count();
        if midway.is_none() && t >= 2_500.0 {
            midway = frame.progress.map(|p| p.percent_complete);
        }
        if app.scene().confetti().is_active() {
            confetti_seen = true;
        }
        if t >= 5_000.0 {
            let p = frame.progress.unwrap();
            assert!(p.is_complete);
            assert_eq!(p.percent_complete, 1.0);
            assert_eq!(frame.remaining_text, TIMES_UP);
            assert!(app.scene().is_landing());
        }
    }

    let midway = midway.unwrap();
    assert!((midway - 0.5).abs() < 0.01, "midway progress {midway}");
    assert_eq!(landed, 1);
    assert!(confetti_seen);
    // All bursts fired and every particle has faded out.
    assert!(!app.scene().confetti().is_active());
    assert!(app.scene().message_alpha() >= 1.0);
    assert!(app.scene().followers().is_active());
    // A finished countdown is not restored next session.
    assert!(app.store().backend().get(TIMER_KEY).unwrap().is_none());
}

#[test]
fn pause_freezes_progress_and_resume_shifts_the_target() {
    let mut app = app_with(MemoryStore::new());
    app.start_countdown(NOW + 10_000.0, NOW).unwrap();
    app.tick(NOW, 0.0);

    app.tick(NOW + 4_000.0, 4_000.0);
    assert_eq!(app.toggle_pause(NOW + 4_000.0), Ok(true));
    let frozen = app.tick(NOW + 9_000.0, 4_016.0).progress.unwrap();
    assert_eq!(frozen.remaining_ms, 6_000.0);
    assert!(!frozen.is_complete);

    assert_eq!(app.toggle_pause(NOW + 9_000.0), Ok(false));
    let resumed = app.tick(NOW + 9_000.0, 4_032.0).progress.unwrap();
    assert_eq!(resumed.remaining_ms, 6_000.0);

    let done = app.tick(NOW + 15_000.0, 4_048.0);
    assert!(done.progress.unwrap().is_complete);
    assert!(done.events.contains(&SceneEvent::Landed));
}

#[test]
fn pause_freezes_only_the_countdown() {
    let mut app = app_with(MemoryStore::new());
    app.start_countdown(NOW + 10_000.0, NOW).unwrap();
    assert!(app.scene_mut().set_weather(WeatherMode::Rain));
    app.tick(NOW, 0.0);
    app.tick(NOW + 2_000.0, 2_000.0);
    assert_eq!(app.toggle_pause(NOW + 2_000.0), Ok(true));

    let vp = app.scene().viewport();
    let scroll = app.scene().background().scroll_offset();
    let day = app.scene().background().day_phase();
    let cloud = app.scene().background().clouds().clouds()[0].screen_pos(scroll, &vp);
    let drop = app.scene().weather().particles()[0].pos();
    let kiwi = app.scene().player().pos();

    let mut t = 2_000.0;
    for _ in 0..30 {
        t += FRAME;
        let progress = app.tick(NOW + t, t).progress.unwrap();
        assert_eq!(progress.percent_complete, 0.2);
        assert_eq!(progress.remaining_ms, 8_000.0);
    }

    let background = app.scene().background();
    assert!(background.scroll_offset() > scroll);
    assert_ne!(background.day_phase(), day);
    assert_ne!(background.clouds().clouds()[0].screen_pos(background.scroll_offset(), &vp), cloud);
    assert_ne!(app.scene().weather().particles()[0].pos(), drop);
    assert_ne!(app.scene().player().pos(), kiwi);
    assert!(!app.scene().is_landing());
}

#[test]
fn saved_countdown_survives_a_reload() {
    let mut first = app_with(MemoryStore::new());
    first.start_countdown(NOW + 60_000.0, NOW).unwrap();
    let backend = first.store().backend().clone();

    let mut second = app_with(backend);
    assert!(second.restore(NOW + 30_000.0));
    let sample = second.tick(NOW + 30_000.0, 0.0).progress.unwrap();
    assert!((sample.percent_complete - 0.5).abs() < 1e-9);
    assert!(second.scene().antagonists().is_active());
}

#[test]
fn nothing_to_restore_leaves_the_scene_idle() {
    let mut app = app_with(MemoryStore::new());
    assert!(!app.restore(NOW));
    assert_eq!(app.toggle_pause(NOW), Err(CountdownError::NoCountdown));
    let frame = app.tick(NOW, 0.0);
    assert!(frame.progress.is_none());
    assert!(!frame.events.contains(&SceneEvent::Landed));
    assert!(!app.scene().is_landing());
}
