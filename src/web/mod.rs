//! Browser glue: canvas, DOM controls, localStorage and the animation loop.

pub mod console;
mod local_store;
mod painter;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{FixedOffset, Offset, Utc};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlInputElement, KeyboardEvent,
    MouseEvent, TouchEvent, Window, window,
};

use crate::app::{App, Frame, entropy_seed};
use crate::config::SceneConfig;
use crate::datetime::{self, Preset};
use crate::error::CountdownError;
use crate::scene::player::PlayerInput;
use crate::scene::weather::WeatherMode;
use crate::scene::{SceneEvent, Viewport};
use crate::share::{self, ShareParams};

pub use local_store::LocalStore;
pub use painter::CanvasPainter;

const CANVAS_ID: &str = "kiwiCanvas";
const TARGET_INPUT_ID: &str = "targetDateTime";
const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

impl From<CountdownError> for JsValue {
    fn from(err: CountdownError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

struct WebState {
    app: App<LocalStore>,
    painter: CanvasPainter,
    canvas: HtmlCanvasElement,
    keys: PlayerInput,
    pointer: PlayerInput,
    base_title: String,
}

impl WebState {
    fn push_input(&mut self) {
        self.app.set_input(PlayerInput {
            left: self.keys.left || self.pointer.left,
            right: self.keys.right || self.pointer.right,
        });
    }
}

thread_local! {
    static APP_STATE: RefCell<Option<WebState>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn with_state<R>(f: impl FnOnce(&mut WebState) -> R) -> Option<R> {
    APP_STATE.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn browser() -> Result<(Window, Document), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;
    Ok((win, doc))
}

/// The browser's current UTC offset.
fn local_offset() -> FixedOffset {
    let west_minutes = js_sys::Date::new_0().get_timezone_offset();
    FixedOffset::west_opt((west_minutes * 60.0) as i32).unwrap_or_else(|| Utc.fix())
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn alert(message: &str) {
    if let Some(win) = window() {
        let _ = win.alert_with_message(message);
    }
}

// --- Canvas -------------------------------------------------------------------

fn canvas(doc: &Document) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        return el.dyn_into().map_err(JsValue::from);
    }
    let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    c.set_id(CANVAS_ID);
    c.set_attribute("style", "display:block; width:100%; height:100%;")?;
    doc.body().ok_or_else(|| JsValue::from_str("no body"))?.append_child(&c)?;
    Ok(c)
}

/// Size the backing store to the CSS box times the device pixel ratio and
/// scale the context so drawing stays in CSS pixels.
fn fit_canvas(win: &Window, canvas: &HtmlCanvasElement, ctx: &CanvasRenderingContext2d) -> Result<Viewport, JsValue> {
    let (mut width, mut height) = (canvas.client_width() as f64, canvas.client_height() as f64);
    if width <= 0.0 || height <= 0.0 {
        (width, height) = FALLBACK_SIZE;
    }
    let dpr = win.device_pixel_ratio().max(1.0);
    canvas.set_width((width * dpr) as u32);
    canvas.set_height((height * dpr) as u32);
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    Ok(Viewport::new(width, height))
}

// --- Entry points -------------------------------------------------------------

#[wasm_bindgen]
pub fn start_app() -> Result<(), JsValue> {
    start(SceneConfig::default())
}

/// Start with scene tunables overridden from JSON (any subset of fields).
#[wasm_bindgen]
pub fn start_app_with_config(json: &str) -> Result<(), JsValue> {
    start(SceneConfig::from_json_or_default(json))
}

fn start(config: SceneConfig) -> Result<(), JsValue> {
    if APP_STATE.with(|cell| cell.borrow().is_some()) {
        log::debug!("already running");
        return Ok(());
    }
    let (win, doc) = browser()?;
    let canvas = canvas(&doc)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;
    let viewport = fit_canvas(&win, &canvas, &ctx)?;

    let mut app = App::new(viewport, config, LocalStore::open(), Box::new(LocalStore::open()), entropy_seed());
    let now = now_ms();
    let offset = local_offset();

    let params = ShareParams::from_query(&win.location().search().unwrap_or_default());
    let started = match params.target_ms(offset, now) {
        Ok(Some(target)) => {
            app.start_shared(target, now)?;
            true
        }
        Ok(None) => app.restore(now),
        Err(err) => {
            log::warn!("{err}");
            app.restore(now)
        }
    };

    let form_value = app.timer().map_or_else(|| datetime::default_target_ms(now), |t| t.target_ms());
    if let Some(input) = target_input(&doc) {
        input.set_value(&datetime::format_datetime_local(form_value, offset).unwrap_or_default());
    }
    if let Some(title) = &params.title {
        doc.set_title(title);
    }
    log::info!("kiwi timer ready ({}x{}, countdown: {started})", viewport.width, viewport.height);

    APP_STATE.with(|cell| {
        *cell.borrow_mut() = Some(WebState {
            app,
            painter: CanvasPainter::new(ctx),
            canvas: canvas.clone(),
            keys: PlayerInput::NONE,
            pointer: PlayerInput::NONE,
            base_title: doc.title(),
        })
    });

    wire_keyboard(&win)?;
    wire_pointer(&canvas)?;
    wire_resize(&win)?;
    wire_controls(&doc)?;
    start_loop();
    Ok(())
}

/// Start a countdown from free text (ISO or natural language).
#[wasm_bindgen]
pub fn start_countdown(input: &str) -> Result<(), JsValue> {
    let now = now_ms();
    let target = datetime::parse_target(input, local_offset(), now)?;
    with_state(|state| state.app.start_countdown(target, now))
        .ok_or_else(|| JsValue::from_str("app not started"))??;
    Ok(())
}

/// Returns `true` if the countdown is now paused.
#[wasm_bindgen]
pub fn toggle_pause() -> Result<bool, JsValue> {
    let paused = with_state(|state| state.app.toggle_pause(now_ms()))
        .ok_or_else(|| JsValue::from_str("app not started"))??;
    Ok(paused)
}

#[wasm_bindgen]
pub fn reset_countdown() {
    with_state(|state| state.app.reset());
}

/// Link that reopens the running countdown; `None` when idle.
#[wasm_bindgen]
pub fn share_url(title: Option<String>) -> Option<String> {
    let href = window()?.location().href().ok()?;
    let base = href.split(['?', '#']).next().unwrap_or(&href).to_string();
    let target = with_state(|state| state.app.timer().map(|t| t.target_ms()))??;
    share::share_url(&base, target, local_offset(), title.as_deref())
}

/// Form value (`YYYY-MM-DDTHH:MM`) for a quick preset, e.g. `("minutes", 30)`.
#[wasm_bindgen]
pub fn apply_preset(kind: &str, amount: i32) -> Option<String> {
    let offset = local_offset();
    let target = Preset::from_name(kind, amount.into())?.apply(now_ms(), offset)?;
    datetime::format_datetime_local(target, offset)
}

/// Switch weather by name (`"clear"`, `"rain"`, `"snow"`). Ignored mid-fade.
#[wasm_bindgen]
pub fn set_weather(mode: &str) -> bool {
    let Some(mode) = WeatherMode::ALL.into_iter().find(|m| m.name() == mode) else {
        log::warn!("unknown weather {mode:?}");
        return false;
    };
    with_state(|state| state.app.scene_mut().set_weather(mode)).unwrap_or(false)
}

// --- Input ----------------------------------------------------------------------

fn wire_keyboard(win: &Window) -> Result<(), JsValue> {
    for (event, held) in [("keydown", true), ("keyup", false)] {
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            let key = evt.key();
            if key != "ArrowLeft" && key != "ArrowRight" {
                return;
            }
            evt.prevent_default();
            with_state(|state| {
                if key == "ArrowLeft" {
                    state.keys.left = held;
                } else {
                    state.keys.right = held;
                }
                state.push_input();
            });
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn steer(x: f64) {
    with_state(|state| {
        state.pointer = PlayerInput::from_pointer(x, state.app.scene().viewport().width);
        state.push_input();
    });
}

fn release() {
    with_state(|state| {
        state.pointer = PlayerInput::NONE;
        state.push_input();
    });
}

fn wire_pointer(canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let press = Closure::wrap(Box::new(move |evt: MouseEvent| {
        steer(evt.offset_x() as f64);
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("mousedown", press.as_ref().unchecked_ref())?;
    press.forget();

    for event in ["mouseup", "mouseleave"] {
        let closure = Closure::wrap(Box::new(move |_: MouseEvent| release()) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    let touch_target = canvas.clone();
    let touch = Closure::wrap(Box::new(move |evt: TouchEvent| {
        evt.prevent_default();
        if let Some(t) = evt.touches().get(0) {
            let left = touch_target.get_bounding_client_rect().left();
            steer(t.client_x() as f64 - left);
        }
    }) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("touchstart", touch.as_ref().unchecked_ref())?;
    touch.forget();

    let untouch = Closure::wrap(Box::new(move |_: TouchEvent| release()) as Box<dyn FnMut(_)>);
    canvas.add_event_listener_with_callback("touchend", untouch.as_ref().unchecked_ref())?;
    untouch.forget();
    Ok(())
}

fn wire_resize(win: &Window) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move || {
        let Some(win) = window() else { return };
        with_state(|state| {
            match fit_canvas(&win, &state.canvas, state.painter.context()) {
                Ok(viewport) => state.app.resize(viewport),
                Err(err) => log::warn!("resize failed: {err:?}"),
            }
        });
    }) as Box<dyn FnMut()>);
    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

// --- Controls ----------------------------------------------------------------

fn target_input(doc: &Document) -> Option<HtmlInputElement> {
    doc.get_element_by_id(TARGET_INPUT_ID)?.dyn_into().ok()
}

fn on_click(el: &Element, mut handler: impl FnMut() + 'static) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_: MouseEvent| handler()) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Buttons present in the host page get wired; missing ones are skipped.
fn wire_controls(doc: &Document) -> Result<(), JsValue> {
    if let Some(btn) = doc.get_element_by_id("startBtn") {
        let doc = doc.clone();
        on_click(&btn, move || {
            let value = target_input(&doc).map(|i| i.value()).unwrap_or_default();
            if let Err(err) = start_countdown(&value) {
                alert(&err.as_string().unwrap_or_default());
            }
        })?;
    }

    if let Some(btn) = doc.get_element_by_id("pauseBtn") {
        let label = btn.clone();
        on_click(&btn, move || match toggle_pause() {
            Ok(paused) => label.set_text_content(Some(if paused { "Resume" } else { "Pause" })),
            Err(err) => log::warn!("{}", err.as_string().unwrap_or_default()),
        })?;
    }

    if let Some(btn) = doc.get_element_by_id("resetBtn") {
        let doc = doc.clone();
        on_click(&btn, move || {
            reset_countdown();
            set_text(&doc, "pauseBtn", "Pause");
        })?;
    }

    // <button data-preset="minutes" data-amount="30">
    let presets = doc.query_selector_all(".quick-actions [data-preset]")?;
    for i in 0..presets.length() {
        let Some(el) = presets.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let kind = el.get_attribute("data-preset").unwrap_or_default();
        let amount = el.get_attribute("data-amount").and_then(|a| a.parse().ok()).unwrap_or(1);
        let doc = doc.clone();
        on_click(&el, move || {
            if let (Some(value), Some(input)) = (apply_preset(&kind, amount), target_input(&doc)) {
                input.set_value(&value);
            }
        })?;
    }
    Ok(())
}

// --- Loop ---------------------------------------------------------------------

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_state(|state| tick(state, ts));
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn tick(state: &mut WebState, ts: f64) {
    let frame = state.app.tick(now_ms(), ts);
    if let Err(err) = state.painter.paint(&state.app.scene().viewport(), &frame.draw_list) {
        log::error!("paint failed: {err:?}");
    }
    if let Some(doc) = window().and_then(|w| w.document()) {
        update_readouts(&doc, &frame, &state.base_title);
    }
}

fn update_readouts(doc: &Document, frame: &Frame, base_title: &str) {
    set_text(doc, "timeDisplay", &frame.remaining_text);
    set_text(doc, "currentScore", &frame.score.current.to_string());
    set_text(doc, "highScore", &frame.score.high.to_string());
    set_text(doc, "stolenScore", &frame.score.stolen.to_string());

    let title = if frame.compact_text.is_empty() {
        base_title.to_string()
    } else {
        format!("{} - {base_title}", frame.compact_text)
    };
    if doc.title() != title {
        doc.set_title(&title);
    }

    for event in &frame.events {
        match event {
            SceneEvent::NewHighScore(score) => log::debug!("new high score {score}"),
            SceneEvent::Landed => log::info!("landed"),
            SceneEvent::WeatherChanged(mode) => log::debug!("weather: {}", mode.name()),
            SceneEvent::FoodCollected { .. } | SceneEvent::FoodStolen(_) => {}
        }
    }
}
