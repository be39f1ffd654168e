// Browser-side checks, run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use chrono::{Offset, Utc};
use kiwi_timer::share::ShareParams;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn entropy_seed_differs_between_calls() {
    let a = kiwi_timer::app::entropy_seed();
    let b = kiwi_timer::app::entropy_seed();
    assert_ne!(a, b);
}

#[wasm_bindgen_test]
fn preset_yields_a_form_value() {
    let value = kiwi_timer::web::apply_preset("minutes", 30).unwrap();
    assert_eq!(value.len(), "2025-01-01T00:00".len());
    assert!(kiwi_timer::web::apply_preset("fortnights", 1).is_none());
}

#[wasm_bindgen_test]
fn shared_link_target_parses_in_the_browser() {
    let params = ShareParams::from_query("?time=2030-01-01T09:00:00&tz=%2B13:00");
    assert!(params.target_ms(Utc.fix(), js_sys::Date::now()).unwrap().is_some());
}
