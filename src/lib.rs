//! Kiwi Timer core crate.
//!
//! A countdown timer drawn as a parachuting kiwi: the bird drifts down while
//! the clock runs out, collects food, dodges thieving kea and lands with a
//! celebration when time is up. Everything except `web` is target-independent
//! and tested natively; `web` binds it to a canvas and the DOM.

use wasm_bindgen::prelude::*;

pub mod app;
pub mod clock;
pub mod config;
pub mod datetime;
pub mod error;
pub mod scene;
pub mod score;
pub mod share;
pub mod storage;
pub mod timefmt;
pub mod web;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    web::console::init();
}
