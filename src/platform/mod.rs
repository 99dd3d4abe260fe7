//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time and today's date
//! - Storage (LocalStorage on web, in-process map on native)
//! - The wasm entry point

pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;

use chrono::NaiveDate;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64
}

/// Today's date in UTC (leaderboard day boundary)
#[cfg(target_arch = "wasm32")]
pub fn today() -> NaiveDate {
    let date = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        date.get_utc_full_year() as i32,
        date.get_utc_month() + 1,
        date.get_utc_date(),
    )
    .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Seed for a new round from the wall clock
pub fn clock_seed() -> u64 {
    now_ms() as u64
}
