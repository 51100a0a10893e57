#[cfg(test)]
#[path = "util_test.rs"]
mod util_test;

const RECONNECT_BASE_MS: u32 = 2_000;
const RECONNECT_JITTER_MS: u32 = 3_000;

pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Base delay plus jitter, `unit` in `[0, 1)`.
pub fn reconnect_delay_ms(unit: f64) -> u32 {
    let unit = if unit.is_finite() { unit.clamp(0.0, 1.0) } else { 0.0 };
    RECONNECT_BASE_MS + (unit * f64::from(RECONNECT_JITTER_MS)) as u32
}

pub fn random_reconnect_delay_ms() -> u32 {
    reconnect_delay_ms(js_sys::Math::random())
}

/// `guessboard_YYYYMMDD_HHMMSS.png` for a local calendar time.
pub fn download_file_name(
    year: u32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> String {
    format!("guessboard_{year:04}{month:02}{day:02}_{hour:02}{minute:02}{second:02}.png")
}

pub fn download_file_name_now() -> String {
    let date = js_sys::Date::new_0();
    download_file_name(
        date.get_full_year(),
        date.get_month() + 1,
        date.get_date(),
        date.get_hours(),
        date.get_minutes(),
        date.get_seconds(),
    )
}

/// `HH:MM:SS` shown in history item tooltips.
pub fn clock_label(timestamp_ms: u64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp_ms as f64));
    format!(
        "{:02}:{:02}:{:02}",
        date.get_hours(),
        date.get_minutes(),
        date.get_seconds()
    )
}
