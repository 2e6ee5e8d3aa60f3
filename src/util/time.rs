/// Milliseconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}

/// Milliseconds since page load
#[cfg(target_arch = "wasm32")]
pub fn current_time_millis() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now())
        .unwrap_or(0.0)
}
