//! Platform abstraction layer
//!
//! Handles browser/native differences for the clock and, on wasm32, the
//! JavaScript-facing game handle.

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Wall-clock milliseconds, used as the tick timestamp
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Wall-clock milliseconds, used as the tick timestamp
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

/// Run seed derived from the clock
pub fn clock_seed() -> u64 {
    now_ms() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_moves_forward() {
        let a = now_ms();
        let b = now_ms();
        assert!(a > 0.0);
        assert!(b >= a);
    }
}
