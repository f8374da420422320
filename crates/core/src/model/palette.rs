//! Per-thread display colors.
//!
//! Hues advance by the golden-ratio conjugate, which keeps successive
//! colors far apart on the color wheel for any number of threads.

use trace_browser_protocol::Hsl;

pub const HUE_STEP: f64 = 0.618_033_988_749_895;
pub const THREAD_SATURATION: f64 = 1.0;
pub const THREAD_LIGHTNESS: f64 = 0.8;

/// Color of the `index`-th thread. Pure and restartable: the same index
/// always yields the same color.
pub fn thread_color(index: usize) -> Hsl {
    let hue = (index as f64 * HUE_STEP).fract();
    Hsl::new(hue, THREAD_SATURATION, THREAD_LIGHTNESS)
}

/// Colors for `thread_count` threads. At least two colors are produced.
pub fn palette(thread_count: usize) -> Vec<Hsl> {
    (0..thread_count.max(2)).map(thread_color).collect()
}
