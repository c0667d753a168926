//! Shared utility functions.

use std::time::Duration;

/// Format a step duration for log output.
///
/// Sub-second durations are shown in milliseconds, longer ones in seconds
/// with two decimals.
/// 412ms -> "412ms"
/// 1234ms -> "1.23s"
pub fn format_elapsed(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

/// Pluralize a count: `plural(1, "change")` -> "1 change".
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
