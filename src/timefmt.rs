//! Human-readable remaining-time strings with adaptive granularity.

pub const TIMES_UP: &str = "Time's up!";

/// `"3d 4h"`, `"1d 2h 5m"`, `"2h 15m"`, `"1h 5m 3s"`, `"4m 10s"`, `"45s"`.
/// Coarser units drop the finest field once there is more than one of them.
pub fn format_remaining(ms: f64) -> String {
    if ms <= 0.0 || ms.is_nan() {
        return TIMES_UP.to_string();
    }
    let seconds = (ms / 1000.0).floor() as u64;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        return if days > 1 {
            format!("{days}d {}h", hours % 24)
        } else {
            format!("{days}d {}h {}m", hours % 24, minutes % 60)
        };
    }
    if hours > 0 {
        return if hours > 1 {
            format!("{hours}h {}m", minutes % 60)
        } else {
            format!("{hours}h {}m {}s", minutes % 60, seconds % 60)
        };
    }
    if minutes > 0 {
        return format!("{minutes}m {}s", seconds % 60);
    }
    format!("{seconds}s")
}

/// Clock-face variant used for the page title: `"12:05"`, `"3:07"`, `"2d 4h"`.
pub fn format_compact(ms: f64) -> String {
    if ms <= 0.0 || ms.is_nan() {
        return "00:00".to_string();
    }
    let seconds = (ms / 1000.0).floor() as u64;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days}d {}h", hours % 24)
    } else if hours > 0 {
        format!("{hours}:{:02}", minutes % 60)
    } else {
        format!("{minutes:02}:{:02}", seconds % 60)
    }
}
