use crate::domain::INVALID_DURATION;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// Formats a number of seconds as `"1d 1h 1m 1s"`.
///
/// Leading day, hour and minute units only appear when non-zero, the seconds
/// unit is always present. Fractions are truncated toward zero. Negative
/// durations keep their sign (`-90.0` gives `"-1m 30s"`) and non-finite input
/// gives [`INVALID_DURATION`].
pub fn format_elapsed(seconds: f64) -> String {
    if !seconds.is_finite() {
        return INVALID_DURATION.to_string();
    }

    let mut remaining = seconds.abs().trunc() as u64;
    let negative = seconds < 0.0 && remaining > 0;

    let days = remaining / SECONDS_PER_DAY;
    remaining -= days * SECONDS_PER_DAY;
    let hours = remaining / SECONDS_PER_HOUR;
    remaining -= hours * SECONDS_PER_HOUR;
    let mins = remaining / SECONDS_PER_MINUTE;
    let secs = remaining - mins * SECONDS_PER_MINUTE;

    let mut result = String::new();
    if negative {
        result.push('-');
    }
    if days > 0 {
        result.push_str(&format!("{days}d "));
    }
    if hours > 0 {
        result.push_str(&format!("{hours}h "));
    }
    if mins > 0 {
        result.push_str(&format!("{mins}m "));
    }
    result.push_str(&format!("{secs}s"));
    result
}
