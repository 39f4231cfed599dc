//! Playback clock formatting
//!
//! Pure helpers for the transport display: the `mm:ss` clock and the
//! progress percentage. Neither ever fails; unusable input renders as zero.

/// Format seconds as a `mm:ss` clock.
///
/// Fractional seconds are floored, negative values clamp to zero and
/// non-finite input (NaN, ±Infinity) renders as `00:00`. Minutes are not
/// wrapped into hours.
///
/// # Examples
///
/// ```
/// use opcon_common::human_time::format_time;
///
/// assert_eq!(format_time(125.0), "02:05");
/// assert_eq!(format_time(59.9), "00:59");
/// assert_eq!(format_time(-5.0), "00:00");
/// assert_eq!(format_time(f64::NAN), "00:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "00:00".to_string();
    }
    let safe = seconds.floor().max(0.0) as u64;
    format!("{:02}:{:02}", safe / 60, safe % 60)
}

/// Percentage of `duration` reached at `position`.
///
/// Returns 0 whenever the duration is not a positive finite number, so the
/// caller never divides by zero.
///
/// # Examples
///
/// ```
/// use opcon_common::human_time::progress_percent;
///
/// assert_eq!(progress_percent(25.0, 100.0), 25.0);
/// assert_eq!(progress_percent(3.0, 0.0), 0.0);
/// ```
pub fn progress_percent(position: f64, duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 && position.is_finite() {
        position.max(0.0) / duration * 100.0
    } else {
        0.0
    }
}

/// `position / duration` clock label, e.g. `00:10 / 01:40`
pub fn format_clock_pair(position: f64, duration: f64) -> String {
    format!("{} / {}", format_time(position), format_time(duration))
}
