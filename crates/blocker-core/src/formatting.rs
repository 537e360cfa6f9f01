/// Format a number of seconds as a compact human-readable duration.
///
/// * `< 60` seconds → `"45s"`
/// * whole minutes → `"2m"`
/// * otherwise → `"1m 15s"`
///
/// # Examples
///
/// ```
/// use blocker_core::formatting::format_seconds;
///
/// assert_eq!(format_seconds(0),   "0s");
/// assert_eq!(format_seconds(45),  "45s");
/// assert_eq!(format_seconds(120), "2m");
/// assert_eq!(format_seconds(75),  "1m 15s");
/// ```
pub fn format_seconds(seconds: u32) -> String {
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    let mins = seconds / 60;
    let secs = seconds % 60;
    if secs == 0 {
        format!("{}m", mins)
    } else {
        format!("{}m {}s", mins, secs)
    }
}

/// Format a countdown as `M:SS`.
///
/// # Examples
///
/// ```
/// use blocker_core::formatting::format_countdown;
///
/// assert_eq!(format_countdown(30),  "0:30");
/// assert_eq!(format_countdown(7),   "0:07");
/// assert_eq!(format_countdown(125), "2:05");
/// ```
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Calculate `(part / whole) * 100`, clamped to `[0, 100]`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use blocker_core::formatting::percentage;
///
/// assert!((percentage(5, 20) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(3, 0), 0.0);
/// assert_eq!(percentage(40, 20), 100.0);
/// ```
pub fn percentage(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    ((f64::from(part) / f64::from(whole)) * 100.0).min(100.0)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
