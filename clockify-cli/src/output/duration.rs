use chrono::Duration;

/// `H:MM:SS`, negative durations shown as zero.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Hours with six decimals, e.g. `1.500000`.
pub fn format_hours(duration: Duration) -> String {
    let seconds = duration.num_seconds().max(0);
    format!("{:.6}", seconds as f64 / 3600.0)
}
