//! Human text rendering helpers shared by the commands.
//!
//! Color is applied through `colored`, which already downgrades to plain
//! text when stdout is not a TTY.

use chrono::NaiveDateTime;
use colored::Colorize;
use gerrit_api::types::{AccountInfo, ChangeInfo};

/// Gerrit timestamps come as `2026-01-02 10:20:30.000000000`; show them to
/// the minute. Unparseable input is passed through untouched.
pub fn short_date(ts: &str) -> String {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| ts.to_string())
}

/// Status tag with a stable width so change listings line up under grep.
pub fn status_tag(status: &str) -> String {
    let tag = format!("{status:<9}");
    match status {
        "NEW" => tag.green().to_string(),
        "MERGED" => tag.blue().to_string(),
        "ABANDONED" => tag.red().to_string(),
        _ => tag,
    }
}

/// One-line change summary: number, status, subject, owner.
pub fn change_line(change: &ChangeInfo) -> String {
    let owner = change
        .owner
        .as_ref()
        .map(AccountInfo::display)
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{:>8}  {}  {}  ({})",
        change.number,
        status_tag(&change.status),
        change.subject,
        owner
    )
}

/// Section header used by grouped listings.
pub fn section(title: &str) -> String {
    title.bold().to_string()
}

/// `label: value` detail line.
pub fn field(label: &str, value: &str) -> String {
    format!("{:<12} {}", format!("{label}:"), value)
}

#[cfg(test)]
mod tests {
    use super::short_date;

    #[test]
    fn gerrit_timestamps_are_shortened() {
        assert_eq!(
            short_date("2026-01-02 10:20:30.000000000"),
            "2026-01-02 10:20"
        );
        assert_eq!(short_date("2026-01-02 10:20:30"), "2026-01-02 10:20");
        assert_eq!(short_date("not a date"), "not a date");
    }
}
