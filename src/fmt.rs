//! Shared formatting helpers for resource rows and detail lines.
//!
//! All pure formatting functions (no ratatui styles, no UI layout) live here.
//! Functions that differ between compact table columns and verbose detail lines
//! are parameterized via [`FmtStyle`].

use chrono::Utc;

/// Controls compact (table columns) vs verbose (detail lines) output.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FmtStyle {
    /// Compact: no spaces, short suffixes ("1.5G", "3m5s")
    Compact,
    /// Detail: spaces, full suffixes ("1.5 GiB", "3m 5s")
    Detail,
}

/// Current wall clock as epoch seconds.
pub fn now_epoch() -> i64 {
    Utc::now().timestamp()
}

/// Format byte count as human-readable size.
///
/// Compact: `"1.5G"`, `"100.3M"`, `"50.0K"`, `"512B"`
/// Detail:  `"1.5 GiB"`, `"100.3 MiB"`, `"50.0 KiB"`, `"512 B"`
pub fn format_bytes(bytes: u64, style: FmtStyle) -> String {
    let (g, m, k, b) = match style {
        FmtStyle::Compact => ("G", "M", "K", "B"),
        FmtStyle::Detail => (" GiB", " MiB", " KiB", " B"),
    };
    let f = bytes as f64;
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0 * 1024.0), g)
    } else if bytes >= 1024 * 1024 {
        format!("{:.1}{}", f / (1024.0 * 1024.0), m)
    } else if bytes >= 1024 {
        format!("{:.1}{}", f / 1024.0, k)
    } else {
        format!("{}{}", bytes, b)
    }
}

/// Format duration in seconds as human-readable.
///
/// Compact: `"3m5s"` (no spaces, `"-"` for negative)
/// Detail:  `"3m 5s"` (with spaces, `"0s"` for `<= 0`)
pub fn format_duration(secs: i64, style: FmtStyle) -> String {
    match style {
        FmtStyle::Compact => {
            if secs < 0 {
                return "-".to_string();
            }
            if secs < 60 {
                format!("{}s", secs)
            } else if secs < 3600 {
                format!("{}m{}s", secs / 60, secs % 60)
            } else if secs < 86400 {
                format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
            } else {
                format!("{}d{}h", secs / 86400, (secs % 86400) / 3600)
            }
        }
        FmtStyle::Detail => {
            if secs <= 0 {
                return "0s".to_string();
            }
            if secs < 60 {
                format!("{}s", secs)
            } else if secs < 3600 {
                format!("{}m {}s", secs / 60, secs % 60)
            } else if secs < 86400 {
                format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
            } else {
                format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
            }
        }
    }
}

/// Format an epoch timestamp as age relative to `now`.
///
/// Returns `"-"` for a zero timestamp or a timestamp in the future.
pub fn format_age(epoch_secs: i64, now: i64, style: FmtStyle) -> String {
    if epoch_secs <= 0 {
        return "-".to_string();
    }
    let age = now.saturating_sub(epoch_secs);
    if age < 0 {
        return "-".to_string();
    }
    format_duration(age, style)
}

/// Format CPU in millicores: `"250m"`, `"1.50"` cores above one core.
pub fn format_millicores(millis: Option<u64>) -> String {
    match millis {
        None => "-".to_string(),
        Some(m) if m >= 1000 => format!("{:.2}", m as f64 / 1000.0),
        Some(m) => format!("{}m", m),
    }
}

/// Format optional memory in compact byte units, `"-"` when unknown.
pub fn format_opt_bytes(bytes: Option<u64>) -> String {
    bytes
        .map(|b| format_bytes(b, FmtStyle::Compact))
        .unwrap_or_else(|| "-".to_string())
}

/// Format `used / total` as a percentage, `"-"` when either side is unknown.
pub fn format_percent(used: Option<u64>, total: Option<u64>) -> String {
    match (used, total) {
        (Some(u), Some(t)) if t > 0 => format!("{:.0}%", u as f64 * 100.0 / t as f64),
        _ => "-".to_string(),
    }
}

/// Truncate string to max length (counted in chars), appending `..`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 2 {
        return s.chars().take(max_len).collect();
    }
    let head: String = s.chars().take(max_len - 2).collect();
    format!("{}..", head)
}
