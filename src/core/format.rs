//! Human-readable formatting for the log table and stat widgets

use crate::time::Millis;

/// Display unit of transaction values.
pub const VALUE_UNIT: &str = "MON";

/// `1234567 -> "1.2M"`, `4321 -> "4.3K"`, smaller numbers as-is.
pub fn format_count(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{:.0}", n)
    }
}

/// `0x1234...abcd`
pub fn short_address(addr: &str) -> String {
    shorten(addr, 6, 4)
}

/// `0xabcd...ef0123`
pub fn short_hash(hash: &str) -> String {
    shorten(hash, 6, 6)
}

fn shorten(s: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= head + tail {
        return s.to_string();
    }
    let start: String = chars[..head].iter().collect();
    let end: String = chars[chars.len() - tail..].iter().collect();
    format!("{start}...{end}")
}

/// `"12.34 MON"`
pub fn format_value(value: f64) -> String {
    format!("{value:.2} {VALUE_UNIT}")
}

/// Relative age, e.g. `"just now"`, `"12s ago"`, `"3m ago"`.
pub fn time_ago(then: Millis, now: Millis) -> String {
    let secs = now.saturating_sub(then) / 1_000;
    match secs {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{secs}s ago"),
        60..=3_599 => format!("{}m ago", secs / 60),
        3_600..=86_399 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
