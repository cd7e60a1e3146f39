//! Display helpers shared by every page: quota, counters, latency, time.

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::config::DisplayConfig;

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How quota amounts are shown. Mirrors the `QuotaPerUnit` and
/// `DisplayInCurrencyEnabled` options of the gateway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaDisplay {
    pub quota_per_unit: f64,
    pub in_currency: bool,
}

impl QuotaDisplay {
    pub fn new(quota_per_unit: f64, in_currency: bool) -> Self {
        Self {
            quota_per_unit,
            in_currency,
        }
    }

    /// Converts raw quota into currency units.
    pub fn to_amount(&self, quota: i64) -> f64 {
        if self.quota_per_unit <= 0.0 {
            return 0.0;
        }
        quota as f64 / self.quota_per_unit
    }
}

impl From<&DisplayConfig> for QuotaDisplay {
    fn from(cfg: &DisplayConfig) -> Self {
        Self::new(cfg.quota_per_unit, cfg.display_in_currency)
    }
}

impl Default for QuotaDisplay {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

pub fn render_quota(quota: i64, display: &QuotaDisplay, digits: usize) -> String {
    if display.in_currency {
        format!("${:.*}", digits, display.to_amount(quota))
    } else {
        render_number(quota)
    }
}

/// Log-line form used by the gateway for consumption records.
pub fn log_quota(quota: i64, display: &QuotaDisplay) -> String {
    if display.in_currency {
        format!("＄{:.6} credits", display.to_amount(quota))
    } else {
        format!("{} credits", quota)
    }
}

/// Abbreviates large counters: 12_345 -> "12.3k", 2_500_000 -> "2.5M".
pub fn render_number(n: i64) -> String {
    let abs = n.unsigned_abs() as f64;
    let sign = if n < 0 { "-" } else { "" };
    if abs >= 1e9 {
        format!("{}{:.1}B", sign, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}{:.1}M", sign, abs / 1e6)
    } else if abs >= 1e4 {
        format!("{}{:.1}k", sign, abs / 1e3)
    } else {
        n.to_string()
    }
}

/// Latency buckets used to colour a channel's last test result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTimeClass {
    NotTested,
    Fast,
    Normal,
    Slow,
    VerySlow,
}

impl ResponseTimeClass {
    pub fn of(ms: i64) -> Self {
        match ms {
            0 => ResponseTimeClass::NotTested,
            t if t <= 1000 => ResponseTimeClass::Fast,
            t if t <= 3000 => ResponseTimeClass::Normal,
            t if t <= 5000 => ResponseTimeClass::Slow,
            _ => ResponseTimeClass::VerySlow,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ResponseTimeClass::NotTested => "grey",
            ResponseTimeClass::Fast => "green",
            ResponseTimeClass::Normal => "lime",
            ResponseTimeClass::Slow => "yellow",
            ResponseTimeClass::VerySlow => "red",
        }
    }
}

pub fn render_response_time(ms: i64) -> String {
    match ResponseTimeClass::of(ms) {
        ResponseTimeClass::NotTested => "Not Tested".to_string(),
        _ => format!("{:.2} sec", ms as f64 / 1000.0),
    }
}

/// Formats a unix timestamp (seconds) in local time. Zero renders as "-".
pub fn timestamp_to_string(ts: i64) -> String {
    if ts == 0 {
        return "-".to_string();
    }
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format(TIME_FORMAT).to_string(),
        None => ts.to_string(),
    }
}

/// Parses `YYYY-MM-DD HH:MM:SS` in local time into unix seconds.
pub fn parse_timestamp(s: &str) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Drops exactly one trailing `/`.
pub fn remove_trailing_slash(s: &str) -> String {
    s.strip_suffix('/').unwrap_or(s).to_string()
}

pub fn verify_json(s: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(s).is_ok()
}

/// Re-indents a JSON document with two spaces; returns the input unchanged
/// when it does not parse.
pub fn pretty_json(s: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(v) => serde_json::to_string_pretty(&v).unwrap_or_else(|_| s.to_string()),
        Err(_) => s.to_string(),
    }
}

/// Splits a comma list, treating the empty string as an empty list.
pub fn split_list(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(',').map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_renders_as_currency_or_number() {
        let currency = QuotaDisplay::new(500_000.0, true);
        assert_eq!(render_quota(1_000_000, &currency, 2), "$2.00");
        let raw = QuotaDisplay::new(500_000.0, false);
        assert_eq!(render_quota(1_000_000, &raw, 2), "1.0M");
        assert_eq!(render_quota(999, &raw, 2), "999");
    }

    #[test]
    fn log_quota_formats() {
        assert_eq!(log_quota(250_000, &QuotaDisplay::new(500_000.0, true)), "＄0.500000 credits");
        assert_eq!(log_quota(250_000, &QuotaDisplay::new(500_000.0, false)), "250000 credits");
    }

    #[test]
    fn number_abbreviations() {
        assert_eq!(render_number(9_999), "9999");
        assert_eq!(render_number(12_345), "12.3k");
        assert_eq!(render_number(3_000_000_000), "3.0B");
        assert_eq!(render_number(-25_000), "-25.0k");
    }

    #[test]
    fn response_time_buckets() {
        assert_eq!(render_response_time(0), "Not Tested");
        assert_eq!(ResponseTimeClass::of(1000), ResponseTimeClass::Fast);
        assert_eq!(ResponseTimeClass::of(1001), ResponseTimeClass::Normal);
        assert_eq!(ResponseTimeClass::of(5000), ResponseTimeClass::Slow);
        assert_eq!(ResponseTimeClass::of(5001).color(), "red");
        assert_eq!(render_response_time(1234), "1.23 sec");
    }

    #[test]
    fn timestamps_round_trip_in_local_time() {
        let ts = parse_timestamp("2024-05-01 12:30:00").unwrap();
        assert_eq!(timestamp_to_string(ts), "2024-05-01 12:30:00");
        assert!(parse_timestamp("yesterday").is_none());
        assert_eq!(timestamp_to_string(0), "-");
    }

    #[test]
    fn trailing_slash_and_lists() {
        assert_eq!(remove_trailing_slash("https://a.b/"), "https://a.b");
        assert_eq!(remove_trailing_slash("https://a.b"), "https://a.b");
        assert!(split_list("").is_empty());
        assert_eq!(split_list("a,b"), vec!["a", "b"]);
    }

    #[test]
    fn json_helpers() {
        assert!(verify_json("{\"gpt-4\": 15}"));
        assert!(!verify_json("{gpt-4: 15"));
        assert_eq!(pretty_json("{\"a\":1}"), "{\n  \"a\": 1\n}");
        assert_eq!(pretty_json("nope"), "nope");
    }
}
