use chrono::{DateTime, Local, Utc};
use sha2::{Digest, Sha256};

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `dd/mm/yyyy`, the way the voucher prints dates.
pub fn date_en_gb(at: &DateTime<Local>) -> String {
    at.format("%d/%m/%Y").to_string()
}

pub fn time_en_gb(at: &DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_weight(value: f64) -> String {
    format!("{:.3}", value)
}

/// Numeric value of operator-typed text. Anything that is not a finite,
/// non-negative number counts as zero.
pub fn parse_or_zero(value: &str) -> f64 {
    match value.trim().replace(',', ".").parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed > 0.0 => parsed,
        _ => 0.0,
    }
}

/// Piece count of operator-typed text; fractional input keeps its integral part.
pub fn parse_count_or_zero(value: &str) -> u64 {
    let trimmed = value.trim();
    if let Ok(count) = trimmed.parse::<u64>() {
        return count;
    }
    parse_or_zero(trimmed).trunc() as u64
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn sanitize_filename(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.').to_string();
    if trimmed.is_empty() {
        "receipt".to_string()
    } else {
        trimmed
    }
}
