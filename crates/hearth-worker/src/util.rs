use chrono::{DateTime, TimeZone, Utc};

use getrandom::fill;

pub fn now_ts() -> i64 {
    Utc::now().timestamp()
}

fn to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .unwrap_or_default()
}

pub fn ts_to_rfc3339(ts: i64) -> String {
    to_datetime(ts).to_rfc3339()
}

/// Short display date used by the web client, e.g. `07 Mar 26`.
pub fn ts_to_display_date(ts: i64) -> String {
    to_datetime(ts).format("%d %b %y").to_string()
}

/// Calendar date, e.g. `2026-03-07`.
pub fn ts_to_date(ts: i64) -> String {
    to_datetime(ts).format("%Y-%m-%d").to_string()
}

pub fn parse_rfc3339(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.timestamp())
}

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    // The OS RNG failing is not recoverable for token and salt generation.
    fill(&mut out).expect("Failed to generate random bytes");
    out
}

pub fn hex_encode(bytes: &[u8]) -> String {
    const LUT: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(LUT[(b >> 4) as usize] as char);
        out.push(LUT[(b & 0x0f) as usize] as char);
    }
    out
}

pub fn uuid_v4() -> String {
    let mut b = random_bytes(16);

    // Set version = 4.
    b[6] = (b[6] & 0x0f) | 0x40;
    // Set variant = RFC4122.
    b[8] = (b[8] & 0x3f) | 0x80;

    let hex = hex_encode(&b);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_has_v4_shape() {
        let id = uuid_v4();
        assert_eq!(id.len(), 36);
        assert_eq!(id.as_bytes()[14], b'4');
        assert_eq!(id.matches('-').count(), 4);
        assert_ne!(id, uuid_v4());
    }

    #[test]
    fn display_dates() {
        // 2026-03-07T12:00:00Z
        let ts = 1_772_884_800;
        assert_eq!(ts_to_display_date(ts), "07 Mar 26");
        assert_eq!(ts_to_date(ts), "2026-03-07");
        assert_eq!(parse_rfc3339("2026-03-07T12:00:00Z"), Some(ts));
        assert_eq!(parse_rfc3339("2026-03-07T14:00:00+02:00"), Some(ts));
        assert_eq!(parse_rfc3339("next tuesday"), None);
    }
}
