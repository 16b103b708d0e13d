//! Timestamp handling.
//!
//! Internally every entity stores time as epoch nanoseconds (`i64`); the
//! wire boundary (JSON sent/received over the RPC substrate) always uses
//! ISO-8601 UTC strings. Keeping the two representations distinct avoids
//! parsing round-trips inside hot paths like the alert monitor's tick loop.

use chrono::{DateTime, TimeZone, Utc};

/// Epoch nanoseconds since 1970-01-01T00:00:00Z.
pub type EpochNanos = i64;

pub fn now_nanos() -> EpochNanos {
    Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1_000)
}

pub fn nanos_to_iso(nanos: EpochNanos) -> String {
    let secs = nanos.div_euclid(1_000_000_000);
    let subsec_nanos = nanos.rem_euclid(1_000_000_000) as u32;
    Utc.timestamp_opt(secs, subsec_nanos)
        .single()
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn iso_to_nanos(iso: &str) -> Option<EpochNanos> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .and_then(|dt| dt.timestamp_nanos_opt())
}

pub fn now_iso() -> String {
    nanos_to_iso(now_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_iso() {
        let n = now_nanos();
        let iso = nanos_to_iso(n);
        let back = iso_to_nanos(&iso).unwrap();
        // millisecond precision on the wire, so allow < 1ms drift
        assert!((n - back).abs() < 1_000_000);
    }
}
