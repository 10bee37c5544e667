use chrono::SecondsFormat;

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Open-ended JSON object (`config`, `file_metadata`, `build_config`).
///
/// Keys are strings, values are untyped. Interpretation belongs to the
/// upload handler and the build engine.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Render a timestamp as ISO-8601 / RFC 3339 in UTC, e.g.
/// `2024-05-01T12:30:00.000000Z`.
pub fn to_iso8601(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn iso8601_uses_utc_suffix_and_micros() {
        let ts = chrono::Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .single()
            .unwrap();
        assert_eq!(to_iso8601(&ts), "2024-05-01T12:30:00.000000Z");
    }

    #[test]
    fn iso8601_parses_back_to_same_instant() {
        let ts = chrono::Utc::now();
        let parsed = chrono::DateTime::parse_from_rfc3339(&to_iso8601(&ts)).unwrap();
        assert_eq!(parsed.timestamp_micros(), ts.timestamp_micros());
    }
}
