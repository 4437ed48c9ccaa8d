/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp as an RFC 3339 string
///
/// All persisted order timestamps use this format so they can be parsed
/// back with `DateTime::parse_from_rfc3339` for report windows.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
