use chrono::{DateTime, SecondsFormat, Utc};

/// RFC 3339 with millisecond precision and a `Z` suffix, the format the CMS
/// and the CRM both write.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
