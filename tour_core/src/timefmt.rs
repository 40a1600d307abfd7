//! Per-field timestamp representations for `DateTime<Utc>` fields.
//!
//! Text forms are RFC 3339; numeric forms are integer counts since the Unix
//! epoch and come straight from chrono's serde helpers.

pub use chrono::serde::ts_microseconds as unix_micro;
pub use chrono::serde::ts_milliseconds as unix_milli;
pub use chrono::serde::ts_nanoseconds as unix_nano;
pub use chrono::serde::ts_seconds as unix;

/// RFC 3339 at whole-second precision, always `Z`.
pub mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::parse_rfc3339(deserializer)
    }
}

/// RFC 3339 with as many fractional digits as the value needs.
pub mod rfc3339_nano {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::parse_rfc3339(deserializer)
    }
}

// Any offset is accepted and normalised to UTC.
fn parse_rfc3339<'de, D>(deserializer: D) -> Result<chrono::DateTime<chrono::Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::{de, Deserialize};

    let text = String::deserialize(deserializer)?;
    chrono::DateTime::parse_from_rfc3339(&text)
        .map(|time| time.with_timezone(&chrono::Utc))
        .map_err(de::Error::custom)
}
