//! [`CustomTime`]: the timestamp wrapper shared by every model.
//!
//! On the wire a timestamp is either an RFC3339 string or JSON `null`. The
//! zero value (no timestamp) always serializes back to `null`. The offset
//! sent by the server is kept as-is.

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A timestamp that may be absent.
///
/// Accepts RFC3339 with or without fractional seconds and with any UTC
/// offset. Anything else fails to decode.
///
/// Equality and ordering compare the instant, so `09:00Z` and `11:00+02:00`
/// are equal even though they render differently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomTime(Option<DateTime<FixedOffset>>);

impl CustomTime {
    /// The zero value. Serializes to `null`.
    pub const ZERO: CustomTime = CustomTime(None);

    pub fn new<Tz: TimeZone>(time: DateTime<Tz>) -> Self {
        Self(Some(time.fixed_offset()))
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Returns `true` when no timestamp is held.
    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        self.0.as_ref()
    }

    pub fn into_datetime(self) -> Option<DateTime<FixedOffset>> {
        self.0
    }

    /// The same instant in UTC.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.0.map(|t| t.with_timezone(&Utc))
    }

    /// Parses an RFC3339 string. Empty and malformed strings are rejected.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(Some(DateTime::parse_from_rfc3339(s)?)))
    }

    /// Renders the wire form: RFC3339 in the stored offset (`Z` for UTC),
    /// `None` for zero.
    pub fn to_rfc3339(&self) -> Option<String> {
        self.0
            .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl From<DateTime<Utc>> for CustomTime {
    fn from(time: DateTime<Utc>) -> Self {
        Self::new(time)
    }
}

impl From<DateTime<FixedOffset>> for CustomTime {
    fn from(time: DateTime<FixedOffset>) -> Self {
        Self(Some(time))
    }
}

impl From<Option<DateTime<Utc>>> for CustomTime {
    fn from(time: Option<DateTime<Utc>>) -> Self {
        time.map_or(Self::ZERO, Self::new)
    }
}

impl fmt::Display for CustomTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(s) => f.write_str(&s),
            None => f.write_str("null"),
        }
    }
}

impl Serialize for CustomTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_rfc3339() {
            Some(s) => serializer.serialize_str(&s),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for CustomTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(CustomTime::ZERO),
            Some(s) => CustomTime::parse(&s).map_err(|e| {
                de::Error::custom(format!("invalid RFC3339 timestamp {:?}: {}", s, e))
            }),
        }
    }
}
