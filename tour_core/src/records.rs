//! Record shapes used by the encoding demonstrations.

use crate::decode::Schema;
use crate::{binary, shape, timefmt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A list plus open-ended metadata, both possibly absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(serialize_with = "shape::seq", default)]
    pub items: Option<Vec<String>>,

    #[serde(serialize_with = "shape::map", default)]
    pub meta: Option<Map<String, Value>>,
}

/// A person; `age` matches case-insensitively regardless of options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(rename = "firstName")]
    pub first_name: String,

    pub age: u32,
}

impl Schema for Person {
    const FOLDED: &'static [&'static str] = &["age"];
}

/// The same kind of payload in two binary representations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryData {
    #[serde(with = "binary::base64")]
    pub data: Vec<u8>,

    #[serde(with = "binary::array")]
    pub raw: Vec<u8>,
}

/// A named event with one time as text and one as epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,

    #[serde(with = "timefmt::rfc3339")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "unix_ts", with = "timefmt::unix")]
    pub unix_epoch: DateTime<Utc>,
}

impl Event {
    /// Creates an event with both times set to `at`.
    pub fn at(name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            timestamp: at,
            unix_epoch: at,
        }
    }
}
