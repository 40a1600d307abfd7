//! Structural decoding with configurable field-name matching.
//!
//! Input members are matched to the target's serialized field names before
//! serde sees them. Exact matches always win. Folded (case-insensitive)
//! matching applies to every field when [`DecodeOptions::match_case_insensitive`]
//! is set, and to the fields a type lists in [`Schema::FOLDED`] regardless.

use crate::error::CodecError;
use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde_json::{Map, Value};
use tracing::debug;

/// A decode target with per-field matching policy.
pub trait Schema: DeserializeOwned {
    /// Fields that always match case-insensitively.
    const FOLDED: &'static [&'static str] = &[];
}

/// Global matching policy for one decode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Match every field name case-insensitively
    pub match_case_insensitive: bool,

    /// Fail on members that match no field instead of dropping them
    pub reject_unknown: bool,
}

impl DecodeOptions {
    pub fn with_case_insensitive(mut self, enabled: bool) -> Self {
        self.match_case_insensitive = enabled;
        self
    }

    pub fn with_reject_unknown(mut self, enabled: bool) -> Self {
        self.reject_unknown = enabled;
        self
    }
}

/// Deserializer that records the field list a derived struct asks for.
struct FieldProbe<'a> {
    fields: &'a mut Option<&'static [&'static str]>,
}

impl<'de> Deserializer<'de> for FieldProbe<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.fields = Some(fields);
        Err(de::Error::custom("field probe"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// Serialized field names of a derived struct, or `None` if `T` does not
/// deserialize as a plain struct (maps, enums, flattened structs).
pub fn field_names<T: DeserializeOwned>() -> Option<&'static [&'static str]> {
    let mut fields = None;
    let _ = T::deserialize(FieldProbe {
        fields: &mut fields,
    });
    fields
}

fn resolve_field(
    key: &str,
    fields: &'static [&'static str],
    folded: &[&str],
    fold_all: bool,
) -> Option<&'static str> {
    if let Some(field) = fields.iter().copied().find(|field| *field == key) {
        return Some(field);
    }
    let lowered = key.to_lowercase();
    fields
        .iter()
        .copied()
        .filter(|field| fold_all || folded.contains(field))
        .find(|field| field.to_lowercase() == lowered)
}

fn resolve_members(
    members: Map<String, Value>,
    fields: &'static [&'static str],
    folded: &[&str],
    options: &DecodeOptions,
) -> Result<Map<String, Value>, CodecError> {
    let mut resolved = Map::new();
    for (key, value) in members {
        let field = match resolve_field(&key, fields, folded, options.match_case_insensitive) {
            Some(field) => field,
            None if options.reject_unknown => return Err(CodecError::UnknownField(key)),
            None => {
                debug!(member = %key, "dropping unmatched member");
                continue;
            }
        };
        if resolved.contains_key(field) {
            return Err(CodecError::DuplicateField(field.to_string()));
        }
        resolved.insert(field.to_string(), value);
    }
    Ok(resolved)
}

/// Decodes `text` into `T` under `options`.
pub fn decode<T: Schema>(text: &str, options: &DecodeOptions) -> Result<T, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let value = match (value, field_names::<T>()) {
        (Value::Object(members), Some(fields)) => {
            Value::Object(resolve_members(members, fields, T::FOLDED, options)?)
        }
        (other, _) => other,
    };
    Ok(serde_json::from_value(value)?)
}
