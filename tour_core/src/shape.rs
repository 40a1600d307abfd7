//! Collection shape policy for structural encoding.
//!
//! Absent collections are `Option<Vec<T>>` / `Option<M>` fields annotated
//! with `serialize_with = "shape::seq"` or `"shape::map"`. How an absent
//! collection is written (`[]`/`{}` or `null`) is decided by the
//! [`EncodeOptions`] active on the current thread, which [`encode`] installs
//! for the duration of one call.
//!
//! ```
//! use serde::Serialize;
//! use tour_core::shape::{self, EncodeOptions};
//!
//! #[derive(Serialize)]
//! struct Tags {
//!     #[serde(serialize_with = "shape::seq")]
//!     tags: Option<Vec<String>>,
//! }
//!
//! let tags = Tags { tags: None };
//! assert_eq!(shape::encode(&tags, &EncodeOptions::default()).unwrap(), r#"{"tags":[]}"#);
//! let nulls = EncodeOptions::default().with_nil_seq_as_null(true);
//! assert_eq!(shape::encode(&tags, &nulls).unwrap(), r#"{"tags":null}"#);
//! ```

use crate::error::CodecError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::cell::Cell;

/// Representation policy for absent collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Write absent sequences as `null` instead of `[]`
    pub nil_seq_as_null: bool,

    /// Write absent maps as `null` instead of `{}`
    pub nil_map_as_null: bool,
}

impl EncodeOptions {
    pub fn with_nil_seq_as_null(mut self, enabled: bool) -> Self {
        self.nil_seq_as_null = enabled;
        self
    }

    pub fn with_nil_map_as_null(mut self, enabled: bool) -> Self {
        self.nil_map_as_null = enabled;
        self
    }
}

thread_local! {
    static ACTIVE: Cell<EncodeOptions> = Cell::new(EncodeOptions::default());
}

/// Restores the previously active options on drop.
struct Scope {
    previous: EncodeOptions,
}

impl Scope {
    fn enter(options: EncodeOptions) -> Self {
        let previous = ACTIVE.with(|active| active.replace(options));
        Self { previous }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        ACTIVE.with(|active| active.set(self.previous));
    }
}

/// Options in effect on this thread.
pub fn active() -> EncodeOptions {
    ACTIVE.with(Cell::get)
}

/// Runs `f` with `options` active on this thread.
pub fn with_options<R>(options: &EncodeOptions, f: impl FnOnce() -> R) -> R {
    let _scope = Scope::enter(*options);
    f()
}

/// Encodes `value` as compact JSON under `options`.
pub fn encode<T>(value: &T, options: &EncodeOptions) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    Ok(with_options(options, || serde_json::to_string(value))?)
}

/// Encodes `value` as indented JSON under `options`.
pub fn encode_pretty<T>(value: &T, options: &EncodeOptions) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    Ok(with_options(options, || serde_json::to_string_pretty(value))?)
}

/// `serialize_with` helper for absent sequences.
pub fn seq<T, S>(value: &Option<Vec<T>>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(items) => items.serialize(serializer),
        None if active().nil_seq_as_null => serializer.serialize_none(),
        None => serializer.serialize_seq(Some(0))?.end(),
    }
}

/// `serialize_with` helper for absent maps.
pub fn map<M, S>(value: &Option<M>, serializer: S) -> Result<S::Ok, S::Error>
where
    M: Serialize,
    S: Serializer,
{
    match value {
        Some(entries) => entries.serialize(serializer),
        None if active().nil_map_as_null => serializer.serialize_none(),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use std::collections::BTreeMap;

    #[derive(Serialize, Default)]
    struct Bag {
        #[serde(serialize_with = "seq")]
        items: Option<Vec<u32>>,
        #[serde(serialize_with = "map")]
        meta: Option<BTreeMap<String, u32>>,
    }

    #[test]
    fn test_default_writes_empty_containers() {
        let out = encode(&Bag::default(), &EncodeOptions::default()).unwrap();
        assert_eq!(out, r#"{"items":[],"meta":{}}"#);
    }

    #[test]
    fn test_toggles_write_null() {
        let opts = EncodeOptions::default()
            .with_nil_seq_as_null(true)
            .with_nil_map_as_null(true);
        let out = encode(&Bag::default(), &opts).unwrap();
        assert_eq!(out, r#"{"items":null,"meta":null}"#);
    }

    #[test]
    fn test_toggles_are_independent() {
        let seq_only = EncodeOptions::default().with_nil_seq_as_null(true);
        assert_eq!(
            encode(&Bag::default(), &seq_only).unwrap(),
            r#"{"items":null,"meta":{}}"#
        );

        let map_only = EncodeOptions::default().with_nil_map_as_null(true);
        assert_eq!(
            encode(&Bag::default(), &map_only).unwrap(),
            r#"{"items":[],"meta":null}"#
        );
    }

    #[test]
    fn test_present_collections_unaffected() {
        let bag = Bag {
            items: Some(vec![]),
            meta: Some(BTreeMap::from([("k".to_string(), 1)])),
        };
        let opts = EncodeOptions::default()
            .with_nil_seq_as_null(true)
            .with_nil_map_as_null(true);
        assert_eq!(encode(&bag, &opts).unwrap(), r#"{"items":[],"meta":{"k":1}}"#);
    }

    #[test]
    fn test_options_restored_after_call() {
        let opts = EncodeOptions::default().with_nil_seq_as_null(true);
        encode(&Bag::default(), &opts).unwrap();
        assert_eq!(active(), EncodeOptions::default());
    }

    #[test]
    fn test_options_restored_after_failure() {
        struct Broken;
        impl Serialize for Broken {
            fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("broken"))
            }
        }

        let opts = EncodeOptions::default().with_nil_map_as_null(true);
        assert!(encode(&Broken, &opts).is_err());
        assert_eq!(active(), EncodeOptions::default());
    }

    #[test]
    fn test_nested_scopes() {
        let outer = EncodeOptions::default().with_nil_seq_as_null(true);
        let inner = EncodeOptions::default().with_nil_map_as_null(true);
        with_options(&outer, || {
            with_options(&inner, || assert_eq!(active(), inner));
            assert_eq!(active(), outer);
        });
    }
}
