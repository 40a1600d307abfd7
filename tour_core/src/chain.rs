//! Fallback-chained value encoding.
//!
//! An [`EncoderChain`] holds type-scoped rules in registration order. Each
//! rule either encodes an [`Item`] completely or answers [`Outcome::Skip`],
//! handing the item to the next rule. When every rule skips, the item's
//! default JSON encoding is used.

use crate::error::CodecError;
use serde_json::Value;
use tracing::trace;

/// Marker written for affirmative text.
pub const HAPPY: &str = "🙂";
/// Marker written for negative text.
pub const DOUBTFUL: &str = "🤨";
/// Marker written for boolean `true`.
pub const OH_YEAH: &str = "Oh yeah!";
/// Marker written for boolean `false`.
pub const OH_NO: &str = "Oh no!";

/// A dynamically typed value fed to the chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Text(String),
    Flag(bool),
    /// Anything else; only ever encoded by default.
    Other(Value),
}

impl Item {
    /// Encoding used when no rule claims the item.
    pub fn default_encoding(&self) -> Value {
        match self {
            Item::Text(text) => Value::String(text.clone()),
            Item::Flag(flag) => Value::Bool(*flag),
            Item::Other(value) => value.clone(),
        }
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Item::Text(text.to_string())
    }
}

impl From<String> for Item {
    fn from(text: String) -> Self {
        Item::Text(text)
    }
}

impl From<bool> for Item {
    fn from(flag: bool) -> Self {
        Item::Flag(flag)
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Other(value)
    }
}

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Encoded(Value),
    /// Not applicable; try the next rule.
    Skip,
}

/// A single encoding rule.
pub trait EncodeRule: Send + Sync {
    /// Rule name, used in logs and errors.
    fn name(&self) -> &str;

    /// Encodes `item` or skips it.
    fn apply(&self, item: &Item) -> Result<Outcome, CodecError>;
}

/// Rule that only sees [`Item::Text`].
pub struct TextRule<F> {
    name: String,
    encode: F,
}

impl<F> TextRule<F>
where
    F: Fn(&str) -> Result<Outcome, CodecError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, encode: F) -> Self {
        Self {
            name: name.into(),
            encode,
        }
    }
}

impl<F> EncodeRule for TextRule<F>
where
    F: Fn(&str) -> Result<Outcome, CodecError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, item: &Item) -> Result<Outcome, CodecError> {
        match item {
            Item::Text(text) => (self.encode)(text),
            _ => Ok(Outcome::Skip),
        }
    }
}

/// Rule that only sees [`Item::Flag`].
pub struct FlagRule<F> {
    name: String,
    encode: F,
}

impl<F> FlagRule<F>
where
    F: Fn(bool) -> Result<Outcome, CodecError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, encode: F) -> Self {
        Self {
            name: name.into(),
            encode,
        }
    }
}

impl<F> EncodeRule for FlagRule<F>
where
    F: Fn(bool) -> Result<Outcome, CodecError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, item: &Item) -> Result<Outcome, CodecError> {
        match item {
            Item::Flag(flag) => (self.encode)(*flag),
            _ => Ok(Outcome::Skip),
        }
    }
}

/// Ordered list of encoding rules with a default fallback.
#[derive(Default)]
pub struct EncoderChain {
    rules: Vec<Box<dyn EncodeRule>>,
}

impl EncoderChain {
    /// Creates a chain with no rules (pure default encoding).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule.
    pub fn with_rule(mut self, rule: impl EncodeRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Appends a text rule built from a closure.
    pub fn with_text<F>(self, name: &str, encode: F) -> Self
    where
        F: Fn(&str) -> Result<Outcome, CodecError> + Send + Sync + 'static,
    {
        self.with_rule(TextRule::new(name, encode))
    }

    /// Appends a boolean rule built from a closure.
    pub fn with_flag<F>(self, name: &str, encode: F) -> Self
    where
        F: Fn(bool) -> Result<Outcome, CodecError> + Send + Sync + 'static,
    {
        self.with_rule(FlagRule::new(name, encode))
    }

    /// Appends all of `other`'s rules after this chain's rules.
    pub fn join(mut self, other: EncoderChain) -> Self {
        self.rules.extend(other.rules);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Encodes one item: first non-skipping rule wins.
    pub fn encode_item(&self, item: &Item) -> Result<Value, CodecError> {
        for rule in &self.rules {
            match rule.apply(item)? {
                Outcome::Encoded(value) => {
                    trace!(rule = rule.name(), "rule claimed item");
                    return Ok(value);
                }
                Outcome::Skip => continue,
            }
        }
        Ok(item.default_encoding())
    }

    /// Encodes a list of items as a compact JSON array.
    pub fn encode(&self, items: &[Item]) -> Result<String, CodecError> {
        let values = items
            .iter()
            .map(|item| self.encode_item(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(serde_json::to_string(&values)?)
    }
}

/// Maps `"true"`/`"yes"` to [`HAPPY`] and `"false"`/`"no"` to [`DOUBTFUL`].
pub fn affirmation_rule() -> impl EncodeRule {
    TextRule::new("affirmation", |text: &str| {
        Ok(match text {
            "yes" | "true" => Outcome::Encoded(Value::from(HAPPY)),
            "no" | "false" => Outcome::Encoded(Value::from(DOUBTFUL)),
            _ => Outcome::Skip,
        })
    })
}

/// Maps booleans to [`OH_YEAH`] / [`OH_NO`].
pub fn verdict_rule() -> impl EncodeRule {
    FlagRule::new("verdict", |flag: bool| {
        let marker = if flag { OH_YEAH } else { OH_NO };
        Ok(Outcome::Encoded(Value::from(marker)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn demo_chain() -> EncoderChain {
        EncoderChain::new()
            .with_rule(verdict_rule())
            .join(EncoderChain::new().with_rule(affirmation_rule()))
    }

    #[test]
    fn test_demo_list() {
        let items = vec![
            Item::from(true),
            Item::from("off"),
            Item::from("no"),
            Item::from("hello"),
        ];
        let out = demo_chain().encode(&items).unwrap();
        assert_eq!(out, r#"["Oh yeah!","off","🤨","hello"]"#);
    }

    #[test]
    fn test_marker_words() {
        let chain = demo_chain();
        for word in ["true", "yes"] {
            assert_eq!(chain.encode_item(&word.into()).unwrap(), json!(HAPPY));
        }
        for word in ["false", "no"] {
            assert_eq!(chain.encode_item(&word.into()).unwrap(), json!(DOUBTFUL));
        }
        assert_eq!(chain.encode_item(&true.into()).unwrap(), json!(OH_YEAH));
        assert_eq!(chain.encode_item(&false.into()).unwrap(), json!(OH_NO));
    }

    #[test]
    fn test_other_uses_default() {
        let chain = demo_chain();
        let item = Item::from(json!({"n": 1}));
        assert_eq!(chain.encode_item(&item).unwrap(), json!({"n": 1}));
    }

    #[test]
    fn test_registration_order_wins() {
        let chain = EncoderChain::new()
            .with_text("first", |_| Ok(Outcome::Encoded(json!(1))))
            .with_text("second", |_| Ok(Outcome::Encoded(json!(2))));
        assert_eq!(chain.encode_item(&"x".into()).unwrap(), json!(1));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_skip_falls_through_to_next_rule() {
        let chain = EncoderChain::new()
            .with_text("picky", |t| {
                Ok(if t == "a" {
                    Outcome::Encoded(json!("A"))
                } else {
                    Outcome::Skip
                })
            })
            .with_text("loud", |t| Ok(Outcome::Encoded(json!(t.to_uppercase()))));
        assert_eq!(chain.encode_item(&"a".into()).unwrap(), json!("A"));
        assert_eq!(chain.encode_item(&"b".into()).unwrap(), json!("B"));
    }

    #[test]
    fn test_rule_error_is_terminal() {
        let chain = EncoderChain::new()
            .with_flag("strict", |_| Err(CodecError::rule("strict", "no flags allowed")))
            .with_flag("lenient", |_| Ok(Outcome::Encoded(json!("ok"))));
        let err = chain.encode(&[Item::from("fine"), Item::from(true)]).unwrap_err();
        assert!(matches!(err, CodecError::Rule { ref rule, .. } if rule == "strict"));
    }

    #[test]
    fn test_empty_chain_is_default_encoding() {
        let chain = EncoderChain::new();
        assert!(chain.is_empty());
        assert_eq!(
            chain.encode(&[Item::from(true), Item::from("yes")]).unwrap(),
            r#"[true,"yes"]"#
        );
    }

    proptest! {
        #[test]
        fn prop_unmarked_text_passes_through(text in "\\PC*") {
            prop_assume!(!matches!(text.as_str(), "true" | "yes" | "false" | "no"));
            let encoded = demo_chain().encode_item(&Item::Text(text.clone())).unwrap();
            prop_assert_eq!(encoded, Value::String(text));
        }
    }
}
