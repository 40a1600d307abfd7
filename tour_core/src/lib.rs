//! Runtime Tour Core - serialization, reflection and timing idioms
//!
//! This library collects the small idioms the tour demonstrates:
//! 1. **Fallback chains**: type-scoped encoding rules that may skip to the next rule
//! 2. **Shape policy**: absent collections as `[]`/`{}` or `null`, per call
//! 3. **Folding decode**: exact or case-insensitive field matching
//! 4. **Field formats**: binary and timestamp representations chosen per field
//! 5. **Type assertion**: exact-type extraction without an intermediate copy
//! 6. **Nap**: a context-driven sleep for real vs virtual clock comparisons

pub mod binary;
pub mod chain;
pub mod decode;
pub mod error;
pub mod nap;
pub mod records;
pub mod reflect;
pub mod shape;
pub mod timefmt;

// Re-export key types for convenience
pub use chain::{EncoderChain, Item, Outcome};
pub use decode::{decode, DecodeOptions, Schema};
pub use error::CodecError;
pub use nap::{nap, nap_for, NAP};
pub use reflect::{legacy_assert, type_assert, Dynamic};
pub use shape::EncodeOptions;
