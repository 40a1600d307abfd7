//! Demonstration catalogue.

/// Demonstration identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoId {
    /// DEMO-001: Real vs virtual clock, plus quiescence wait
    VirtualTime,

    /// DEMO-002: Fallback-chained encoder rules
    FallbackChain,

    /// DEMO-003: Absent collections as empty vs null
    CollectionShape,

    /// DEMO-004: Exact vs case-insensitive field matching
    CaseFolding,

    /// DEMO-005: Base64 text vs byte array per field
    BinaryFormats,

    /// DEMO-006: RFC 3339 text vs Unix seconds per field
    TimeFormats,

    /// DEMO-007: Task group with automatic completion
    TaskGroup,

    /// DEMO-008: Exact-type extraction without a copy
    TypeAssert,
}

impl DemoId {
    /// Returns a list of all demonstrations, in presentation order.
    pub fn all() -> Vec<DemoId> {
        vec![
            DemoId::VirtualTime,
            DemoId::FallbackChain,
            DemoId::CollectionShape,
            DemoId::CaseFolding,
            DemoId::BinaryFormats,
            DemoId::TimeFormats,
            DemoId::TaskGroup,
            DemoId::TypeAssert,
        ]
    }

    /// Returns the demonstration name.
    pub fn name(&self) -> &'static str {
        match self {
            DemoId::VirtualTime => "virtual_time",
            DemoId::FallbackChain => "fallback_chain",
            DemoId::CollectionShape => "collection_shape",
            DemoId::CaseFolding => "case_folding",
            DemoId::BinaryFormats => "binary_formats",
            DemoId::TimeFormats => "time_formats",
            DemoId::TaskGroup => "task_group",
            DemoId::TypeAssert => "type_assert",
        }
    }

    /// Returns a description of the demonstration.
    pub fn description(&self) -> &'static str {
        match self {
            DemoId::VirtualTime => "5s nap on a paused clock, then wait for a spawned task to park",
            DemoId::FallbackChain => "bool and text rules chained in front of the default encoder",
            DemoId::CollectionShape => {
                "absent list/map written as []/{} by default, null on request"
            }
            DemoId::CaseFolding => "decode {\"firstname\",\"AGE\"} with exact and folded matching",
            DemoId::BinaryFormats => "same bytes as base64 text and as an array of numbers",
            DemoId::TimeFormats => "same instant as RFC 3339 text and as Unix seconds",
            DemoId::TaskGroup => "worker threads joined through RAII completion guards",
            DemoId::TypeAssert => "borrow-in-place type assertion vs copy-then-downcast",
        }
    }
}

impl std::fmt::Display for DemoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for DemoId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "virtual_time" | "virtualtime" | "demo-001" => Ok(DemoId::VirtualTime),
            "fallback_chain" | "fallbackchain" | "demo-002" => Ok(DemoId::FallbackChain),
            "collection_shape" | "collectionshape" | "demo-003" => Ok(DemoId::CollectionShape),
            "case_folding" | "casefolding" | "demo-004" => Ok(DemoId::CaseFolding),
            "binary_formats" | "binaryformats" | "demo-005" => Ok(DemoId::BinaryFormats),
            "time_formats" | "timeformats" | "demo-006" => Ok(DemoId::TimeFormats),
            "task_group" | "taskgroup" | "demo-007" => Ok(DemoId::TaskGroup),
            "type_assert" | "typeassert" | "demo-008" => Ok(DemoId::TypeAssert),
            _ => Err(format!("Unknown demo: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("case_folding".parse::<DemoId>(), Ok(DemoId::CaseFolding));
        assert_eq!("TypeAssert".parse::<DemoId>(), Ok(DemoId::TypeAssert));
        assert_eq!("DEMO-001".parse::<DemoId>(), Ok(DemoId::VirtualTime));
    }

    #[test]
    fn test_unknown_name() {
        assert!("http_server".parse::<DemoId>().is_err());
    }

    #[test]
    fn test_names_parse_back() {
        for demo in DemoId::all() {
            assert_eq!(demo.to_string().parse::<DemoId>(), Ok(demo));
        }
    }
}
