//! Demo runner - executes each demonstration and checks its output.

use crate::sandbox::Sandbox;
use crate::scenarios::DemoId;

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tour_core::chain::{affirmation_rule, verdict_rule};
use tour_core::records::{BinaryData, Event, Inventory, Person};
use tour_core::reflect::{legacy_assert, Dynamic};
use tour_core::shape;
use tour_core::{decode, nap_for, CodecError, DecodeOptions, EncodeOptions, EncoderChain, Item, NAP};
use tour_env::{EnvError, TaskGroup, TokioContext, TourContext};
use tracing::{debug, error, info};

/// Member names differ from `Person`'s fields only in letter case.
pub const PERSON_INPUT: &str = r#"{"firstname": "Bob", "AGE": 40}"#;

const SHARED_STATE_NOTE: &str =
    "Shared state reaches workers only through Arc<Mutex<_>>; unsynchronized writes do not compile";

/// Why a demonstration failed.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Unexpected {what}: got {actual}, expected {expected}")]
    Expectation {
        what: String,
        actual: String,
        expected: String,
    },
}

fn expect_eq<T: PartialEq + Debug>(what: &str, actual: &T, expected: &T) -> Result<(), DemoError> {
    if actual == expected {
        Ok(())
    } else {
        Err(DemoError::Expectation {
            what: what.to_string(),
            actual: format!("{:?}", actual),
            expected: format!("{:?}", expected),
        })
    }
}

/// Configuration for a demo run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Instant used by the time formats demo (None = now)
    pub fixed_time: Option<DateTime<Utc>>,

    /// Nap length for the virtual time demo
    pub nap: Duration,

    /// Units spawned by the task group demo
    pub workers: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fixed_time: None,
            nap: NAP,
            workers: 3,
        }
    }
}

/// Results from running a demonstration.
#[derive(Debug, Clone)]
pub struct DemoResult {
    /// Demonstration that was run
    pub demo: DemoId,

    /// Whether every expectation held
    pub passed: bool,

    /// Human-readable lines produced
    pub output: Vec<String>,

    /// Wall-clock run time
    pub elapsed: Duration,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Runs demonstrations.
pub struct DemoRunner {
    config: DemoConfig,
}

impl DemoRunner {
    /// Creates a new demo runner.
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }

    /// Pins the instant used by the time formats demo.
    pub fn with_fixed_time(mut self, at: DateTime<Utc>) -> Self {
        self.config.fixed_time = Some(at);
        self
    }

    /// Sets the task group size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Sets the virtual nap length.
    pub fn with_nap(mut self, nap: Duration) -> Self {
        self.config.nap = nap;
        self
    }

    /// Runs every demonstration in order.
    pub fn run_all(&self) -> Vec<DemoResult> {
        DemoId::all().into_iter().map(|demo| self.run(demo)).collect()
    }

    /// Runs a demonstration and returns the result.
    pub fn run(&self, demo: DemoId) -> DemoResult {
        info!("Starting demo: {}", demo.name());
        debug!("  {}", demo.description());

        let started = Instant::now();
        let mut output = Vec::new();
        let outcome = match demo {
            DemoId::VirtualTime => self.run_virtual_time(&mut output),
            DemoId::FallbackChain => self.run_fallback_chain(&mut output),
            DemoId::CollectionShape => self.run_collection_shape(&mut output),
            DemoId::CaseFolding => self.run_case_folding(&mut output),
            DemoId::BinaryFormats => self.run_binary_formats(&mut output),
            DemoId::TimeFormats => self.run_time_formats(&mut output),
            DemoId::TaskGroup => self.run_task_group(&mut output),
            DemoId::TypeAssert => self.run_type_assert(&mut output),
        };
        let elapsed = started.elapsed();

        let failure_reason = match outcome {
            Ok(()) => None,
            Err(err) => {
                error!("Demo {} failed: {}", demo.name(), err);
                Some(err.to_string())
            }
        };

        DemoResult {
            demo,
            passed: failure_reason.is_none(),
            output,
            elapsed,
            failure_reason,
        }
    }

    /// DEMO-001: a nap on the paused clock, then a quiescence wait.
    fn run_virtual_time(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let nap = self.config.nap;
        let wall = Instant::now();

        let (slept, seen) = Sandbox::new().run(|ctx| async move {
            let start = ctx.now();
            nap_for(&ctx, nap).await;
            let slept = ctx.now() - start;

            let done = Arc::new(AtomicBool::new(false));
            let flag = done.clone();
            ctx.spawn("setter", async move {
                flag.store(true, Ordering::SeqCst);
            });
            ctx.wait().await;

            (slept, done.load(Ordering::SeqCst))
        })?;
        let wall = wall.elapsed();

        out.push(format!(
            "Virtual nap of {:?}: {:?} virtual, {:?} wall clock",
            nap, slept, wall
        ));
        out.push(format!("Spawned task done after wait: {}", seen));

        expect_eq("task visibility after wait", &seen, &true)?;
        expect_eq("virtual clock covers nap", &(slept >= nap), &true)?;
        if nap >= Duration::from_secs(1) {
            expect_eq("nap finished before wall clock caught up", &(wall < nap), &true)?;
        }
        Ok(())
    }

    /// DEMO-002: verdict and affirmation rules ahead of the default.
    fn run_fallback_chain(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let chain = EncoderChain::new()
            .with_rule(verdict_rule())
            .join(EncoderChain::new().with_rule(affirmation_rule()));
        let items = [
            Item::from(true),
            Item::from("off"),
            Item::from("no"),
            Item::from("hello"),
        ];

        let data = chain.encode(&items)?;
        out.push(data.clone());

        expect_eq("chain output", &data.as_str(), &r#"["Oh yeah!","off","🤨","hello"]"#)
    }

    /// DEMO-003: absent collections, default vs null.
    fn run_collection_shape(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let inventory = Inventory::default();

        let b1 = shape::encode(&inventory, &EncodeOptions::default())?;
        out.push(format!("Default (absent -> {{}} or []): {}", b1));

        let nulls = EncodeOptions::default()
            .with_nil_seq_as_null(true)
            .with_nil_map_as_null(true);
        let b2 = shape::encode(&inventory, &nulls)?;
        out.push(format!("With options (absent -> null): {}", b2));

        expect_eq("default shape", &b1.as_str(), &r#"{"items":[],"meta":{}}"#)?;
        expect_eq("null shape", &b2.as_str(), &r#"{"items":null,"meta":null}"#)
    }

    /// DEMO-004: exact, strict and folded field matching.
    fn run_case_folding(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let p1: Person = decode(PERSON_INPUT, &DecodeOptions::default())?;
        out.push(format!("Default decode: {:?}", p1));

        let strict = DecodeOptions::default().with_reject_unknown(true);
        match decode::<Person>(PERSON_INPUT, &strict) {
            Err(err) => out.push(format!("Strict decode error: {}", err)),
            Ok(person) => {
                return Err(DemoError::Expectation {
                    what: "strict decode".to_string(),
                    actual: format!("{:?}", person),
                    expected: "an unknown field error".to_string(),
                })
            }
        }

        let folded = DecodeOptions::default().with_case_insensitive(true);
        let p2: Person = decode(PERSON_INPUT, &folded)?;
        out.push(format!("Case-insensitive decode: {:?}", p2));

        expect_eq(
            "default decode",
            &p1,
            &Person { first_name: String::new(), age: 40 },
        )?;
        expect_eq(
            "case-insensitive decode",
            &p2,
            &Person { first_name: "Bob".to_string(), age: 40 },
        )
    }

    /// DEMO-005: base64 vs array for the same kind of payload.
    fn run_binary_formats(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let bd = BinaryData {
            data: b"Hello".to_vec(),
            raw: b"World".to_vec(),
        };

        let b = shape::encode(&bd, &EncodeOptions::default())?;
        out.push(format!("Binary Data: {}", b));

        expect_eq(
            "binary output",
            &b.as_str(),
            &r#"{"data":"SGVsbG8=","raw":[87,111,114,108,100]}"#,
        )
    }

    /// DEMO-006: RFC 3339 text vs Unix seconds for the same instant.
    fn run_time_formats(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let at = self
            .config
            .fixed_time
            .unwrap_or_else(|| DateTime::<Utc>::from(TokioContext::new().system_time()));
        let event = Event::at("Meeting", at);

        let b = shape::encode(&event, &EncodeOptions::default())?;
        out.push(format!("Event JSON: {}", b));

        let value: serde_json::Value = serde_json::from_str(&b).map_err(CodecError::from)?;
        expect_eq("unix_ts", &value["unix_ts"].as_i64(), &Some(at.timestamp()))?;
        expect_eq(
            "timestamp",
            &value["timestamp"].as_str().map(str::to_string),
            &Some(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        )
    }

    /// DEMO-007: worker threads joined by completion guards.
    fn run_task_group(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let group = TaskGroup::new();

        for i in 0..self.config.workers {
            let lines = lines.clone();
            group.go(&format!("worker-{}", i), move || {
                lines
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(format!("worker-{}: rust is awesome", i));
            })?;
        }
        group.wait()?;

        let mut lines = std::mem::take(&mut *lines.lock().unwrap_or_else(PoisonError::into_inner));
        lines.sort();
        let finished = lines.len();
        out.extend(lines);
        out.push(SHARED_STATE_NOTE.to_string());

        expect_eq("finished workers", &finished, &self.config.workers)
    }

    /// DEMO-008: in-place type assertion vs the copying form.
    fn run_type_assert(&self, out: &mut Vec<String>) -> Result<(), DemoError> {
        let greeting = Dynamic::new(String::from("Hello, Rust!"));

        let (legacy, _) = legacy_assert::<String>(&greeting);
        out.push(format!("Old way: {}", legacy));

        let text = greeting.type_assert::<String>();
        match text {
            Some(text) => out.push(format!("New way (type_assert): {}", text)),
            None => out.push("Type assertion failed!".to_string()),
        }

        let number = Dynamic::new(123i64);
        let int = number.type_assert::<i64>();
        match int {
            Some(n) => out.push(format!("New way (type_assert) for i64: {}", n)),
            None => out.push("Integer type assertion failed!".to_string()),
        }

        let wrong = number.type_assert::<String>();
        if wrong.is_none() {
            out.push(format!("{} as String: assertion failed", number.type_name()));
        }

        expect_eq("legacy text", &legacy.as_str(), &"Hello, Rust!")?;
        expect_eq("asserted text", &text.map(String::as_str), &Some("Hello, Rust!"))?;
        expect_eq("asserted int", &int.copied(), &Some(123))?;
        expect_eq("mismatch", &wrong.is_none(), &true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn runner() -> DemoRunner {
        let at = Utc.with_ymd_and_hms(2025, 7, 16, 12, 45, 27).unwrap();
        DemoRunner::new(DemoConfig::default()).with_fixed_time(at)
    }

    #[test]
    fn test_all_demos_pass() {
        for result in runner().run_all() {
            assert!(result.passed, "{} failed: {:?}", result.demo, result.failure_reason);
            assert!(!result.output.is_empty());
        }
    }

    #[test]
    fn test_fallback_chain_output() {
        let result = runner().run(DemoId::FallbackChain);
        assert_eq!(result.output, vec![r#"["Oh yeah!","off","🤨","hello"]"#.to_string()]);
    }

    #[test]
    fn test_time_formats_with_fixed_time() {
        let result = runner().run(DemoId::TimeFormats);
        assert!(result.passed);
        let expected = concat!(
            r#"Event JSON: {"name":"Meeting","#,
            r#""timestamp":"2025-07-16T12:45:27Z","unix_ts":1752669927}"#,
        );
        assert_eq!(result.output, vec![expected.to_string()]);
    }

    #[test]
    fn test_virtual_time_is_fast() {
        let result = runner().with_nap(Duration::from_secs(3600)).run(DemoId::VirtualTime);
        assert!(result.passed, "{:?}", result.failure_reason);
        assert!(result.elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_case_folding_shows_strict_error() {
        let result = runner().run(DemoId::CaseFolding);
        assert!(result.passed);
        assert!(result.output.iter().any(|line| line.contains("Unknown field: firstname")));
    }

    #[test]
    fn test_task_group_scales_with_workers() {
        let result = runner().with_workers(8).run(DemoId::TaskGroup);
        assert!(result.passed);
        assert_eq!(
            result.output.iter().filter(|line| line.ends_with("rust is awesome")).count(),
            8
        );
    }
}
