//! Runtime Tour CLI
//!
//! Run the tour's demonstrations and check their output.

use chrono::{TimeZone, Utc};
use clap::Parser;
use std::time::Duration;
use tour_sim::{DemoConfig, DemoId, DemoResult, DemoRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Runtime Tour demonstration runner
#[derive(Parser, Debug)]
#[command(name = "tour-sim")]
#[command(about = "Run the runtime tour demonstrations", long_about = None)]
struct Args {
    /// Demo to run (virtual_time, fallback_chain, collection_shape,
    /// case_folding, binary_formats, time_formats, task_group, type_assert, all)
    #[arg(short, long, default_value = "all")]
    demo: String,

    /// Pin the time formats demo to this Unix timestamp (seconds)
    #[arg(long)]
    fixed_time: Option<i64>,

    /// Virtual nap length in milliseconds
    #[arg(long, default_value = "5000")]
    nap_ms: u64,

    /// Number of task group workers
    #[arg(short, long, default_value = "3")]
    workers: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for demo output
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Runtime Tour v0.1.0");
    }

    // Parse demos
    let demos: Vec<DemoId> = if args.demo == "all" {
        DemoId::all()
    } else {
        vec![args.demo.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            let names: Vec<_> = DemoId::all().iter().map(|d| d.name()).collect();
            eprintln!("Available demos: {}, all", names.join(", "));
            std::process::exit(1);
        })]
    };

    let mut config = DemoConfig {
        nap: Duration::from_millis(args.nap_ms),
        workers: args.workers,
        ..Default::default()
    };
    if let Some(secs) = args.fixed_time {
        match Utc.timestamp_opt(secs, 0).single() {
            Some(at) => config.fixed_time = Some(at),
            None => {
                eprintln!("Error: --fixed-time {} is out of range", secs);
                std::process::exit(1);
            }
        }
    }

    let runner = DemoRunner::new(config);
    let results: Vec<DemoResult> = demos.iter().map(|demo| runner.run(*demo)).collect();
    let failed_count = results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": results.len(),
            "passed": results.len() - failed_count,
            "failed": failed_count,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "demo": r.demo.name(),
                    "passed": r.passed,
                    "elapsed_ms": r.elapsed.as_secs_f64() * 1000.0,
                    "output": r.output,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                error!("Failed to render summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        for result in &results {
            println!("── {} ──", result.demo.name());
            for line in &result.output {
                println!("{}", line);
            }
            if result.passed {
                info!("✓ {} PASSED ({:?})", result.demo.name(), result.elapsed);
            } else {
                error!(
                    "✗ {} FAILED: {}",
                    result.demo.name(),
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        if failed_count == 0 {
            info!("✅ All {} demos passed!", results.len());
        } else {
            error!("❌ {}/{} demos failed!", failed_count, results.len());
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
