//! Generic CLI for running the dispatch benchmarks.
//!
//! Usage:
//!   dispatch-bench                                # Run every algorithm
//!   dispatch-bench --list                         # List available algorithms
//!   dispatch-bench switch_vs_table_random         # Run algorithms matching a prefix
//!   dispatch-bench --sizes 4,64,512 --budget 8192 # Custom fan-outs and loop length
//!   dispatch-bench --verify                       # Cross-check all variants only

use std::path::PathBuf;

use clap::Parser;
use dispatch_bench::control_flow::switch_vs_table::code::{
    check_fan_out, fixtures, TrialError, FAN_OUTS, FIXTURE_LEN,
};
use dispatch_bench::registry::{build_registry, AlgorithmRunner};
use dispatch_bench::tui;
use dispatch_bench::utils::runner::export_csv;
use dispatch_bench::utils::{run_suite, time_seed, PinStrategy, SuiteConfig, TimingConfig};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum AppError {
    #[error("Algorithm '{name}' not found. Available: {available}")]
    UnknownAlgorithm { name: String, available: String },

    #[error("Algorithm '{name}' failed verification: {reason}")]
    Verification { name: &'static str, reason: String },

    #[error(transparent)]
    Trial(#[from] TrialError),
}

/// Match vs function-pointer table dispatch benchmarks
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// Algorithm name, or a prefix such as `switch_vs_table_random` (omit for all)
    algorithm: Option<String>,

    /// List all available algorithms
    #[arg(short, long)]
    list: bool,

    /// Comma-separated fan-outs to measure
    #[arg(long, value_delimiter = ',', value_parser = parse_fan_out, default_values_t = FAN_OUTS)]
    sizes: Vec<usize>,

    /// Loop iterations performed by one timed execution
    #[arg(short, long, default_value_t = FIXTURE_LEN)]
    budget: usize,

    /// Number of measurement runs per variant
    #[arg(short, long, default_value_t = 30)]
    runs: usize,

    /// Warmup executions per variant before measuring
    #[arg(long, default_value_t = 10)]
    warmup: usize,

    /// Seed for the execution schedule (default: time-based)
    #[arg(long, env = "DISPATCH_BENCH_SEED")]
    seed: Option<u64>,

    /// Seed for the random selector fixture
    #[arg(long, env = "DISPATCH_BENCH_FIXTURE_SEED", default_value_t = fixtures::DEFAULT_FIXTURE_SEED)]
    fixture_seed: u64,

    /// CPU pinning strategy during measurement
    #[arg(long, value_enum, default_value_t = PinStrategy::PerExecution)]
    pin: PinStrategy,

    /// Export raw timings to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Only verify that every variant computes the reference result
    #[arg(long)]
    verify: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_fan_out(s: &str) -> Result<usize, String> {
    let n: usize = s.trim().parse().map_err(|e| format!("invalid fan-out {s:?}: {e}"))?;
    check_fan_out(n).map_err(|e| format!("{e} (expected one of {FAN_OUTS:?})"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        error!(error = ?e, "benchmark aborted");
        std::process::exit(1);
    }
}

/// Build the process-wide fixtures from `--fixture-seed`, returning the active seed.
fn install_fixtures(args: &CliArgs) -> u64 {
    fixtures::init(args.fixture_seed);
    fixtures::global().seed()
}

fn run(args: CliArgs) -> Result<(), AppError> {
    install_fixtures(&args);
    let registry = build_registry();

    if args.list {
        tui::print_available_algorithms(&registry);
        return Ok(());
    }

    let algorithms: Vec<&dyn AlgorithmRunner> = match &args.algorithm {
        Some(name) => match registry.find(name) {
            Some(algo) => vec![algo],
            None => registry.matching(name),
        },
        None => registry.all().iter().map(|a| a.as_ref()).collect(),
    };

    if algorithms.is_empty() {
        return Err(AppError::UnknownAlgorithm {
            name: args.algorithm.unwrap_or_default(),
            available: registry.list_names().join(", "),
        });
    }

    if args.verify {
        for algo in &algorithms {
            algo.verify().map_err(|reason| AppError::Verification {
                name: algo.name(),
                reason,
            })?;
            println!("  ✅ Algorithm '{}' passed verification", algo.name());
        }
        return Ok(());
    }

    let config = SuiteConfig {
        sizes: args.sizes,
        budget: args.budget,
        timing: TimingConfig {
            runs_per_variant: args.runs,
            warmup_iterations: args.warmup,
            pin_strategy: args.pin,
        },
        seed: args.seed.unwrap_or_else(time_seed),
    };
    info!(
        seed = config.seed,
        fixture_seed = fixtures::global().seed(),
        "starting suite"
    );

    tui::print_header();
    let suite = run_suite(&algorithms, &config)?;

    if let Some(path) = &args.csv {
        match export_csv(path, &suite.raw_data) {
            Ok(()) => println!("  Raw data exported to: {}", path.display()),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to export CSV"),
        }
        println!();
    }

    tui::print_suite_results(&algorithms, &config.sizes, config.timing.runs_per_variant, &suite);

    println!("Note: Speedup is relative to the 'switch' variant.");
    Ok(())
}
