//! Suite execution across algorithms and sizes, plus CSV export.

use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use super::timer::{measure_variants, TimingConfig};
use crate::control_flow::switch_vs_table::code::{TrialError, FAN_OUTS, FIXTURE_LEN};
use crate::registry::{AlgorithmRunner, BenchmarkResult};

/// Everything needed to run a set of algorithms.
#[derive(Clone, Debug)]
pub struct SuiteConfig {
    /// Sizes (fan-outs) to measure, in display order
    pub sizes: Vec<usize>,
    /// Loop iterations performed by one timed execution
    pub budget: usize,
    pub timing: TimingConfig,
    /// Seed for the execution schedule shuffle
    pub seed: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            sizes: FAN_OUTS.to_vec(),
            budget: FIXTURE_LEN,
            timing: TimingConfig::default(),
            seed: super::bench::time_seed(),
        }
    }
}

/// Raw timing data for a single variant (used for CSV export)
///
/// `avg_nanos` and `median_nanos` are in the active measurement unit
/// (cycles or nanoseconds).
pub struct RawTimingData {
    pub algo_name: String,
    pub variant_name: String,
    pub input_size: usize,
    pub budget: usize,
    pub avg_nanos: u64,
    pub median_nanos: u64,
    pub result_sample: Option<f64>,
}

/// Results of a suite run: `results[algo][size]` holds one entry per variant.
pub struct SuiteResults {
    pub results: Vec<Vec<Vec<BenchmarkResult>>>,
    pub raw_data: Vec<RawTimingData>,
}

/// Run every algorithm at every size.
///
/// Each (algorithm, size) pair gets its own shuffled schedule; the seed is
/// advanced per pair so schedules differ while staying reproducible.
pub fn run_suite(
    algorithms: &[&dyn AlgorithmRunner],
    config: &SuiteConfig,
) -> Result<SuiteResults, TrialError> {
    let mut results = Vec::with_capacity(algorithms.len());
    let mut raw_data = Vec::new();
    let mut seed = config.seed;

    for algo in algorithms {
        let mut per_size = Vec::with_capacity(config.sizes.len());

        for &size in &config.sizes {
            let closures = algo.get_variant_closures(size, config.budget);
            if closures.is_empty() {
                warn!(algorithm = algo.name(), size, "no variants for size, skipping");
                per_size.push(Vec::new());
                continue;
            }

            info!(algorithm = algo.name(), size, budget = config.budget, "measuring");
            let variant_results = measure_variants(closures, config.budget, &config.timing, seed)?;
            seed = seed.wrapping_add(1);

            raw_data.extend(variant_results.iter().map(|r| RawTimingData {
                algo_name: algo.name().to_string(),
                variant_name: r.name.clone(),
                input_size: size,
                budget: config.budget,
                avg_nanos: r.avg_time.as_nanos() as u64,
                median_nanos: r.median_time.as_nanos() as u64,
                result_sample: r.result_sample,
            }));
            per_size.push(variant_results);
        }

        results.push(per_size);
    }

    Ok(SuiteResults { results, raw_data })
}

/// Export timing data to CSV file
pub fn export_csv(path: &Path, data: &[RawTimingData]) -> std::io::Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_csv(&mut file, data)?;
    file.flush()
}

fn write_csv<W: Write>(out: &mut W, data: &[RawTimingData]) -> std::io::Result<()> {
    writeln!(
        out,
        "algorithm,variant,compiler,fan_out,budget,avg_{unit},median_{unit},result",
        unit = super::bench::unit_name()
    )?;

    for entry in data {
        let compiler = if entry.variant_name.starts_with("c-") {
            super::C_COMPILER_NAME.unwrap_or("Unknown")
        } else {
            "rustc"
        };

        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            entry.algo_name,
            entry.variant_name,
            compiler,
            entry.input_size,
            entry.budget,
            entry.avg_nanos,
            entry.median_nanos,
            entry.result_sample.map(|v| v.to_string()).unwrap_or_default()
        )?;
    }

    Ok(())
}
