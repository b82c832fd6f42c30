//! Algorithm registry for dynamic algorithm discovery and execution.
//!
//! This module provides a generic interface for registering and running
//! benchmark families without needing separate binary files for each.

use crate::control_flow::switch_vs_table::code::{AccessPattern, FunctionSet, TrialError};
use crate::utils::bench::Measurement;
use crate::utils::timer::VariantResult;

/// Result from running a variant benchmark (alias for VariantResult)
pub type BenchmarkResult = VariantResult;

/// Outcome of one timed execution: the measurement and an optional result value.
pub type RunOutcome = Result<(Measurement, Option<f64>), TrialError>;

/// A simple closure that runs one iteration of a variant
pub struct VariantClosure<'a> {
    pub name: &'static str,
    pub description: &'static str,
    /// Timing happens inside the closure to eliminate Fn trait overhead.
    pub run: Box<dyn FnMut() -> RunOutcome + 'a>,
}

/// Trait that all algorithm benchmarkers must implement
pub trait AlgorithmRunner: Send + Sync {
    /// Name of the algorithm (e.g., "switch_vs_table_random_minimal")
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Category (e.g., "control_flow")
    fn category(&self) -> &'static str;

    /// Get list of available variant names
    fn available_variants(&self) -> Vec<&'static str>;

    /// Get closures for each variant, ready to be measured.
    ///
    /// `size` is the problem size (the fan-out for dispatch benchmarks) and
    /// `budget` the number of loop iterations one execution performs. The
    /// runner will handle warmup, timing, and repetition.
    fn get_variant_closures<'a>(&'a self, size: usize, budget: usize) -> Vec<VariantClosure<'a>>;

    /// Verify correctness of all variants against the reference
    fn verify(&self) -> Result<(), String>;
}

/// Global registry of all algorithms
pub struct AlgorithmRegistry {
    algorithms: Vec<Box<dyn AlgorithmRunner>>,
}

impl AlgorithmRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// Register an algorithm
    pub fn register<A: AlgorithmRunner + 'static>(&mut self, algo: A) {
        self.algorithms.push(Box::new(algo));
    }

    /// Get all registered algorithms
    pub fn all(&self) -> &[Box<dyn AlgorithmRunner>] {
        &self.algorithms
    }

    /// Find algorithm by name
    pub fn find(&self, name: &str) -> Option<&dyn AlgorithmRunner> {
        self.algorithms
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    /// Algorithms whose name starts with `prefix` (e.g. "switch_vs_table_random")
    pub fn matching(&self, prefix: &str) -> Vec<&dyn AlgorithmRunner> {
        self.algorithms
            .iter()
            .filter(|a| a.name().starts_with(prefix))
            .map(|a| a.as_ref())
            .collect()
    }

    /// List algorithm names
    pub fn list_names(&self) -> Vec<&'static str> {
        self.algorithms.iter().map(|a| a.name()).collect()
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the default registry with all algorithms
pub fn build_registry() -> AlgorithmRegistry {
    use crate::control_flow::switch_vs_table::SwitchVsTableRunner;

    let mut registry = AlgorithmRegistry::new();

    for pattern in AccessPattern::ALL {
        for set in FunctionSet::ALL {
            registry.register(SwitchVsTableRunner::new(pattern, set));
        }
    }

    registry
}
