//! # Switch vs Table Dispatch
//!
//! Compares a dense `match` (one arm per target, each arm calling a distinct
//! function) against an array of function pointers indexed by the same
//! selector, for fan-outs from 4 to 512.
//!
//! ## Key Concepts
//!
//! - **Switch**: the compiler sees every target, so it can lower the `match`
//!   to a jump table and inline small bodies into the arms.
//! - **Table**: one bounds-checked load and one indirect call; the target is
//!   never statically known, so nothing can be inlined.
//!
//! ## Access Patterns
//!
//! - `sequential`: `k = i mod N`, perfectly predictable
//! - `ascending`: the same stream read through a 4096-entry fixture
//! - `random`: a seeded random fixture, defeats branch prediction
//!
//! ## Function Sets
//!
//! - `minimal`: `#[inline]` bodies, the switch may inline them
//! - `noinline`: the same bodies behind `#[inline(never)]`, isolating the
//!   cost of dispatch alone
//!
//! Every variant of a trial computes the same accumulator; only timing differs.

pub mod code;
pub mod test;

use crate::registry::{AlgorithmRunner, VariantClosure};
use code::{fixtures, run_trial_with, AccessPattern, FunctionSet, TrialId, FAN_OUTS};

/// Runs one (access pattern, function set) slice of the benchmark.
///
/// The problem size is the fan-out; variants are the dispatch mechanisms on
/// every available backend.
pub struct SwitchVsTableRunner {
    pattern: AccessPattern,
    set: FunctionSet,
}

impl SwitchVsTableRunner {
    pub fn new(pattern: AccessPattern, set: FunctionSet) -> Self {
        Self { pattern, set }
    }

    pub fn pattern(&self) -> AccessPattern {
        self.pattern
    }

    pub fn set(&self) -> FunctionSet {
        self.set
    }
}

impl AlgorithmRunner for SwitchVsTableRunner {
    fn name(&self) -> &'static str {
        match (self.pattern, self.set) {
            (AccessPattern::Sequential, FunctionSet::Minimal) => "switch_vs_table_sequential_minimal",
            (AccessPattern::Sequential, FunctionSet::NoInline) => "switch_vs_table_sequential_noinline",
            (AccessPattern::Ascending, FunctionSet::Minimal) => "switch_vs_table_ascending_minimal",
            (AccessPattern::Ascending, FunctionSet::NoInline) => "switch_vs_table_ascending_noinline",
            (AccessPattern::Random, FunctionSet::Minimal) => "switch_vs_table_random_minimal",
            (AccessPattern::Random, FunctionSet::NoInline) => "switch_vs_table_random_noinline",
        }
    }

    fn category(&self) -> &'static str {
        "control_flow"
    }

    fn description(&self) -> &'static str {
        match self.pattern {
            AccessPattern::Sequential => {
                "match vs fn-pointer table, sequential selectors (optimal cache friendliness)"
            }
            AccessPattern::Ascending => {
                "match vs fn-pointer table, ascending fixture selectors (moderate cache friendliness)"
            }
            AccessPattern::Random => {
                "match vs fn-pointer table, random fixture selectors (poor cache friendliness)"
            }
        }
    }

    fn available_variants(&self) -> Vec<&'static str> {
        code::get_variants().iter().map(|v| v.name).collect()
    }

    fn get_variant_closures<'a>(&'a self, size: usize, budget: usize) -> Vec<VariantClosure<'a>> {
        if !FAN_OUTS.contains(&size) {
            tracing::warn!(
                algorithm = self.name(),
                size,
                supported = ?FAN_OUTS,
                "unsupported fan-out"
            );
            return Vec::new();
        }

        let fixtures = fixtures::global();

        code::get_variants()
            .into_iter()
            .filter_map(|v| {
                let kind = v.function;
                let id = TrialId::new(self.pattern, kind.mechanism, self.set, size).ok()?;

                Some(VariantClosure {
                    name: v.name,
                    description: v.description,
                    run: Box::new(move || {
                        // Timing inside closure - measures the whole trial loop
                        let (elapsed, accumulator) =
                            crate::measure!(run_trial_with(kind.backend, &id, fixtures, budget));
                        Ok((elapsed, Some(accumulator? as f64)))
                    }),
                })
            })
            .collect()
    }

    fn verify(&self) -> Result<(), String> {
        test::verify(self.pattern, self.set, fixtures::global())
    }
}
