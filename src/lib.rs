//! # Dispatch Bench
//!
//! Micro-benchmarks comparing a dense `match` against a table of function
//! pointers, across fan-outs, selector access patterns and inlinability.

pub mod control_flow;
pub mod registry;
pub mod utils;

/// Re-export tui from utils
pub use utils::tui;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::control_flow::switch_vs_table::code::{
        fixtures, run_trial, run_trial_with, AccessPattern, Backend, Fixtures, FunctionSet,
        Mechanism, TrialError, TrialId, FAN_OUTS,
    };
    pub use crate::registry::{build_registry, AlgorithmRegistry, AlgorithmRunner};
    pub use crate::utils::{run_suite, PinStrategy, SuiteConfig, TimingConfig};
}
