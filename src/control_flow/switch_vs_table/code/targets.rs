//! Dispatch targets, function tables and `match` trials.
//!
//! Generated by `build.rs`: for each function set, 512 targets where target
//! `j` returns `x + j`, the table holding them, and for every fan-out an
//! exhaustive `match` over the first `N` targets plus its trial loop.

use super::fixtures::Selector;
use super::original::run_pattern;
use super::{DispatchFn, FunctionSet, TrialFn};

include!(concat!(env!("OUT_DIR"), "/switch_vs_table_targets.rs"));
