//! Rust trial loops.
//!
//! Every trial function is `#[inline(never)]` so it shows up as one
//! measurable unit, while [`run_pattern`] is `#[inline(always)]` so the
//! access pattern, the fan-out and (for `match` dispatch) the targets are all
//! known at compile time inside each trial.
//!
//! The `match` trials are generated in [`super::targets`]; the table trials
//! are generic over the fan-out here, since their body does not depend on
//! the number of arms.

use super::fixtures::Selector;
use super::{targets, FunctionSet, Mechanism, TrialFn};

/// The measurement loop: `acc += dispatch(select(i), i)` for `i` in `0..budget`.
#[inline(always)]
pub fn run_pattern<D>(selector: Selector<'_>, fan_out: usize, budget: usize, dispatch: D) -> i64
where
    D: Fn(usize, i64) -> i64,
{
    let mut acc: i64 = 0;
    match selector.inputs() {
        None => {
            for i in 0..budget {
                acc = acc.wrapping_add(dispatch(i % fan_out, i as i64));
            }
        }
        Some(inputs) => {
            for i in 0..budget {
                let k = (inputs[i % inputs.len()] % fan_out as u64) as usize;
                acc = acc.wrapping_add(dispatch(k, i as i64));
            }
        }
    }
    acc
}

#[inline(never)]
fn table_minimal_trial<const N: usize>(selector: Selector<'_>, budget: usize) -> i64 {
    let table = FunctionSet::Minimal.table();
    run_pattern(selector, N, budget, |k, x| table[k](x))
}

#[inline(never)]
fn table_no_inline_trial<const N: usize>(selector: Selector<'_>, budget: usize) -> i64 {
    let table = FunctionSet::NoInline.table();
    run_pattern(selector, N, budget, |k, x| table[k](x))
}

macro_rules! table_trial_lookup {
    ($set:expr, $fan_out:expr; $($n:literal),+) => {
        match ($set, $fan_out) {
            $(
                (FunctionSet::Minimal, $n) => Some(table_minimal_trial::<$n> as TrialFn),
                (FunctionSet::NoInline, $n) => Some(table_no_inline_trial::<$n> as TrialFn),
            )+
            _ => None,
        }
    };
}

/// Function-pointer table trial for a set and fan-out.
pub fn table_trial(set: FunctionSet, fan_out: usize) -> Option<TrialFn> {
    table_trial_lookup!(set, fan_out; 4, 8, 16, 32, 64, 128, 256, 512)
}

/// `match` trial for a set and fan-out.
pub fn switch_trial(set: FunctionSet, fan_out: usize) -> Option<TrialFn> {
    targets::switch_trial(set, fan_out)
}

/// Trial function for a mechanism, set and fan-out, or `None` for an unsupported fan-out.
pub fn trial_fn(mechanism: Mechanism, set: FunctionSet, fan_out: usize) -> Option<TrialFn> {
    match mechanism {
        Mechanism::Switch => switch_trial(set, fan_out),
        Mechanism::Table => table_trial(set, fan_out),
    }
}
