//! FFI bindings for the C implementation of switch_vs_table.
//!
//! The C trial loops are compiled by `build.rs` from `trial.c` and a
//! generated header of targets. They follow the same contract as the Rust
//! trials: a null input pointer means sequential selection.

use super::{Selector, TrialError, TrialId};

#[cfg(c_implementation_active)]
mod ffi {
    use super::super::{FunctionSet, Mechanism};

    pub(super) type CTrialFn = unsafe extern "C" fn(*const u64, usize, usize) -> i64;

    include!(concat!(env!("OUT_DIR"), "/switch_vs_table_c_trials.rs"));
}

/// Check if C implementations are available
#[cfg(c_implementation_active)]
pub const C_IMPL_AVAILABLE: bool = true;

#[cfg(not(c_implementation_active))]
pub const C_IMPL_AVAILABLE: bool = false;

/// Run one C trial and return the raw accumulator.
#[cfg(c_implementation_active)]
pub fn run(id: &TrialId, selector: Selector<'_>, budget: usize) -> Result<i64, TrialError> {
    let trial = ffi::c_trial(id.mechanism(), id.set(), id.fan_out())
        .ok_or(TrialError::UnsupportedFanOut(id.fan_out()))?;

    let (ptr, len) = match selector.inputs() {
        None => (std::ptr::null(), 0),
        Some(inputs) => (inputs.as_ptr(), inputs.len()),
    };

    // SAFETY: `ptr` is either null (sequential, never read) or points at
    // `len` initialised u64s borrowed for the duration of the call;
    // `Selector` guarantees `len > 0` for indexed inputs.
    Ok(unsafe { trial(ptr, len, budget) })
}

#[cfg(not(c_implementation_active))]
pub fn run(_id: &TrialId, _selector: Selector<'_>, _budget: usize) -> Result<i64, TrialError> {
    Err(TrialError::BackendUnavailable(super::Backend::C))
}
