//! Implementation variants for the switch vs table comparison.
//!
//! A trial is identified by four labels: the access pattern that turns the
//! loop counter into a selector, the dispatch mechanism, the function set and
//! the fan-out. [`TrialId`] renders them as `pattern/mechanism/set/N`.

pub mod c_impl;
pub mod fixtures;
pub mod original;
pub mod targets;

use std::fmt;
use std::str::FromStr;

pub use fixtures::{Fixtures, Selector};

use crate::utils::VariantInfo;

/// Fan-outs measured by the benchmark.
pub const FAN_OUTS: [usize; 8] = [4, 8, 16, 32, 64, 128, 256, 512];

/// Number of targets in each function table.
pub const MAX_FAN_OUT: usize = 512;

/// Length of the ascending and random fixtures.
pub const FIXTURE_LEN: usize = 4096;

/// Signature shared by every dispatch target.
pub type DispatchFn = fn(i64) -> i64;

/// A complete measurement loop: runs `budget` iterations and returns the accumulator.
pub type TrialFn = fn(Selector<'_>, usize) -> i64;

/// Errors raised while identifying or running a trial.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrialError {
    /// The accumulator went negative, which the target domain rules out.
    #[error("trial {trial}: accumulator invariant violated ({accumulator} < 0)")]
    InvariantViolated { trial: String, accumulator: i64 },
    /// The fan-out is not one of [`FAN_OUTS`].
    #[error("unsupported fan-out: {0}")]
    UnsupportedFanOut(usize),
    /// A trial name did not have the `pattern/mechanism/set/N` shape.
    #[error("malformed trial name: {0:?}")]
    MalformedName(String),
    /// A label did not name a known pattern, mechanism or function set.
    #[error("unknown {kind} label: {label:?}")]
    UnknownLabel { kind: &'static str, label: String },
    /// An indexed selector was built from an empty slice.
    #[error("indexed selector needs at least one input")]
    EmptyInputs,
    /// The requested backend was not compiled into this binary.
    #[error("{0} backend is not available in this build")]
    BackendUnavailable(Backend),
}

/// Rule used to turn the loop counter into a selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessPattern {
    /// `k = i mod N`
    Sequential,
    /// `k = A[i mod |A|] mod N` over the ascending fixture
    Ascending,
    /// `k = R[i mod |R|] mod N` over the random fixture
    Random,
}

impl AccessPattern {
    pub const ALL: [AccessPattern; 3] = [Self::Sequential, Self::Ascending, Self::Random];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Ascending => "ascending",
            Self::Random => "random",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Sequential => "optimal cache friendliness (i mod N)",
            Self::Ascending => "moderate cache friendliness (ascending fixture read)",
            Self::Random => "poor cache friendliness (random fixture read)",
        }
    }
}

/// How the selector is turned into a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mechanism {
    /// Exhaustive `match` with one arm per target.
    Switch,
    /// Indexed load from a function-pointer table, then an indirect call.
    Table,
}

impl Mechanism {
    pub const ALL: [Mechanism; 2] = [Self::Switch, Self::Table];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Table => "table",
        }
    }
}

/// Which family of targets is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionSet {
    /// Small bodies the compiler may inline through the `match`.
    Minimal,
    /// Identical bodies marked `#[inline(never)]`.
    NoInline,
}

impl FunctionSet {
    pub const ALL: [FunctionSet; 2] = [Self::Minimal, Self::NoInline];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::NoInline => "noinline",
        }
    }

    /// The function-pointer table for this set.
    pub fn table(self) -> &'static [DispatchFn; MAX_FAN_OUT] {
        match self {
            Self::Minimal => &targets::MINIMAL_FUNCS,
            Self::NoInline => &targets::NO_INLINE_FUNCS,
        }
    }
}

macro_rules! impl_label_parsing {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = TrialError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .into_iter()
                    .find(|v| v.label() == s)
                    .ok_or_else(|| TrialError::UnknownLabel {
                        kind: $kind,
                        label: s.to_string(),
                    })
            }
        }
    };
}

impl_label_parsing!(AccessPattern, "access pattern");
impl_label_parsing!(Mechanism, "mechanism");
impl_label_parsing!(FunctionSet, "function set");

/// Returns `Ok(fan_out)` if the fan-out is one of [`FAN_OUTS`].
pub fn check_fan_out(fan_out: usize) -> Result<usize, TrialError> {
    if FAN_OUTS.contains(&fan_out) {
        Ok(fan_out)
    } else {
        Err(TrialError::UnsupportedFanOut(fan_out))
    }
}

/// Fully qualified name of one measurable trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrialId {
    pattern: AccessPattern,
    mechanism: Mechanism,
    set: FunctionSet,
    fan_out: usize,
}

impl TrialId {
    pub fn new(
        pattern: AccessPattern,
        mechanism: Mechanism,
        set: FunctionSet,
        fan_out: usize,
    ) -> Result<Self, TrialError> {
        Ok(Self {
            pattern,
            mechanism,
            set,
            fan_out: check_fan_out(fan_out)?,
        })
    }

    /// Every combination, ordered by pattern, set, mechanism, then fan-out.
    pub fn all() -> Vec<TrialId> {
        let mut ids = Vec::with_capacity(
            AccessPattern::ALL.len() * FunctionSet::ALL.len() * Mechanism::ALL.len() * FAN_OUTS.len(),
        );
        for pattern in AccessPattern::ALL {
            for set in FunctionSet::ALL {
                for mechanism in Mechanism::ALL {
                    for fan_out in FAN_OUTS {
                        ids.push(TrialId {
                            pattern,
                            mechanism,
                            set,
                            fan_out,
                        });
                    }
                }
            }
        }
        ids
    }

    pub fn pattern(&self) -> AccessPattern {
        self.pattern
    }

    pub fn mechanism(&self) -> Mechanism {
        self.mechanism
    }

    pub fn set(&self) -> FunctionSet {
        self.set
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }
}

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.pattern, self.mechanism, self.set, self.fan_out
        )
    }
}

impl FromStr for TrialId {
    type Err = TrialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        let [pattern, mechanism, set, fan_out] = parts.as_slice() else {
            return Err(TrialError::MalformedName(s.to_string()));
        };
        let fan_out = fan_out
            .parse()
            .map_err(|_| TrialError::MalformedName(s.to_string()))?;

        TrialId::new(pattern.parse()?, mechanism.parse()?, set.parse()?, fan_out)
    }
}

/// Which compiler produced the trial loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Rust,
    C,
}

impl Backend {
    /// Backends compiled into this binary.
    pub fn available() -> Vec<Backend> {
        if c_impl::C_IMPL_AVAILABLE {
            vec![Backend::Rust, Backend::C]
        } else {
            vec![Backend::Rust]
        }
    }

    /// Variant name used in result tables for a mechanism on this backend.
    pub const fn variant_name(self, mechanism: Mechanism) -> &'static str {
        match (self, mechanism) {
            (Backend::Rust, Mechanism::Switch) => "switch",
            (Backend::Rust, Mechanism::Table) => "table",
            (Backend::C, Mechanism::Switch) => "c-switch",
            (Backend::C, Mechanism::Table) => "c-table",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Rust => f.write_str("Rust"),
            Backend::C => f.write_str("C"),
        }
    }
}

/// The sign check that keeps the measurement loop observable.
///
/// Every target returns `input + j` with non-negative operands, so a negative
/// accumulator can only mean the loop was miscompiled or the targets changed.
#[inline]
pub fn check_accumulator(id: &TrialId, accumulator: i64) -> Result<i64, TrialError> {
    if accumulator < 0 {
        return Err(TrialError::InvariantViolated {
            trial: id.to_string(),
            accumulator,
        });
    }
    Ok(accumulator)
}

/// Run one trial of `budget` iterations with the Rust backend.
pub fn run_trial(id: &TrialId, fixtures: &Fixtures, budget: usize) -> Result<i64, TrialError> {
    run_trial_with(Backend::Rust, id, fixtures, budget)
}

/// Run one trial of `budget` iterations with the given backend.
pub fn run_trial_with(
    backend: Backend,
    id: &TrialId,
    fixtures: &Fixtures,
    budget: usize,
) -> Result<i64, TrialError> {
    let selector = fixtures.selector(id.pattern);
    let accumulator = match backend {
        Backend::Rust => {
            let trial = original::trial_fn(id.mechanism, id.set, id.fan_out)
                .ok_or(TrialError::UnsupportedFanOut(id.fan_out))?;
            trial(selector, budget)
        }
        Backend::C => c_impl::run(id, selector, budget)?,
    };
    check_accumulator(id, accumulator)
}

/// A measurable variant: which backend runs which mechanism.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantKind {
    pub backend: Backend,
    pub mechanism: Mechanism,
}

/// Returns all available variants, the `match` baseline first.
pub fn get_variants() -> Vec<VariantInfo<VariantKind>> {
    let mut variants = vec![
        VariantInfo {
            name: Backend::Rust.variant_name(Mechanism::Switch),
            description: "Rust exhaustive match, one arm per target",
            function: VariantKind {
                backend: Backend::Rust,
                mechanism: Mechanism::Switch,
            },
        },
        VariantInfo {
            name: Backend::Rust.variant_name(Mechanism::Table),
            description: "Rust fn-pointer table lookup and indirect call",
            function: VariantKind {
                backend: Backend::Rust,
                mechanism: Mechanism::Table,
            },
        },
    ];

    // Register C implementations if available
    if c_impl::C_IMPL_AVAILABLE {
        variants.push(VariantInfo {
            name: Backend::C.variant_name(Mechanism::Switch),
            description: "C switch statement",
            function: VariantKind {
                backend: Backend::C,
                mechanism: Mechanism::Switch,
            },
        });
        variants.push(VariantInfo {
            name: Backend::C.variant_name(Mechanism::Table),
            description: "C function-pointer array",
            function: VariantKind {
                backend: Backend::C,
                mechanism: Mechanism::Table,
            },
        });
    }

    variants
}
