//! Read-only selector fixtures shared by every trial.

use super::{AccessPattern, TrialError, FIXTURE_LEN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::OnceLock;

/// Seed used when the process-wide fixtures are first touched without [`init`].
pub const DEFAULT_FIXTURE_SEED: u64 = 0x5EED_D15B_A7C4;

static GLOBAL: OnceLock<Fixtures> = OnceLock::new();

/// The ascending and random input sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fixtures {
    seed: u64,
    ascending: Vec<u64>,
    random: Vec<u64>,
}

impl Fixtures {
    /// Build both sequences. The random one is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let random = (0..FIXTURE_LEN)
            .map(|_| rng.random_range(0..=i64::MAX as u64))
            .collect();
        let ascending = (0..FIXTURE_LEN as u64).collect();

        Self {
            seed,
            ascending,
            random,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ascending(&self) -> &[u64] {
        &self.ascending
    }

    pub fn random(&self) -> &[u64] {
        &self.random
    }

    /// Selector source for an access pattern.
    pub fn selector(&self, pattern: AccessPattern) -> Selector<'_> {
        match pattern {
            AccessPattern::Sequential => Selector::sequential(),
            AccessPattern::Ascending => Selector {
                inputs: Some(&self.ascending),
            },
            AccessPattern::Random => Selector {
                inputs: Some(&self.random),
            },
        }
    }
}

/// Maps the loop counter to a selector in `[0, fan_out)`.
///
/// An indexed selector always reads a non-empty slice; [`Selector::indexed`]
/// rejects empty ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selector<'a> {
    inputs: Option<&'a [u64]>,
}

impl<'a> Selector<'a> {
    /// `k = i mod N`
    pub const fn sequential() -> Self {
        Self { inputs: None }
    }

    /// `k = inputs[i mod |inputs|] mod N`
    pub fn indexed(inputs: &'a [u64]) -> Result<Self, TrialError> {
        if inputs.is_empty() {
            return Err(TrialError::EmptyInputs);
        }
        Ok(Self {
            inputs: Some(inputs),
        })
    }

    /// The indexed inputs, or `None` for sequential selection. Never empty.
    #[inline(always)]
    pub fn inputs(&self) -> Option<&'a [u64]> {
        self.inputs
    }

    #[inline(always)]
    pub fn select(&self, i: usize, fan_out: usize) -> usize {
        match self.inputs {
            None => i % fan_out,
            Some(inputs) => (inputs[i % inputs.len()] % fan_out as u64) as usize,
        }
    }
}

/// Install the process-wide fixtures.
///
/// Returns `false` if they were already built, in which case the existing
/// fixtures (and their seed) stay in place.
pub fn init(seed: u64) -> bool {
    install(&GLOBAL, seed)
}

fn install(cell: &OnceLock<Fixtures>, seed: u64) -> bool {
    let mut installed = false;
    let fixtures = cell.get_or_init(|| {
        installed = true;
        Fixtures::new(seed)
    });

    if !installed && fixtures.seed != seed {
        tracing::warn!(
            requested = seed,
            active = fixtures.seed,
            "fixtures already initialised, keeping existing seed"
        );
    }
    installed
}

/// The process-wide fixtures, built with [`DEFAULT_FIXTURE_SEED`] if [`init`] was never called.
pub fn global() -> &'static Fixtures {
    GLOBAL.get_or_init(|| Fixtures::new(DEFAULT_FIXTURE_SEED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_keeps_first_seed() {
        let cell = OnceLock::new();
        assert!(install(&cell, 7));
        assert_eq!(cell.get().map(Fixtures::seed), Some(7));

        assert!(!install(&cell, 8));
        assert!(!install(&cell, 7));
        assert_eq!(cell.get(), Some(&Fixtures::new(7)));
    }

    #[test]
    fn test_indexed_selector_rejects_empty_inputs() {
        assert_eq!(Selector::indexed(&[]), Err(TrialError::EmptyInputs));

        let inputs = [9u64];
        let selector = Selector::indexed(&inputs).unwrap();
        assert_eq!(selector.inputs(), Some(&inputs[..]));
        assert_eq!(selector.select(3, 4), 1);
        assert_eq!(Selector::sequential().inputs(), None);
    }

    #[test]
    fn test_fixture_selectors_are_never_empty() {
        let fixtures = Fixtures::new(21);
        for pattern in AccessPattern::ALL {
            let selector = fixtures.selector(pattern);
            match pattern {
                AccessPattern::Sequential => assert_eq!(selector.inputs(), None),
                _ => assert_eq!(selector.inputs().map(<[u64]>::len), Some(FIXTURE_LEN)),
            }
        }
    }
}
