//! Tests for switch vs table implementations

use super::code::{
    run_trial_with, AccessPattern, Backend, Fixtures, FunctionSet, Mechanism, TrialId, FAN_OUTS,
    FIXTURE_LEN,
};

/// Budgets used for cross-checking: empty, partial, exact fixture wrap, and past it.
const VERIFY_BUDGETS: [usize; 5] = [0, 1, 37, FIXTURE_LEN, FIXTURE_LEN + 513];

/// Straightforward model of a trial: `Σ (i + k(i))`, wrapping like the trials do.
pub fn reference_accumulator(
    pattern: AccessPattern,
    fixtures: &Fixtures,
    fan_out: usize,
    budget: usize,
) -> i64 {
    let selector = fixtures.selector(pattern);
    wrapping_total((0..budget).map(|i| (i as i64).wrapping_add(selector.select(i, fan_out) as i64)))
}

fn wrapping_total(values: impl IntoIterator<Item = i64>) -> i64 {
    values.into_iter().fold(0i64, |acc, v| acc.wrapping_add(v))
}

/// Verify every backend and mechanism of one (pattern, set) slice against the model.
pub fn verify(pattern: AccessPattern, set: FunctionSet, fixtures: &Fixtures) -> Result<(), String> {
    for fan_out in FAN_OUTS {
        for budget in VERIFY_BUDGETS {
            let expected = reference_accumulator(pattern, fixtures, fan_out, budget);

            for backend in Backend::available() {
                for mechanism in Mechanism::ALL {
                    let id = TrialId::new(pattern, mechanism, set, fan_out).map_err(|e| e.to_string())?;
                    let actual = run_trial_with(backend, &id, fixtures, budget)
                        .map_err(|e| format!("{} ({}): {}", id, backend, e))?;

                    if actual != expected {
                        return Err(format!(
                            "Trial '{}' ({}) failed for budget {}: expected {}, got {}",
                            id, backend, budget, expected, actual
                        ));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Verify every slice of the benchmark.
pub fn verify_all(fixtures: &Fixtures) -> Result<(), String> {
    for pattern in AccessPattern::ALL {
        for set in FunctionSet::ALL {
            verify(pattern, set, fixtures)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_flow::switch_vs_table::code::original::run_pattern;
    use crate::control_flow::switch_vs_table::code::{
        c_impl, check_accumulator, fixtures, run_trial, Selector, TrialError,
    };
    use crate::control_flow::switch_vs_table::SwitchVsTableRunner;
    use crate::registry::AlgorithmRunner;

    fn id(pattern: AccessPattern, mechanism: Mechanism, set: FunctionSet, n: usize) -> TrialId {
        TrialId::new(pattern, mechanism, set, n).unwrap()
    }

    #[test]
    fn test_all_variants() {
        verify_all(&Fixtures::new(0xDEC0DE)).expect("All variants should produce correct results");
    }

    #[test]
    fn test_sequential_fan_out_4_budget_4() {
        // Targets 0..3 receive i = 0..3: 0 + 2 + 4 + 6
        let fixtures = Fixtures::new(1);
        for mechanism in Mechanism::ALL {
            let trial = id(AccessPattern::Sequential, mechanism, FunctionSet::Minimal, 4);
            assert_eq!(run_trial(&trial, &fixtures, 4), Ok(12), "{}", trial);
        }
    }

    #[test]
    fn test_ascending_matches_sequential_within_fixture() {
        let fixtures = Fixtures::new(1);
        for budget in [4, 100, FIXTURE_LEN] {
            for mechanism in Mechanism::ALL {
                let seq = id(AccessPattern::Sequential, mechanism, FunctionSet::Minimal, 4);
                let asc = id(AccessPattern::Ascending, mechanism, FunctionSet::Minimal, 4);
                assert_eq!(
                    run_trial(&seq, &fixtures, budget),
                    run_trial(&asc, &fixtures, budget)
                );
            }
        }
        let asc = id(AccessPattern::Ascending, Mechanism::Table, FunctionSet::Minimal, 4);
        assert_eq!(run_trial(&asc, &fixtures, 4), Ok(12));
    }

    #[test]
    fn test_random_is_reproducible_per_seed() {
        let trial = id(AccessPattern::Random, Mechanism::Switch, FunctionSet::Minimal, 4);
        let budget = 10_000;

        let first = run_trial(&trial, &Fixtures::new(42), budget).unwrap();
        let second = run_trial(&trial, &Fixtures::new(42), budget).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, reference_accumulator(AccessPattern::Random, &Fixtures::new(42), 4, budget));

        // Same fixtures, repeated runs
        let fixtures = Fixtures::new(7);
        assert_eq!(
            run_trial(&trial, &fixtures, budget),
            run_trial(&trial, &fixtures, budget)
        );
    }

    #[test]
    fn test_switch_and_table_agree() {
        let fixtures = Fixtures::new(99);
        for pattern in AccessPattern::ALL {
            for set in FunctionSet::ALL {
                for n in FAN_OUTS {
                    let switch = run_trial(&id(pattern, Mechanism::Switch, set, n), &fixtures, 2 * n + 3);
                    let table = run_trial(&id(pattern, Mechanism::Table, set, n), &fixtures, 2 * n + 3);
                    assert_eq!(switch, table, "{}/{}/{}", pattern, set, n);
                }
            }
        }
    }

    #[test]
    fn test_minimal_and_noinline_agree() {
        let fixtures = Fixtures::new(5);
        for pattern in AccessPattern::ALL {
            for mechanism in Mechanism::ALL {
                for n in [4, 512] {
                    let minimal = run_trial(&id(pattern, mechanism, FunctionSet::Minimal, n), &fixtures, 5000);
                    let no_inline = run_trial(&id(pattern, mechanism, FunctionSet::NoInline, n), &fixtures, 5000);
                    assert_eq!(minimal, no_inline, "{}/{}/{}", pattern, mechanism, n);
                }
            }
        }
    }

    #[test]
    fn test_boundary_fan_outs_hit_every_target() {
        let fixtures = Fixtures::new(3);
        for n in [4, 512] {
            // One full cycle of the sequential pattern reaches every arm exactly once.
            let trial = id(AccessPattern::Sequential, Mechanism::Switch, FunctionSet::NoInline, n);
            let expected: i64 = (0..n as i64).map(|k| 2 * k).sum();
            assert_eq!(run_trial(&trial, &fixtures, n), Ok(expected));

            for pattern in AccessPattern::ALL {
                let selector = fixtures.selector(pattern);
                for i in 0..FIXTURE_LEN * 2 {
                    assert!(selector.select(i, n) < n);
                }
            }
        }
    }

    #[test]
    fn test_selector_values_are_in_range_for_extreme_inputs() {
        let inputs = [u64::MAX, i64::MAX as u64, 0, 511, 512];
        let selector = Selector::indexed(&inputs).unwrap();
        for n in FAN_OUTS {
            for i in 0..inputs.len() {
                assert!(selector.select(i, n) < n);
            }
        }
    }

    #[test]
    fn test_fixture_shape() {
        let fixtures = Fixtures::new(11);
        assert_eq!(fixtures.seed(), 11);
        assert_eq!(fixtures.ascending().len(), FIXTURE_LEN);
        assert_eq!(fixtures.random().len(), FIXTURE_LEN);
        assert!(fixtures.ascending().iter().copied().eq(0..FIXTURE_LEN as u64));
        assert!(fixtures.random().iter().all(|&r| r <= i64::MAX as u64));
        assert_eq!(fixtures, Fixtures::new(11));
        assert_ne!(fixtures.random(), Fixtures::new(12).random());
    }

    #[test]
    fn test_global_fixtures_are_stable() {
        let first = fixtures::global();
        let active = first.seed();

        assert!(!fixtures::init(active ^ 0x1234));
        assert!(!fixtures::init(active));

        let second = fixtures::global();
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.seed(), active);
        assert_eq!(second, &Fixtures::new(active));
    }

    #[test]
    fn test_reference_model_wraps_like_trials() {
        let values = [i64::MAX, 1, 5];
        let via_loop = run_pattern(Selector::sequential(), 3, 3, |k, _| values[k]);
        assert_eq!(via_loop, i64::MIN + 5);
        assert_eq!(wrapping_total(values), via_loop);
    }

    #[test]
    fn test_single_input_selector_on_every_backend() {
        let inputs = [6u64];
        let selector = Selector::indexed(&inputs).unwrap();
        let trial = id(AccessPattern::Random, Mechanism::Table, FunctionSet::Minimal, 4);
        // k is always 6 mod 4 = 2: Σ (i + 2) for i in 0..3
        let expected = 9;

        let rust = run_pattern(selector, 4, 3, |k, x| FunctionSet::Minimal.table()[k](x));
        assert_eq!(rust, expected);

        match c_impl::run(&trial, selector, 3) {
            Ok(acc) => assert_eq!(acc, expected),
            Err(e) => assert_eq!(e, TrialError::BackendUnavailable(Backend::C)),
        }
    }

    #[test]
    fn test_invariant_guard() {
        let trial = id(AccessPattern::Random, Mechanism::Table, FunctionSet::NoInline, 64);
        assert_eq!(check_accumulator(&trial, 0), Ok(0));
        assert_eq!(check_accumulator(&trial, 17), Ok(17));
        assert_eq!(
            check_accumulator(&trial, -1),
            Err(TrialError::InvariantViolated {
                trial: "random/table/noinline/64".to_string(),
                accumulator: -1,
            })
        );
    }

    #[test]
    fn test_trial_names_round_trip() {
        let ids = TrialId::all();
        assert_eq!(ids.len(), 3 * 2 * 2 * FAN_OUTS.len());
        for trial in &ids {
            let parsed: TrialId = trial.to_string().parse().unwrap();
            assert_eq!(&parsed, trial);
        }

        let parsed: TrialId = "ascending/switch/noinline/128".parse().unwrap();
        assert_eq!(parsed.pattern(), AccessPattern::Ascending);
        assert_eq!(parsed.mechanism(), Mechanism::Switch);
        assert_eq!(parsed.set(), FunctionSet::NoInline);
        assert_eq!(parsed.fan_out(), 128);
    }

    #[test]
    fn test_trial_name_errors() {
        assert_eq!(
            "random/table/minimal".parse::<TrialId>(),
            Err(TrialError::MalformedName("random/table/minimal".to_string()))
        );
        assert_eq!(
            "random/table/minimal/x".parse::<TrialId>(),
            Err(TrialError::MalformedName("random/table/minimal/x".to_string()))
        );
        assert_eq!(
            "random/table/minimal/5".parse::<TrialId>(),
            Err(TrialError::UnsupportedFanOut(5))
        );
        assert!(matches!(
            "random/hash/minimal/4".parse::<TrialId>(),
            Err(TrialError::UnknownLabel { kind: "mechanism", .. })
        ));
        assert!(TrialId::new(AccessPattern::Random, Mechanism::Table, FunctionSet::Minimal, 1024).is_err());
    }

    #[test]
    fn test_c_backend_availability() {
        let trial = id(AccessPattern::Sequential, Mechanism::Switch, FunctionSet::Minimal, 4);
        let fixtures = Fixtures::new(1);
        let result = run_trial_with(Backend::C, &trial, &fixtures, 4);
        if Backend::available().contains(&Backend::C) {
            assert_eq!(result, Ok(12));
        } else {
            assert_eq!(result, Err(TrialError::BackendUnavailable(Backend::C)));
        }
    }

    #[test]
    fn test_runner_closures() {
        let runner = SwitchVsTableRunner::new(AccessPattern::Ascending, FunctionSet::Minimal);
        assert_eq!(runner.pattern(), AccessPattern::Ascending);
        assert_eq!(runner.set(), FunctionSet::Minimal);
        assert!(runner.get_variant_closures(3, 16).is_empty());

        let mut closures = runner.get_variant_closures(4, 4);
        assert_eq!(closures.len(), runner.available_variants().len());
        for closure in &mut closures {
            let (_, result) = (closure.run)().unwrap();
            assert_eq!(result, Some(12.0), "{}", closure.name);
        }
    }
}
