use std::sync::Arc;

use approx::assert_relative_eq;
use dutyscope::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

const STRATEGIES: [DutyStrategy; 2] = [DutyStrategy::LinearScan, DutyStrategy::BinarySearch];

fn timeline(pairs: &[(u64, &str)]) -> Timeline {
    Timeline::from_tokens(4, BitOrder::MsbFirst, pairs.iter().copied()).unwrap()
}

fn led_trace() -> Timeline {
    timeline(&[(0, "0000"), (1000, "0001"), (3000, "0000")])
}

fn random_timeline(rng: &mut StdRng) -> Timeline {
    let n = rng.gen_range(1..=40);
    let mut t = rng.gen_range(0..50u64);
    let mut transitions = Vec::with_capacity(n);
    for _ in 0..n {
        transitions.push(Transition::new(t, BusValue::from_bits(rng.gen_range(0..16), 4)));
        t += rng.gen_range(1..=100);
    }
    Timeline::new(4, transitions).unwrap()
}

#[test]
fn strategies_agree_on_random_timelines() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let tl = random_timeline(&mut rng);
        let horizon = tl.last().timestamp + 200;
        for _ in 0..50 {
            let end = rng.gen_range(0..horizon);
            let length = rng.gen_range(1..=horizon);
            for bit in 0..4 {
                let linear = duty_cycle(&tl, DutyStrategy::LinearScan, end, length, bit).unwrap();
                let binary =
                    duty_cycle(&tl, DutyStrategy::BinarySearch, end, length, bit).unwrap();
                assert_eq!(linear, binary, "end={end} length={length} bit={bit} tl={tl:?}");
                assert!((0.0..=1.0).contains(&linear));
            }
        }
    }
}

#[test]
fn strategies_agree_on_window_edges_at_transitions() {
    let tl = timeline(&[(10, "0101"), (20, "1010"), (30, "1111"), (40, "0000")]);
    for end in 0..60 {
        for length in [1, 5, 10, 20, 35, 100] {
            for bit in 0..4 {
                let a = duty_cycle(&tl, DutyStrategy::LinearScan, end, length, bit).unwrap();
                let b = duty_cycle(&tl, DutyStrategy::BinarySearch, end, length, bit).unwrap();
                assert_eq!(a, b, "end={end} length={length} bit={bit}");
            }
        }
    }
}

#[test]
fn concrete_led_scenario() {
    let tl = led_trace();
    for strategy in STRATEGIES {
        let d0 = duty_cycle(&tl, strategy, 3000, 3000, 0).unwrap();
        assert_relative_eq!(d0, 2000.0 / 3000.0);
        for bit in 1..4 {
            assert_eq!(duty_cycle(&tl, strategy, 3000, 3000, bit).unwrap(), 0.0);
        }
    }
}

#[test]
fn zero_window_is_dark() {
    let tl = timeline(&[(0, "1111")]);
    for strategy in STRATEGIES {
        for bit in 0..4 {
            assert_eq!(duty_cycle(&tl, strategy, 0, 100, bit).unwrap(), 0.0);
            assert_eq!(duty_cycle(&tl, strategy, 50, 0, bit).unwrap(), 0.0);
        }
    }
}

#[test]
fn constant_signal_is_fully_on_or_off() {
    let tl = timeline(&[(0, "0101")]);
    for strategy in STRATEGIES {
        for (end, length) in [(1, 1), (10, 100), (1_000_000, 7)] {
            assert_eq!(duty_cycle(&tl, strategy, end, length, 0).unwrap(), 1.0);
            assert_eq!(duty_cycle(&tl, strategy, end, length, 1).unwrap(), 0.0);
            assert_eq!(duty_cycle(&tl, strategy, end, length, 2).unwrap(), 1.0);
            assert_eq!(duty_cycle(&tl, strategy, end, length, 3).unwrap(), 0.0);
        }
    }
}

#[test]
fn window_is_clipped_at_zero() {
    // Bit 0 high for the first 15 of 30 ps; the nominal 100 ps window would give 0.15.
    let tl = timeline(&[(0, "0001"), (15, "0000")]);
    assert_eq!(Window::ending_at(30, 100).len(), 30);
    for strategy in STRATEGIES {
        assert_relative_eq!(duty_cycle(&tl, strategy, 30, 100, 0).unwrap(), 0.5);
    }
}

#[test]
fn window_before_first_transition_takes_first_value() {
    let tl = timeline(&[(500, "0001"), (600, "0000")]);
    for strategy in STRATEGIES {
        assert_eq!(duty_cycle(&tl, strategy, 400, 100, 0).unwrap(), 1.0);
    }
}

#[test]
fn trailing_state_extends_past_last_transition() {
    let tl = timeline(&[(0, "0000"), (100, "0010")]);
    for strategy in STRATEGIES {
        assert_relative_eq!(duty_cycle(&tl, strategy, 1000, 1000, 1).unwrap(), 0.9);
    }
}

#[test]
fn malformed_token_reads_as_all_low() {
    let bad = timeline(&[(0, "0000"), (10, "11"), (20, "0000")]);
    let zero = timeline(&[(0, "0000"), (10, "0000"), (20, "0000")]);
    for strategy in STRATEGIES {
        for bit in 0..4 {
            assert_eq!(
                duty_cycle(&bad, strategy, 30, 30, bit).unwrap(),
                duty_cycle(&zero, strategy, 30, 30, bit).unwrap()
            );
        }
    }
}

#[test]
fn bit_index_is_checked_at_query_time() {
    let tl = led_trace();
    let err = duty_cycle(&tl, DutyStrategy::BinarySearch, 100, 100, 4).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 4, width: 4 }));
}

#[test]
fn zero_width_bus_has_no_bits() {
    let tl = Timeline::new(0, [Transition::new(0, BusValue::zero(0))]).unwrap();
    let engine = DutyEngine::new(Arc::new(tl), DutyStrategy::BinarySearch);
    assert!(engine.duty(10, 10, 0).is_err());
    assert!(engine.evaluate(10, 10).duties.is_empty());
}

#[test]
fn batch_evaluation_matches_single_bit_queries() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..50 {
        let tl = Arc::new(random_timeline(&mut rng));
        for strategy in STRATEGIES {
            let engine = DutyEngine::new(tl.clone(), strategy);
            let end = rng.gen_range(0..tl.last().timestamp + 100);
            let length = rng.gen_range(1..=500);
            let snapshot = engine.evaluate(end, length);
            assert_eq!((snapshot.end_time, snapshot.length), (end, length));
            for bit in 0..4 {
                assert_eq!(snapshot.duty(bit), Some(engine.duty(end, length, bit).unwrap()));
            }
        }
    }
}
