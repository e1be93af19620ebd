use pretty_assertions::assert_eq;
use rustfmcore::synth::algorithm::{
    constant_lookback_feedback, pair_modulation, pairwise_mix, parallel_mix, self_feedback,
    serial_modulation,
};
use rustfmcore::{
    Algorithm, ChipTopology, Envelope, Operator, SynthError, SynthesisState, Waveform,
};

const EPS: f64 = 1e-12;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

fn held(elapsed: f64) -> SynthesisState {
    SynthesisState::new(elapsed, 440.0, true)
}

fn four_operators() -> Vec<Operator> {
    vec![
        Operator::new().with_modulation_index(0.8),
        Operator::new().with_detune(2.0).with_modulation_index(1.5),
        Operator::new()
            .with_waveform(Waveform::Triangle)
            .with_detune(0.5)
            .with_modulation_index(0.6),
        Operator::new()
            .with_detune(3.0)
            .with_modulation_index(2.0)
            .with_envelope(Envelope::new(0.01, 0.02, 0.5, 0.1)),
    ]
}

#[test]
fn test_serial_single_operator_is_raw_product() {
    let op = Operator::new().with_modulation_index(2.5);
    let state = held(0.3 / 440.0);
    let sample = serial_modulation(&[op], &state).unwrap();
    assert_close(sample, op.evaluate(&state) / 2.5);
}

#[test]
fn test_serial_chain_accumulates_outputs() {
    let ops = four_operators();
    let state = held(0.0123);

    let m3 = ops[3].evaluate(&state);
    let acc = m3;
    let m2 = ops[2].evaluate(&state.with_modulation(acc));
    let acc = acc + m2;
    let m1 = ops[1].evaluate(&state.with_modulation(acc));
    let acc = acc + m1;
    let carrier = ops[0].evaluate(&state.with_modulation(acc));

    let sample = serial_modulation(&ops, &state).unwrap();
    assert_close(sample, carrier / ops[0].modulation_index);
}

#[test]
fn test_serial_three_operator_reference_value() {
    let ops = [
        Operator::new(),
        Operator::new().with_detune(2.0).with_modulation_index(1.5),
        Operator::new().with_detune(3.0).with_modulation_index(2.0),
    ];
    let sample = serial_modulation(&ops, &held(0.0123)).unwrap();
    assert!(
        (sample - -0.5141525137610066).abs() < 1e-9,
        "got {sample}"
    );
}

#[test]
fn test_serial_empty_is_an_error() {
    let err = serial_modulation(&[], &held(0.0)).unwrap_err();
    assert!(matches!(
        err,
        SynthError::InsufficientOperators { found: 0, .. }
    ));
}

#[test]
fn test_pair_modulation_needs_two_operators() {
    let err = pair_modulation(&[Operator::new()], &held(0.0)).unwrap_err();
    assert_eq!(
        err,
        SynthError::InsufficientOperators {
            algorithm: "pair modulation",
            required: 2,
            found: 1,
        }
    );
}

#[test]
fn test_pair_modulation_ignores_extra_operators() {
    let ops = four_operators();
    let state = held(0.004);
    let two = pair_modulation(&ops[..2], &state).unwrap();
    let four = pair_modulation(&ops, &state).unwrap();
    assert_eq!(two, four);

    let modulator = ops[1].evaluate(&state);
    let expected = ops[0].evaluate(&state.with_modulation(modulator)) / ops[0].modulation_index;
    assert_close(two, expected);
}

#[test]
fn test_parallel_mix_normalises_by_index_sum() {
    let ops = four_operators();
    let state = held(0.0071);
    let total: f64 = ops.iter().map(|op| op.modulation_index).sum();
    let mix: f64 = ops.iter().map(|op| op.evaluate(&state)).sum();
    assert_close(parallel_mix(&ops, &state).unwrap(), mix / total);
}

#[test]
fn test_parallel_mix_identical_operators_match_single() {
    let op = Operator::new()
        .with_waveform(Waveform::UpSaw)
        .with_modulation_index(0.7)
        .with_detune(1.5);
    let state = held(0.0021);
    let single = parallel_mix(&[op], &state).unwrap();
    for n in 2..=6 {
        let ops = vec![op; n];
        let mixed = parallel_mix(&ops, &state).unwrap();
        assert!((mixed - single).abs() < 1e-9, "{n} operators: {mixed} vs {single}");
    }
}

#[test]
fn test_pairwise_mix_averages_pairs() {
    let ops = four_operators();
    let state = held(0.0099);
    let a = pair_modulation(&ops[0..2], &state).unwrap();
    let b = pair_modulation(&ops[2..4], &state).unwrap();
    assert_close(pairwise_mix(&ops, &state).unwrap(), (a + b) / 2.0);

    // trailing odd operator is dropped
    let mut five = ops.clone();
    five.push(Operator::new().with_detune(7.0));
    assert_close(
        pairwise_mix(&five, &state).unwrap(),
        pairwise_mix(&ops, &state).unwrap(),
    );
}

#[test]
fn test_self_feedback_first_call_matches_serial() {
    let ops = four_operators();
    let state = held(0.0042);
    for channel in 0..ops.len() {
        let mut previous = 0.0;
        let fed = self_feedback(&ops, channel, &mut previous, &state).unwrap();
        assert_close(fed, serial_modulation(&ops, &state).unwrap());
    }
}

#[test]
fn test_self_feedback_single_operator_remembers_output() {
    let op = Operator::new();
    let state = held(0.1 / 440.0);
    let mut previous = 0.0;

    let first = self_feedback(&[op], 0, &mut previous, &state).unwrap();
    assert_close(first, serial_modulation(&[op], &state).unwrap());
    assert_close(previous, op.evaluate(&state));

    let second = self_feedback(&[op], 0, &mut previous, &state).unwrap();
    assert_close(second, op.evaluate(&state.with_modulation(first)));
    assert!((second - first).abs() > 1e-3);
}

#[test]
fn test_self_feedback_channel_out_of_range() {
    let mut previous = 0.0;
    let err = self_feedback(&four_operators(), 4, &mut previous, &held(0.0)).unwrap_err();
    assert_eq!(
        err,
        SynthError::FeedbackChannelOutOfRange {
            channel: 4,
            operators: 4,
        }
    );
}

#[test]
fn test_algorithm_self_feedback_state_and_reset() {
    let ops = vec![Operator::new()];
    let state = held(0.1 / 440.0);
    let mut algorithm = Algorithm::self_feedback(0);

    let first = algorithm.combine(&ops, &state).unwrap();
    let second = algorithm.combine(&ops, &state).unwrap();
    assert!((second - first).abs() > 1e-3);

    algorithm.reset();
    assert_close(algorithm.combine(&ops, &state).unwrap(), first);
}

#[test]
fn test_algorithm_equality_ignores_feedback_memory() {
    let ops = vec![Operator::new()];
    let mut algorithm = Algorithm::self_feedback(0);
    algorithm.combine(&ops, &held(0.1 / 440.0)).unwrap();

    assert_eq!(algorithm, Algorithm::self_feedback(0));
    assert_ne!(algorithm, Algorithm::self_feedback(1));
    assert_ne!(algorithm, Algorithm::SerialModulation);
    assert_ne!(
        Algorithm::constant_lookback(0, 0.001),
        Algorithm::constant_lookback(0, 0.002)
    );
    assert_ne!(
        Algorithm::chip(ChipTopology::Stack),
        Algorithm::chip(ChipTopology::TwoPairs)
    );
}

#[test]
fn test_constant_lookback_uses_past_output() {
    let op = Operator::new();
    let lookback = 0.001;
    let state = held(0.01);

    let past = op.evaluate(&state.at_time(0.01 - lookback));
    let expected = op.evaluate(&state.with_modulation(past));

    let sample = constant_lookback_feedback(&[op], 0, lookback, &state).unwrap();
    assert_close(sample, expected);
    // stateless: same input, same output
    assert_eq!(
        constant_lookback_feedback(&[op], 0, lookback, &state).unwrap(),
        sample
    );
}

#[test]
fn test_constant_lookback_clamps_to_time_zero() {
    let op = Operator::new().with_detune(1.25);
    let state = held(0.0002);
    let past = op.evaluate(&state.at_time(0.0));
    let expected = op.evaluate(&state.with_modulation(past));
    assert_close(
        constant_lookback_feedback(&[op], 0, 0.001, &state).unwrap(),
        expected,
    );
}

#[test]
fn test_constant_lookback_rejects_negative_lookback() {
    let err = constant_lookback_feedback(&[Operator::new()], 0, -0.5, &held(0.0)).unwrap_err();
    assert!(matches!(err, SynthError::InvalidParameter { .. }));
    assert!(Algorithm::constant_lookback(0, f64::NAN).validate().is_err());
    assert!(Algorithm::constant_lookback(0, 0.0).validate().is_ok());
}

#[test]
fn test_chip_topology_requires_four_operators() {
    let ops = four_operators();
    for topology in ChipTopology::ALL {
        let err = Algorithm::chip(topology)
            .combine(&ops[..3], &held(0.0))
            .unwrap_err();
        assert_eq!(
            err,
            SynthError::InsufficientOperators {
                algorithm: topology.name(),
                required: 4,
                found: 3,
            }
        );
    }
}

#[test]
fn test_chip_stack_passes_only_the_neighbour() {
    let ops = four_operators();
    let state = held(0.0173);

    let m3 = ops[3].evaluate(&state);
    let m2 = ops[2].evaluate(&state.with_modulation(m3));
    let m1 = ops[1].evaluate(&state.with_modulation(m2));
    let carrier = ops[0].evaluate(&state.with_modulation(m1));

    let stack = ChipTopology::Stack.render(&ops, &state).unwrap();
    assert_close(stack, carrier / ops[0].modulation_index);
    assert!((stack - serial_modulation(&ops, &state).unwrap()).abs() > 1e-6);
}

#[test]
fn test_chip_merged_modulators_sum_into_operator_one() {
    let ops = four_operators();
    let state = held(0.0055);

    let m = ops[3].evaluate(&state) + ops[2].evaluate(&state);
    let m1 = ops[1].evaluate(&state.with_modulation(m));
    let carrier = ops[0].evaluate(&state.with_modulation(m1));

    let sample = ChipTopology::MergedModulators.render(&ops, &state).unwrap();
    assert_close(sample, carrier / ops[0].modulation_index);
}

#[test]
fn test_chip_two_pairs_with_equal_depths_matches_pairwise_mix() {
    let ops: Vec<Operator> = four_operators()
        .into_iter()
        .map(|op| op.with_modulation_index(1.2))
        .collect();
    let state = held(0.0031);
    let pairs = ChipTopology::TwoPairs.render(&ops, &state).unwrap();
    assert!((pairs - pairwise_mix(&ops, &state).unwrap()).abs() < 1e-9);
}

#[test]
fn test_chip_feedback_fan_with_silent_modulator_is_parallel_mix() {
    let mut ops = four_operators();
    ops[3] = ops[3].with_modulation_index(0.0);
    let state = held(0.0087);
    let fan = ChipTopology::FeedbackFan.render(&ops, &state).unwrap();
    assert_close(fan, parallel_mix(&ops[..3], &state).unwrap());
}

#[test]
fn test_chip_feedback_fan_feeds_operator_three_back() {
    let ops = four_operators();
    let state = held(0.02);

    let op3 = ops[3];
    let past = op3.evaluate(&state.at_time(0.02 - 0.001));
    let m = op3.evaluate(&state.with_modulation(past));
    let mix: f64 = ops[..3]
        .iter()
        .map(|op| op.evaluate(&state.with_modulation(m)))
        .sum();
    let depth: f64 = ops[..3].iter().map(|op| op.modulation_index).sum();

    assert_close(
        ChipTopology::FeedbackFan.render(&ops, &state).unwrap(),
        mix / depth,
    );
}

#[test]
fn test_min_operators_and_names() {
    assert_eq!(Algorithm::SerialModulation.min_operators(), 1);
    assert_eq!(Algorithm::PairModulation.min_operators(), 2);
    assert_eq!(Algorithm::PairwiseMix.min_operators(), 2);
    assert_eq!(Algorithm::chip(ChipTopology::TwoPairs).min_operators(), 4);
    assert_eq!(Algorithm::default(), Algorithm::ParallelMix);
    assert_eq!(
        Algorithm::constant_lookback(2, 0.5).to_string(),
        "constant lookback feedback (channel 2, 0.5 s)"
    );
    assert_eq!(
        Algorithm::chip(ChipTopology::FeedbackFan).to_string(),
        "chip feedback fan"
    );
}
