use super::context::SynthesisState;
use super::error::{check_non_negative, SynthError, SynthResult};
use super::operator::Operator;
use super::topology::ChipTopology;
use crate::synth::prelude::fmt;
use std::mem;
#[cfg(feature = "serde")]
use crate::synth::prelude::{Deserialize, Serialize};

/// Lookback used by constant-lookback feedback when none is configured (1 ms).
pub const DEFAULT_LOOKBACK: f64 = 0.001;

const SERIAL_MODULATION: &str = "serial modulation";
const PAIR_MODULATION: &str = "pair modulation";
const PARALLEL_MIX: &str = "parallel mix";
const PAIRWISE_MIX: &str = "pairwise mix";
const SELF_FEEDBACK: &str = "self feedback";
const CONSTANT_LOOKBACK_FEEDBACK: &str = "constant lookback feedback";

// --- Algorithm ---

/// How a voice's operators combine into one sample.
///
/// Operator index 0 is the carrier; higher indices sit further up the
/// modulation chain. Each variant carries only the state it needs: the
/// self-feedback variant remembers the feedback channel's previous output,
/// everything else is stateless.
///
/// Outputs are not clipped. Variants that end in a single carrier divide by
/// that carrier's modulation index, so its depth setting does not double as
/// an output gain.
///
/// Equality compares configuration only; the self-feedback memory is
/// ignored.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Algorithm {
    /// Every operator modulates all lower indices: each one hears the sum
    /// of the outputs above it.
    SerialModulation,
    /// Operator 1 modulates operator 0; the rest are ignored.
    PairModulation,
    /// All operators evaluated independently and mixed.
    ParallelMix,
    /// Even/odd operator pairs, each pair-modulated, averaged together.
    PairwiseMix,
    /// Serial chain where `channel` also receives its own output from the
    /// previous call.
    ///
    /// The feedback term therefore depends on how evenly `sample` is called:
    /// irregular or out-of-order calls feed back a sample from an irregular
    /// point in time.
    SelfFeedback {
        channel: usize,
        #[cfg_attr(feature = "serde", serde(skip))]
        previous: f64,
    },
    /// Serial chain where `channel` also receives its own output evaluated
    /// `lookback` seconds earlier. Independent of call cadence.
    ConstantLookbackFeedback { channel: usize, lookback: f64 },
    /// One of the fixed four-operator routings.
    Chip { topology: ChipTopology },
}

impl Algorithm {
    pub fn self_feedback(channel: usize) -> Self {
        Algorithm::SelfFeedback {
            channel,
            previous: 0.0,
        }
    }

    pub fn constant_lookback(channel: usize, lookback: f64) -> Self {
        Algorithm::ConstantLookbackFeedback { channel, lookback }
    }

    pub fn chip(topology: ChipTopology) -> Self {
        Algorithm::Chip { topology }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::SerialModulation => SERIAL_MODULATION,
            Algorithm::PairModulation => PAIR_MODULATION,
            Algorithm::ParallelMix => PARALLEL_MIX,
            Algorithm::PairwiseMix => PAIRWISE_MIX,
            Algorithm::SelfFeedback { .. } => SELF_FEEDBACK,
            Algorithm::ConstantLookbackFeedback { .. } => CONSTANT_LOOKBACK_FEEDBACK,
            Algorithm::Chip { topology } => topology.name(),
        }
    }

    /// Fewest operators this algorithm accepts.
    pub fn min_operators(&self) -> usize {
        match self {
            Algorithm::SerialModulation | Algorithm::ParallelMix => 1,
            Algorithm::PairModulation | Algorithm::PairwiseMix => 2,
            Algorithm::SelfFeedback { .. } | Algorithm::ConstantLookbackFeedback { .. } => 1,
            Algorithm::Chip { .. } => ChipTopology::OPERATOR_COUNT,
        }
    }

    /// Checks the parameters carried by the variant itself.
    pub fn validate(&self) -> SynthResult<()> {
        match self {
            Algorithm::ConstantLookbackFeedback { lookback, .. } => {
                check_non_negative("lookback", *lookback)
            }
            _ => Ok(()),
        }
    }

    /// Forgets any remembered feedback sample.
    pub fn reset(&mut self) {
        if let Algorithm::SelfFeedback { previous, .. } = self {
            *previous = 0.0;
        }
    }

    /// Produces one sample from `operators` at `state`.
    pub fn combine(&mut self, operators: &[Operator], state: &SynthesisState) -> SynthResult<f64> {
        match self {
            Algorithm::SerialModulation => serial_modulation(operators, state),
            Algorithm::PairModulation => pair_modulation(operators, state),
            Algorithm::ParallelMix => parallel_mix(operators, state),
            Algorithm::PairwiseMix => pairwise_mix(operators, state),
            Algorithm::SelfFeedback { channel, previous } => {
                self_feedback(operators, *channel, previous, state)
            }
            Algorithm::ConstantLookbackFeedback { channel, lookback } => {
                constant_lookback_feedback(operators, *channel, *lookback, state)
            }
            Algorithm::Chip { topology } => topology.render(operators, state),
        }
    }
}

impl PartialEq for Algorithm {
    fn eq(&self, other: &Self) -> bool {
        use Algorithm::*;
        match (self, other) {
            (SelfFeedback { channel: a, .. }, SelfFeedback { channel: b, .. }) => a == b,
            (
                ConstantLookbackFeedback {
                    channel: a,
                    lookback: x,
                },
                ConstantLookbackFeedback {
                    channel: b,
                    lookback: y,
                },
            ) => a == b && x == y,
            (Chip { topology: a }, Chip { topology: b }) => a == b,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::ParallelMix
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::SelfFeedback { channel, .. } => {
                write!(f, "{} (channel {channel})", self.name())
            }
            Algorithm::ConstantLookbackFeedback { channel, lookback } => {
                write!(f, "{} (channel {channel}, {lookback} s)", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

// --- Chain evaluation ---

#[derive(Clone, Copy)]
enum Feedback {
    None,
    Previous { channel: usize, sample: f64 },
    Lookback { channel: usize, lookback: f64 },
}

impl Feedback {
    fn channel(&self) -> Option<usize> {
        match *self {
            Feedback::None => None,
            Feedback::Previous { channel, .. } | Feedback::Lookback { channel, .. } => {
                Some(channel)
            }
        }
    }
}

struct ChainOutput {
    carrier: f64,
    channel: f64,
}

/// Runs operators from the last index down to 0. Every output is added to
/// the accumulator, so each operator is modulated by the sum of all outputs
/// above it. A feedback term is added to the accumulator right before its
/// channel is evaluated.
fn run_chain(operators: &[Operator], state: &SynthesisState, feedback: Feedback) -> ChainOutput {
    let mut modulation = state.modulation;
    let mut carrier = 0.0;
    let mut channel_out = 0.0;

    for (index, op) in operators.iter().enumerate().rev() {
        match feedback {
            Feedback::Previous { channel, sample } if channel == index => {
                modulation += sample;
            }
            Feedback::Lookback { channel, lookback } if channel == index => {
                modulation += lookback_sample(op, &state.with_modulation(modulation), lookback);
            }
            _ => {}
        }

        carrier = op.evaluate(&state.with_modulation(modulation));
        if feedback.channel() == Some(index) {
            channel_out = carrier;
        }
        modulation += carrier;
    }

    ChainOutput {
        carrier,
        channel: channel_out,
    }
}

/// `op` evaluated `lookback` seconds before `state`, never before time 0.
pub(crate) fn lookback_sample(op: &Operator, state: &SynthesisState, lookback: f64) -> f64 {
    let past = state.at_time((state.elapsed - lookback).max(0.0));
    op.evaluate(&past)
}

fn check_channel(channel: usize, operators: &[Operator]) -> SynthResult<()> {
    if channel >= operators.len() {
        return Err(SynthError::FeedbackChannelOutOfRange {
            channel,
            operators: operators.len(),
        });
    }
    Ok(())
}

// --- Algorithm functions ---

/// Operator N-1 modulates N-2, ..., down to the carrier at index 0, with
/// outputs accumulating on the way down.
pub fn serial_modulation(operators: &[Operator], state: &SynthesisState) -> SynthResult<f64> {
    SynthError::require_operators(SERIAL_MODULATION, 1, operators.len())?;
    let out = run_chain(operators, state, Feedback::None);
    Ok(out.carrier / operators[0].modulation_index)
}

/// Operator 1 modulates operator 0. Operators past index 1 are ignored.
pub fn pair_modulation(operators: &[Operator], state: &SynthesisState) -> SynthResult<f64> {
    SynthError::require_operators(PAIR_MODULATION, 2, operators.len())?;
    let modulator = operators[1].evaluate(state);
    let carrier = operators[0].evaluate(&state.with_modulation(modulator));
    Ok(carrier / operators[0].modulation_index)
}

/// Independent operators, mixed and normalised by the sum of their
/// modulation indices. At least one index must be non-zero.
pub fn parallel_mix(operators: &[Operator], state: &SynthesisState) -> SynthResult<f64> {
    SynthError::require_operators(PARALLEL_MIX, 1, operators.len())?;
    let total_index: f64 = operators.iter().map(|op| op.modulation_index).sum();
    let mix: f64 = operators.iter().map(|op| op.evaluate(state)).sum();
    Ok(mix / total_index)
}

/// Pairs (0,1), (2,3), ... each pair-modulated, then averaged. A trailing
/// odd operator is left out.
pub fn pairwise_mix(operators: &[Operator], state: &SynthesisState) -> SynthResult<f64> {
    SynthError::require_operators(PAIRWISE_MIX, 2, operators.len())?;
    let pairs = operators.len() / 2;
    let mut mix = 0.0;
    for pair in operators.chunks_exact(2) {
        mix += pair_modulation(pair, state)?;
    }
    Ok(mix / pairs as f64)
}

/// Serial modulation where `channel` also receives `previous`, its own output
/// from the last call. `previous` is updated with this call's output.
pub fn self_feedback(
    operators: &[Operator],
    channel: usize,
    previous: &mut f64,
    state: &SynthesisState,
) -> SynthResult<f64> {
    SynthError::require_operators(SELF_FEEDBACK, 1, operators.len())?;
    check_channel(channel, operators)?;

    let out = run_chain(
        operators,
        state,
        Feedback::Previous {
            channel,
            sample: *previous,
        },
    );
    *previous = out.channel;
    Ok(out.carrier / operators[0].modulation_index)
}

/// Serial modulation where `channel` also receives its own output from
/// `lookback` seconds earlier.
pub fn constant_lookback_feedback(
    operators: &[Operator],
    channel: usize,
    lookback: f64,
    state: &SynthesisState,
) -> SynthResult<f64> {
    SynthError::require_operators(CONSTANT_LOOKBACK_FEEDBACK, 1, operators.len())?;
    check_channel(channel, operators)?;
    check_non_negative("lookback", lookback)?;

    let out = run_chain(operators, state, Feedback::Lookback { channel, lookback });
    Ok(out.carrier / operators[0].modulation_index)
}
