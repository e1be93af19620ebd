//! Frequency-modulation synthesis core.
//!
//! A [`Synthesizer`](synth::Synthesizer) is one monophonic voice: an ordered
//! list of operators, an algorithm that wires them together, and the hold/time
//! state driven by `attack`, `release` and `sample`. Audio output, MIDI and
//! voice allocation live outside this crate.

pub mod synth;

pub use synth::{
    Algorithm, ChipTopology, Envelope, EnvelopeStage, Operator, OperatorConfig, SynthConfig,
    SynthError, SynthResult, Synthesize, SynthesisState, Synthesizer, Waveform,
};
