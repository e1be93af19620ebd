use super::config::OperatorConfig;
use super::context::SynthesisState;
use super::envelope::Envelope;
use super::error::{check_non_negative, SynthResult};
use super::waveform::Waveform;
#[cfg(feature = "serde")]
use crate::synth::prelude::{Deserialize, Serialize};

/// One oscillator + envelope unit of the FM graph.
///
/// `modulation_index` is the output amplitude when the operator is a carrier
/// and the modulation depth when it feeds another operator. `detune` is the
/// ratio applied to the voice's base frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Operator {
    pub waveform: Waveform,
    pub envelope: Envelope,
    pub modulation_index: f64,
    pub detune: f64,
}

impl Operator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_modulation_index(mut self, modulation_index: f64) -> Self {
        self.modulation_index = modulation_index;
        self
    }

    pub fn with_detune(mut self, detune: f64) -> Self {
        self.detune = detune;
        self
    }

    /// This operator's own cycle frequency for a voice at `base_frequency`.
    #[inline]
    pub fn frequency(&self, base_frequency: f64) -> f64 {
        base_frequency * self.detune
    }

    /// Operator output at `state`.
    ///
    /// `state.base_frequency` must be positive; it is not checked here.
    pub fn evaluate(&self, state: &SynthesisState) -> f64 {
        let env = self.envelope.evaluate(state.elapsed, state.is_holding);
        let position = (state.elapsed * self.frequency(state.base_frequency)).rem_euclid(1.0);
        let wave = self.waveform.evaluate(position, state.modulation);
        self.modulation_index * wave * env
    }

    /// Overwrites the fields that are set in `config`.
    pub fn apply(&mut self, config: &OperatorConfig) {
        self.waveform = config.waveform.unwrap_or(self.waveform);
        self.envelope = config.envelope.unwrap_or(self.envelope);
        self.modulation_index = config.modulation_index.unwrap_or(self.modulation_index);
        self.detune = config.detune.unwrap_or(self.detune);
    }

    /// Fully populated configuration describing this operator.
    pub fn config(&self) -> OperatorConfig {
        OperatorConfig {
            waveform: Some(self.waveform),
            envelope: Some(self.envelope),
            modulation_index: Some(self.modulation_index),
            detune: Some(self.detune),
        }
    }

    pub fn validate(&self) -> SynthResult<()> {
        check_non_negative("modulation_index", self.modulation_index)?;
        check_non_negative("detune", self.detune)?;
        self.envelope.validate()
    }
}

impl Default for Operator {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            envelope: Envelope::DEFAULT,
            modulation_index: 1.0,
            detune: 1.0,
        }
    }
}

impl From<&OperatorConfig> for Operator {
    fn from(config: &OperatorConfig) -> Self {
        let mut op = Operator::default();
        op.apply(config);
        op
    }
}
