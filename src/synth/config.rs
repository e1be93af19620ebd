use super::algorithm::Algorithm;
use super::envelope::Envelope;
use super::error::{SynthError, SynthResult};
use super::operator::Operator;
use super::waveform::Waveform;
#[cfg(feature = "serde")]
use crate::synth::prelude::{Deserialize, Serialize};

/// Number of operators in a default voice.
pub const DEFAULT_OPERATOR_COUNT: usize = 4;

/// Partial operator settings. Unset fields keep the operator's current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OperatorConfig {
    pub waveform: Option<Waveform>,
    pub envelope: Option<Envelope>,
    pub modulation_index: Option<f64>,
    pub detune: Option<f64>,
}

impl OperatorConfig {
    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = Some(waveform);
        self
    }

    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = Some(envelope);
        self
    }

    pub fn modulation_index(mut self, modulation_index: f64) -> Self {
        self.modulation_index = Some(modulation_index);
        self
    }

    pub fn detune(mut self, detune: f64) -> Self {
        self.detune = Some(detune);
        self
    }
}

/// Construction-time configuration of one voice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynthConfig {
    /// One entry per operator; the length is the operator count.
    pub operators: Vec<OperatorConfig>,
    pub algorithm: Algorithm,
}

impl SynthConfig {
    pub fn new(operators: Vec<OperatorConfig>, algorithm: Algorithm) -> Self {
        Self {
            operators,
            algorithm,
        }
    }

    /// Builds the operator list, applying each entry to a default operator.
    pub fn build_operators(&self) -> Vec<Operator> {
        self.operators.iter().map(Operator::from).collect()
    }

    /// Checks every operator against the data-model invariants.
    ///
    /// The operator count is not compared against the algorithm here; that
    /// happens when the algorithm runs, since it can be swapped later.
    pub fn validate(&self) -> SynthResult<()> {
        for (index, op) in self.build_operators().iter().enumerate() {
            op.validate().map_err(|e| match e {
                SynthError::InvalidParameter { name, message } => {
                    SynthError::invalid_param(format!("operators[{index}].{name}"), message)
                }
                other => other,
            })?;
        }
        self.algorithm.validate()
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            operators: vec![OperatorConfig::default(); DEFAULT_OPERATOR_COUNT],
            algorithm: Algorithm::ParallelMix,
        }
    }
}
