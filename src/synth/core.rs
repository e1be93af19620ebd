use super::algorithm::Algorithm;
use super::config::{SynthConfig, DEFAULT_OPERATOR_COUNT};
use super::context::SynthesisState;
use super::error::{SynthError, SynthResult};
use super::operator::Operator;

/// Note lifecycle shared by anything that can be played like a voice.
pub trait Synthesize {
    /// Starts a note at `frequency` Hz and resets time to zero.
    fn attack(&mut self, frequency: f64);
    /// Lets go of the note and resets time to zero.
    fn release(&mut self);
    /// Produces the sample `time` seconds after the last attack or release.
    fn sample(&mut self, time: f64) -> SynthResult<f64>;
}

/// One FM voice: the operators, the algorithm wiring them, and the
/// current hold/time state.
///
/// Only one note sounds at a time. Calling [`attack`](Self::attack) while a
/// note is held simply retriggers at the new frequency.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    operators: Vec<Operator>,
    algorithm: Algorithm,
    state: SynthesisState,
    last_sample: f64,
}

impl Synthesizer {
    /// `count` default operators wired by `algorithm`.
    pub fn new(count: usize, algorithm: Algorithm) -> Self {
        Self::with_operators(vec![Operator::default(); count], algorithm)
    }

    pub fn with_operators(operators: Vec<Operator>, algorithm: Algorithm) -> Self {
        let synth = Self {
            operators,
            algorithm,
            state: SynthesisState::default(),
            last_sample: 0.0,
        };
        synth.warn_if_underpopulated();
        synth
    }

    pub fn from_config(config: &SynthConfig) -> SynthResult<Self> {
        if let Err(e) = config.validate() {
            log::warn!("Synth: rejected config: {e}");
            return Err(e);
        }
        Ok(Self::with_operators(
            config.build_operators(),
            config.algorithm,
        ))
    }

    pub fn attack(&mut self, frequency: f64) {
        log::debug!("Synth: attack at {frequency} Hz");
        self.state.elapsed = 0.0;
        self.state.base_frequency = frequency;
        self.state.is_holding = true;
    }

    pub fn release(&mut self) {
        log::debug!("Synth: release");
        self.state.elapsed = 0.0;
        self.state.is_holding = false;
    }

    /// Sample at `time` seconds since the last attack or release.
    ///
    /// Needs a prior [`attack`](Self::attack): evaluating with a zero base
    /// frequency gives a constant phase rather than an error. Errors are
    /// returned without logging; a bad operator count is reported once when
    /// the algorithm or operators are configured.
    pub fn sample(&mut self, time: f64) -> SynthResult<f64> {
        self.state.elapsed = time;
        let sample = self.algorithm.combine(&self.operators, &self.state)?;
        self.last_sample = sample;
        Ok(sample)
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    /// Copy of the current hold/time state.
    pub fn state(&self) -> SynthesisState {
        self.state
    }

    /// Value returned by the last successful [`sample`](Self::sample).
    pub fn last_sample(&self) -> f64 {
        self.last_sample
    }

    pub fn set_operator(&mut self, index: usize, operator: Operator) -> SynthResult<()> {
        match self.operators.get_mut(index) {
            Some(slot) => {
                log::trace!("Synth: operator {index} set to {operator:?}");
                *slot = operator;
                Ok(())
            }
            None => {
                log::warn!(
                    "Synth: set_operator index {} out of bounds ({} operators)",
                    index,
                    self.operators.len()
                );
                Err(SynthError::OperatorIndexOutOfRange {
                    index,
                    len: self.operators.len(),
                })
            }
        }
    }

    /// Swaps the algorithm. Any remembered feedback starts from zero.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        log::debug!("Synth: algorithm set to {algorithm}");
        self.algorithm = algorithm;
        self.algorithm.reset();
        self.warn_if_underpopulated();
    }

    pub fn reset_feedback(&mut self) {
        self.algorithm.reset();
    }

    fn warn_if_underpopulated(&self) {
        let required = self.algorithm.min_operators();
        if self.operators.len() < required {
            log::warn!(
                "Synth: {} needs {} operators but the voice has {}; sampling will fail",
                self.algorithm,
                required,
                self.operators.len()
            );
        }
    }

    /// True once released and every operator's envelope has run out.
    pub fn is_finished(&self) -> bool {
        !self.state.is_holding
            && self
                .operators
                .iter()
                .all(|op| op.envelope.is_finished(self.state.elapsed, false))
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_OPERATOR_COUNT, Algorithm::ParallelMix)
    }
}

impl Synthesize for Synthesizer {
    fn attack(&mut self, frequency: f64) {
        Synthesizer::attack(self, frequency);
    }

    fn release(&mut self) {
        Synthesizer::release(self);
    }

    fn sample(&mut self, time: f64) -> SynthResult<f64> {
        Synthesizer::sample(self, time)
    }
}
