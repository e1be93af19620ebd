/// Point in synthesis time passed down the operator chain.
///
/// `modulation` is the phase term an algorithm feeds into the next operator.
/// Algorithms work on copies (`with_modulation`, `at_time`) while chaining;
/// the synthesizer's own copy only changes through attack/release/sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SynthesisState {
    /// Seconds since the last attack or release.
    pub elapsed: f64,
    /// Voice frequency in Hz. Must be positive before operators are evaluated.
    pub base_frequency: f64,
    /// True between attack and release.
    pub is_holding: bool,
    /// Phase modulation (radians) fed into the next operator.
    pub modulation: f64,
}

impl SynthesisState {
    pub fn new(elapsed: f64, base_frequency: f64, is_holding: bool) -> Self {
        Self {
            elapsed,
            base_frequency,
            is_holding,
            modulation: 0.0,
        }
    }

    #[inline]
    pub fn with_modulation(self, modulation: f64) -> Self {
        Self { modulation, ..self }
    }

    #[inline]
    pub fn at_time(self, elapsed: f64) -> Self {
        Self { elapsed, ..self }
    }
}
