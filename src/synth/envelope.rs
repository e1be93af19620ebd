use crate::synth::error::{check_non_negative, SynthError, SynthResult};
#[cfg(feature = "serde")]
use crate::synth::prelude::{Deserialize, Serialize};

/// Linear attack/decay/sustain/release amplitude shape.
///
/// Times are in seconds, `sustain` is a level in `0..=1`. The envelope keeps
/// no runtime state: it is evaluated from the time since the last attack or
/// release and whether the note is still held.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

/// Segment of the envelope a point in time falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    Finished,
}

impl Envelope {
    /// Constant full level while held, silent once released.
    pub const DEFAULT: Envelope = Envelope {
        attack: 0.0,
        decay: 0.0,
        sustain: 1.0,
        release: 0.0,
    };

    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    pub fn validate(&self) -> SynthResult<()> {
        check_non_negative("attack", self.attack)?;
        check_non_negative("decay", self.decay)?;
        check_non_negative("release", self.release)?;
        if !(0.0..=1.0).contains(&self.sustain) {
            return Err(SynthError::invalid_param(
                "sustain",
                format!("must be within 0..=1, got {}", self.sustain),
            ));
        }
        Ok(())
    }

    /// Which segment `elapsed` falls into.
    ///
    /// While holding, `elapsed` counts from the attack; after release it counts
    /// from the release. Zero-length segments are skipped.
    pub fn stage(&self, elapsed: f64, holding: bool) -> EnvelopeStage {
        if holding {
            if self.attack > 0.0 && elapsed < self.attack {
                EnvelopeStage::Attack
            } else if self.decay > 0.0 && elapsed < self.attack + self.decay {
                EnvelopeStage::Decay
            } else {
                EnvelopeStage::Sustain
            }
        } else if self.release > 0.0 && elapsed < self.release {
            EnvelopeStage::Release
        } else {
            EnvelopeStage::Finished
        }
    }

    /// Amplitude at `elapsed` seconds into the current hold or release.
    pub fn evaluate(&self, elapsed: f64, holding: bool) -> f64 {
        match self.stage(elapsed, holding) {
            EnvelopeStage::Attack => elapsed / self.attack,
            EnvelopeStage::Decay => {
                let progress = (elapsed - self.attack) / self.decay;
                1.0 - progress * (1.0 - self.sustain)
            }
            EnvelopeStage::Sustain => self.sustain,
            // Release always ramps down from the sustain level.
            EnvelopeStage::Release => self.sustain - self.sustain * (elapsed / self.release),
            EnvelopeStage::Finished => 0.0,
        }
    }

    pub fn is_finished(&self, elapsed: f64, holding: bool) -> bool {
        self.stage(elapsed, holding) == EnvelopeStage::Finished
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::DEFAULT
    }
}
