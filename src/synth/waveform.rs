use crate::synth::prelude::{fmt, wrap_angle, PI, TAU};
#[cfg(feature = "serde")]
use crate::synth::prelude::{Deserialize, Serialize};

/// Periodic waveform evaluated at a position within one cycle.
///
/// Waveforms hold no state, so one value can be shared by any number of
/// operators. Band-limited variants carry the number of odd harmonics summed
/// by their Fourier series.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Waveform {
    Sine,
    Square,
    BandLimitedSquare { harmonics: u32 },
    BandLimitedTriangle { harmonics: u32 },
    Triangle,
    UpSaw,
    DownSaw,
}

impl Waveform {
    /// Waveforms that take no construction parameters.
    pub const ALL_EXACT: [Waveform; 5] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::UpSaw,
        Waveform::DownSaw,
    ];

    pub fn band_limited_square(harmonics: u32) -> Self {
        Waveform::BandLimitedSquare { harmonics }
    }

    pub fn band_limited_triangle(harmonics: u32) -> Self {
        Waveform::BandLimitedTriangle { harmonics }
    }

    /// Evaluates the waveform.
    ///
    /// `position` is the fraction of a cycle and `phase_offset` an extra phase
    /// in radians. Neither needs to be in range: modulation can push the phase
    /// anywhere, and the result is wrapped onto one cycle.
    pub fn evaluate(&self, position: f64, phase_offset: f64) -> f64 {
        let phase = TAU * position + phase_offset;
        match *self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::BandLimitedSquare { harmonics } => square_series(phase, harmonics),
            Waveform::BandLimitedTriangle { harmonics } => triangle_series(phase, harmonics),
            Waveform::Triangle => {
                let x = wrap_angle(phase) / TAU;
                if x <= 0.25 {
                    x * 4.0
                } else if x <= 0.75 {
                    2.0 - x * 4.0
                } else {
                    x * 4.0 - 4.0
                }
            }
            Waveform::UpSaw => {
                let x = wrap_angle(phase) / TAU;
                x * 2.0 - 1.0
            }
            Waveform::DownSaw => {
                let x = wrap_angle(phase) / TAU;
                1.0 - x * 2.0
            }
        }
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sine
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waveform::Sine => write!(f, "sine"),
            Waveform::Square => write!(f, "square"),
            Waveform::BandLimitedSquare { harmonics } => {
                write!(f, "band-limited square ({harmonics} harmonics)")
            }
            Waveform::BandLimitedTriangle { harmonics } => {
                write!(f, "band-limited triangle ({harmonics} harmonics)")
            }
            Waveform::Triangle => write!(f, "triangle"),
            Waveform::UpSaw => write!(f, "up saw"),
            Waveform::DownSaw => write!(f, "down saw"),
        }
    }
}

// Odd harmonics only: n = 2k - 1.
fn square_series(phase: f64, harmonics: u32) -> f64 {
    let phase = wrap_angle(phase);
    let sum: f64 = (1..=harmonics)
        .map(|k| {
            let n = (2 * k - 1) as f64;
            (n * phase).sin() / n
        })
        .sum();
    sum * 4.0 / PI
}

fn triangle_series(phase: f64, harmonics: u32) -> f64 {
    let phase = wrap_angle(phase);
    let sum: f64 = (1..=harmonics)
        .map(|k| {
            let n = (2 * k - 1) as f64;
            let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
            sign * (n * phase).sin() / (n * n)
        })
        .sum();
    sum * 8.0 / (PI * PI)
}
