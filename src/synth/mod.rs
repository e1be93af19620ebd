pub mod algorithm;
pub mod config;
pub mod context;
pub mod core;
pub mod envelope;
pub mod error;
pub mod operator;
pub mod prelude;
pub mod topology;
pub mod waveform;

pub use self::algorithm::Algorithm;
pub use self::config::{OperatorConfig, SynthConfig};
pub use self::context::SynthesisState;
pub use self::core::{Synthesize, Synthesizer};
pub use self::envelope::{Envelope, EnvelopeStage};
pub use self::error::{SynthError, SynthResult};
pub use self::operator::Operator;
pub use self::topology::ChipTopology;
pub use self::waveform::Waveform;
