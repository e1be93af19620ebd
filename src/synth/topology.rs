//! Fixed four-operator routings modelled on classic 4-op FM chips.
//!
//! Indices run opposite to the hardware's slot numbering: the chip's OP4
//! (nearest the output) is index 0 and OP1 (the feedback slot) is index 3,
//! i.e. index = 4 - slot. A modulated operator receives the sum of its
//! sources' outputs; the sample is the sum of carrier outputs divided by the
//! sum of carrier modulation indices.

use super::algorithm::{lookback_sample, DEFAULT_LOOKBACK};
use super::context::SynthesisState;
use super::error::{SynthError, SynthResult};
use super::operator::Operator;
use crate::synth::prelude::fmt;
#[cfg(feature = "serde")]
use crate::synth::prelude::{Deserialize, Serialize};

/// Lookback of the feedback slot in [`ChipTopology::FeedbackFan`] (1 ms).
pub const CHIP_FEEDBACK_LOOKBACK: f64 = DEFAULT_LOOKBACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChipTopology {
    /// 3 → 2 → 1 → 0
    Stack,
    /// (3 + 2) → 1 → 0
    MergedModulators,
    /// 3 → 2 and 1 → 0, carriers 2 and 0
    TwoPairs,
    /// 3 (self-feedback) → 2, 1, 0, all three carriers
    FeedbackFan,
}

#[derive(Debug)]
struct Route {
    sources: &'static [usize],
    carrier: bool,
}

const fn route(sources: &'static [usize], carrier: bool) -> Route {
    Route { sources, carrier }
}

#[derive(Debug)]
struct RoutingTable {
    routes: [Route; ChipTopology::OPERATOR_COUNT],
    feedback: Option<usize>,
}

static STACK: RoutingTable = RoutingTable {
    routes: [
        route(&[1], true),
        route(&[2], false),
        route(&[3], false),
        route(&[], false),
    ],
    feedback: None,
};

static MERGED_MODULATORS: RoutingTable = RoutingTable {
    routes: [
        route(&[1], true),
        route(&[2, 3], false),
        route(&[], false),
        route(&[], false),
    ],
    feedback: None,
};

static TWO_PAIRS: RoutingTable = RoutingTable {
    routes: [
        route(&[1], true),
        route(&[], false),
        route(&[3], true),
        route(&[], false),
    ],
    feedback: None,
};

static FEEDBACK_FAN: RoutingTable = RoutingTable {
    routes: [
        route(&[3], true),
        route(&[3], true),
        route(&[3], true),
        route(&[], false),
    ],
    feedback: Some(3),
};

impl ChipTopology {
    pub const OPERATOR_COUNT: usize = 4;

    pub const ALL: [ChipTopology; 4] = [
        ChipTopology::Stack,
        ChipTopology::MergedModulators,
        ChipTopology::TwoPairs,
        ChipTopology::FeedbackFan,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChipTopology::Stack => "chip stack",
            ChipTopology::MergedModulators => "chip merged modulators",
            ChipTopology::TwoPairs => "chip two pairs",
            ChipTopology::FeedbackFan => "chip feedback fan",
        }
    }

    fn table(&self) -> &'static RoutingTable {
        match self {
            ChipTopology::Stack => &STACK,
            ChipTopology::MergedModulators => &MERGED_MODULATORS,
            ChipTopology::TwoPairs => &TWO_PAIRS,
            ChipTopology::FeedbackFan => &FEEDBACK_FAN,
        }
    }

    /// Indices whose outputs reach the audible sample.
    pub fn carriers(&self) -> impl Iterator<Item = usize> {
        self.table()
            .routes
            .iter()
            .enumerate()
            .filter(|(_, r)| r.carrier)
            .map(|(index, _)| index)
    }

    /// Operators feeding `index`.
    pub fn sources(&self, index: usize) -> &'static [usize] {
        self.table()
            .routes
            .get(index)
            .map(|r| r.sources)
            .unwrap_or(&[])
    }

    /// Index of the self-feedback operator, if the routing has one.
    pub fn feedback_operator(&self) -> Option<usize> {
        self.table().feedback
    }

    /// Renders one sample. Needs four operators; extra ones are ignored.
    pub fn render(&self, operators: &[Operator], state: &SynthesisState) -> SynthResult<f64> {
        SynthError::require_operators(self.name(), Self::OPERATOR_COUNT, operators.len())?;
        let table = self.table();
        let mut outputs = [0.0; Self::OPERATOR_COUNT];

        // Sources always sit at a higher index than what they feed.
        for index in (0..Self::OPERATOR_COUNT).rev() {
            let op = &operators[index];
            let route = &table.routes[index];

            let mut modulation = if route.sources.is_empty() {
                state.modulation
            } else {
                route.sources.iter().map(|&s| outputs[s]).sum()
            };
            if table.feedback == Some(index) {
                let input = state.with_modulation(modulation);
                modulation += lookback_sample(op, &input, CHIP_FEEDBACK_LOOKBACK);
            }

            outputs[index] = op.evaluate(&state.with_modulation(modulation));
        }

        let (mix, depth) = table
            .routes
            .iter()
            .zip(operators)
            .zip(outputs)
            .filter(|((r, _), _)| r.carrier)
            .fold((0.0, 0.0), |(mix, depth), ((_, op), out)| {
                (mix + out, depth + op.modulation_index)
            });
        Ok(mix / depth)
    }
}

impl fmt::Display for ChipTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
