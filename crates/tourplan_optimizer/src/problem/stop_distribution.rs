use fxhash::FxHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ids::Commodity, payload::Segment};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct StopCountRow {
    pub cumulative_probability: f64,
    pub stops: u32,
}

/// Stop bounds drawn for one vehicle.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopLimits {
    /// Soft bound, exceeding it is penalized.
    pub max_stops: u32,
    /// Hard bound.
    pub slack_stops: u32,
}

#[derive(Debug, Error, PartialEq)]
pub enum StopDistributionError {
    #[error("stop count distribution has no rows")]
    Empty,
    #[error("cumulative probabilities must be non-decreasing")]
    NotSorted,
}

/// Empirical cumulative distribution of stops per tour for one commodity class.
#[derive(Debug, Clone)]
pub struct StopCountDistribution {
    rows: Vec<StopCountRow>,
}

impl StopCountDistribution {
    pub fn new(rows: Vec<StopCountRow>) -> Result<Self, StopDistributionError> {
        if rows.is_empty() {
            return Err(StopDistributionError::Empty);
        }

        if rows
            .windows(2)
            .any(|pair| pair[0].cumulative_probability > pair[1].cumulative_probability)
        {
            return Err(StopDistributionError::NotSorted);
        }

        Ok(StopCountDistribution { rows })
    }

    /// The max is the first row whose cumulative probability reaches `u`, the
    /// slack is the last row of the table.
    pub fn draw(&self, u: f64) -> StopLimits {
        let last = self.rows[self.rows.len() - 1];
        let max_stops = self
            .rows
            .iter()
            .find(|row| row.cumulative_probability >= u)
            .unwrap_or(&last)
            .stops;

        StopLimits {
            max_stops,
            slack_stops: last.stops,
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> StopLimits {
        self.draw(rng.random_range(0.0..=1.0))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StopDistributions {
    by_commodity: FxHashMap<Commodity, StopCountDistribution>,
}

impl StopDistributions {
    pub fn insert(&mut self, commodity: Commodity, distribution: StopCountDistribution) {
        self.by_commodity.insert(commodity, distribution);
    }

    pub fn get(&self, commodity: Commodity) -> Option<&StopCountDistribution> {
        self.by_commodity.get(&commodity)
    }
}

/// Decides which groups get a stop count dimension.
#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct StopPolicy {
    /// Mixed cargo class, never stop limited.
    pub mixed_commodity: Commodity,
}

impl Default for StopPolicy {
    fn default() -> Self {
        StopPolicy {
            mixed_commodity: Commodity(2),
        }
    }
}

impl StopPolicy {
    pub fn applies(&self, commodity: Commodity, segment: Segment) -> bool {
        commodity != self.mixed_commodity && segment == Segment::Internal
    }
}
