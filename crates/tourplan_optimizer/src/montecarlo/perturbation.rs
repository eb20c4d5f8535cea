use rand::Rng;
use serde::{Deserialize, Serialize};
use tourplan_costs::travel_matrices::TravelMatrices;

/// Bounds of the factor every travel time is multiplied by in a trial.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PerturbationRange {
    pub low: f64,
    pub high: f64,
}

impl Default for PerturbationRange {
    fn default() -> Self {
        PerturbationRange {
            low: 0.8,
            high: 1.2,
        }
    }
}

impl PerturbationRange {
    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low > 0.0 && self.low <= self.high
    }

    /// Scales each travel time by its own uniform draw and truncates it to
    /// whole minutes. Energy costs are left as they are.
    pub fn perturb<R: Rng>(&self, matrices: &TravelMatrices, rng: &mut R) -> TravelMatrices {
        TravelMatrices::from_fn(matrices.num_nodes(), |from, to| {
            let factor = rng.random_range(self.low..=self.high);
            (
                (matrices.time(from, to) * factor).trunc(),
                matrices.energy(from, to),
            )
        })
    }
}
