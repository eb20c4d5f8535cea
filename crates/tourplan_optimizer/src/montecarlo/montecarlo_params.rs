use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};

use super::perturbation::PerturbationRange;

/// Which travel-time matrices a trial's routes must respect their time
/// windows under to stay eligible.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityScope {
    /// The matrix the trial was solved with.
    #[default]
    OwnMatrix,
    /// Every trial's matrix.
    AnyMatrix,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct MonteCarloParams {
    pub trials: usize,
    pub perturbation: PerturbationRange,
    pub seed: u64,
    pub feasibility_scope: FeasibilityScope,
}

impl Default for MonteCarloParams {
    fn default() -> Self {
        MonteCarloParams {
            trials: 2,
            perturbation: PerturbationRange::default(),
            seed: 0,
            feasibility_scope: FeasibilityScope::OwnMatrix,
        }
    }
}

impl MonteCarloParams {
    /// Each trial draws from its own stream so a run is reproducible.
    pub fn rng_for_trial(&self, trial: usize) -> SmallRng {
        SmallRng::seed_from_u64(self.seed.wrapping_add(trial as u64))
    }
}
