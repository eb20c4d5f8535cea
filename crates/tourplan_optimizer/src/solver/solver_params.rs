use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FirstSolutionStrategy {
    /// Extends each route from the depot along its cheapest feasible arc.
    #[default]
    PathCheapestArc,
    /// Repeatedly commits the cheapest insertion over all routes.
    BestInsertion,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SolverParams {
    pub time_limit: SignedDuration,

    pub weight_time: f64,
    pub weight_energy: f64,

    /// Waiting allowed between two consecutive visits, in minutes.
    pub waiting_slack: f64,
    /// Latest cumulative time of any route.
    pub horizon: f64,

    pub stop_count_penalty: f64,
    pub drop_penalty: f64,

    pub first_solution_strategy: FirstSolutionStrategy,
    pub local_search: bool,
    pub max_local_search_iterations: usize,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams {
            time_limit: SignedDuration::from_secs(900),
            weight_time: 0.5,
            weight_energy: 0.5,
            waiting_slack: 30.0,
            horizon: 86400.0,
            stop_count_penalty: 100_000.0,
            drop_penalty: 100_000.0,
            first_solution_strategy: FirstSolutionStrategy::PathCheapestArc,
            local_search: true,
            max_local_search_iterations: 200,
        }
    }
}
