use serde::{Deserialize, Serialize};
use tourplan_costs::cost_resolver::ResolverParams;

use crate::{
    extraction::solution_extractor::RunLabels,
    montecarlo::montecarlo_params::MonteCarloParams,
    partition::capacity_partitioner::PartitionParams,
    problem::stop_distribution::StopPolicy,
    solver::solver_params::SolverParams,
};

/// Every knob of a planning run. Missing sections fall back to their defaults.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PlannerParams {
    pub resolver: ResolverParams,
    pub solver: SolverParams,
    pub montecarlo: MonteCarloParams,
    pub partition: PartitionParams,
    pub stop_policy: StopPolicy,
    pub labels: RunLabels,
}
