use jiff::SignedDuration;
use tracing::{Level, info, instrument};

use crate::{problem::routing_instance::RoutingInstance, timer_debug};

use super::{
    backend::RoutingBackend, deadline::Deadline, insertion_backend::InsertionBackend,
    routing_model::RoutingModel, routing_solution::RoutingSolution, solve_status::SolveFailure,
    solver_params::SolverParams,
};

/// Turns a routing instance into a model, runs it through a backend and
/// reports the outcome.
pub struct SolverAdapter<B = InsertionBackend> {
    params: SolverParams,
    backend: B,
}

impl SolverAdapter<InsertionBackend> {
    pub fn new(params: SolverParams) -> Self {
        let backend = InsertionBackend::new(&params);
        SolverAdapter { params, backend }
    }
}

impl<B: RoutingBackend> SolverAdapter<B> {
    pub fn with_backend(params: SolverParams, backend: B) -> Self {
        SolverAdapter { params, backend }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    /// Solves with the configured time limit and arc cost weights.
    pub fn solve_instance(
        &self,
        instance: &RoutingInstance,
    ) -> Result<RoutingSolution, SolveFailure> {
        self.solve(
            instance,
            self.params.time_limit,
            self.params.weight_time,
            self.params.weight_energy,
        )
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(group = %instance.key()))]
    pub fn solve(
        &self,
        instance: &RoutingInstance,
        time_limit: SignedDuration,
        weight_time: f64,
        weight_energy: f64,
    ) -> Result<RoutingSolution, SolveFailure> {
        if time_limit <= SignedDuration::ZERO {
            return Err(SolveFailure::NotSolved);
        }

        let params = SolverParams {
            time_limit,
            weight_time,
            weight_energy,
            ..self.params.clone()
        };
        let model = RoutingModel::from_instance(instance, &params);
        model.validate()?;

        let deadline = Deadline::new(time_limit);
        let solution = timer_debug!(
            "Solved routing instance",
            self.backend.solve(&model, &deadline)
        )?;

        info!(
            backend = self.backend.backend_name(),
            vehicles = solution.used_routes().count(),
            dropped = solution.dropped().len(),
            objective = solution.objective().soft_score,
            "Solved group"
        );

        Ok(solution)
    }
}
