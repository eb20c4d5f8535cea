use tracing::{Level, debug, instrument};

use super::{
    backend::RoutingBackend,
    construction::{best_insertion::BestInsertion, path_cheapest_arc::PathCheapestArc},
    deadline::Deadline,
    ls::local_search::LocalSearch,
    routing_model::RoutingModel,
    routing_solution::RoutingSolution,
    solve_status::SolveFailure,
    solver_params::{FirstSolutionStrategy, SolverParams},
    working_solution::WorkingSolution,
};

/// In-process backend: a construction heuristic followed by local search.
pub struct InsertionBackend {
    first_solution_strategy: FirstSolutionStrategy,
    local_search: Option<LocalSearch>,
}

impl InsertionBackend {
    pub fn new(params: &SolverParams) -> Self {
        InsertionBackend {
            first_solution_strategy: params.first_solution_strategy,
            local_search: params
                .local_search
                .then(|| LocalSearch::new(params.max_local_search_iterations)),
        }
    }
}

impl RoutingBackend for InsertionBackend {
    fn backend_name(&self) -> &'static str {
        "insertion"
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    fn solve(
        &self,
        model: &RoutingModel,
        deadline: &Deadline,
    ) -> Result<RoutingSolution, SolveFailure> {
        let mut solution = WorkingSolution::new(model);

        if self.first_solution_strategy == FirstSolutionStrategy::PathCheapestArc {
            PathCheapestArc::construct(&mut solution, deadline)?;
        }
        // Places what the routes left behind, anywhere it still fits
        BestInsertion::insert_tasks(&mut solution, deadline)?;

        if solution.score().is_failure() {
            debug!(
                unassigned = solution.unassigned_tasks().len(),
                "Mandatory visits left unassigned"
            );
            return Err(SolveFailure::Infeasible);
        }

        if let Some(local_search) = &self.local_search {
            let iterations = local_search.improve(&mut solution, deadline);
            debug!(iterations, score = ?solution.score(), "Local search done");
        }

        debug!(analysis = ?model.analyze(&solution), "Final score");

        RoutingSolution::from_working(&solution)
    }
}
