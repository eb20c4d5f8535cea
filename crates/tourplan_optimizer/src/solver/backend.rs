use super::{
    deadline::Deadline, routing_model::RoutingModel, routing_solution::RoutingSolution,
    solve_status::SolveFailure,
};

/// An engine able to solve a routing model within a deadline.
pub trait RoutingBackend {
    fn backend_name(&self) -> &'static str;

    fn solve(
        &self,
        model: &RoutingModel,
        deadline: &Deadline,
    ) -> Result<RoutingSolution, SolveFailure>;
}
