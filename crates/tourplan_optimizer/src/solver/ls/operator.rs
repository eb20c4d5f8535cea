use crate::solver::{deadline::Deadline, working_solution::WorkingSolution};

pub trait LocalSearchOperator {
    fn operator_name(&self) -> &'static str;

    /// Applies the best improving move found, if any. Gives up without moving
    /// once the deadline passes.
    fn improve(&self, solution: &mut WorkingSolution, deadline: &Deadline) -> bool;
}
