use tracing::{Level, debug, instrument};

use crate::solver::{deadline::Deadline, working_solution::WorkingSolution};

use super::{operator::LocalSearchOperator, relocate::RelocateOperator, two_opt::TwoOptOperator};

/// Applies improving moves until none is left, the iteration budget is spent
/// or the deadline passes.
pub struct LocalSearch {
    max_iterations: usize,
    operators: Vec<Box<dyn LocalSearchOperator>>,
}

impl LocalSearch {
    pub fn new(max_iterations: usize) -> Self {
        LocalSearch {
            max_iterations,
            operators: vec![Box::new(TwoOptOperator), Box::new(RelocateOperator)],
        }
    }

    /// Returns the number of iterations run.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn improve(&self, solution: &mut WorkingSolution, deadline: &Deadline) -> usize {
        for iteration in 0..self.max_iterations {
            if deadline.is_reached() {
                debug!(iteration, "Local search stopped by the deadline");
                return iteration;
            }

            let mut improved = false;
            for operator in &self.operators {
                if operator.improve(solution, deadline) {
                    debug!(
                        iteration,
                        operator = operator.operator_name(),
                        score = ?solution.score(),
                        "Improved solution"
                    );
                    improved = true;
                }
            }

            if !improved {
                return iteration + 1;
            }
        }

        self.max_iterations
    }
}
