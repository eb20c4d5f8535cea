use tracing::{Level, instrument};

use crate::solver::{
    construction::best_insertion::BestInsertion, deadline::Deadline, insertion::Insertion,
    score::Score, working_solution::WorkingSolution,
};

use super::operator::LocalSearchOperator;

/// **Relocate**
///
/// Takes a task out of its route and reinserts it at its cheapest feasible
/// position, in the same route or another one. Both legs of a pickup and
/// delivery job move together. Tasks left unserved are tried as well.
///
/// ```text
/// BEFORE:
///    Route 1: ... (A) -> [T] -> (C) ...
///    Route 2: ... (X) -> (Y) ...
///
/// AFTER:
///    Route 1: ... (A) -> (C) ...
///    Route 2: ... (X) -> [T] -> (Y) ...
/// ```
#[derive(Debug, Default)]
pub struct RelocateOperator;

impl LocalSearchOperator for RelocateOperator {
    fn operator_name(&self) -> &'static str {
        "relocate"
    }

    #[instrument(skip_all, level = Level::DEBUG)]
    fn improve(&self, solution: &mut WorkingSolution, deadline: &Deadline) -> bool {
        let model = solution.model();
        let current = solution.score();
        let mut best: Option<(Insertion, Score)> = None;

        for task in solution.assigned_tasks() {
            if deadline.is_reached() {
                return false;
            }

            let mut reduced = solution.clone();
            reduced.remove_task(task);

            let Some((insertion, delta)) = BestInsertion::best_insertion(&reduced, task) else {
                continue;
            };

            let score = reduced.score() - model.unassigned_score(task) + delta;
            if score.improves_on(best.as_ref().map_or(&current, |(_, best_score)| best_score)) {
                best = Some((insertion, score));
            }
        }

        for task in solution.unassigned_tasks() {
            if deadline.is_reached() {
                return false;
            }

            let Some((insertion, delta)) = BestInsertion::best_insertion(solution, task) else {
                continue;
            };

            let score = current - model.unassigned_score(task) + delta;
            if score.improves_on(best.as_ref().map_or(&current, |(_, best_score)| best_score)) {
                best = Some((insertion, score));
            }
        }

        let Some((insertion, _)) = best else {
            return false;
        };

        solution.remove_task(insertion.task());
        solution.insert(&insertion);
        true
    }
}
