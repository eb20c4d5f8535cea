use fxhash::FxHashMap;

use crate::{
    problem::routing_instance::VehicleIdx,
    solver::{
        deadline::Deadline,
        insertion::{Insertion, Task, for_each_route_insertion},
        score::Score,
        solve_status::SolveFailure,
        working_solution::WorkingSolution,
    },
};

type CacheKey = (VehicleIdx, usize, Task);

/// Best feasible insertion of every task into a route, valid as long as the
/// route version is unchanged.
#[derive(Default)]
pub struct InsertionCache {
    entries: FxHashMap<CacheKey, Option<(Insertion, Score)>>,
}

impl InsertionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn best_in_route(
        &mut self,
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        task: Task,
    ) -> Option<(Insertion, Score)> {
        let key = (vehicle, solution.route(vehicle).version(), task);
        if let Some(entry) = self.entries.get(&key) {
            return entry.clone();
        }

        let best = BestInsertion::best_in_route(solution, vehicle, task);
        self.entries.insert(key, best.clone());
        best
    }
}

/// Commits, one at a time, the cheapest feasible insertion over every
/// unassigned task and every route.
#[derive(Default)]
pub struct BestInsertion;

impl BestInsertion {
    pub fn best_in_route(
        solution: &WorkingSolution,
        vehicle: VehicleIdx,
        task: Task,
    ) -> Option<(Insertion, Score)> {
        let model = solution.model();
        let route = solution.route(vehicle);
        let mut best: Option<(Insertion, Score)> = None;

        for_each_route_insertion(solution, vehicle, task, |insertion| {
            let score = model.route_score(vehicle, &insertion.apply_to(route.stops()));
            if score.is_failure() {
                return;
            }

            let delta = score - route.score();
            if best.as_ref().is_none_or(|(_, best_delta)| delta < *best_delta) {
                best = Some((insertion, delta));
            }
        });

        best
    }

    /// Cheapest feasible insertion of `task` in any route, with its score delta.
    pub fn best_insertion(solution: &WorkingSolution, task: Task) -> Option<(Insertion, Score)> {
        (0..solution.routes().len())
            .filter_map(|index| Self::best_in_route(solution, VehicleIdx::new(index), task))
            .min_by(|(_, a), (_, b)| a.cmp(b))
    }

    pub fn insert_tasks(
        solution: &mut WorkingSolution,
        deadline: &Deadline,
    ) -> Result<(), SolveFailure> {
        let model = solution.model();
        let mut cache = InsertionCache::new();

        loop {
            if deadline.is_reached() {
                return Err(SolveFailure::TimeLimitExceeded);
            }

            let mut best: Option<(Insertion, Score)> = None;
            for task in solution.unassigned_tasks() {
                for index in 0..solution.routes().len() {
                    let Some((insertion, delta)) =
                        cache.best_in_route(solution, VehicleIdx::new(index), task)
                    else {
                        continue;
                    };

                    // Serving the task has to beat leaving it out
                    let gain = delta - model.unassigned_score(task);
                    if gain < Score::ZERO
                        && best.as_ref().is_none_or(|(_, best_gain)| gain < *best_gain)
                    {
                        best = Some((insertion, gain));
                    }
                }
            }

            match best {
                Some((insertion, _)) => solution.insert(&insertion),
                None => return Ok(()),
            }
        }
    }
}
