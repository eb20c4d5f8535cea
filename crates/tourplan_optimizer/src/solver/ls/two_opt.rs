use crate::{
    problem::routing_instance::{NodeIdx, VehicleIdx},
    solver::{deadline::Deadline, score::Score, working_solution::WorkingSolution},
};

use super::operator::LocalSearchOperator;

/// **Intra-Route 2-opt**
///
/// Reverses the visits between `from` and `to`, both included. Reversals that
/// put a delivery ahead of its pickup break the route and are rejected by the
/// route score.
///
/// ```text
/// BEFORE: (A) -> [from] -> (B) -> [to] -> (C)
/// AFTER:  (A) -> [to] -> (B) -> [from] -> (C)
/// ```
#[derive(Debug, Default)]
pub struct TwoOptOperator;

impl LocalSearchOperator for TwoOptOperator {
    fn operator_name(&self) -> &'static str {
        "two_opt"
    }

    fn improve(&self, solution: &mut WorkingSolution, deadline: &Deadline) -> bool {
        let model = solution.model();
        let mut best: Option<(VehicleIdx, Vec<NodeIdx>, Score)> = None;

        for route in solution.routes().iter().filter(|route| route.len() >= 2) {
            for from in 0..route.len() - 1 {
                if deadline.is_reached() {
                    return false;
                }

                for to in from + 1..route.len() {
                    let mut stops = route.stops().to_vec();
                    stops[from..=to].reverse();

                    let delta = model.route_score(route.vehicle(), &stops) - route.score();
                    let threshold = best.as_ref().map_or(Score::ZERO, |(_, _, best)| *best);
                    if delta.improves_on(&threshold) {
                        best = Some((route.vehicle(), stops, delta));
                    }
                }
            }
        }

        match best {
            Some((vehicle, stops, _)) => {
                solution.set_route(vehicle, stops);
                true
            }
            None => false,
        }
    }
}
