use crate::{
    problem::routing_instance::{NodeIdx, RoutingInstance},
    solver::score::Score,
};

use super::route_constraint::{RouteConstraint, RouteContext};

/// Weighted sum of the time spent on an arc and its energy cost, the same for
/// every vehicle.
#[derive(Clone, Debug)]
pub struct ArcCostConstraint {
    weight_time: f64,
    weight_energy: f64,
}

impl ArcCostConstraint {
    pub fn new(weight_time: f64, weight_energy: f64) -> Self {
        ArcCostConstraint {
            weight_time,
            weight_energy,
        }
    }

    #[inline(always)]
    pub fn arc_cost(&self, instance: &RoutingInstance, from: NodeIdx, to: NodeIdx) -> f64 {
        self.weight_time * instance.transit(from, to)
            + self.weight_energy * instance.matrices().energy(from.get(), to.get())
    }
}

impl RouteConstraint for ArcCostConstraint {
    fn compute_score(&self, context: &RouteContext) -> Score {
        if context.stops.is_empty() {
            return Score::ZERO;
        }

        Score::soft(
            context
                .arcs()
                .map(|(from, to)| self.arc_cost(context.instance, from, to))
                .sum(),
        )
    }
}
