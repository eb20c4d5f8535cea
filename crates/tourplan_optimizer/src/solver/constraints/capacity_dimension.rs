use crate::{
    problem::routing_instance::{NodeIdx, RoutingInstance},
    solver::score::Score,
};

use super::route_constraint::{RouteConstraint, RouteContext};

/// Load carried by a vehicle, starting empty at the depot. The running load
/// must stay within `[0, capacity]` at every node.
#[derive(Clone, Debug, Default)]
pub struct CapacityDimension;

impl CapacityDimension {
    /// Running load after each node of the path, the depot start included.
    pub fn loads(instance: &RoutingInstance, path: impl Iterator<Item = NodeIdx>) -> Vec<i64> {
        path.scan(0i64, |load, node| {
            *load += instance.node(node).demand;
            Some(*load)
        })
        .collect()
    }
}

impl RouteConstraint for CapacityDimension {
    fn compute_score(&self, context: &RouteContext) -> Score {
        let capacity = context.vehicle().capacity;

        let excess: i64 = CapacityDimension::loads(context.instance, context.path())
            .into_iter()
            .map(|load| (load - capacity).max(0) + (-load).max(0))
            .sum();

        Score::hard(excess as f64)
    }
}
