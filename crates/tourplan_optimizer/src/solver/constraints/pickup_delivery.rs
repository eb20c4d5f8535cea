use crate::{
    problem::routing_instance::{NodeIdx, NodeKind},
    solver::score::Score,
};

use super::route_constraint::{RouteConstraint, RouteContext};

/// Both legs of a pickup and delivery job ride the same vehicle, pickup first.
/// Transit times are never negative, so visiting the pickup first also keeps
/// its cumulative time at or below the delivery's.
#[derive(Clone, Debug, Default)]
pub struct PickupDeliveryConstraint;

impl RouteConstraint for PickupDeliveryConstraint {
    fn compute_score(&self, context: &RouteContext) -> Score {
        let instance = context.instance;
        let position = |target: NodeIdx| context.stops.iter().position(|&node| node == target);

        let broken = context
            .stops
            .iter()
            .enumerate()
            .filter(|&(index, &node)| {
                let Some(partner) = instance.partner(node) else {
                    return false;
                };
                match (instance.node(node).kind, position(partner)) {
                    (NodeKind::Pickup, Some(other)) => other < index,
                    (NodeKind::Delivery, Some(other)) => other > index,
                    _ => true,
                }
            })
            .count();

        Score::hard(broken as f64)
    }
}
