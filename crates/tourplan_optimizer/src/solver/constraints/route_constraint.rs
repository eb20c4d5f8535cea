use crate::{
    problem::routing_instance::{InstanceVehicle, NodeIdx, RoutingInstance, VehicleIdx},
    solver::score::Score,
};

use super::{
    arc_cost::ArcCostConstraint,
    capacity_dimension::CapacityDimension,
    pickup_delivery::PickupDeliveryConstraint,
    stop_count_dimension::{StopCountLimit, StopCountSoftUpperBound},
    time_dimension::TimeDimension,
};

/// A candidate route: the vehicle and its visits, depot excluded.
pub struct RouteContext<'a> {
    pub instance: &'a RoutingInstance,
    pub vehicle: VehicleIdx,
    pub stops: &'a [NodeIdx],
}

impl<'a> RouteContext<'a> {
    pub fn vehicle(&self) -> &'a InstanceVehicle {
        self.instance.vehicle(self.vehicle)
    }

    /// Every node of the route, starting and ending at the depot.
    pub fn path(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        std::iter::once(NodeIdx::DEPOT)
            .chain(self.stops.iter().copied())
            .chain(std::iter::once(NodeIdx::DEPOT))
    }

    pub fn arcs(&self) -> impl Iterator<Item = (NodeIdx, NodeIdx)> + '_ {
        self.path().zip(self.path().skip(1))
    }
}

pub trait RouteConstraint {
    fn compute_score(&self, context: &RouteContext) -> Score;
}

#[derive(Clone, Debug)]
pub enum RouteConstraintType {
    ArcCost(ArcCostConstraint),
    Time(TimeDimension),
    Capacity(CapacityDimension),
    StopCountLimit(StopCountLimit),
    StopCountSoftUpperBound(StopCountSoftUpperBound),
    PickupDelivery(PickupDeliveryConstraint),
}

impl RouteConstraintType {
    pub fn constraint_name(&self) -> &'static str {
        match self {
            RouteConstraintType::ArcCost(_) => "arc_cost",
            RouteConstraintType::Time(_) => "time",
            RouteConstraintType::Capacity(_) => "capacity",
            RouteConstraintType::StopCountLimit(_) => "stop_count_limit",
            RouteConstraintType::StopCountSoftUpperBound(_) => "stop_count_soft_upper_bound",
            RouteConstraintType::PickupDelivery(_) => "pickup_delivery",
        }
    }
}

impl RouteConstraint for RouteConstraintType {
    fn compute_score(&self, context: &RouteContext) -> Score {
        match self {
            RouteConstraintType::ArcCost(c) => c.compute_score(context),
            RouteConstraintType::Time(c) => c.compute_score(context),
            RouteConstraintType::Capacity(c) => c.compute_score(context),
            RouteConstraintType::StopCountLimit(c) => c.compute_score(context),
            RouteConstraintType::StopCountSoftUpperBound(c) => c.compute_score(context),
            RouteConstraintType::PickupDelivery(c) => c.compute_score(context),
        }
    }
}
