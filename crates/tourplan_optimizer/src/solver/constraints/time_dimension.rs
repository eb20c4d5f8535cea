use crate::{
    problem::routing_instance::{NodeIdx, RoutingInstance},
    solver::{schedule::Schedule, score::Score},
};

use super::route_constraint::{RouteConstraint, RouteContext};

#[derive(Clone, Debug)]
pub struct TimeDimension {
    waiting_slack: f64,
    horizon: f64,
}

impl TimeDimension {
    pub fn new(waiting_slack: f64, horizon: f64) -> Self {
        TimeDimension {
            waiting_slack,
            horizon,
        }
    }

    pub fn schedule(&self, instance: &RoutingInstance, stops: &[NodeIdx]) -> Option<Schedule> {
        Schedule::compute(instance, stops, self.waiting_slack, self.horizon)
    }
}

impl RouteConstraint for TimeDimension {
    fn compute_score(&self, context: &RouteContext) -> Score {
        if context.stops.is_empty() || self.schedule(context.instance, context.stops).is_some() {
            Score::ZERO
        } else {
            Score::hard(1.0)
        }
    }
}
