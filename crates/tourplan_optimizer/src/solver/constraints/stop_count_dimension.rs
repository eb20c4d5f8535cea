use crate::solver::score::Score;

use super::route_constraint::{RouteConstraint, RouteContext};

fn stop_count(context: &RouteContext) -> u32 {
    context
        .stops
        .iter()
        .map(|&node| context.instance.node(node).stop_cost)
        .sum()
}

/// Hard ceiling on the stops of a tour: the vehicle's slack-stops limit.
#[derive(Clone, Debug, Default)]
pub struct StopCountLimit;

impl RouteConstraint for StopCountLimit {
    fn compute_score(&self, context: &RouteContext) -> Score {
        let Some(limits) = context.vehicle().stop_limits else {
            return Score::ZERO;
        };

        Score::hard(stop_count(context).saturating_sub(limits.slack_stops) as f64)
    }
}

/// Every stop above the vehicle's drawn max-stops costs `penalty`.
#[derive(Clone, Debug)]
pub struct StopCountSoftUpperBound {
    penalty: f64,
}

impl StopCountSoftUpperBound {
    pub fn new(penalty: f64) -> Self {
        StopCountSoftUpperBound { penalty }
    }
}

impl RouteConstraint for StopCountSoftUpperBound {
    fn compute_score(&self, context: &RouteContext) -> Score {
        let Some(limits) = context.vehicle().stop_limits else {
            return Score::ZERO;
        };

        Score::soft(self.penalty * stop_count(context).saturating_sub(limits.max_stops) as f64)
    }
}
