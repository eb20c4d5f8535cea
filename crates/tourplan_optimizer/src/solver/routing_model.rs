use crate::problem::{
    job_kind::JobKind,
    routing_instance::{NodeIdx, NodeKind, PickupDeliveryPair, RoutingInstance, VehicleIdx},
};

use super::{
    constraints::{
        arc_cost::ArcCostConstraint,
        capacity_dimension::CapacityDimension,
        pickup_delivery::PickupDeliveryConstraint,
        route_constraint::{RouteConstraint, RouteConstraintType, RouteContext},
        stop_count_dimension::{StopCountLimit, StopCountSoftUpperBound},
        time_dimension::TimeDimension,
    },
    insertion::Task,
    schedule::Schedule,
    score::{Score, ScoreAnalysis},
    solve_status::SolveFailure,
    solver_params::SolverParams,
    working_solution::WorkingSolution,
};

/// Allows a visit to stay unserved at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct NodeDisjunction {
    pub penalty: f64,
}

/// A routing instance with the constraints a backend has to honor.
pub struct RoutingModel<'a> {
    instance: &'a RoutingInstance,
    arc_cost: ArcCostConstraint,
    time: TimeDimension,
    constraints: Vec<RouteConstraintType>,
    disjunction: Option<NodeDisjunction>,
    tasks: Vec<Task>,
    params: SolverParams,
}

impl<'a> RoutingModel<'a> {
    pub fn from_instance(instance: &'a RoutingInstance, params: &SolverParams) -> Self {
        let arc_cost = ArcCostConstraint::new(params.weight_time, params.weight_energy);
        let time = TimeDimension::new(params.waiting_slack, params.horizon);

        let mut constraints = vec![
            RouteConstraintType::ArcCost(arc_cost.clone()),
            RouteConstraintType::Time(time.clone()),
            RouteConstraintType::Capacity(CapacityDimension),
        ];

        let mut disjunction = None;
        if instance.stop_counting() {
            constraints.push(RouteConstraintType::StopCountLimit(StopCountLimit));
            constraints.push(RouteConstraintType::StopCountSoftUpperBound(
                StopCountSoftUpperBound::new(params.stop_count_penalty),
            ));
            disjunction = Some(NodeDisjunction {
                penalty: params.drop_penalty,
            });
        }

        if instance.job_kind() == JobKind::PickupDelivery {
            constraints.push(RouteConstraintType::PickupDelivery(
                PickupDeliveryConstraint,
            ));
        }

        let tasks = (1..instance.num_nodes())
            .map(NodeIdx::new)
            .filter_map(|node| match instance.partner(node) {
                None => Some(Task::Single(node)),
                Some(delivery) if instance.node(node).kind == NodeKind::Pickup => {
                    Some(Task::Pair(PickupDeliveryPair {
                        pickup: node,
                        delivery,
                    }))
                }
                Some(_) => None,
            })
            .collect();

        RoutingModel {
            instance,
            arc_cost,
            time,
            constraints,
            disjunction,
            tasks,
            params: params.clone(),
        }
    }

    pub fn instance(&self) -> &'a RoutingInstance {
        self.instance
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn constraints(&self) -> &[RouteConstraintType] {
        &self.constraints
    }

    pub fn disjunction(&self) -> Option<&NodeDisjunction> {
        self.disjunction.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn num_vehicles(&self) -> usize {
        self.instance.vehicles().len()
    }

    pub fn arc_cost(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        self.arc_cost.arc_cost(self.instance, from, to)
    }

    pub fn schedule(&self, stops: &[NodeIdx]) -> Option<Schedule> {
        self.time.schedule(self.instance, stops)
    }

    /// Score of one route. Unused vehicles cost nothing.
    pub fn route_score(&self, vehicle: VehicleIdx, stops: &[NodeIdx]) -> Score {
        if stops.is_empty() {
            return Score::ZERO;
        }

        let context = RouteContext {
            instance: self.instance,
            vehicle,
            stops,
        };

        self.constraints
            .iter()
            .map(|constraint| constraint.compute_score(&context))
            .sum()
    }

    /// Cost of leaving a task unserved. Without a disjunction every visit is
    /// mandatory, so skipping one is a hard violation.
    pub fn unassigned_score(&self, task: Task) -> Score {
        let nodes = task.node_count() as f64;
        match self.disjunction {
            Some(disjunction) => Score::soft(disjunction.penalty * nodes),
            None => Score::hard(nodes),
        }
    }

    pub fn analyze(&self, solution: &WorkingSolution) -> ScoreAnalysis {
        let mut analysis = ScoreAnalysis::default();

        for route in solution.routes().iter().filter(|route| !route.is_empty()) {
            let context = RouteContext {
                instance: self.instance,
                vehicle: route.vehicle(),
                stops: route.stops(),
            };
            for constraint in &self.constraints {
                analysis.add(
                    constraint.constraint_name(),
                    constraint.compute_score(&context),
                );
            }
        }

        for task in solution.unassigned_tasks() {
            analysis.add("unassigned", self.unassigned_score(task));
        }

        analysis
    }

    pub fn validate(&self) -> Result<(), SolveFailure> {
        let invalid = |reason: String| Err(SolveFailure::InvalidModel(reason));

        if self.params.waiting_slack < 0.0 || self.params.horizon <= 0.0 {
            return invalid(format!(
                "waiting slack {} and horizon {} must be positive",
                self.params.waiting_slack, self.params.horizon
            ));
        }

        if self.instance.vehicles().is_empty() {
            return invalid("no vehicles".to_owned());
        }

        for (index, node) in self.instance.nodes().iter().enumerate() {
            if !node.window.is_valid() {
                return invalid(format!(
                    "node {index} has time window [{}, {}]",
                    node.window.start(),
                    node.window.end()
                ));
            }
            if !node.service_minutes.is_finite() || node.service_minutes < 0.0 {
                return invalid(format!("node {index} has service time {}", node.service_minutes));
            }
        }

        for vehicle in self.instance.vehicles() {
            if vehicle.capacity < 0 {
                return invalid(format!(
                    "vehicle {} has capacity {}",
                    vehicle.id, vehicle.capacity
                ));
            }
            if self.instance.stop_counting() && vehicle.stop_limits.is_none() {
                return invalid(format!("vehicle {} has no stop limits", vehicle.id));
            }
        }

        let matrices = self.instance.matrices();
        let valid_entry = |value: f64| value.is_finite() && value >= 0.0;
        if !matrices.times().iter().copied().all(valid_entry)
            || !matrices.energies().iter().copied().all(valid_entry)
        {
            return invalid("matrix entries must be finite and non-negative".to_owned());
        }

        Ok(())
    }
}
