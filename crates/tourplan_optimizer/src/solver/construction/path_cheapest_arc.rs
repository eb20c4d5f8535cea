use fixedbitset::FixedBitSet;
use tracing::debug;

use crate::{
    problem::routing_instance::{NodeIdx, NodeKind, VehicleIdx},
    solver::{
        deadline::Deadline, insertion::Task, routing_model::RoutingModel, score::Score,
        solve_status::SolveFailure, working_solution::WorkingSolution,
    },
};

/// Builds the routes one vehicle at a time. Starting at the depot, a route is
/// extended with the visit reached by the cheapest arc among those that still
/// leave the route closable, and closed once nothing else fits.
///
/// A pickup opens its delivery, which stays pending until the route picks it
/// or closes.
#[derive(Default)]
pub struct PathCheapestArc;

struct Candidate {
    node: NodeIdx,
    /// `None` for a pending delivery whose task is already on the route.
    task: Option<Task>,
}

impl PathCheapestArc {
    pub fn construct(
        solution: &mut WorkingSolution,
        deadline: &Deadline,
    ) -> Result<(), SolveFailure> {
        let model = solution.model();
        let instance = model.instance();

        for index in 0..solution.routes().len() {
            let vehicle = VehicleIdx::new(index);
            let mut stops = solution.route(vehicle).stops().to_vec();
            let mut pending: Vec<NodeIdx> = Vec::new();
            let mut visited = FixedBitSet::with_capacity(instance.num_nodes());
            visited.extend(stops.iter().map(|node| node.get()));

            loop {
                if deadline.is_reached() {
                    return Err(SolveFailure::TimeLimitExceeded);
                }

                let last = stops.last().copied().unwrap_or(NodeIdx::DEPOT);
                let closed_score = model.route_score(vehicle, &closed(&stops, &pending, None));

                let mut best: Option<(NodeIdx, f64)> = None;
                for candidate in candidates(solution, &visited, &pending) {
                    let cost = model.arc_cost(last, candidate.node);
                    if best.is_some_and(|(_, best_cost)| cost >= best_cost) {
                        continue;
                    }

                    if accepts(model, vehicle, &stops, &pending, &candidate, closed_score) {
                        best = Some((candidate.node, cost));
                    }
                }

                let Some((next, _)) = best else {
                    break;
                };

                if let Some(position) = pending.iter().position(|&node| node == next) {
                    pending.remove(position);
                } else if instance.node(next).kind == NodeKind::Pickup
                    && let Some(delivery) = instance.partner(next)
                {
                    pending.push(delivery);
                }
                visited.insert(next.get());
                stops.push(next);
            }

            stops.append(&mut pending);
            debug!(vehicle = %vehicle, stops = stops.len(), "Closed route");
            solution.set_route(vehicle, stops);
        }

        Ok(())
    }
}

/// The route as it would end if closed now, optionally extended by `next`.
fn closed(
    stops: &[NodeIdx],
    pending: &[NodeIdx],
    next: Option<(NodeIdx, Option<NodeIdx>)>,
) -> Vec<NodeIdx> {
    let mut route = stops.to_vec();
    let next_node = next.map(|(node, _)| node);
    if let Some((node, delivery)) = next {
        route.push(node);
        route.extend(delivery);
    }
    route.extend(
        pending
            .iter()
            .copied()
            .filter(|&node| Some(node) != next_node),
    );
    route
}

fn candidates(
    solution: &WorkingSolution,
    visited: &FixedBitSet,
    pending: &[NodeIdx],
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = solution
        .unassigned_tasks()
        .into_iter()
        .filter(|task| !visited.contains(task.first_node().get()))
        .map(|task| Candidate {
            node: task.first_node(),
            task: Some(task),
        })
        .collect();

    candidates.extend(pending.iter().map(|&node| Candidate { node, task: None }));
    candidates
}

fn accepts(
    model: &RoutingModel,
    vehicle: VehicleIdx,
    stops: &[NodeIdx],
    pending: &[NodeIdx],
    candidate: &Candidate,
    closed_score: Score,
) -> bool {
    let delivery = match candidate.task {
        Some(Task::Pair(pair)) => Some(pair.delivery),
        _ => None,
    };

    let extended = closed(stops, pending, Some((candidate.node, delivery)));
    let score = model.route_score(vehicle, &extended);
    if score.is_failure() {
        return false;
    }

    match candidate.task {
        // Serving the task has to beat leaving it out
        Some(task) => score - closed_score - model.unassigned_score(task) < Score::ZERO,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use tourplan_costs::travel_matrices::TravelMatrices;

    use crate::{
        problem::{job_kind::JobKind, routing_instance::RoutingInstanceBuilder},
        solver::solver_params::SolverParams,
        test_utils::{
            delivery_instance, depot_node, group_key, pickup_node, stop_node, test_vehicle,
        },
    };

    use super::*;

    fn deadline() -> Deadline {
        Deadline::new(SignedDuration::from_secs(60))
    }

    #[test]
    fn test_splits_by_capacity() {
        let instance = delivery_instance(&[(11, 50), (12, 60)], 100, 2);
        let model = RoutingModel::from_instance(&instance, &SolverParams::default());
        let mut solution = WorkingSolution::new(&model);

        PathCheapestArc::construct(&mut solution, &deadline()).unwrap();

        assert!(solution.unassigned_tasks().is_empty());
        assert_eq!(solution.route(VehicleIdx::new(0)).len(), 1);
        assert_eq!(solution.route(VehicleIdx::new(1)).len(), 1);
    }

    #[test]
    fn test_follows_cheapest_arc() {
        let mut builder = RoutingInstanceBuilder::new(group_key(), JobKind::Delivery);
        builder.add_node(depot_node((0.0, 1440.0)));
        for zone in [11, 12, 13] {
            builder.add_node(stop_node(&format!("p{zone}"), zone, 1, (0.0, 1440.0)));
        }
        // Nodes lie on a line: depot, 3, 1, 2
        let position = [0.0, 20.0, 30.0, 10.0];
        builder
            .set_matrices(TravelMatrices::from_fn(4, |from, to| {
                (f64::abs(position[from] - position[to]), 0.0)
            }))
            .add_vehicle(test_vehicle(1, 100));
        let instance = builder.build().unwrap();
        let model = RoutingModel::from_instance(&instance, &SolverParams::default());
        let mut solution = WorkingSolution::new(&model);

        PathCheapestArc::construct(&mut solution, &deadline()).unwrap();

        assert_eq!(
            solution.route(VehicleIdx::new(0)).stops(),
            &[NodeIdx::new(3), NodeIdx::new(1), NodeIdx::new(2)]
        );
    }

    #[test]
    fn test_delivery_follows_pickup() {
        let mut builder = RoutingInstanceBuilder::new(group_key(), JobKind::PickupDelivery);
        builder.add_node(depot_node((0.0, 1440.0)));
        let pickup = builder.add_node(pickup_node("p1", 11, 70, (0.0, 1440.0)));
        let delivery = builder.add_node(stop_node("p1", 12, -70, (0.0, 1440.0)));
        let other_pickup = builder.add_node(pickup_node("p2", 13, 70, (0.0, 1440.0)));
        let other_delivery = builder.add_node(stop_node("p2", 14, -70, (0.0, 1440.0)));
        builder
            .add_pickup_delivery(pickup, delivery)
            .add_pickup_delivery(other_pickup, other_delivery)
            .set_matrices(TravelMatrices::from_fn(5, |from, to| {
                (if from == to { 0.0 } else { 10.0 }, 0.0)
            }))
            .add_vehicle(test_vehicle(1, 100));
        let instance = builder.build().unwrap();
        let model = RoutingModel::from_instance(&instance, &SolverParams::default());
        let mut solution = WorkingSolution::new(&model);

        PathCheapestArc::construct(&mut solution, &deadline()).unwrap();

        // Both pickups together would overload the vehicle
        assert_eq!(
            solution.route(VehicleIdx::new(0)).stops(),
            &[pickup, delivery, other_pickup, other_delivery]
        );
        assert!(!solution.score().is_failure());
    }
}
