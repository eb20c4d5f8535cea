use fixedbitset::FixedBitSet;

use crate::problem::routing_instance::{NodeIdx, VehicleIdx};

use super::{insertion::Insertion, insertion::Task, routing_model::RoutingModel, score::Score};

#[derive(Debug, Clone)]
pub struct WorkingRoute {
    vehicle: VehicleIdx,
    stops: Vec<NodeIdx>,
    score: Score,
    version: usize,
}

impl WorkingRoute {
    pub fn vehicle(&self) -> VehicleIdx {
        self.vehicle
    }

    /// Visits in order, the depot excluded.
    pub fn stops(&self) -> &[NodeIdx] {
        &self.stops
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Bumped on every change, used to cache insertion evaluations.
    pub fn version(&self) -> usize {
        self.version
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Mutable solution state shared by the construction heuristics and the local
/// search. One route per vehicle, possibly empty.
#[derive(Clone)]
pub struct WorkingSolution<'a> {
    model: &'a RoutingModel<'a>,
    routes: Vec<WorkingRoute>,
    assigned: FixedBitSet,
}

impl<'a> WorkingSolution<'a> {
    pub fn new(model: &'a RoutingModel<'a>) -> Self {
        WorkingSolution {
            model,
            routes: (0..model.num_vehicles())
                .map(|index| WorkingRoute {
                    vehicle: VehicleIdx::new(index),
                    stops: Vec::new(),
                    score: Score::ZERO,
                    version: 0,
                })
                .collect(),
            assigned: FixedBitSet::with_capacity(model.instance().num_nodes()),
        }
    }

    pub fn model(&self) -> &'a RoutingModel<'a> {
        self.model
    }

    pub fn routes(&self) -> &[WorkingRoute] {
        &self.routes
    }

    pub fn route(&self, vehicle: VehicleIdx) -> &WorkingRoute {
        &self.routes[vehicle.get()]
    }

    pub fn is_assigned(&self, task: Task) -> bool {
        self.assigned.contains(task.first_node().get())
    }

    pub fn unassigned_tasks(&self) -> Vec<Task> {
        self.model
            .tasks()
            .iter()
            .copied()
            .filter(|&task| !self.is_assigned(task))
            .collect()
    }

    pub fn assigned_tasks(&self) -> Vec<Task> {
        self.model
            .tasks()
            .iter()
            .copied()
            .filter(|&task| self.is_assigned(task))
            .collect()
    }

    /// Visits no vehicle serves.
    pub fn unassigned_nodes(&self) -> Vec<NodeIdx> {
        self.unassigned_tasks()
            .into_iter()
            .flat_map(Task::nodes)
            .collect()
    }

    pub fn score(&self) -> Score {
        let routes: Score = self.routes.iter().map(|route| route.score).sum();
        let unassigned: Score = self
            .unassigned_tasks()
            .into_iter()
            .map(|task| self.model.unassigned_score(task))
            .sum();

        routes + unassigned
    }

    /// Change of the route score if `insertion` were applied.
    pub fn insertion_delta(&self, insertion: &Insertion) -> Score {
        let route = self.route(insertion.vehicle());
        let stops = insertion.apply_to(route.stops());

        self.model.route_score(route.vehicle, &stops) - route.score
    }

    pub fn insert(&mut self, insertion: &Insertion) {
        let stops = insertion.apply_to(self.route(insertion.vehicle()).stops());
        self.set_route(insertion.vehicle(), stops);
    }

    /// Replaces the visits of a vehicle.
    pub fn set_route(&mut self, vehicle: VehicleIdx, stops: Vec<NodeIdx>) {
        let score = self.model.route_score(vehicle, &stops);
        let route = &mut self.routes[vehicle.get()];

        for node in &route.stops {
            self.assigned.set(node.get(), false);
        }
        for node in &stops {
            self.assigned.insert(node.get());
        }

        route.stops = stops;
        route.score = score;
        route.version += 1;
    }

    /// Takes a task off its route, returning the vehicle that served it.
    pub fn remove_task(&mut self, task: Task) -> Option<VehicleIdx> {
        let vehicle = self
            .routes
            .iter()
            .find(|route| route.stops.contains(&task.first_node()))
            .map(|route| route.vehicle)?;

        let stops = self
            .route(vehicle)
            .stops()
            .iter()
            .copied()
            .filter(|&node| !task.nodes().any(|task_node| task_node == node))
            .collect();
        self.set_route(vehicle, stops);

        Some(vehicle)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        solver::{insertion::SingleInsertion, solver_params::SolverParams},
        test_utils::delivery_instance,
    };

    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let instance = delivery_instance(&[(11, 10), (12, 10)], 100, 1);
        let model = RoutingModel::from_instance(&instance, &SolverParams::default());
        let mut solution = WorkingSolution::new(&model);

        assert_eq!(solution.unassigned_tasks().len(), 2);
        assert!(solution.score().is_failure());

        let insertion = Insertion::Single(SingleInsertion {
            vehicle: VehicleIdx::new(0),
            node: NodeIdx::new(2),
            position: 0,
        });
        let delta = solution.insertion_delta(&insertion);
        solution.insert(&insertion);

        assert_eq!(solution.route(VehicleIdx::new(0)).score(), delta);
        assert_eq!(solution.unassigned_nodes(), vec![NodeIdx::new(1)]);
        assert_eq!(solution.route(VehicleIdx::new(0)).version(), 1);

        assert_eq!(
            solution.remove_task(Task::Single(NodeIdx::new(2))),
            Some(VehicleIdx::new(0))
        );
        assert!(solution.route(VehicleIdx::new(0)).is_empty());
        assert_eq!(solution.remove_task(Task::Single(NodeIdx::new(2))), None);
    }
}
