use crate::problem::routing_instance::{NodeIdx, PickupDeliveryPair, VehicleIdx};

use super::working_solution::WorkingSolution;

/// The unit the search assigns to vehicles: a lone visit or both legs of a
/// pickup and delivery job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Single(NodeIdx),
    Pair(PickupDeliveryPair),
}

impl Task {
    pub fn first_node(self) -> NodeIdx {
        match self {
            Task::Single(node) => node,
            Task::Pair(pair) => pair.pickup,
        }
    }

    pub fn nodes(self) -> impl Iterator<Item = NodeIdx> {
        let (first, second) = match self {
            Task::Single(node) => (node, None),
            Task::Pair(pair) => (pair.pickup, Some(pair.delivery)),
        };
        std::iter::once(first).chain(second)
    }

    pub fn node_count(self) -> usize {
        match self {
            Task::Single(_) => 1,
            Task::Pair(_) => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SingleInsertion {
    pub vehicle: VehicleIdx,
    pub node: NodeIdx,
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct PairInsertion {
    pub vehicle: VehicleIdx,
    pub pair: PickupDeliveryPair,

    /// Position of the pickup
    pub pickup_position: usize,

    /// Position of the delivery in the route before the pickup has been inserted
    pub delivery_position: usize,
}

#[derive(Debug, Clone)]
pub enum Insertion {
    Single(SingleInsertion),
    Pair(PairInsertion),
}

impl Insertion {
    pub fn vehicle(&self) -> VehicleIdx {
        match self {
            Insertion::Single(insertion) => insertion.vehicle,
            Insertion::Pair(insertion) => insertion.vehicle,
        }
    }

    pub fn task(&self) -> Task {
        match self {
            Insertion::Single(insertion) => Task::Single(insertion.node),
            Insertion::Pair(insertion) => Task::Pair(insertion.pair),
        }
    }

    /// The stops of the route once the insertion is applied.
    pub fn apply_to(&self, stops: &[NodeIdx]) -> Vec<NodeIdx> {
        let mut result = Vec::with_capacity(stops.len() + 2);
        result.extend_from_slice(stops);

        match self {
            Insertion::Single(insertion) => {
                result.insert(insertion.position, insertion.node);
            }
            Insertion::Pair(insertion) => {
                result.insert(insertion.pickup_position, insertion.pair.pickup);
                result.insert(insertion.delivery_position + 1, insertion.pair.delivery);
            }
        }

        result
    }
}

pub fn for_each_insertion(solution: &WorkingSolution, task: Task, mut f: impl FnMut(Insertion)) {
    for index in 0..solution.routes().len() {
        for_each_route_insertion(solution, VehicleIdx::new(index), task, &mut f);
    }
}

pub fn for_each_route_insertion(
    solution: &WorkingSolution,
    vehicle: VehicleIdx,
    task: Task,
    mut f: impl FnMut(Insertion),
) {
    let len = solution.route(vehicle).len();

    match task {
        Task::Single(node) => {
            for position in 0..=len {
                f(Insertion::Single(SingleInsertion {
                    vehicle,
                    node,
                    position,
                }));
            }
        }
        Task::Pair(pair) => {
            for pickup_position in 0..=len {
                for delivery_position in pickup_position..=len {
                    f(Insertion::Pair(PairInsertion {
                        vehicle,
                        pair,
                        pickup_position,
                        delivery_position,
                    }));
                }
            }
        }
    }
}
