use serde::Serialize;

use crate::problem::routing_instance::{NodeIdx, VehicleIdx};

use super::{
    constraints::capacity_dimension::CapacityDimension, score::Score,
    solve_status::SolveFailure, working_solution::WorkingSolution,
};

#[derive(Serialize, Debug, Clone)]
pub struct VehicleRoute {
    pub vehicle: VehicleIdx,
    /// Starts and ends at the depot.
    pub nodes: Vec<NodeIdx>,
    /// Cumulative time at each node, in minutes.
    pub cumuls: Vec<f64>,
    /// Running load after each node.
    pub loads: Vec<i64>,
}

impl VehicleRoute {
    /// A vehicle is used when its first hop leaves the depot.
    pub fn is_used(&self) -> bool {
        self.nodes.len() > 2
    }

    pub fn stops(&self) -> &[NodeIdx] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    pub fn start_cumul(&self) -> f64 {
        self.cumuls[0]
    }

    pub fn end_cumul(&self) -> f64 {
        self.cumuls[self.cumuls.len() - 1]
    }

    /// Consecutive node pairs, the return to the depot included.
    pub fn arcs(&self) -> Vec<(NodeIdx, NodeIdx)> {
        self.nodes.windows(2).map(|arc| (arc[0], arc[1])).collect()
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct RoutingSolution {
    routes: Vec<VehicleRoute>,
    dropped: Vec<NodeIdx>,
    objective: Score,
}

impl RoutingSolution {
    pub fn from_working(solution: &WorkingSolution) -> Result<Self, SolveFailure> {
        let model = solution.model();
        let instance = model.instance();

        let routes = solution
            .routes()
            .iter()
            .map(|route| {
                let schedule = model
                    .schedule(route.stops())
                    .ok_or(SolveFailure::Infeasible)?;
                let nodes: Vec<NodeIdx> = std::iter::once(NodeIdx::DEPOT)
                    .chain(route.stops().iter().copied())
                    .chain(std::iter::once(NodeIdx::DEPOT))
                    .collect();
                let loads = CapacityDimension::loads(instance, nodes.iter().copied());

                Ok(VehicleRoute {
                    vehicle: route.vehicle(),
                    nodes,
                    cumuls: schedule.cumuls().to_vec(),
                    loads,
                })
            })
            .collect::<Result<Vec<_>, SolveFailure>>()?;

        Ok(RoutingSolution {
            routes,
            dropped: solution.unassigned_nodes(),
            objective: solution.score(),
        })
    }

    pub fn routes(&self) -> &[VehicleRoute] {
        &self.routes
    }

    pub fn used_routes(&self) -> impl Iterator<Item = &VehicleRoute> {
        self.routes.iter().filter(|route| route.is_used())
    }

    /// Visits left out through their disjunction.
    pub fn dropped(&self) -> &[NodeIdx] {
        &self.dropped
    }

    pub fn objective(&self) -> Score {
        self.objective
    }
}
