use std::fmt;

use serde::Serialize;
use tourplan_costs::travel_matrices::TravelMatrices;

use crate::define_index_newtype;

use super::{
    ids::{CarrierId, Commodity, GeoId, PayloadId, VehicleId, VehicleTypeId, ZoneId},
    job_kind::JobKind,
    payload::Segment,
    problem_builder::BuildError,
    stop_distribution::StopLimits,
    time_window::TimeWindow,
};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Depot,
    Pickup,
    Delivery,
}

#[derive(Serialize, Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// `None` only for the depot.
    pub payload: Option<PayloadId>,
    pub zone: ZoneId,
    pub geo: Option<GeoId>,
    pub x: f64,
    pub y: f64,
    pub window: TimeWindow,
    pub service_minutes: f64,
    pub demand: i64,
    pub stop_cost: u32,
}

define_index_newtype!(NodeIdx, Node);

impl NodeIdx {
    pub const DEPOT: NodeIdx = NodeIdx::new(0);

    pub fn is_depot(&self) -> bool {
        self.get() == 0
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct InstanceVehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleTypeId,
    pub capacity: i64,
    pub stop_limits: Option<StopLimits>,
}

define_index_newtype!(VehicleIdx, InstanceVehicle);

/// Identifies one solvable group: a carrier's payloads of one commodity and
/// segment carried by one vehicle type.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub carrier: CarrierId,
    pub commodity: Commodity,
    pub segment: Segment,
    pub vehicle_type: VehicleTypeId,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.carrier, self.commodity, self.segment, self.vehicle_type
        )
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickupDeliveryPair {
    pub pickup: NodeIdx,
    pub delivery: NodeIdx,
}

/// One normalized routing problem. The depot is always node 0.
#[derive(Debug, Clone)]
pub struct RoutingInstance {
    key: GroupKey,
    job_kind: JobKind,
    nodes: Vec<Node>,
    matrices: TravelMatrices,
    vehicles: Vec<InstanceVehicle>,
    pairs: Vec<PickupDeliveryPair>,
    partners: Vec<Option<NodeIdx>>,
    stop_counting: bool,
}

impl RoutingInstance {
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn job_kind(&self) -> JobKind {
        self.job_kind
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: NodeIdx) -> &Node {
        &self.nodes[index]
    }

    pub fn depot(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn matrices(&self) -> &TravelMatrices {
        &self.matrices
    }

    pub fn vehicles(&self) -> &[InstanceVehicle] {
        &self.vehicles
    }

    pub fn vehicle(&self, index: VehicleIdx) -> &InstanceVehicle {
        &self.vehicles[index]
    }

    pub fn pickup_deliveries(&self) -> &[PickupDeliveryPair] {
        &self.pairs
    }

    /// The other leg of a pickup and delivery job.
    pub fn partner(&self, node: NodeIdx) -> Option<NodeIdx> {
        self.partners[node.get()]
    }

    pub fn stop_counting(&self) -> bool {
        self.stop_counting
    }

    /// Time spent on the arc, service at the origin included.
    #[inline(always)]
    pub fn transit(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        self.matrices.time(from.get(), to.get()) + self.nodes[from].service_minutes
    }

    pub fn service_durations(&self) -> Vec<f64> {
        self.nodes.iter().map(|node| node.service_minutes).collect()
    }

    pub fn time_windows(&self) -> Vec<TimeWindow> {
        self.nodes.iter().map(|node| node.window).collect()
    }

    pub fn with_matrices(&self, matrices: TravelMatrices) -> Result<RoutingInstance, BuildError> {
        if matrices.num_nodes() != self.nodes.len() {
            return Err(BuildError::MatrixSize {
                nodes: self.nodes.len(),
                matrix: matrices.num_nodes(),
            });
        }

        Ok(RoutingInstance {
            matrices,
            ..self.clone()
        })
    }
}

pub struct RoutingInstanceBuilder {
    key: GroupKey,
    job_kind: JobKind,
    nodes: Vec<Node>,
    matrices: Option<TravelMatrices>,
    vehicles: Vec<InstanceVehicle>,
    pairs: Vec<PickupDeliveryPair>,
    stop_counting: bool,
}

impl RoutingInstanceBuilder {
    pub fn new(key: GroupKey, job_kind: JobKind) -> Self {
        RoutingInstanceBuilder {
            key,
            job_kind,
            nodes: Vec::new(),
            matrices: None,
            vehicles: Vec::new(),
            pairs: Vec::new(),
            stop_counting: false,
        }
    }

    pub fn add_node(&mut self, node: Node) -> NodeIdx {
        self.nodes.push(node);
        NodeIdx::new(self.nodes.len() - 1)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn set_matrices(&mut self, matrices: TravelMatrices) -> &mut RoutingInstanceBuilder {
        self.matrices = Some(matrices);
        self
    }

    pub fn add_vehicle(&mut self, vehicle: InstanceVehicle) -> &mut RoutingInstanceBuilder {
        self.vehicles.push(vehicle);
        self
    }

    pub fn add_pickup_delivery(
        &mut self,
        pickup: NodeIdx,
        delivery: NodeIdx,
    ) -> &mut RoutingInstanceBuilder {
        self.pairs.push(PickupDeliveryPair { pickup, delivery });
        self
    }

    pub fn set_stop_counting(&mut self, stop_counting: bool) -> &mut RoutingInstanceBuilder {
        self.stop_counting = stop_counting;
        self
    }

    pub fn build(self) -> Result<RoutingInstance, BuildError> {
        let depots = self
            .nodes
            .iter()
            .filter(|node| node.kind == NodeKind::Depot)
            .count();
        if depots != 1 || self.nodes.first().map(|node| node.kind) != Some(NodeKind::Depot) {
            return Err(BuildError::DepotPlacement);
        }

        let matrices = self.matrices.ok_or(BuildError::MissingMatrices)?;
        if matrices.num_nodes() != self.nodes.len() {
            return Err(BuildError::MatrixSize {
                nodes: self.nodes.len(),
                matrix: matrices.num_nodes(),
            });
        }

        if self.vehicles.is_empty() {
            return Err(BuildError::EmptyFleet);
        }

        let mut partners = vec![None; self.nodes.len()];
        for pair in &self.pairs {
            let (pickup, delivery) = (pair.pickup.get(), pair.delivery.get());
            if pickup == 0
                || delivery == 0
                || pickup >= self.nodes.len()
                || delivery >= self.nodes.len()
                || pickup == delivery
                || partners[pickup].is_some()
                || partners[delivery].is_some()
            {
                return Err(BuildError::InvalidPair(pickup, delivery));
            }
            partners[pickup] = Some(pair.delivery);
            partners[delivery] = Some(pair.pickup);
        }

        Ok(RoutingInstance {
            key: self.key,
            job_kind: self.job_kind,
            nodes: self.nodes,
            matrices,
            vehicles: self.vehicles,
            pairs: self.pairs,
            partners,
            stop_counting: self.stop_counting,
        })
    }
}
