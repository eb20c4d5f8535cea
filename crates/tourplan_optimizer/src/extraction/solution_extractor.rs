use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, debug, instrument};

use crate::{
    problem::{
        fleet_ledger::{FleetError, FleetLedger},
        ids::{CarrierId, FleetClass, JobId, PayloadId, VehicleId},
        job_kind::JobKind,
        routing_instance::{NodeIdx, RoutingInstance, VehicleIdx},
    },
    solver::routing_solution::{RoutingSolution, VehicleRoute},
};

use super::{
    id_sequences::IdSequences,
    records::{RouteAssignmentRecord, StopRecord, TourRecord},
    trial_route::{TrialInputs, TrialRoute},
};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("vehicle {0} is not part of the instance")]
    UnknownVehicle(VehicleIdx),
    #[error("node {0} is not part of the instance")]
    UnknownNode(NodeIdx),
    #[error("route of vehicle {vehicle} has {values} schedule values for {nodes} nodes")]
    Misaligned {
        vehicle: VehicleIdx,
        nodes: usize,
        values: usize,
    },
    #[error("node {0} has no payload")]
    MissingPayload(NodeIdx),
    #[error(transparent)]
    Fleet(#[from] FleetError),
}

/// Labels used to build synthetic depot payload ids.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RunLabels {
    pub region: String,
    pub shipment_type: String,
}

impl RunLabels {
    pub fn depot_payload_id(&self, depot_seq: u64) -> String {
        format!("{}_d{}{}", self.region, self.shipment_type, depot_seq)
    }
}

pub struct ExtractionContext<'a> {
    pub carrier: &'a CarrierId,
    pub fleet_class: &'a FleetClass,
    pub trial: usize,
    pub job_id: JobId,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractedTours {
    pub tours: Vec<TourRecord>,
    pub assignments: Vec<RouteAssignmentRecord>,
    pub stops: Vec<StopRecord>,
    pub trial_routes: Vec<TrialRoute>,
    pub used_vehicles: Vec<VehicleId>,
}

pub struct SolutionExtractor {
    labels: RunLabels,
    max_tour_duration_secs: i64,
}

const PAYLOAD_TYPE: u8 = 1;
const REQUEST_TYPE: u8 = 1;

fn secs(minutes: f64) -> i64 {
    (minutes * 60.0) as i64
}

impl SolutionExtractor {
    pub fn new(labels: RunLabels) -> Self {
        SolutionExtractor {
            labels,
            max_tour_duration_secs: 3600,
        }
    }

    pub fn labels(&self) -> &RunLabels {
        &self.labels
    }

    /// Translates every used route into output records and removes the used
    /// vehicles from the fleet ledger. Nothing is emitted, consumed or counted
    /// when any route fails to translate.
    #[instrument(skip_all, level = Level::DEBUG, fields(group = %instance.key()))]
    pub fn extract(
        &self,
        instance: &RoutingInstance,
        solution: &RoutingSolution,
        context: &ExtractionContext,
        ids: &mut IdSequences,
        ledger: &mut FleetLedger,
    ) -> Result<ExtractedTours, ExtractionError> {
        let mut sequences = ids.clone();
        let mut extracted = ExtractedTours::default();

        let inputs = Arc::new(TrialInputs {
            time_matrix: instance.matrices().time_rows(),
            stop_durations: instance.service_durations(),
            time_windows: instance.time_windows(),
        });

        for route in solution.used_routes() {
            self.extract_route(
                instance,
                route,
                context,
                &mut sequences,
                &inputs,
                &mut extracted,
            )?;
        }

        ledger.consume(context.carrier, context.fleet_class, &extracted.used_vehicles)?;
        *ids = sequences;

        debug!(
            tours = extracted.tours.len(),
            stops = extracted.stops.len(),
            "Extracted solution"
        );

        Ok(extracted)
    }

    fn extract_route(
        &self,
        instance: &RoutingInstance,
        route: &VehicleRoute,
        context: &ExtractionContext,
        ids: &mut IdSequences,
        inputs: &Arc<TrialInputs>,
        extracted: &mut ExtractedTours,
    ) -> Result<(), ExtractionError> {
        let vehicle = instance
            .vehicles()
            .get(route.vehicle.get())
            .ok_or(ExtractionError::UnknownVehicle(route.vehicle))?;
        if route.cumuls.len() != route.nodes.len() || route.loads.len() != route.nodes.len() {
            return Err(ExtractionError::Misaligned {
                vehicle: route.vehicle,
                nodes: route.nodes.len(),
                values: route.cumuls.len().min(route.loads.len()),
            });
        }
        if let Some(&node) = route
            .nodes
            .iter()
            .find(|node| node.get() >= instance.num_nodes())
        {
            return Err(ExtractionError::UnknownNode(node));
        }

        let tour_id = ids.next_tour();
        let depot_seq = ids.next_depot();
        let depot = instance.depot();
        let depot_id = self.labels.depot_payload_id(depot_seq);

        extracted.tours.push(TourRecord {
            tour_id,
            departure_time_secs: secs(route.start_cumul()),
            departure_zone: depot.zone,
            max_duration_secs: self.max_tour_duration_secs,
            depot_x: depot.x,
            depot_y: depot.y,
        });
        extracted.assignments.push(RouteAssignmentRecord {
            carrier: context.carrier.clone(),
            tour_id,
            vehicle_id: vehicle.id,
            vehicle_type: vehicle.vehicle_type.clone(),
            depot_zone: depot.zone,
            depot_x: depot.x,
            depot_y: depot.y,
        });

        let last = route.nodes.len() - 1;
        let mut stops = Vec::with_capacity(route.nodes.len());
        for (rank, &node_index) in route.nodes.iter().enumerate() {
            let node = instance.node(node_index);
            let record = if rank == 0 || rank == last {
                let payload_id = if rank == 0 {
                    PayloadId::new(depot_id.clone())
                } else {
                    PayloadId::new(format!("{depot_id}_"))
                };
                StopRecord {
                    payload_id,
                    sequence_rank: rank,
                    tour_id,
                    payload_type: PAYLOAD_TYPE,
                    weight: node.demand,
                    cumulative_weight: route.loads[rank],
                    request_type: REQUEST_TYPE,
                    zone: node.zone,
                    arrival_secs: secs(route.cumuls[rank]),
                    window_lower_secs: 0,
                    window_upper_secs: 0,
                    service_secs: 0,
                    x: depot.x,
                    y: depot.y,
                }
            } else {
                let payload_id = node
                    .payload
                    .clone()
                    .ok_or(ExtractionError::MissingPayload(node_index))?;
                let (window_lower_secs, window_upper_secs) = node.window.to_seconds();
                StopRecord {
                    payload_id,
                    sequence_rank: rank,
                    tour_id,
                    payload_type: PAYLOAD_TYPE,
                    weight: node.demand,
                    cumulative_weight: route.loads[rank],
                    request_type: REQUEST_TYPE,
                    zone: node.zone,
                    arrival_secs: secs(route.cumuls[rank]),
                    window_lower_secs,
                    window_upper_secs,
                    service_secs: secs(node.service_minutes),
                    x: node.x,
                    y: node.y,
                }
            };
            stops.push(record);
        }

        if instance.job_kind() == JobKind::Delivery {
            unload_from_full(&mut stops);
        }

        extracted.stops.extend(stops);
        extracted.trial_routes.push(TrialRoute {
            trial: context.trial,
            job_id: context.job_id,
            tour_id,
            vehicle: route.vehicle,
            arcs: route
                .arcs()
                .into_iter()
                .map(|(from, to)| (from.get(), to.get()))
                .collect(),
            end_time: route.end_cumul(),
            loads: route.loads[..last].to_vec(),
            departure_time: route.start_cumul().trunc(),
            inputs: Arc::clone(inputs),
        });
        extracted.used_vehicles.push(vehicle.id);

        Ok(())
    }
}

/// Rewrites the loads of a delivery tour so the vehicle leaves the depot full
/// and each stop reports the weight it drops off as a negative amount.
fn unload_from_full(stops: &mut [StopRecord]) {
    let Some((terminal, visits)) = stops.split_last_mut() else {
        return;
    };

    let mut load = terminal.cumulative_weight;
    for (index, record) in visits.iter_mut().enumerate() {
        let remaining = load - record.weight;
        record.cumulative_weight = remaining;
        record.weight = if index == 0 { remaining } else { -record.weight };
        load = remaining;
    }

    terminal.cumulative_weight = 0;
}
