use serde::{Deserialize, Serialize};

use crate::problem::ids::{CarrierId, PayloadId, TourId, VehicleId, VehicleTypeId, ZoneId};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TourRecord {
    pub tour_id: TourId,
    pub departure_time_secs: i64,
    pub departure_zone: ZoneId,
    pub max_duration_secs: i64,
    pub depot_x: f64,
    pub depot_y: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RouteAssignmentRecord {
    pub carrier: CarrierId,
    pub tour_id: TourId,
    pub vehicle_id: VehicleId,
    pub vehicle_type: VehicleTypeId,
    pub depot_zone: ZoneId,
    pub depot_x: f64,
    pub depot_y: f64,
}

/// One visit of a tour. Depot departures and returns carry synthetic
/// payload ids.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub payload_id: PayloadId,
    pub sequence_rank: usize,
    pub tour_id: TourId,
    pub payload_type: u8,
    /// Signed weight handled at this stop.
    pub weight: i64,
    pub cumulative_weight: i64,
    pub request_type: u8,
    pub zone: ZoneId,
    pub arrival_secs: i64,
    pub window_lower_secs: i64,
    pub window_upper_secs: i64,
    pub service_secs: i64,
    pub x: f64,
    pub y: f64,
}
