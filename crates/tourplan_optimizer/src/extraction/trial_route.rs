use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::problem::{
    ids::{JobId, TourId},
    routing_instance::VehicleIdx,
    time_window::TimeWindow,
};

/// The data of one group as it was solved in a trial, shared by all of its
/// routes.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TrialInputs {
    /// Perturbed travel times, row by row.
    pub time_matrix: Vec<Vec<f64>>,
    pub stop_durations: Vec<f64>,
    pub time_windows: Vec<TimeWindow>,
}

/// A route as produced by one Monte-Carlo trial, kept for robustness
/// evaluation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TrialRoute {
    pub trial: usize,
    pub job_id: JobId,
    pub tour_id: TourId,
    pub vehicle: VehicleIdx,
    /// Node pairs in travel order, the return to the depot included.
    pub arcs: Vec<(usize, usize)>,
    /// Cumulative time back at the depot.
    pub end_time: f64,
    /// Running load at each visited node, the return excluded.
    pub loads: Vec<i64>,
    pub departure_time: f64,
    pub inputs: Arc<TrialInputs>,
}
