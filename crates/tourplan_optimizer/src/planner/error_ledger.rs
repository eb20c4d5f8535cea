use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    extraction::solution_extractor::ExtractionError,
    partition::payload_drop::{CapacityOverflow, DroppedPayload},
    problem::{
        ids::{CarrierId, Commodity, VehicleTypeId},
        payload::Segment,
        problem_builder::BuildError,
    },
    solver::solve_status::SolveFailure,
};

use super::group::PlanningGroup;

/// Why a group produced no tours. The messages end up in the error table as is.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("NO PAYLOAD INFO")]
    NoPayloads,
    #[error("INCORRECT PROBLEM TYPE: {0}")]
    IncorrectProblemType(String),
    #[error("NO STOPS DISTRIBUTION FOR COMMODITY {0}")]
    NoStopDistribution(Commodity),
    #[error("COMMODITY DOES NOT MATCH VEHICLE")]
    CommodityMismatch,
    #[error("NO VEHICLE TYPE INFO")]
    NoVehicleTypeInfo,
    #[error("NO CARRIER INFO")]
    NoCarrierInfo,
    #[error("NO VEHICLES AVAILABLE")]
    NoVehiclesLeft,
    #[error(transparent)]
    CapacityOverflow(#[from] CapacityOverflow),
    #[error("could not create data dictionary: {0}")]
    Build(#[from] BuildError),
    #[error(transparent)]
    Solve(#[from] SolveFailure),
    #[error("could not extract solution: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("NO TIME-WINDOW FEASIBLE TRIAL")]
    NoFeasibleTrial,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub carrier: CarrierId,
    pub vehicle_type: VehicleTypeId,
    pub commodity: Commodity,
    pub segment: Segment,
    pub reason: String,
    /// `None` for entries made after all trials ran.
    pub trial: Option<usize>,
}

/// Every skipped group and dropped payload of a run, in the order they happened.
#[derive(Debug, Clone, Default)]
pub struct ErrorLedger {
    records: Vec<ErrorRecord>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_group(&mut self, group: &PlanningGroup, trial: Option<usize>, reason: &GroupError) {
        if matches!(reason, GroupError::Extraction(_)) {
            error!(group = %group, ?trial, "{reason}");
        } else {
            warn!(group = %group, ?trial, "Skipped group: {reason}");
        }

        self.push(group, trial, reason.to_string());
    }

    pub fn record_dropped(&mut self, group: &PlanningGroup, trial: usize, dropped: &DroppedPayload) {
        let reason = format!(
            "Dropped payload: {} with weight: {}",
            dropped.payload, dropped.weight
        );
        warn!(group = %group, trial, "{reason}");

        self.push(group, Some(trial), reason);
    }

    fn push(&mut self, group: &PlanningGroup, trial: Option<usize>, reason: String) {
        self.records.push(ErrorRecord {
            carrier: group.carrier.clone(),
            vehicle_type: group.vehicle_type.clone(),
            commodity: group.commodity,
            segment: group.segment,
            reason,
            trial,
        });
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ErrorRecord> {
        self.records
    }
}
