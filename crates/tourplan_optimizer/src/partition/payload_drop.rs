use serde::Serialize;
use thiserror::Error;

use crate::problem::{ids::PayloadId, payload::Payload};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DroppedPayload {
    pub payload: PayloadId,
    pub weight: f64,
}

#[derive(Debug)]
pub struct FittedPayloads<'a> {
    pub kept: Vec<&'a Payload>,
    pub dropped: Vec<DroppedPayload>,
}

/// The group cannot be served. Payloads dropped on the way are still reported.
#[derive(Debug, Error, PartialEq)]
#[error("SINGLE PAYLOAD WEIGHT GREATER THAN VEHICLE CAPACITY")]
pub struct CapacityOverflow {
    pub dropped: Vec<DroppedPayload>,
}

/// Drops the heaviest payload until the total demand fits the fleet.
///
/// Fails when everything had to be dropped, or when a payload that is left
/// does not fit a single vehicle on its own.
pub fn drop_until_fits<'a>(
    payloads: &[&'a Payload],
    vehicle_capacity: i64,
    vehicles: usize,
) -> Result<FittedPayloads<'a>, CapacityOverflow> {
    let fleet_capacity = vehicle_capacity.saturating_mul(vehicles as i64);
    let mut kept = payloads.to_vec();
    let mut dropped = Vec::new();
    let mut total: i64 = kept.iter().map(|payload| payload.demand()).sum();

    while total > fleet_capacity {
        let Some((heaviest, _)) = kept
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.weight().total_cmp(&b.weight()))
        else {
            break;
        };

        let payload = kept.remove(heaviest);
        total -= payload.demand();
        dropped.push(DroppedPayload {
            payload: payload.id().clone(),
            weight: payload.weight(),
        });
    }

    if kept.is_empty() || kept.iter().any(|payload| payload.demand() > vehicle_capacity) {
        return Err(CapacityOverflow { dropped });
    }

    Ok(FittedPayloads { kept, dropped })
}
