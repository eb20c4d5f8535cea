use std::fmt;

use serde::Serialize;

use crate::problem::{
    ids::{CarrierId, Commodity, JobId, VehicleTypeId},
    payload::{Payload, Segment},
};

/// One (carrier, commodity, segment, vehicle type) combination, solved once
/// per Monte-Carlo trial under the same job id.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlanningGroup {
    pub job_id: JobId,
    pub carrier: CarrierId,
    pub commodity: Commodity,
    pub segment: Segment,
    pub vehicle_type: VehicleTypeId,
    /// Indices into the payload table the groups were enumerated from.
    pub payloads: Vec<usize>,
}

impl PlanningGroup {
    pub fn payloads<'a>(&self, table: &'a [Payload]) -> Vec<&'a Payload> {
        self.payloads.iter().map(|&index| &table[index]).collect()
    }
}

impl fmt::Display for PlanningGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.carrier, self.commodity, self.segment, self.vehicle_type
        )
    }
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Enumerates every group of the payload table.
///
/// Carriers come in order of their first payload. Within a carrier the
/// commodities come in first-appearance order, then the segments of that
/// commodity, then every vehicle type the carrier uses. A combination without
/// payloads is still enumerated so it can be reported. Job ids follow the
/// enumeration order.
pub fn enumerate_groups(payloads: &[Payload]) -> Vec<PlanningGroup> {
    let mut carriers: Vec<&CarrierId> = Vec::new();
    for payload in payloads {
        push_unique(&mut carriers, payload.carrier());
    }

    let mut groups = Vec::new();
    for carrier in carriers {
        let owned: Vec<usize> = payloads
            .iter()
            .enumerate()
            .filter(|(_, payload)| payload.carrier() == carrier)
            .map(|(index, _)| index)
            .collect();

        let mut commodities = Vec::new();
        let mut vehicle_types = Vec::new();
        for &index in &owned {
            push_unique(&mut commodities, payloads[index].commodity());
            push_unique(&mut vehicle_types, payloads[index].vehicle_type());
        }

        for commodity in commodities {
            let mut segments = Vec::new();
            for &index in &owned {
                if payloads[index].commodity() == commodity {
                    push_unique(&mut segments, payloads[index].segment());
                }
            }

            for segment in segments {
                for &vehicle_type in &vehicle_types {
                    let members = owned
                        .iter()
                        .copied()
                        .filter(|&index| {
                            let payload = &payloads[index];
                            payload.commodity() == commodity
                                && payload.segment() == segment
                                && payload.vehicle_type() == vehicle_type
                        })
                        .collect();

                    groups.push(PlanningGroup {
                        job_id: JobId(groups.len()),
                        carrier: carrier.clone(),
                        commodity,
                        segment,
                        vehicle_type: vehicle_type.clone(),
                        payloads: members,
                    });
                }
            }
        }
    }

    groups
}
