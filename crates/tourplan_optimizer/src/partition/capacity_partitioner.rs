use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::problem::{
    carrier::Carrier,
    ids::{CarrierId, FleetClass, VehicleTypeId},
    payload::Payload,
    vehicle_type::{VehicleType, VehicleTypeCatalog},
};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct PartitionParams {
    /// Largest number of payloads a single carrier solves for one fleet class.
    pub batch_size: usize,
}

impl Default for PartitionParams {
    fn default() -> Self {
        PartitionParams { batch_size: 30 }
    }
}

/// One batch of a split carrier.
#[derive(Debug, Clone)]
pub struct SubCarrier {
    pub carrier: Carrier,
    pub parent: CarrierId,
    pub batch: usize,
    pub payloads: Vec<Payload>,
}

/// Carrier and payload tables after splitting, plus where each sub-carrier came from.
#[derive(Debug, Clone, Default)]
pub struct PartitionPlan {
    pub carriers: Vec<Carrier>,
    pub payloads: Vec<Payload>,
    pub parents: FxHashMap<CarrierId, CarrierId>,
}

/// A payload of the class being split, with the vehicle type it asks for.
#[derive(Debug, Clone, Copy)]
pub struct ClassMember<'a> {
    pub payload: &'a Payload,
    pub vehicle_type: &'a VehicleType,
}

impl ClassMember<'_> {
    fn demand(&self) -> u64 {
        self.payload.demand().unsigned_abs()
    }
}

pub struct CapacityPartitioner {
    params: PartitionParams,
}

impl CapacityPartitioner {
    pub fn new(params: PartitionParams) -> Self {
        CapacityPartitioner { params }
    }

    pub fn needs_split(&self, payload_count: usize) -> bool {
        payload_count > self.params.batch_size
    }

    /// Splits the payloads a carrier has for one fleet class into successive
    /// batches of at most `batch_size` payloads. The class fleet is shared out
    /// between the batches and the shares add up to the parent's fleet.
    ///
    /// When the fleet is smaller than the number of batches, batches are also
    /// closed once a single vehicle is full and every batch gets at least one
    /// vehicle per vehicle type it holds.
    pub fn split(
        &self,
        carrier: &Carrier,
        class: &FleetClass,
        members: &[ClassMember],
    ) -> Vec<SubCarrier> {
        let batch_size = self.params.batch_size.max(1);
        let fleet = carrier.fleet_count(class).unwrap_or(0);

        let batches: Vec<&[ClassMember]> = if fleet < members.len().div_ceil(batch_size) {
            self.vehicle_batches(members)
        } else {
            members.chunks(batch_size).collect()
        };
        let shares = fleet_shares(&batches, fleet);

        batches
            .into_iter()
            .zip(shares)
            .enumerate()
            .map(|(batch, (members, share))| {
                let id = CarrierId::new(format!("{}_{}", carrier.id(), batch));
                SubCarrier {
                    carrier: carrier.sub_carrier(id.clone(), class.clone(), share),
                    parent: carrier.id().clone(),
                    batch,
                    payloads: members
                        .iter()
                        .map(|member| member.payload.reassigned_to(id.clone()))
                        .collect(),
                }
            })
            .collect()
    }

    /// Batches that each fit one vehicle of a single type.
    fn vehicle_batches<'m, 'a>(
        &self,
        members: &'m [ClassMember<'a>],
    ) -> Vec<&'m [ClassMember<'a>]> {
        let batch_size = self.params.batch_size.max(1);
        let mut batches = Vec::new();
        let mut start = 0;
        let mut demand = 0u64;

        for (index, member) in members.iter().enumerate() {
            let current = &members[start..index];
            if let Some(last) = current.last() {
                let capacity = match last.vehicle_type.capacity_units() {
                    capacity if capacity > 0 => capacity.unsigned_abs(),
                    _ => u64::MAX,
                };
                let full = current.len() >= batch_size
                    || last.vehicle_type.id != member.vehicle_type.id
                    || demand.saturating_add(member.demand()) > capacity;
                if full {
                    batches.push(current);
                    start = index;
                    demand = 0;
                }
            }
            demand = demand.saturating_add(member.demand());
        }
        if start < members.len() {
            batches.push(&members[start..]);
        }

        batches
    }

    /// Splits every carrier whose payload count for a fleet class exceeds the
    /// batch size. Payload order is preserved; split payloads now point to their
    /// sub-carrier and each sub-carrier is listed right after its parent.
    /// Payloads whose vehicle type is unknown stay with their carrier.
    pub fn partition(
        &self,
        carriers: &[Carrier],
        payloads: &[Payload],
        catalog: &VehicleTypeCatalog,
    ) -> PartitionPlan {
        let mut by_carrier: FxHashMap<&CarrierId, Vec<(FleetClass, Vec<usize>)>> =
            FxHashMap::default();
        for (index, payload) in payloads.iter().enumerate() {
            let Some(vehicle_type) = catalog.get(payload.vehicle_type()) else {
                continue;
            };
            let class = vehicle_type.fleet_class();
            let groups = by_carrier.entry(payload.carrier()).or_default();
            match groups.iter_mut().find(|(known, _)| *known == class) {
                Some((_, members)) => members.push(index),
                None => groups.push((class, vec![index])),
            }
        }

        let mut plan = PartitionPlan::default();
        let mut reassigned: Vec<Option<Payload>> = vec![None; payloads.len()];

        for carrier in carriers {
            let mut parent = carrier.clone();
            let mut subs = Vec::new();

            for (class, indices) in by_carrier.get_mut(carrier.id()).into_iter().flatten() {
                let class = &*class;
                let fleet = parent.fleet_count(class).unwrap_or(0);
                if fleet == 0 || !self.needs_split(indices.len()) {
                    continue;
                }

                // Payloads of one type are kept together so batches rarely mix types.
                let mut type_order: Vec<&VehicleTypeId> = Vec::new();
                for &index in indices.iter() {
                    let vehicle_type = payloads[index].vehicle_type();
                    if !type_order.contains(&vehicle_type) {
                        type_order.push(vehicle_type);
                    }
                }
                indices.sort_by_key(|&index| {
                    type_order
                        .iter()
                        .position(|&known| known == payloads[index].vehicle_type())
                });

                let members: Vec<ClassMember> = indices
                    .iter()
                    .filter_map(|&index| {
                        let payload = &payloads[index];
                        catalog.get(payload.vehicle_type()).map(|vehicle_type| ClassMember {
                            payload,
                            vehicle_type,
                        })
                    })
                    .collect();
                let split = self.split(&parent, class, &members);

                info!(
                    carrier = %carrier.id(),
                    class = %class,
                    payloads = members.len(),
                    batches = split.len(),
                    "Splitting carrier"
                );

                let taken: usize = split
                    .iter()
                    .map(|sub| sub.carrier.fleet_count(class).unwrap_or(0))
                    .sum();
                parent.set_fleet_count(class.clone(), fleet.saturating_sub(taken));

                let mut moved = indices.iter();
                for sub in split {
                    for payload in &sub.payloads {
                        if let Some(&index) = moved.next() {
                            reassigned[index] = Some(payload.clone());
                        }
                    }
                    plan.parents.insert(sub.carrier.id().clone(), sub.parent.clone());
                    subs.push(sub.carrier);
                }
            }

            plan.carriers.push(parent);
            plan.carriers.extend(subs);
        }

        plan.payloads = payloads
            .iter()
            .zip(reassigned)
            .map(|(original, moved)| moved.unwrap_or_else(|| original.clone()))
            .collect();

        plan
    }
}

/// One vehicle per distinct vehicle type of each batch, then the rest of the
/// fleet in proportion to batch demand by largest remainder. The shares only
/// exceed `fleet` when the fleet cannot cover those base vehicles.
fn fleet_shares(batches: &[&[ClassMember]], fleet: usize) -> Vec<usize> {
    let mut shares: Vec<usize> = batches
        .iter()
        .map(|batch| {
            let mut types: Vec<&VehicleTypeId> = batch
                .iter()
                .map(|member| &member.vehicle_type.id)
                .collect();
            types.sort();
            types.dedup();
            types.len()
        })
        .collect();

    let spare = fleet.saturating_sub(shares.iter().sum());
    if spare == 0 || shares.is_empty() {
        return shares;
    }

    let demands: Vec<u128> = batches
        .iter()
        .map(|batch| batch.iter().map(|member| member.demand() as u128).sum())
        .collect();
    let total: u128 = demands.iter().sum();
    if total == 0 {
        let count = shares.len();
        for extra in 0..spare {
            shares[extra % count] += 1;
        }
        return shares;
    }

    let mut handed = 0;
    let mut remainders: Vec<(u128, usize)> = Vec::with_capacity(shares.len());
    for (index, demand) in demands.into_iter().enumerate() {
        let exact = spare as u128 * demand;
        let whole = (exact / total) as usize;
        shares[index] += whole;
        handed += whole;
        remainders.push((exact % total, index));
    }
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, index) in remainders.iter().take(spare - handed) {
        shares[index] += 1;
    }

    shares
}
