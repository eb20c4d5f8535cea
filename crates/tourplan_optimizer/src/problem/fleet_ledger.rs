use std::collections::BTreeMap;

use fxhash::FxHashMap;
use thiserror::Error;

use super::{
    carrier::Carrier,
    ids::{CarrierId, FleetClass, VehicleId},
};

#[derive(Debug, Error, PartialEq)]
pub enum FleetError {
    #[error("carrier {carrier} has no {class} fleet")]
    UnknownPool { carrier: CarrierId, class: FleetClass },
    #[error("vehicle {vehicle} is not available to carrier {carrier}")]
    UnavailableVehicle {
        carrier: CarrierId,
        vehicle: VehicleId,
    },
}

/// Remaining vehicles per carrier and fleet class.
///
/// Vehicle ids are handed out sequentially over the carrier table, class by
/// class, so every vehicle in a run has a distinct id. Vehicles used by a
/// solved group are removed and never offered again to later groups.
#[derive(Debug, Clone, Default)]
pub struct FleetLedger {
    pools: FxHashMap<CarrierId, BTreeMap<FleetClass, Vec<VehicleId>>>,
}

impl FleetLedger {
    pub fn from_carriers<'a>(carriers: impl IntoIterator<Item = &'a Carrier>) -> Self {
        let mut pools: FxHashMap<CarrierId, BTreeMap<FleetClass, Vec<VehicleId>>> =
            FxHashMap::default();
        let mut next_id = 0u64;

        for carrier in carriers {
            let classes = pools.entry(carrier.id().clone()).or_default();
            for (class, &count) in carrier.fleet() {
                let ids = (next_id..next_id + count as u64).map(VehicleId).collect();
                next_id += count as u64;
                classes.insert(class.clone(), ids);
            }
        }

        FleetLedger { pools }
    }

    /// `None` when the carrier has no record at all for this class.
    pub fn available(&self, carrier: &CarrierId, class: &FleetClass) -> Option<&[VehicleId]> {
        self.pools
            .get(carrier)
            .and_then(|classes| classes.get(class))
            .map(Vec::as_slice)
    }

    pub fn remaining(&self, carrier: &CarrierId, class: &FleetClass) -> usize {
        self.available(carrier, class).map_or(0, <[VehicleId]>::len)
    }

    /// Removes `used` from the pool. Nothing is removed if any of them is not available.
    pub fn consume(
        &mut self,
        carrier: &CarrierId,
        class: &FleetClass,
        used: &[VehicleId],
    ) -> Result<(), FleetError> {
        let pool = self
            .pools
            .get_mut(carrier)
            .and_then(|classes| classes.get_mut(class))
            .ok_or_else(|| FleetError::UnknownPool {
                carrier: carrier.clone(),
                class: class.clone(),
            })?;

        if let Some(&vehicle) = used.iter().find(|vehicle| !pool.contains(vehicle)) {
            return Err(FleetError::UnavailableVehicle {
                carrier: carrier.clone(),
                vehicle,
            });
        }

        pool.retain(|vehicle| !used.contains(vehicle));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        problem::{carrier::CarrierBuilder, carrier::Depot, ids::ZoneId},
        test_utils::MD_CLASS,
    };

    use super::*;

    fn carrier(id: &str, md: usize, hd: usize) -> Carrier {
        CarrierBuilder::new(
            id.into(),
            Depot {
                zone: ZoneId(1),
                x: 0.0,
                y: 0.0,
            },
        )
        .set_fleet_count(MD_CLASS.into(), md)
        .set_fleet_count("hd_veh".into(), hd)
        .build()
    }

    #[test]
    fn test_sequential_ids_across_carriers() {
        let carriers = vec![carrier("a", 2, 1), carrier("b", 1, 0)];
        let ledger = FleetLedger::from_carriers(&carriers);

        // Classes are visited in name order: hd_veh before md_veh
        assert_eq!(
            ledger.available(&"a".into(), &"hd_veh".into()),
            Some(&[VehicleId(0)][..])
        );
        assert_eq!(
            ledger.available(&"a".into(), &MD_CLASS.into()),
            Some(&[VehicleId(1), VehicleId(2)][..])
        );
        assert_eq!(
            ledger.available(&"b".into(), &MD_CLASS.into()),
            Some(&[VehicleId(3)][..])
        );
        assert_eq!(ledger.remaining(&"b".into(), &"hd_veh".into()), 0);
        assert_eq!(ledger.available(&"c".into(), &MD_CLASS.into()), None);
    }

    #[test]
    fn test_consume_removes_used_vehicles() {
        let carriers = vec![carrier("a", 3, 0)];
        let mut ledger = FleetLedger::from_carriers(&carriers);

        ledger
            .consume(&"a".into(), &MD_CLASS.into(), &[VehicleId(1)])
            .unwrap();

        assert_eq!(
            ledger.available(&"a".into(), &MD_CLASS.into()),
            Some(&[VehicleId(0), VehicleId(2)][..])
        );
    }

    #[test]
    fn test_consume_is_all_or_nothing() {
        let carriers = vec![carrier("a", 2, 0)];
        let mut ledger = FleetLedger::from_carriers(&carriers);

        let result = ledger.consume(&"a".into(), &MD_CLASS.into(), &[VehicleId(0), VehicleId(9)]);

        assert_eq!(
            result,
            Err(FleetError::UnavailableVehicle {
                carrier: "a".into(),
                vehicle: VehicleId(9)
            })
        );
        assert_eq!(ledger.remaining(&"a".into(), &MD_CLASS.into()), 2);
    }
}
