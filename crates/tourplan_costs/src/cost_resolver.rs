use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    fallback::{CostQuery, EnergyFallback, TimeFallback},
    ids::{GeoId, VehicleTypeId, ZoneId},
    tables::CostTables,
};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ResolverParams {
    /// Distance units per hour used to turn zone distances into minutes.
    pub average_speed: f64,
    pub fallback_minutes: f64,
    /// Divisor applied to raw energy table values.
    pub energy_scale: f64,
    pub time_fallbacks: Vec<TimeFallback>,
    pub energy_fallbacks: Vec<EnergyFallback>,
}

impl Default for ResolverParams {
    fn default() -> Self {
        Self {
            average_speed: 40.0,
            fallback_minutes: 180.0,
            energy_scale: 1.3e8,
            time_fallbacks: vec![
                TimeFallback::GeoPair,
                TimeFallback::ZoneDistance,
                TimeFallback::Constant,
            ],
            energy_fallbacks: vec![
                EnergyFallback::GeoPair,
                EnergyFallback::ZoneDistance,
                EnergyFallback::DatasetMean,
            ],
        }
    }
}

/// Resolves travel time and energy between two zones.
///
/// Never fails: every lookup walks the configured fallbacks in order and the
/// chain ends with an estimate that is always available.
#[derive(Debug, Clone)]
pub struct CostResolver {
    tables: CostTables,
    params: ResolverParams,
}

impl CostResolver {
    pub fn new(tables: CostTables, params: ResolverParams) -> Self {
        CostResolver { tables, params }
    }

    pub fn tables(&self) -> &CostTables {
        &self.tables
    }

    pub fn params(&self) -> &ResolverParams {
        &self.params
    }

    pub fn geo_of(&self, zone: ZoneId) -> Option<GeoId> {
        self.tables.zone_mapping.geo_of(zone)
    }

    pub fn resolve_time(
        &self,
        origin_zone: ZoneId,
        destination_zone: ZoneId,
        origin_geo: Option<GeoId>,
        destination_geo: Option<GeoId>,
    ) -> f64 {
        if origin_zone == destination_zone {
            return 0.0;
        }

        let query = CostQuery {
            origin_zone,
            destination_zone,
            origin_geo,
            destination_geo,
            vehicle_type: None,
        };

        self.params
            .time_fallbacks
            .iter()
            .find_map(|strategy| {
                let estimate = strategy.estimate(&self.tables, &self.params, &query)?;
                trace!(?strategy, %origin_zone, %destination_zone, estimate, "travel time");
                Some(estimate)
            })
            .unwrap_or(self.params.fallback_minutes)
    }

    pub fn resolve_energy(
        &self,
        origin_zone: ZoneId,
        destination_zone: ZoneId,
        origin_geo: Option<GeoId>,
        destination_geo: Option<GeoId>,
        vehicle_type: &VehicleTypeId,
    ) -> f64 {
        if origin_zone == destination_zone {
            return 0.0;
        }

        let query = CostQuery {
            origin_zone,
            destination_zone,
            origin_geo,
            destination_geo,
            vehicle_type: Some(vehicle_type),
        };

        self.params
            .energy_fallbacks
            .iter()
            .find_map(|strategy| {
                let estimate = strategy.estimate(&self.tables, &self.params, &query)?;
                trace!(?strategy, %origin_zone, %destination_zone, estimate, "energy");
                Some(estimate)
            })
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::tables::{
        EnergyCostRow, EnergyCostTable, FuelRateTable, TravelTimeRow, TravelTimeTable,
        ZoneDistanceRow, ZoneDistanceTable,
    };

    use super::*;

    fn vehicle_type() -> VehicleTypeId {
        VehicleTypeId::new("md_veh_diesel")
    }

    fn tables() -> CostTables {
        CostTables {
            travel_times: TravelTimeTable::from_rows(vec![TravelTimeRow {
                origin: GeoId(100),
                destination: GeoId(200),
                minutes: 17.0,
            }]),
            energy_costs: EnergyCostTable::from_rows(vec![
                EnergyCostRow {
                    origin: GeoId(100),
                    destination: GeoId(200),
                    vehicle_type: vehicle_type(),
                    energy: 2.6e8,
                },
                EnergyCostRow {
                    origin: GeoId(200),
                    destination: GeoId(100),
                    vehicle_type: vehicle_type(),
                    energy: 1.3e8,
                },
            ]),
            zone_distances: ZoneDistanceTable::from_rows(vec![ZoneDistanceRow {
                origin: ZoneId(2),
                destination: ZoneId(3),
                distance: 10.0,
            }]),
            fuel_rates: FuelRateTable::from_rows(vec![(vehicle_type(), 0.5)]),
            ..CostTables::default()
        }
    }

    #[test]
    fn test_same_zone_is_free() {
        let resolver = CostResolver::new(tables(), ResolverParams::default());

        assert_eq!(
            resolver.resolve_time(ZoneId(1), ZoneId(1), Some(GeoId(100)), Some(GeoId(200))),
            0.0
        );
        assert_eq!(
            resolver.resolve_energy(ZoneId(1), ZoneId(1), None, None, &vehicle_type()),
            0.0
        );
    }

    #[test]
    fn test_time_lookup_order() {
        let resolver = CostResolver::new(tables(), ResolverParams::default());

        // Geo pair known
        assert_eq!(
            resolver.resolve_time(ZoneId(1), ZoneId(2), Some(GeoId(100)), Some(GeoId(200))),
            17.0
        );
        // Zone distance: 10 / 40 * 60
        assert_eq!(resolver.resolve_time(ZoneId(2), ZoneId(3), None, None), 15.0);
        // Nothing known
        assert_eq!(resolver.resolve_time(ZoneId(3), ZoneId(4), None, None), 180.0);
    }

    #[test]
    fn test_energy_lookup_order() {
        let resolver = CostResolver::new(tables(), ResolverParams::default());

        assert_eq!(
            resolver.resolve_energy(
                ZoneId(1),
                ZoneId(2),
                Some(GeoId(100)),
                Some(GeoId(200)),
                &vehicle_type()
            ),
            2.0
        );
        assert_eq!(
            resolver.resolve_energy(ZoneId(2), ZoneId(3), None, None, &vehicle_type()),
            5.0
        );
        // Mean of 2.6e8 and 1.3e8, scaled
        assert_eq!(
            resolver.resolve_energy(ZoneId(3), ZoneId(4), None, None, &vehicle_type()),
            1.5
        );
    }

    #[test]
    fn test_unresolvable_pair_is_stable() {
        let resolver = CostResolver::new(CostTables::default(), ResolverParams::default());

        let first = resolver.resolve_time(ZoneId(8), ZoneId(9), Some(GeoId(1)), None);
        let second = resolver.resolve_time(ZoneId(8), ZoneId(9), Some(GeoId(1)), None);
        assert_eq!(first, second);
        assert_eq!(first, 180.0);

        let first = resolver.resolve_energy(ZoneId(8), ZoneId(9), None, None, &vehicle_type());
        let second = resolver.resolve_energy(ZoneId(8), ZoneId(9), None, None, &vehicle_type());
        assert_eq!(first, second);
        assert_eq!(first, 0.0);
    }

    #[test]
    fn test_custom_chain_without_constant() {
        let params = ResolverParams {
            time_fallbacks: vec![TimeFallback::GeoPair],
            fallback_minutes: 90.0,
            ..ResolverParams::default()
        };
        let resolver = CostResolver::new(tables(), params);

        assert_eq!(resolver.resolve_time(ZoneId(2), ZoneId(3), None, None), 90.0);
    }
}
