use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ids::{GeoId, VehicleTypeId, ZoneId};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ZoneGeoRow {
    pub zone: ZoneId,
    pub geo: GeoId,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TravelTimeRow {
    pub origin: GeoId,
    pub destination: GeoId,
    pub minutes: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct EnergyCostRow {
    pub origin: GeoId,
    pub destination: GeoId,
    pub vehicle_type: VehicleTypeId,
    pub energy: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ZoneDistanceRow {
    pub origin: ZoneId,
    pub destination: ZoneId,
    pub distance: f64,
}

/// Raw reference rows as handed over by the loading collaborators.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct CostTableRows {
    pub zone_mapping: Vec<ZoneGeoRow>,
    pub travel_times: Vec<TravelTimeRow>,
    pub energy_costs: Vec<EnergyCostRow>,
    pub zone_distances: Vec<ZoneDistanceRow>,
    pub fuel_rates: Vec<(VehicleTypeId, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneMapping {
    geo_by_zone: FxHashMap<ZoneId, GeoId>,
}

impl ZoneMapping {
    pub fn from_rows(rows: impl IntoIterator<Item = ZoneGeoRow>) -> Self {
        let mut geo_by_zone = FxHashMap::default();
        for row in rows {
            // First mapping wins, later duplicates are ignored
            geo_by_zone.entry(row.zone).or_insert(row.geo);
        }
        ZoneMapping { geo_by_zone }
    }

    pub fn geo_of(&self, zone: ZoneId) -> Option<GeoId> {
        self.geo_by_zone.get(&zone).copied()
    }

    pub fn len(&self) -> usize {
        self.geo_by_zone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geo_by_zone.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TravelTimeTable {
    minutes: FxHashMap<(GeoId, GeoId), f64>,
}

impl TravelTimeTable {
    pub fn from_rows(rows: impl IntoIterator<Item = TravelTimeRow>) -> Self {
        TravelTimeTable {
            minutes: rows
                .into_iter()
                .map(|row| ((row.origin, row.destination), row.minutes))
                .collect(),
        }
    }

    pub fn get(&self, origin: GeoId, destination: GeoId) -> Option<f64> {
        self.minutes.get(&(origin, destination)).copied()
    }
}

/// Energy units per geo pair and vehicle type.
///
/// The mean over every row is kept around since it is the last resort
/// estimate when neither the pair nor a zone distance is known.
#[derive(Debug, Clone, Default)]
pub struct EnergyCostTable {
    by_vehicle_type: FxHashMap<VehicleTypeId, FxHashMap<(GeoId, GeoId), f64>>,
    mean: Option<f64>,
}

impl EnergyCostTable {
    pub fn from_rows(rows: impl IntoIterator<Item = EnergyCostRow>) -> Self {
        let mut by_vehicle_type: FxHashMap<VehicleTypeId, FxHashMap<(GeoId, GeoId), f64>> =
            FxHashMap::default();
        let mut total = 0.0;
        let mut count = 0usize;

        for row in rows {
            total += row.energy;
            count += 1;
            by_vehicle_type
                .entry(row.vehicle_type)
                .or_default()
                .insert((row.origin, row.destination), row.energy);
        }

        EnergyCostTable {
            by_vehicle_type,
            mean: (count > 0).then(|| total / count as f64),
        }
    }

    pub fn get(
        &self,
        origin: GeoId,
        destination: GeoId,
        vehicle_type: &VehicleTypeId,
    ) -> Option<f64> {
        self.by_vehicle_type
            .get(vehicle_type)
            .and_then(|pairs| pairs.get(&(origin, destination)))
            .copied()
    }

    pub fn mean(&self) -> Option<f64> {
        self.mean
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZoneDistanceTable {
    distances: FxHashMap<(ZoneId, ZoneId), f64>,
}

impl ZoneDistanceTable {
    pub fn from_rows(rows: impl IntoIterator<Item = ZoneDistanceRow>) -> Self {
        ZoneDistanceTable {
            distances: rows
                .into_iter()
                .map(|row| ((row.origin, row.destination), row.distance))
                .collect(),
        }
    }

    pub fn get(&self, origin: ZoneId, destination: ZoneId) -> Option<f64> {
        self.distances.get(&(origin, destination)).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FuelRateTable {
    rates: FxHashMap<VehicleTypeId, f64>,
}

impl FuelRateTable {
    pub fn from_rows(rows: impl IntoIterator<Item = (VehicleTypeId, f64)>) -> Self {
        FuelRateTable {
            rates: rows.into_iter().collect(),
        }
    }

    pub fn get(&self, vehicle_type: &VehicleTypeId) -> Option<f64> {
        self.rates.get(vehicle_type).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CostTables {
    pub zone_mapping: ZoneMapping,
    pub travel_times: TravelTimeTable,
    pub energy_costs: EnergyCostTable,
    pub zone_distances: ZoneDistanceTable,
    pub fuel_rates: FuelRateTable,
}

impl From<CostTableRows> for CostTables {
    fn from(rows: CostTableRows) -> Self {
        CostTables {
            zone_mapping: ZoneMapping::from_rows(rows.zone_mapping),
            travel_times: TravelTimeTable::from_rows(rows.travel_times),
            energy_costs: EnergyCostTable::from_rows(rows.energy_costs),
            zone_distances: ZoneDistanceTable::from_rows(rows.zone_distances),
            fuel_rates: FuelRateTable::from_rows(rows.fuel_rates),
        }
    }
}
