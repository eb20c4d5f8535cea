use serde::{Deserialize, Serialize};

use crate::{
    cost_resolver::ResolverParams,
    ids::{GeoId, VehicleTypeId, ZoneId},
    tables::CostTables,
};

/// Everything a fallback strategy may look at for one origin/destination pair.
#[derive(Debug, Clone, Copy)]
pub struct CostQuery<'a> {
    pub origin_zone: ZoneId,
    pub destination_zone: ZoneId,
    pub origin_geo: Option<GeoId>,
    pub destination_geo: Option<GeoId>,
    pub vehicle_type: Option<&'a VehicleTypeId>,
}

impl CostQuery<'_> {
    fn geo_pair(&self) -> Option<(GeoId, GeoId)> {
        Some((self.origin_geo?, self.destination_geo?))
    }
}

/// Travel time estimates in minutes, evaluated in the order they are listed.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeFallback {
    /// Exact lookup in the geo pair travel time table.
    GeoPair,
    /// Zone distance driven at the average speed.
    ZoneDistance,
    /// Fixed number of minutes, always succeeds.
    Constant,
}

impl TimeFallback {
    pub fn estimate(
        &self,
        tables: &CostTables,
        params: &ResolverParams,
        query: &CostQuery,
    ) -> Option<f64> {
        match self {
            TimeFallback::GeoPair => {
                let (origin, destination) = query.geo_pair()?;
                tables.travel_times.get(origin, destination)
            }
            TimeFallback::ZoneDistance => {
                if params.average_speed <= 0.0 {
                    return None;
                }

                tables
                    .zone_distances
                    .get(query.origin_zone, query.destination_zone)
                    .map(|distance| distance / params.average_speed * 60.0)
            }
            TimeFallback::Constant => Some(params.fallback_minutes),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnergyFallback {
    /// Exact lookup for the pair and vehicle type, scaled down by the energy scale.
    GeoPair,
    /// Zone distance times the vehicle type's fuel rate.
    ZoneDistance,
    /// Mean of the whole energy table, scaled down by the energy scale.
    DatasetMean,
}

impl EnergyFallback {
    pub fn estimate(
        &self,
        tables: &CostTables,
        params: &ResolverParams,
        query: &CostQuery,
    ) -> Option<f64> {
        match self {
            EnergyFallback::GeoPair => {
                let (origin, destination) = query.geo_pair()?;
                tables
                    .energy_costs
                    .get(origin, destination, query.vehicle_type?)
                    .map(|energy| energy / params.energy_scale)
            }
            EnergyFallback::ZoneDistance => {
                let fuel_rate = tables.fuel_rates.get(query.vehicle_type?)?;
                tables
                    .zone_distances
                    .get(query.origin_zone, query.destination_zone)
                    .map(|distance| distance * fuel_rate)
            }
            EnergyFallback::DatasetMean => tables
                .energy_costs
                .mean()
                .map(|mean| mean / params.energy_scale),
        }
    }
}
