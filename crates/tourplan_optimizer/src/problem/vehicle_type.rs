use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use tourplan_costs::tables::FuelRateTable;

use super::ids::{Commodity, FleetClass, VehicleTypeId};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct VehicleType {
    pub id: VehicleTypeId,
    /// Payload weight the vehicle can carry.
    pub capacity: f64,
    pub commodities: Vec<Commodity>,
    pub fuel_rate: f64,
}

impl VehicleType {
    /// First two `_` separated tokens of the type id (`md_veh_diesel` -> `md_veh`).
    pub fn fleet_class(&self) -> FleetClass {
        let mut tokens = self.id.as_str().splitn(3, '_');
        match (tokens.next(), tokens.next()) {
            (Some(size), Some(kind)) => FleetClass::new(format!("{size}_{kind}")),
            _ => FleetClass::new(self.id.as_str()),
        }
    }

    pub fn carries(&self, commodity: Commodity) -> bool {
        self.commodities.contains(&commodity)
    }

    pub fn capacity_units(&self) -> i64 {
        self.capacity as i64
    }
}

#[derive(Debug, Clone, Default)]
pub struct VehicleTypeCatalog {
    types: FxHashMap<VehicleTypeId, VehicleType>,
}

impl VehicleTypeCatalog {
    pub fn new(types: impl IntoIterator<Item = VehicleType>) -> Self {
        VehicleTypeCatalog {
            types: types
                .into_iter()
                .map(|vehicle_type| (vehicle_type.id.clone(), vehicle_type))
                .collect(),
        }
    }

    pub fn get(&self, id: &VehicleTypeId) -> Option<&VehicleType> {
        self.types.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn fuel_rates(&self) -> FuelRateTable {
        FuelRateTable::from_rows(
            self.types
                .values()
                .map(|vehicle_type| (vehicle_type.id.clone(), vehicle_type.fuel_rate)),
        )
    }
}
