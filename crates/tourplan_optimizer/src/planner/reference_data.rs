use serde::Deserialize;
use tourplan_costs::{
    cost_resolver::{CostResolver, ResolverParams},
    tables::{CostTableRows, CostTables},
};

use crate::problem::{
    carrier::Carrier,
    ids::Commodity,
    payload::Payload,
    stop_distribution::{StopCountDistribution, StopCountRow, StopDistributions},
    vehicle_type::{VehicleType, VehicleTypeCatalog},
};

use super::tour_planner::PlanningError;

/// Reference tables of a run, ready to plan with.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub resolver: CostResolver,
    pub catalog: VehicleTypeCatalog,
    pub carriers: Vec<Carrier>,
    pub payloads: Vec<Payload>,
    pub stop_distributions: StopDistributions,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StopDistributionInput {
    pub commodity: Commodity,
    pub rows: Vec<StopCountRow>,
}

/// Rows as handed over by the loading collaborators.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReferenceDataInput {
    pub cost_tables: CostTableRows,
    pub vehicle_types: Vec<VehicleType>,
    pub carriers: Vec<Carrier>,
    pub payloads: Vec<Payload>,
    pub stop_distributions: Vec<StopDistributionInput>,
}

impl ReferenceDataInput {
    /// Fuel rates come from the vehicle types unless the cost tables list their own.
    pub fn into_reference_data(
        self,
        resolver_params: ResolverParams,
    ) -> Result<ReferenceData, PlanningError> {
        let mut rows = self.cost_tables;
        if rows.fuel_rates.is_empty() {
            rows.fuel_rates = self
                .vehicle_types
                .iter()
                .map(|vehicle_type| (vehicle_type.id.clone(), vehicle_type.fuel_rate))
                .collect();
        }

        let mut stop_distributions = StopDistributions::default();
        for input in self.stop_distributions {
            let distribution = StopCountDistribution::new(input.rows).map_err(|source| {
                PlanningError::StopDistribution {
                    commodity: input.commodity,
                    source,
                }
            })?;
            stop_distributions.insert(input.commodity, distribution);
        }

        Ok(ReferenceData {
            resolver: CostResolver::new(CostTables::from(rows), resolver_params),
            catalog: VehicleTypeCatalog::new(self.vehicle_types),
            carriers: self.carriers,
            payloads: self.payloads,
            stop_distributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::problem::{ids::VehicleTypeId, stop_distribution::StopDistributionError};

    use super::*;

    const INPUT: &str = r#"{
        "vehicle_types": [
            { "id": "md_veh_diesel", "capacity": 100.0, "commodities": [1, 3], "fuel_rate": 0.25 }
        ],
        "stop_distributions": [
            {
                "commodity": 1,
                "rows": [
                    { "cumulative_probability": 0.4, "stops": 2 },
                    { "cumulative_probability": 1.0, "stops": 6 }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_fuel_rates_from_vehicle_types() {
        let input: ReferenceDataInput = serde_json::from_str(INPUT).unwrap();

        let data = input.into_reference_data(ResolverParams::default()).unwrap();

        assert_eq!(
            data.resolver
                .tables()
                .fuel_rates
                .get(&VehicleTypeId::new("md_veh_diesel")),
            Some(0.25)
        );
        assert_eq!(data.catalog.len(), 1);
        assert!(data.stop_distributions.get(Commodity(1)).is_some());
        assert!(data.carriers.is_empty());
    }

    #[test]
    fn test_invalid_distribution_is_fatal() {
        let mut input: ReferenceDataInput = serde_json::from_str(INPUT).unwrap();
        input.stop_distributions[0].rows.clear();

        let result = input.into_reference_data(ResolverParams::default());

        assert!(matches!(
            result,
            Err(PlanningError::StopDistribution {
                commodity: Commodity(1),
                source: StopDistributionError::Empty
            })
        ));
    }
}
