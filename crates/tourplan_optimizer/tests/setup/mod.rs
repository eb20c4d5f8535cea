#![allow(dead_code)]

use std::{fs::File, path::PathBuf};

use serde::Deserialize;
use tourplan_costs::{
    cost_resolver::ResolverParams,
    tables::{CostTableRows, TravelTimeRow, ZoneGeoRow},
};
use tourplan_optimizer::{
    planner::{
        planner_params::PlannerParams,
        reference_data::{ReferenceData, ReferenceDataInput, StopDistributionInput},
    },
    problem::{
        carrier::{Carrier, CarrierBuilder, Depot},
        ids::{Commodity, GeoId, ZoneId},
        job_kind::JobKind,
        payload::{Payload, PayloadBuilder, Segment, StopSite},
        stop_distribution::StopCountRow,
        time_window::TimeWindow,
        vehicle_type::VehicleType,
    },
};

pub const MD_VEHICLE_TYPE: &str = "md_veh_diesel";
pub const MD_CLASS: &str = "md_veh";

#[derive(Deserialize)]
pub struct ScenarioFixture {
    pub params: PlannerParams,
    pub reference: ReferenceDataInput,
}

pub fn fixture_path(fixture: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(fixture)
}

pub fn load_fixture(fixture: &str) -> (PlannerParams, ReferenceData) {
    let file = File::open(fixture_path(fixture)).unwrap();
    let scenario: ScenarioFixture = serde_json::from_reader(file).unwrap();
    let reference = scenario
        .reference
        .into_reference_data(scenario.params.resolver.clone())
        .unwrap();

    (scenario.params, reference)
}

pub fn site(zone: i64, window: (f64, f64)) -> StopSite {
    StopSite {
        zone: ZoneId(zone),
        window: TimeWindow::new(window.0, window.1),
        service_minutes: 5.0,
        x: zone as f64 * 0.01,
        y: 0.0,
    }
}

pub fn delivery(id: &str, carrier: &str, zone: i64, weight: f64, window: (f64, f64)) -> Payload {
    PayloadBuilder::new(id.into(), carrier.into(), MD_VEHICLE_TYPE.into())
        .set_segment(Segment::External)
        .set_delivery(site(zone, window))
        .set_weight(weight)
        .build()
}

pub fn pickup_delivery(id: &str, carrier: &str, zones: (i64, i64), weight: f64) -> Payload {
    PayloadBuilder::new(id.into(), carrier.into(), MD_VEHICLE_TYPE.into())
        .set_segment(Segment::External)
        .set_job(JobKind::PickupDelivery.to_string())
        .set_pickup(site(zones.0, (0.0, 1440.0)))
        .set_delivery(site(zones.1, (0.0, 1440.0)))
        .set_weight(weight)
        .build()
}

pub fn carrier(id: &str, vehicles: usize) -> Carrier {
    CarrierBuilder::new(
        id.into(),
        Depot {
            zone: ZoneId(1),
            x: 0.0,
            y: 0.0,
        },
    )
    .set_window(TimeWindow::new(0.0, 1440.0))
    .set_fleet_count(MD_CLASS.into(), vehicles)
    .build()
}

pub fn vehicle_type(capacity: f64) -> VehicleType {
    VehicleType {
        id: MD_VEHICLE_TYPE.into(),
        capacity,
        commodities: vec![Commodity(1), Commodity(3)],
        fuel_rate: 0.3,
    }
}

/// Zones 1 to 9 on a line, one geo id per zone, 4 minutes per zone apart.
pub fn line_cost_tables() -> CostTableRows {
    let zones: Vec<i64> = (1..=9).collect();
    let mut rows = CostTableRows::default();

    for &zone in &zones {
        rows.zone_mapping.push(ZoneGeoRow {
            zone: ZoneId(zone),
            geo: GeoId(zone * 100),
        });
        for &other in &zones {
            if zone != other {
                rows.travel_times.push(TravelTimeRow {
                    origin: GeoId(zone * 100),
                    destination: GeoId(other * 100),
                    minutes: 4.0 * (zone - other).abs() as f64,
                });
            }
        }
    }

    rows
}

pub fn reference(carriers: Vec<Carrier>, payloads: Vec<Payload>, capacity: f64) -> ReferenceData {
    ReferenceDataInput {
        cost_tables: line_cost_tables(),
        vehicle_types: vec![vehicle_type(capacity)],
        carriers,
        payloads,
        stop_distributions: vec![StopDistributionInput {
            commodity: Commodity(1),
            rows: vec![StopCountRow {
                cumulative_probability: 1.0,
                stops: 20,
            }],
        }],
    }
    .into_reference_data(ResolverParams::default())
    .unwrap()
}
