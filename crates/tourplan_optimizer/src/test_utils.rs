use tourplan_costs::{
    cost_resolver::{CostResolver, ResolverParams},
    tables::{CostTables, TravelTimeRow, TravelTimeTable, ZoneGeoRow, ZoneMapping},
    travel_matrices::TravelMatrices,
};

use crate::problem::{
    carrier::{Carrier, CarrierBuilder, Depot},
    ids::{Commodity, GeoId, VehicleId, ZoneId},
    job_kind::JobKind,
    payload::{Payload, PayloadBuilder, Segment, StopSite},
    routing_instance::{
        GroupKey, InstanceVehicle, Node, NodeKind, RoutingInstance, RoutingInstanceBuilder,
    },
    stop_distribution::StopLimits,
    time_window::TimeWindow,
    vehicle_type::{VehicleType, VehicleTypeCatalog},
};

pub const MD_VEHICLE_TYPE: &str = "md_veh_diesel";
pub const MD_ELECTRIC_TYPE: &str = "md_veh_electric";
pub const MD_CLASS: &str = "md_veh";

pub fn group_key() -> GroupKey {
    GroupKey {
        carrier: "c1".into(),
        commodity: Commodity(1),
        segment: Segment::Internal,
        vehicle_type: MD_VEHICLE_TYPE.into(),
    }
}

pub fn depot_node(window: (f64, f64)) -> Node {
    Node {
        kind: NodeKind::Depot,
        payload: None,
        zone: ZoneId(1),
        geo: None,
        x: 0.0,
        y: 0.0,
        window: TimeWindow::new(window.0, window.1),
        service_minutes: 0.0,
        demand: 0,
        stop_cost: 0,
    }
}

fn payload_node(kind: NodeKind, payload: &str, zone: i64, demand: i64, window: (f64, f64)) -> Node {
    Node {
        kind,
        payload: Some(payload.into()),
        zone: ZoneId(zone),
        geo: None,
        x: zone as f64,
        y: 0.0,
        window: TimeWindow::new(window.0, window.1),
        service_minutes: 0.0,
        demand,
        stop_cost: 0,
    }
}

pub fn stop_node(payload: &str, zone: i64, demand: i64, window: (f64, f64)) -> Node {
    payload_node(NodeKind::Delivery, payload, zone, demand, window)
}

pub fn pickup_node(payload: &str, zone: i64, demand: i64, window: (f64, f64)) -> Node {
    payload_node(NodeKind::Pickup, payload, zone, demand, window)
}

pub fn test_vehicle(id: u64, capacity: i64) -> InstanceVehicle {
    InstanceVehicle {
        id: VehicleId(id),
        vehicle_type: MD_VEHICLE_TYPE.into(),
        capacity,
        stop_limits: None,
    }
}

pub fn vehicle_ids(count: usize) -> Vec<VehicleId> {
    (0..count as u64).map(VehicleId).collect()
}

/// Delivery instance with a depot at zone 1, one stop per `(zone, demand)`
/// and 10 minutes between any two distinct nodes.
pub fn delivery_instance(stops: &[(i64, i64)], capacity: i64, vehicles: usize) -> RoutingInstance {
    let mut builder = RoutingInstanceBuilder::new(group_key(), JobKind::Delivery);
    builder.add_node(depot_node((0.0, 1440.0)));
    for (index, &(zone, demand)) in stops.iter().enumerate() {
        builder.add_node(stop_node(&format!("p{index}"), zone, demand, (0.0, 1440.0)));
    }

    builder.set_matrices(TravelMatrices::from_fn(stops.len() + 1, |from, to| {
        if from == to { (0.0, 0.0) } else { (10.0, 0.0) }
    }));
    for id in 0..vehicles {
        builder.add_vehicle(test_vehicle(id as u64, capacity));
    }

    builder.build().unwrap()
}

fn site(zone: i64, window: (f64, f64)) -> StopSite {
    StopSite {
        zone: ZoneId(zone),
        window: TimeWindow::new(window.0, window.1),
        service_minutes: 0.0,
        x: zone as f64,
        y: 0.0,
    }
}

/// Internal commodity 1 delivery of carrier `c1`.
pub fn delivery_payload(id: &str, zone: i64, weight: f64, window: (f64, f64)) -> Payload {
    PayloadBuilder::new(id.into(), "c1".into(), MD_VEHICLE_TYPE.into())
        .set_delivery(site(zone, window))
        .set_weight(weight)
        .build()
}

/// External commodity 3 delivery of carrier `c1`, outside any stop policy.
pub fn external_payload(id: &str, vehicle_type: &str, zone: i64, weight: f64) -> Payload {
    PayloadBuilder::new(id.into(), "c1".into(), vehicle_type.into())
        .set_commodity(Commodity(3))
        .set_segment(Segment::External)
        .set_delivery(site(zone, (0.0, 1440.0)))
        .set_weight(weight)
        .build()
}

pub fn pickup_delivery_payload(id: &str, zones: (i64, i64), weight: f64) -> Payload {
    PayloadBuilder::new(id.into(), "c1".into(), MD_VEHICLE_TYPE.into())
        .set_job(JobKind::PickupDelivery.to_string())
        .set_pickup(site(zones.0, (0.0, 1440.0)))
        .set_delivery(site(zones.1, (0.0, 1440.0)))
        .set_weight(weight)
        .build()
}

pub fn test_carrier(id: &str, md_vehicles: usize) -> Carrier {
    CarrierBuilder::new(
        id.into(),
        Depot {
            zone: ZoneId(1),
            x: 0.0,
            y: 0.0,
        },
    )
    .set_window(TimeWindow::new(0.0, 1440.0))
    .set_fleet_count(MD_CLASS.into(), md_vehicles)
    .build()
}

pub fn test_catalog(capacity: f64) -> VehicleTypeCatalog {
    VehicleTypeCatalog::new(vec![VehicleType {
        id: MD_VEHICLE_TYPE.into(),
        capacity,
        commodities: vec![Commodity(1), Commodity(2), Commodity(3)],
        fuel_rate: 0.3,
    }])
}

/// Diesel and electric types of the same `md_veh` fleet class.
pub fn mixed_catalog(capacity: f64) -> VehicleTypeCatalog {
    VehicleTypeCatalog::new([MD_VEHICLE_TYPE, MD_ELECTRIC_TYPE].map(|id| VehicleType {
        id: id.into(),
        capacity,
        commodities: vec![Commodity(1), Commodity(2), Commodity(3)],
        fuel_rate: 0.3,
    }))
}

/// Zones 1, 11, 12 and 13 map to geo ids 100, 1100, 1200 and 1300. Only the
/// depot to zone 11 travel time is known, everything else falls back.
pub fn test_resolver() -> CostResolver {
    let tables = CostTables {
        zone_mapping: ZoneMapping::from_rows([(1, 100), (11, 1100), (12, 1200), (13, 1300)].map(
            |(zone, geo)| ZoneGeoRow {
                zone: ZoneId(zone),
                geo: GeoId(geo),
            },
        )),
        travel_times: TravelTimeTable::from_rows(vec![TravelTimeRow {
            origin: GeoId(100),
            destination: GeoId(1100),
            minutes: 20.0,
        }]),
        ..CostTables::default()
    };

    CostResolver::new(tables, ResolverParams::default())
}

/// Stop-counted delivery instance: `stops` unit demands at zone 11, one
/// vehicle with the given stop limits and 10 minutes between distinct nodes.
pub fn stop_counting_instance(stops: usize, limits: StopLimits) -> RoutingInstance {
    let mut builder = RoutingInstanceBuilder::new(group_key(), JobKind::Delivery);
    builder.add_node(depot_node((0.0, 1440.0)));
    for index in 0..stops {
        builder.add_node(Node {
            stop_cost: 1,
            ..stop_node(&format!("p{index}"), 11, 1, (0.0, 1440.0))
        });
    }

    builder
        .set_stop_counting(true)
        .set_matrices(TravelMatrices::from_fn(stops + 1, |from, to| {
            if from == to { (0.0, 0.0) } else { (10.0, 0.0) }
        }))
        .add_vehicle(InstanceVehicle {
            stop_limits: Some(limits),
            ..test_vehicle(0, 100)
        });

    builder.build().unwrap()
}
