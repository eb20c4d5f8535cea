use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    ids::{CarrierId, FleetClass, ZoneId},
    time_window::TimeWindow,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Depot {
    pub zone: ZoneId,
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Carrier {
    id: CarrierId,
    depot: Depot,
    window: TimeWindow,
    service_minutes: f64,
    fleet: BTreeMap<FleetClass, usize>,
}

impl Carrier {
    pub fn id(&self) -> &CarrierId {
        &self.id
    }

    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn service_minutes(&self) -> f64 {
        self.service_minutes
    }

    pub fn fleet(&self) -> &BTreeMap<FleetClass, usize> {
        &self.fleet
    }

    pub fn fleet_count(&self, class: &FleetClass) -> Option<usize> {
        self.fleet.get(class).copied()
    }

    pub fn set_fleet_count(&mut self, class: FleetClass, count: usize) {
        self.fleet.insert(class, count);
    }

    /// Same depot and schedule under a new id, owning only `count` vehicles of `class`.
    pub fn sub_carrier(&self, id: CarrierId, class: FleetClass, count: usize) -> Carrier {
        Carrier {
            id,
            depot: self.depot.clone(),
            window: self.window,
            service_minutes: self.service_minutes,
            fleet: BTreeMap::from([(class, count)]),
        }
    }
}

pub struct CarrierBuilder {
    id: CarrierId,
    depot: Depot,
    window: TimeWindow,
    service_minutes: f64,
    fleet: BTreeMap<FleetClass, usize>,
}

impl CarrierBuilder {
    pub fn new(id: CarrierId, depot: Depot) -> Self {
        CarrierBuilder {
            id,
            depot,
            window: TimeWindow::new(0.0, 1440.0),
            service_minutes: 0.0,
            fleet: BTreeMap::new(),
        }
    }

    pub fn set_window(&mut self, window: TimeWindow) -> &mut CarrierBuilder {
        self.window = window;
        self
    }

    pub fn set_service_minutes(&mut self, service_minutes: f64) -> &mut CarrierBuilder {
        self.service_minutes = service_minutes;
        self
    }

    pub fn set_fleet_count(&mut self, class: FleetClass, count: usize) -> &mut CarrierBuilder {
        self.fleet.insert(class, count);
        self
    }

    pub fn build(&self) -> Carrier {
        Carrier {
            id: self.id.clone(),
            depot: self.depot.clone(),
            window: self.window,
            service_minutes: self.service_minutes,
            fleet: self.fleet.clone(),
        }
    }
}
