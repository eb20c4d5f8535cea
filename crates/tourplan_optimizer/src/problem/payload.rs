use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    ids::{CarrierId, Commodity, PayloadId, VehicleTypeId, ZoneId},
    job_kind::{JobKind, UnknownJobKind},
    time_window::TimeWindow,
};

/// Whether a shipment stays inside the study region or leaves it.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Internal,
    External,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Segment::Internal => "internal",
            Segment::External => "external",
        })
    }
}

/// One end of a shipment: where, when and for how long the vehicle stops.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StopSite {
    pub zone: ZoneId,
    pub window: TimeWindow,
    pub service_minutes: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Payload {
    id: PayloadId,
    carrier: CarrierId,
    commodity: Commodity,
    /// Kept raw so malformed kinds reach validation instead of failing deserialization.
    job: String,
    segment: Segment,
    #[serde(default)]
    pickup: Option<StopSite>,
    #[serde(default)]
    delivery: Option<StopSite>,
    weight: f64,
    vehicle_type: VehicleTypeId,
}

impl Payload {
    pub fn id(&self) -> &PayloadId {
        &self.id
    }

    pub fn carrier(&self) -> &CarrierId {
        &self.carrier
    }

    pub fn commodity(&self) -> Commodity {
        self.commodity
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn job_kind(&self) -> Result<JobKind, UnknownJobKind> {
        self.job.parse()
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn pickup(&self) -> Option<&StopSite> {
        self.pickup.as_ref()
    }

    pub fn delivery(&self) -> Option<&StopSite> {
        self.delivery.as_ref()
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Whole capacity units this payload takes, rounded up.
    pub fn demand(&self) -> i64 {
        self.weight.ceil() as i64
    }

    pub fn vehicle_type(&self) -> &VehicleTypeId {
        &self.vehicle_type
    }

    pub fn reassigned_to(&self, carrier: CarrierId) -> Payload {
        Payload {
            carrier,
            ..self.clone()
        }
    }
}

pub struct PayloadBuilder {
    id: PayloadId,
    carrier: CarrierId,
    vehicle_type: VehicleTypeId,
    commodity: Commodity,
    job: String,
    segment: Segment,
    pickup: Option<StopSite>,
    delivery: Option<StopSite>,
    weight: f64,
}

impl PayloadBuilder {
    pub fn new(id: PayloadId, carrier: CarrierId, vehicle_type: VehicleTypeId) -> Self {
        PayloadBuilder {
            id,
            carrier,
            vehicle_type,
            commodity: Commodity(1),
            job: JobKind::Delivery.to_string(),
            segment: Segment::Internal,
            pickup: None,
            delivery: None,
            weight: 0.0,
        }
    }

    pub fn set_commodity(&mut self, commodity: Commodity) -> &mut PayloadBuilder {
        self.commodity = commodity;
        self
    }

    pub fn set_job(&mut self, job: impl Into<String>) -> &mut PayloadBuilder {
        self.job = job.into();
        self
    }

    pub fn set_segment(&mut self, segment: Segment) -> &mut PayloadBuilder {
        self.segment = segment;
        self
    }

    pub fn set_pickup(&mut self, pickup: StopSite) -> &mut PayloadBuilder {
        self.pickup = Some(pickup);
        self
    }

    pub fn set_delivery(&mut self, delivery: StopSite) -> &mut PayloadBuilder {
        self.delivery = Some(delivery);
        self
    }

    pub fn set_weight(&mut self, weight: f64) -> &mut PayloadBuilder {
        self.weight = weight;
        self
    }

    pub fn build(&self) -> Payload {
        Payload {
            id: self.id.clone(),
            carrier: self.carrier.clone(),
            commodity: self.commodity,
            job: self.job.clone(),
            segment: self.segment,
            pickup: self.pickup.clone(),
            delivery: self.delivery.clone(),
            weight: self.weight,
            vehicle_type: self.vehicle_type.clone(),
        }
    }
}
