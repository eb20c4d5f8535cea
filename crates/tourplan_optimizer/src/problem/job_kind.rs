use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Delivery,
    Pickup,
    PickupDelivery,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("unknown job kind '{0}'")]
pub struct UnknownJobKind(pub String);

impl FromStr for JobKind {
    type Err = UnknownJobKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "delivery" => Ok(JobKind::Delivery),
            "pickup" => Ok(JobKind::Pickup),
            "pickup_delivery" => Ok(JobKind::PickupDelivery),
            other => Err(UnknownJobKind(other.to_owned())),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::Delivery => "delivery",
            JobKind::Pickup => "pickup",
            JobKind::PickupDelivery => "pickup_delivery",
        })
    }
}
