use rand::Rng;
use thiserror::Error;
use tourplan_costs::{cost_resolver::CostResolver, travel_matrices::TravelMatrices};
use tracing::{Level, debug, instrument};

use crate::timer_debug;

use super::{
    carrier::Carrier,
    ids::{Commodity, PayloadId, VehicleId, VehicleTypeId},
    job_kind::{JobKind, UnknownJobKind},
    payload::{Payload, StopSite},
    routing_instance::{
        GroupKey, InstanceVehicle, Node, NodeKind, RoutingInstance, RoutingInstanceBuilder,
    },
    stop_distribution::{StopDistributions, StopPolicy},
    time_window::TimeWindow,
    vehicle_type::VehicleTypeCatalog,
};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no payloads to build an instance from")]
    NoPayloads,
    #[error(transparent)]
    UnknownJobKind(#[from] UnknownJobKind),
    #[error("payload {payload} is a '{found}' job in a '{expected}' group")]
    MixedJobKinds {
        payload: PayloadId,
        found: String,
        expected: JobKind,
    },
    #[error("payload {payload} has no {leg} stop")]
    MissingStop {
        payload: PayloadId,
        leg: &'static str,
    },
    #[error("invalid time window [{start}, {end}] for {owner}")]
    InvalidTimeWindow { owner: String, start: f64, end: f64 },
    #[error("vehicle type {0} is not in the catalog")]
    UnknownVehicleType(VehicleTypeId),
    #[error("no stop count distribution for commodity {0}")]
    MissingStopDistribution(Commodity),
    #[error("no vehicles available")]
    EmptyFleet,
    #[error("the depot must be the first and only depot node")]
    DepotPlacement,
    #[error("travel matrices are missing")]
    MissingMatrices,
    #[error("travel matrices cover {matrix} nodes, instance has {nodes}")]
    MatrixSize { nodes: usize, matrix: usize },
    #[error("invalid pickup and delivery pair ({0}, {1})")]
    InvalidPair(usize, usize),
}

/// Payloads of one group together with the carrier serving them and the
/// vehicles it still has available.
pub struct GroupInput<'a> {
    pub carrier: &'a Carrier,
    pub payloads: &'a [&'a Payload],
    pub vehicle_ids: &'a [VehicleId],
}

pub struct ProblemBuilder<'a> {
    resolver: &'a CostResolver,
    catalog: &'a VehicleTypeCatalog,
    stop_distributions: &'a StopDistributions,
    stop_policy: StopPolicy,
}

fn checked_window(
    window: TimeWindow,
    owner: impl FnOnce() -> String,
) -> Result<TimeWindow, BuildError> {
    if window.is_valid() {
        Ok(window)
    } else {
        Err(BuildError::InvalidTimeWindow {
            owner: owner(),
            start: window.start(),
            end: window.end(),
        })
    }
}

impl<'a> ProblemBuilder<'a> {
    pub fn new(
        resolver: &'a CostResolver,
        catalog: &'a VehicleTypeCatalog,
        stop_distributions: &'a StopDistributions,
        stop_policy: StopPolicy,
    ) -> Self {
        ProblemBuilder {
            resolver,
            catalog,
            stop_distributions,
            stop_policy,
        }
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(carrier = %input.carrier.id()))]
    pub fn build<R: Rng>(
        &self,
        input: &GroupInput,
        rng: &mut R,
    ) -> Result<RoutingInstance, BuildError> {
        let first = input.payloads.first().ok_or(BuildError::NoPayloads)?;
        let job_kind = first.job_kind()?;

        let vehicle_type = self
            .catalog
            .get(first.vehicle_type())
            .ok_or_else(|| BuildError::UnknownVehicleType(first.vehicle_type().clone()))?;

        let key = GroupKey {
            carrier: input.carrier.id().clone(),
            commodity: first.commodity(),
            segment: first.segment(),
            vehicle_type: vehicle_type.id.clone(),
        };

        let stop_counting = self.stop_policy.applies(key.commodity, key.segment);
        let distribution = if stop_counting {
            Some(
                self.stop_distributions
                    .get(key.commodity)
                    .ok_or(BuildError::MissingStopDistribution(key.commodity))?,
            )
        } else {
            None
        };
        let stop_cost = u32::from(stop_counting);

        let mut builder = RoutingInstanceBuilder::new(key, job_kind);
        builder.set_stop_counting(stop_counting);

        let depot = input.carrier.depot();
        builder.add_node(Node {
            kind: NodeKind::Depot,
            payload: None,
            zone: depot.zone,
            geo: self.resolver.geo_of(depot.zone),
            x: depot.x,
            y: depot.y,
            window: checked_window(input.carrier.window(), || {
                format!("depot of carrier {}", input.carrier.id())
            })?,
            service_minutes: input.carrier.service_minutes(),
            demand: 0,
            stop_cost: 0,
        });

        for payload in input.payloads {
            if payload.job_kind()? != job_kind {
                return Err(BuildError::MixedJobKinds {
                    payload: payload.id().clone(),
                    found: payload.job().to_owned(),
                    expected: job_kind,
                });
            }

            let demand = payload.demand();
            match job_kind {
                JobKind::Delivery => {
                    let site = required_site(payload, payload.delivery(), "delivery")?;
                    let node = self.stop_node(payload, site, NodeKind::Delivery, demand, stop_cost)?;
                    builder.add_node(node);
                }
                JobKind::Pickup => {
                    let site = required_site(payload, payload.pickup(), "pickup")?;
                    let node = self.stop_node(payload, site, NodeKind::Pickup, demand, stop_cost)?;
                    builder.add_node(node);
                }
                JobKind::PickupDelivery => {
                    let pickup_site = required_site(payload, payload.pickup(), "pickup")?;
                    let delivery_site = required_site(payload, payload.delivery(), "delivery")?;
                    let pickup = builder.add_node(self.stop_node(
                        payload,
                        pickup_site,
                        NodeKind::Pickup,
                        demand,
                        stop_cost,
                    )?);
                    let delivery = builder.add_node(self.stop_node(
                        payload,
                        delivery_site,
                        NodeKind::Delivery,
                        -demand,
                        stop_cost,
                    )?);
                    builder.add_pickup_delivery(pickup, delivery);
                }
            }
        }

        let matrices = timer_debug!("Travel matrices", {
            self.travel_matrices(builder.nodes(), &vehicle_type.id)
        });
        builder.set_matrices(matrices);

        if input.vehicle_ids.is_empty() {
            return Err(BuildError::EmptyFleet);
        }

        for &id in input.vehicle_ids {
            builder.add_vehicle(InstanceVehicle {
                id,
                vehicle_type: vehicle_type.id.clone(),
                capacity: vehicle_type.capacity_units(),
                stop_limits: distribution.map(|distribution| distribution.sample(rng)),
            });
        }

        let instance = builder.build()?;
        debug!(
            nodes = instance.num_nodes(),
            vehicles = instance.vehicles().len(),
            stop_counting,
            "Built routing instance {}",
            instance.key()
        );

        Ok(instance)
    }

    fn stop_node(
        &self,
        payload: &Payload,
        site: &StopSite,
        kind: NodeKind,
        demand: i64,
        stop_cost: u32,
    ) -> Result<Node, BuildError> {
        Ok(Node {
            kind,
            payload: Some(payload.id().clone()),
            zone: site.zone,
            geo: self.resolver.geo_of(site.zone),
            x: site.x,
            y: site.y,
            window: checked_window(site.window, || format!("payload {}", payload.id()))?,
            service_minutes: site.service_minutes,
            demand,
            stop_cost,
        })
    }

    /// Co-located stops cost nothing to travel between. Entries are truncated
    /// to whole minutes and energy units.
    fn travel_matrices(&self, nodes: &[Node], vehicle_type: &VehicleTypeId) -> TravelMatrices {
        TravelMatrices::from_fn(nodes.len(), |from, to| {
            let (origin, destination) = (&nodes[from], &nodes[to]);
            if from == to || origin.zone == destination.zone {
                return (0.0, 0.0);
            }

            let time = self.resolver.resolve_time(
                origin.zone,
                destination.zone,
                origin.geo,
                destination.geo,
            );
            let energy = self.resolver.resolve_energy(
                origin.zone,
                destination.zone,
                origin.geo,
                destination.geo,
                vehicle_type,
            );

            (time.trunc(), energy.trunc())
        })
    }
}

fn required_site<'p>(
    payload: &Payload,
    site: Option<&'p StopSite>,
    leg: &'static str,
) -> Result<&'p StopSite, BuildError> {
    site.ok_or_else(|| BuildError::MissingStop {
        payload: payload.id().clone(),
        leg,
    })
}
