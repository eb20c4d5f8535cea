use std::collections::BTreeMap;

use fxhash::{FxHashMap, FxHashSet};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, debug, info, instrument};

use crate::{
    extraction::{
        id_sequences::IdSequences,
        records::{RouteAssignmentRecord, StopRecord, TourRecord},
        solution_extractor::{ExtractedTours, ExtractionContext, SolutionExtractor},
        trial_route::TrialRoute,
    },
    montecarlo::selection::{RobustnessSelector, SelectedTrial},
    partition::{
        capacity_partitioner::{CapacityPartitioner, PartitionPlan},
        payload_drop::{DroppedPayload, drop_until_fits},
    },
    problem::{
        carrier::Carrier,
        fleet_ledger::FleetLedger,
        ids::{CarrierId, Commodity, JobId, TourId},
        problem_builder::{GroupInput, ProblemBuilder},
        stop_distribution::StopDistributionError,
    },
    solver::solver_adapter::SolverAdapter,
    timer_debug,
};

use super::{
    error_ledger::{ErrorLedger, ErrorRecord, GroupError},
    group::{PlanningGroup, enumerate_groups},
    planner_params::PlannerParams,
    reference_data::ReferenceData,
};

/// Problems with the run as a whole. Anything that only concerns one group is
/// a [`GroupError`] instead.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("at least one Monte-Carlo trial is required")]
    NoTrials,
    #[error("invalid perturbation range [{low}, {high}]")]
    InvalidPerturbation { low: f64, high: f64 },
    #[error("vehicle type catalog is empty")]
    EmptyCatalog,
    #[error("carrier table is empty")]
    NoCarriers,
    #[error("invalid stop count distribution for commodity {commodity}: {source}")]
    StopDistribution {
        commodity: Commodity,
        #[source]
        source: StopDistributionError,
    },
}

/// Final tour plan: the selected trial of every job, plus everything needed
/// to audit the selection.
#[derive(Serialize, Debug, Clone, Default)]
pub struct PlanOutput {
    pub tours: Vec<TourRecord>,
    pub assignments: Vec<RouteAssignmentRecord>,
    pub stops: Vec<StopRecord>,
    pub errors: Vec<ErrorRecord>,
    /// Routes of every trial, selected or not.
    pub trial_routes: Vec<TrialRoute>,
    pub selections: BTreeMap<JobId, Option<SelectedTrial>>,
    /// Sub-carrier to the carrier it was split from.
    pub lineage: FxHashMap<CarrierId, CarrierId>,
}

/// State threaded through one trial's groups.
struct TrialState<'p> {
    trial: usize,
    fleet: FleetLedger,
    carriers: &'p FxHashMap<&'p CarrierId, &'p Carrier>,
    plan: &'p PartitionPlan,
}

/// Runs the whole pipeline: partition, then for every Monte-Carlo trial build,
/// solve and extract each group in turn, then keep the most robust trial of
/// each job.
pub struct TourPlanner<'a> {
    reference: &'a ReferenceData,
    params: PlannerParams,
    adapter: SolverAdapter,
    extractor: SolutionExtractor,
}

impl<'a> TourPlanner<'a> {
    pub fn new(
        reference: &'a ReferenceData,
        params: PlannerParams,
    ) -> Result<Self, PlanningError> {
        if params.montecarlo.trials == 0 {
            return Err(PlanningError::NoTrials);
        }
        let perturbation = params.montecarlo.perturbation;
        if !perturbation.is_valid() {
            return Err(PlanningError::InvalidPerturbation {
                low: perturbation.low,
                high: perturbation.high,
            });
        }
        if reference.catalog.is_empty() {
            return Err(PlanningError::EmptyCatalog);
        }
        if reference.carriers.is_empty() {
            return Err(PlanningError::NoCarriers);
        }

        Ok(TourPlanner {
            reference,
            adapter: SolverAdapter::new(params.solver.clone()),
            extractor: SolutionExtractor::new(params.labels.clone()),
            params,
        })
    }

    pub fn params(&self) -> &PlannerParams {
        &self.params
    }

    pub fn run(&self) -> PlanOutput {
        let partitioner = CapacityPartitioner::new(self.params.partition.clone());
        let plan = timer_debug!(
            "Partitioned carriers",
            partitioner.partition(
                &self.reference.carriers,
                &self.reference.payloads,
                &self.reference.catalog,
            )
        );
        let groups = enumerate_groups(&plan.payloads);
        let carriers: FxHashMap<&CarrierId, &Carrier> = plan
            .carriers
            .iter()
            .map(|carrier| (carrier.id(), carrier))
            .collect();

        let mut ids = IdSequences::new();
        let mut errors = ErrorLedger::new();
        let mut produced = ExtractedTours::default();

        for trial in 0..self.params.montecarlo.trials {
            info!(trial, groups = groups.len(), "Starting Monte-Carlo trial");

            let mut rng = self.params.montecarlo.rng_for_trial(trial);
            let mut state = TrialState {
                trial,
                fleet: FleetLedger::from_carriers(&plan.carriers),
                carriers: &carriers,
                plan: &plan,
            };

            for group in &groups {
                match self.plan_group(group, &mut state, &mut rng, &mut ids, &mut errors) {
                    Ok(extracted) => {
                        produced.tours.extend(extracted.tours);
                        produced.assignments.extend(extracted.assignments);
                        produced.stops.extend(extracted.stops);
                        produced.trial_routes.extend(extracted.trial_routes);
                    }
                    Err(error) => errors.record_group(group, Some(trial), &error),
                }
            }
        }

        let selector = RobustnessSelector::new(self.params.montecarlo.feasibility_scope);
        let selections = selector.select_all(&produced.trial_routes);

        let mut selected_tours: FxHashSet<TourId> = FxHashSet::default();
        for (job_id, selection) in &selections {
            match selection {
                Some(selected) => selected_tours.extend(
                    produced
                        .trial_routes
                        .iter()
                        .filter(|route| route.job_id == *job_id && route.trial == selected.trial)
                        .map(|route| route.tour_id),
                ),
                None => {
                    if let Some(group) = groups.get(job_id.0) {
                        errors.record_group(group, None, &GroupError::NoFeasibleTrial);
                    }
                }
            }
        }

        let output = PlanOutput {
            tours: produced
                .tours
                .into_iter()
                .filter(|tour| selected_tours.contains(&tour.tour_id))
                .collect(),
            assignments: produced
                .assignments
                .into_iter()
                .filter(|assignment| selected_tours.contains(&assignment.tour_id))
                .collect(),
            stops: produced
                .stops
                .into_iter()
                .filter(|stop| selected_tours.contains(&stop.tour_id))
                .collect(),
            errors: errors.into_records(),
            trial_routes: produced.trial_routes,
            selections,
            lineage: plan.parents,
        };

        info!(
            tours = output.tours.len(),
            stops = output.stops.len(),
            errors = output.errors.len(),
            "Planning run finished"
        );

        output
    }

    /// Checks, builds, solves and extracts one group. The checks run in a fixed
    /// order and the first failing one decides the reported reason.
    #[instrument(skip_all, level = Level::DEBUG, fields(group = %group, trial = state.trial))]
    fn plan_group<R: Rng>(
        &self,
        group: &PlanningGroup,
        state: &mut TrialState,
        rng: &mut R,
        ids: &mut IdSequences,
        errors: &mut ErrorLedger,
    ) -> Result<ExtractedTours, GroupError> {
        let reference = self.reference;
        let payloads = group.payloads(&state.plan.payloads);

        let first = payloads.first().ok_or(GroupError::NoPayloads)?;
        if first.job_kind().is_err() {
            return Err(GroupError::IncorrectProblemType(first.job().to_owned()));
        }

        if self.params.stop_policy.applies(group.commodity, group.segment)
            && reference.stop_distributions.get(group.commodity).is_none()
        {
            return Err(GroupError::NoStopDistribution(group.commodity));
        }

        let vehicle_type = reference
            .catalog
            .get(&group.vehicle_type)
            .ok_or(GroupError::NoVehicleTypeInfo)?;
        if !vehicle_type.carries(group.commodity) {
            return Err(GroupError::CommodityMismatch);
        }

        let class = vehicle_type.fleet_class();
        let carrier = state.carriers.get(&group.carrier).copied();
        if carrier.is_some() && state.fleet.available(&group.carrier, &class).is_none() {
            return Err(GroupError::NoVehicleTypeInfo);
        }
        let carrier = carrier.ok_or(GroupError::NoCarrierInfo)?;

        let available = state
            .fleet
            .available(carrier.id(), &class)
            .map(<[_]>::to_vec)
            .unwrap_or_default();
        if available.is_empty() {
            return Err(GroupError::NoVehiclesLeft);
        }

        let capacity = vehicle_type.capacity_units();
        let fitted = match drop_until_fits(&payloads, capacity, available.len()) {
            Ok(fitted) => fitted,
            Err(overflow) => {
                self.record_dropped(errors, group, state.trial, &overflow.dropped);
                return Err(overflow.into());
            }
        };
        self.record_dropped(errors, group, state.trial, &fitted.dropped);

        let builder = ProblemBuilder::new(
            &reference.resolver,
            &reference.catalog,
            &reference.stop_distributions,
            self.params.stop_policy,
        );
        let instance = timer_debug!(
            "Built routing instance",
            builder.build(
                &GroupInput {
                    carrier,
                    payloads: &fitted.kept,
                    vehicle_ids: &available,
                },
                rng,
            )
        )?;

        let perturbed = self
            .params
            .montecarlo
            .perturbation
            .perturb(instance.matrices(), rng);
        let instance = instance.with_matrices(perturbed)?;

        let solution = self.adapter.solve_instance(&instance)?;

        let solver_dropped: Vec<DroppedPayload> = solution
            .dropped()
            .iter()
            .map(|&node| instance.node(node))
            .filter_map(|node| {
                node.payload.clone().map(|payload| DroppedPayload {
                    payload,
                    weight: node.demand.abs() as f64,
                })
            })
            .collect();
        self.record_dropped(errors, group, state.trial, &solver_dropped);

        let extracted = self.extractor.extract(
            &instance,
            &solution,
            &ExtractionContext {
                carrier: carrier.id(),
                fleet_class: &class,
                trial: state.trial,
                job_id: group.job_id,
            },
            ids,
            &mut state.fleet,
        )?;

        debug!(
            tours = extracted.tours.len(),
            vehicles = extracted.used_vehicles.len(),
            "Planned group"
        );

        Ok(extracted)
    }

    fn record_dropped(
        &self,
        errors: &mut ErrorLedger,
        group: &PlanningGroup,
        trial: usize,
        dropped: &[DroppedPayload],
    ) {
        for payload in dropped {
            errors.record_dropped(group, trial, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use crate::{
        problem::{
            ids::{Commodity, PayloadId},
            payload::{Payload, PayloadBuilder, Segment},
            stop_distribution::{StopCountDistribution, StopCountRow, StopDistributions},
        },
        test_utils::{
            MD_ELECTRIC_TYPE, MD_VEHICLE_TYPE, delivery_payload, external_payload, mixed_catalog,
            test_carrier, test_catalog, test_resolver,
        },
    };

    use super::*;

    fn reference(payloads: Vec<Payload>, fleet: usize) -> ReferenceData {
        let mut stop_distributions = StopDistributions::default();
        stop_distributions.insert(
            Commodity(1),
            StopCountDistribution::new(vec![StopCountRow {
                cumulative_probability: 1.0,
                stops: 10,
            }])
            .unwrap(),
        );

        ReferenceData {
            resolver: test_resolver(),
            catalog: test_catalog(100.0),
            carriers: vec![test_carrier("c1", fleet)],
            payloads,
            stop_distributions,
        }
    }

    fn params(trials: usize) -> PlannerParams {
        let mut params = PlannerParams::default();
        params.montecarlo.trials = trials;
        params.solver.time_limit = SignedDuration::from_secs(10);
        params
    }

    #[test]
    fn test_rejects_invalid_run_parameters() {
        let reference = reference(Vec::new(), 1);

        assert!(matches!(
            TourPlanner::new(&reference, params(0)),
            Err(PlanningError::NoTrials)
        ));

        let mut inverted = params(2);
        inverted.montecarlo.perturbation.low = 1.5;
        assert!(matches!(
            TourPlanner::new(&reference, inverted),
            Err(PlanningError::InvalidPerturbation { .. })
        ));

        let no_carriers = ReferenceData {
            carriers: Vec::new(),
            ..reference.clone()
        };
        assert!(matches!(
            TourPlanner::new(&no_carriers, params(1)),
            Err(PlanningError::NoCarriers)
        ));
    }

    #[test]
    fn test_two_payloads_over_capacity_get_two_tours() {
        let reference = reference(
            vec![
                delivery_payload("p1", 11, 50.0, (0.0, 1440.0)),
                delivery_payload("p2", 12, 60.0, (0.0, 1440.0)),
            ],
            2,
        );

        let output = TourPlanner::new(&reference, params(2)).unwrap().run();

        assert_eq!(output.tours.len(), 2);
        assert_eq!(output.assignments.len(), 2);
        // Depot, one payload, depot again
        assert_eq!(output.stops.len(), 6);
        assert!(output.errors.is_empty());
        assert_eq!(output.selections.len(), 1);
        assert!(output.selections[&JobId(0)].is_some());
        // Every trial produced its own tours
        assert_eq!(output.trial_routes.len(), 4);
    }

    #[test]
    fn test_group_checks_are_reported() {
        let teleport = PayloadBuilder::new("p1".into(), "c1".into(), MD_VEHICLE_TYPE.into())
            .set_job("teleport")
            .set_weight(1.0)
            .build();
        let wrong_commodity = PayloadBuilder::new("p2".into(), "c1".into(), MD_VEHICLE_TYPE.into())
            .set_commodity(Commodity(9))
            .set_weight(1.0)
            .build();
        let unknown_type = PayloadBuilder::new("p3".into(), "c1".into(), "hd_veh_diesel".into())
            .set_commodity(Commodity(3))
            .set_segment(Segment::External)
            .set_weight(1.0)
            .build();
        let orphan = PayloadBuilder::new("p4".into(), "c9".into(), MD_VEHICLE_TYPE.into())
            .set_commodity(Commodity(3))
            .set_segment(Segment::External)
            .set_weight(1.0)
            .build();

        let reference = reference(vec![teleport, wrong_commodity, unknown_type, orphan], 1);
        let output = TourPlanner::new(&reference, params(1)).unwrap().run();

        let reasons: Vec<&str> = output
            .errors
            .iter()
            .map(|error| error.reason.as_str())
            .collect();

        assert!(output.tours.is_empty());
        assert!(reasons.contains(&"INCORRECT PROBLEM TYPE: teleport"));
        assert!(reasons.contains(&"NO STOPS DISTRIBUTION FOR COMMODITY 9"));
        assert!(reasons.contains(&"NO VEHICLE TYPE INFO"));
        assert!(reasons.contains(&"NO PAYLOAD INFO"));
        assert!(reasons.contains(&"NO CARRIER INFO"));
    }

    #[test]
    fn test_overflow_drops_heaviest_payload() {
        let reference = reference(
            vec![
                delivery_payload("p1", 11, 40.0, (0.0, 1440.0)),
                delivery_payload("p2", 12, 90.0, (0.0, 1440.0)),
                delivery_payload("p3", 13, 30.0, (0.0, 1440.0)),
            ],
            1,
        );

        let output = TourPlanner::new(&reference, params(1)).unwrap().run();

        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].reason, "Dropped payload: p2 with weight: 90");
        assert_eq!(output.tours.len(), 1);
        assert!(output.stops.iter().all(|stop| stop.payload_id.as_str() != "p2"));
    }

    #[test]
    fn test_fleet_is_shared_across_groups_of_a_trial() {
        let external = |id: &str, commodity: u32| {
            PayloadBuilder::new(id.into(), "c1".into(), MD_VEHICLE_TYPE.into())
                .set_commodity(Commodity(commodity))
                .set_segment(Segment::External)
                .set_delivery(
                    delivery_payload(id, 11, 80.0, (0.0, 1440.0))
                        .delivery()
                        .cloned()
                        .unwrap(),
                )
                .set_weight(80.0)
                .build()
        };
        let reference = reference(vec![external("a", 1), external("b", 3)], 1);

        let output = TourPlanner::new(&reference, params(1)).unwrap().run();

        // The only vehicle went to the first commodity
        assert_eq!(output.tours.len(), 1);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].commodity, Commodity(3));
        assert_eq!(output.errors[0].reason, "NO VEHICLES AVAILABLE");
    }

    #[test]
    fn test_stop_ceiling_drops_are_recorded() {
        let mut reference = reference(
            vec![
                delivery_payload("p1", 11, 10.0, (0.0, 1440.0)),
                delivery_payload("p2", 12, 10.0, (0.0, 1440.0)),
                delivery_payload("p3", 13, 10.0, (0.0, 1440.0)),
            ],
            1,
        );
        reference.stop_distributions.insert(
            Commodity(1),
            StopCountDistribution::new(vec![StopCountRow {
                cumulative_probability: 1.0,
                stops: 1,
            }])
            .unwrap(),
        );

        let output = TourPlanner::new(&reference, params(1)).unwrap().run();

        assert_eq!(output.tours.len(), 1);
        assert_eq!(output.errors.len(), 2);
        for error in &output.errors {
            assert!(error.reason.starts_with("Dropped payload: p"));
            assert!(error.reason.ends_with("with weight: 10"));
        }
    }

    #[test]
    fn test_split_class_serves_every_vehicle_type() {
        let mut payloads: Vec<Payload> = (0..35)
            .map(|i| external_payload(&format!("d{i}"), MD_VEHICLE_TYPE, 11, 1.0))
            .collect();
        payloads.extend(
            (0..35).map(|i| external_payload(&format!("e{i}"), MD_ELECTRIC_TYPE, 11, 1.0)),
        );
        let expected: FxHashSet<PayloadId> = payloads.iter().map(|p| p.id().clone()).collect();
        let reference = ReferenceData {
            catalog: mixed_catalog(100.0),
            ..reference(payloads, 4)
        };

        let output = TourPlanner::new(&reference, params(1)).unwrap().run();

        assert!(output.errors.is_empty());
        let served: FxHashSet<&PayloadId> = output
            .stops
            .iter()
            .map(|stop| &stop.payload_id)
            .filter(|id| expected.contains(*id))
            .collect();
        assert_eq!(served.len(), 70);
    }
}
