use std::{hint::black_box, sync::Arc};

use criterion::{Criterion, criterion_group, criterion_main};
use jiff::SignedDuration;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tourplan_costs::travel_matrices::TravelMatrices;
use tourplan_optimizer::{
    extraction::trial_route::{TrialInputs, TrialRoute},
    montecarlo::{
        montecarlo_params::FeasibilityScope, perturbation::PerturbationRange,
        selection::RobustnessSelector,
    },
    problem::{
        ids::{Commodity, JobId, PayloadId, TourId, VehicleId, ZoneId},
        job_kind::JobKind,
        payload::Segment,
        routing_instance::{
            GroupKey, InstanceVehicle, Node, NodeKind, RoutingInstance, RoutingInstanceBuilder,
        },
        time_window::TimeWindow,
    },
    solver::{solver_adapter::SolverAdapter, solver_params::SolverParams},
};

fn node(kind: NodeKind, index: usize, demand: i64) -> Node {
    Node {
        kind,
        payload: (kind != NodeKind::Depot).then(|| PayloadId::new(format!("p{index}"))),
        zone: ZoneId(index as i64 + 1),
        geo: None,
        x: 0.0,
        y: 0.0,
        window: TimeWindow::new(0.0, 1440.0),
        service_minutes: 5.0,
        demand,
        stop_cost: 0,
    }
}

fn random_instance(stops: usize, vehicles: usize, rng: &mut SmallRng) -> RoutingInstance {
    let mut builder = RoutingInstanceBuilder::new(
        GroupKey {
            carrier: "bench".into(),
            commodity: Commodity(3),
            segment: Segment::External,
            vehicle_type: "md_veh_diesel".into(),
        },
        JobKind::Delivery,
    );
    builder.add_node(node(NodeKind::Depot, 0, 0));
    for index in 1..=stops {
        builder.add_node(node(NodeKind::Delivery, index, rng.random_range(5..40)));
    }

    let points: Vec<(f64, f64)> = (0..=stops)
        .map(|_| (rng.random_range(0.0..30.0), rng.random_range(0.0..30.0)))
        .collect();
    builder.set_matrices(TravelMatrices::from_fn(stops + 1, |from, to| {
        let (a, b) = (points[from], points[to]);
        let minutes = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt().trunc();
        (minutes, (minutes * 0.3).trunc())
    }));

    for id in 0..vehicles {
        builder.add_vehicle(InstanceVehicle {
            id: VehicleId(id as u64),
            vehicle_type: "md_veh_diesel".into(),
            capacity: 200,
            stop_limits: None,
        });
    }

    builder.build().unwrap()
}

fn solver_benchmark(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(42);
    let instance = random_instance(30, 6, &mut rng);
    let adapter = SolverAdapter::new(SolverParams {
        time_limit: SignedDuration::from_secs(60),
        ..SolverParams::default()
    });

    c.bench_function("solve 30 deliveries", |b| {
        b.iter(|| adapter.solve_instance(black_box(&instance)))
    });

    let range = PerturbationRange::default();
    c.bench_function("perturb 31x31 matrix", |b| {
        b.iter(|| range.perturb(black_box(instance.matrices()), &mut rng))
    });
}

fn selection_benchmark(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(7);
    let instance = random_instance(30, 6, &mut rng);
    let adapter = SolverAdapter::new(SolverParams::default());
    let range = PerturbationRange::default();

    let mut routes = Vec::new();
    for trial in 0..10 {
        let perturbed = instance
            .with_matrices(range.perturb(instance.matrices(), &mut rng))
            .unwrap();
        let solution = adapter.solve_instance(&perturbed).unwrap();
        let inputs = Arc::new(TrialInputs {
            time_matrix: perturbed.matrices().time_rows(),
            stop_durations: perturbed.service_durations(),
            time_windows: perturbed.time_windows(),
        });

        for route in solution.used_routes() {
            routes.push(TrialRoute {
                trial,
                job_id: JobId(0),
                tour_id: TourId(routes.len() as u64),
                vehicle: route.vehicle,
                arcs: route
                    .arcs()
                    .into_iter()
                    .map(|(from, to)| (from.get(), to.get()))
                    .collect(),
                end_time: route.end_cumul(),
                loads: route.loads.clone(),
                departure_time: route.start_cumul().trunc(),
                inputs: Arc::clone(&inputs),
            });
        }
    }

    let selector = RobustnessSelector::new(FeasibilityScope::OwnMatrix);
    c.bench_function("select among 10 trials", |b| {
        b.iter(|| selector.select_all(black_box(&routes)))
    });
}

criterion_group!(benches, solver_benchmark, selection_benchmark);
criterion_main!(benches);
