use std::{cmp::Ordering, collections::BTreeMap};

use serde::Serialize;
use tracing::debug;

use crate::{extraction::trial_route::TrialRoute, problem::ids::JobId};

use super::{
    evaluation::{route_distance, time_window_check},
    montecarlo_params::FeasibilityScope,
};

/// How one trial's routes behave across every trial's travel times.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TrialStatistics {
    pub trial: usize,
    /// Total distance of the trial's routes under each trial's matrix.
    pub distances: Vec<(usize, f64)>,
    pub feasible: bool,
    /// Sample standard deviation of `distances`, `None` below two values.
    pub std_dev: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SelectedTrial {
    pub job_id: JobId,
    pub trial: usize,
    pub std_dev: Option<f64>,
    pub statistics: Vec<TrialStatistics>,
}

/// Sample standard deviation, `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Some(variance.sqrt())
}

/// Picks, per job, the trial whose plan varies least when replayed under the
/// travel times of every trial.
pub struct RobustnessSelector {
    scope: FeasibilityScope,
}

impl RobustnessSelector {
    pub fn new(scope: FeasibilityScope) -> Self {
        RobustnessSelector { scope }
    }

    /// Groups routes by job and selects each job's trial. A job maps to `None`
    /// when none of its trials is feasible.
    pub fn select_all(&self, routes: &[TrialRoute]) -> BTreeMap<JobId, Option<SelectedTrial>> {
        let mut jobs: BTreeMap<JobId, Vec<&TrialRoute>> = BTreeMap::new();
        for route in routes {
            jobs.entry(route.job_id).or_default().push(route);
        }

        jobs.into_iter()
            .map(|(job_id, routes)| (job_id, self.select(job_id, &routes)))
            .collect()
    }

    pub fn select(&self, job_id: JobId, routes: &[&TrialRoute]) -> Option<SelectedTrial> {
        let mut by_trial: BTreeMap<usize, Vec<&TrialRoute>> = BTreeMap::new();
        for &route in routes {
            by_trial.entry(route.trial).or_default().push(route);
        }

        let statistics: Vec<TrialStatistics> = by_trial
            .iter()
            .map(|(&trial, trial_routes)| self.statistics(trial, trial_routes, &by_trial))
            .collect();

        let selected = statistics
            .iter()
            .filter(|statistics| statistics.feasible)
            .min_by(|a, b| {
                // Undefined deviations rank last, ties go to the earlier trial
                let by_deviation = match (a.std_dev, b.std_dev) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                by_deviation.then(a.trial.cmp(&b.trial))
            })?;

        debug!(
            job = %job_id,
            trial = selected.trial,
            std_dev = ?selected.std_dev,
            "Selected trial"
        );

        Some(SelectedTrial {
            job_id,
            trial: selected.trial,
            std_dev: selected.std_dev,
            statistics: statistics.clone(),
        })
    }

    fn statistics(
        &self,
        trial: usize,
        routes: &[&TrialRoute],
        by_trial: &BTreeMap<usize, Vec<&TrialRoute>>,
    ) -> TrialStatistics {
        let mut distances = Vec::new();
        let mut feasible = true;

        for (&matrix_trial, matrix_routes) in by_trial {
            let Some(inputs) = matrix_routes.first().map(|route| &route.inputs) else {
                continue;
            };

            let total: Option<f64> = routes
                .iter()
                .map(|route| route_distance(&route.arcs, inputs))
                .sum();
            if let Some(total) = total {
                distances.push((matrix_trial, total));
            }

            let checked = self.scope == FeasibilityScope::AnyMatrix || matrix_trial == trial;
            if checked
                && !routes.iter().all(|route| {
                    time_window_check(&route.arcs, inputs, route.departure_time) == Some(true)
                })
            {
                feasible = false;
            }
        }

        let values: Vec<f64> = distances.iter().map(|&(_, distance)| distance).collect();
        TrialStatistics {
            trial,
            std_dev: sample_std_dev(&values),
            distances,
            feasible,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        extraction::trial_route::TrialInputs,
        problem::{ids::TourId, routing_instance::VehicleIdx, time_window::TimeWindow},
    };

    use super::*;

    fn inputs(scale: f64, windows: Vec<TimeWindow>) -> Arc<TrialInputs> {
        Arc::new(TrialInputs {
            time_matrix: vec![
                vec![0.0, 10.0 * scale, 40.0 * scale],
                vec![10.0 * scale, 0.0, 10.0 * scale],
                vec![40.0 * scale, 10.0 * scale, 0.0],
            ],
            stop_durations: vec![0.0; 3],
            time_windows: windows,
        })
    }

    fn open_windows() -> Vec<TimeWindow> {
        vec![TimeWindow::new(0.0, 1440.0); 3]
    }

    fn route(trial: usize, arcs: Vec<(usize, usize)>, inputs: &Arc<TrialInputs>) -> TrialRoute {
        TrialRoute {
            trial,
            job_id: JobId(0),
            tour_id: TourId(trial as u64),
            vehicle: VehicleIdx::new(0),
            arcs,
            end_time: 0.0,
            loads: Vec::new(),
            departure_time: 0.0,
            inputs: Arc::clone(inputs),
        }
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[1.0]), None);
        assert_eq!(sample_std_dev(&[2.0, 4.0]), Some(f64::sqrt(2.0)));
        assert_eq!(sample_std_dev(&[5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_lowest_deviation_wins() {
        let first = inputs(1.0, open_windows());
        let second = inputs(2.0, open_windows());
        // Trial 0 goes through node 1 on short arcs only, trial 1 uses the long arc
        let routes = vec![
            route(0, vec![(0, 1), (1, 2), (2, 1), (1, 0)], &first),
            route(1, vec![(0, 2), (2, 0)], &second),
        ];

        let selected = RobustnessSelector::new(FeasibilityScope::OwnMatrix)
            .select_all(&routes)
            .remove(&JobId(0))
            .flatten()
            .unwrap();

        // 40 vs 80 against 80 vs 160
        assert_eq!(selected.trial, 0);
        assert_eq!(selected.statistics[0].distances, vec![(0, 40.0), (1, 80.0)]);
        assert_eq!(selected.std_dev, sample_std_dev(&[40.0, 80.0]));
    }

    #[test]
    fn test_infeasible_trial_is_never_selected() {
        let mut tight = open_windows();
        tight[2] = TimeWindow::new(0.0, 5.0);
        let first = inputs(1.0, tight);
        let second = inputs(2.0, open_windows());
        let routes = vec![
            route(0, vec![(0, 1), (1, 2), (2, 1), (1, 0)], &first),
            route(1, vec![(0, 2), (2, 0)], &second),
        ];

        let selected = RobustnessSelector::new(FeasibilityScope::OwnMatrix)
            .select(JobId(0), &routes.iter().collect::<Vec<_>>())
            .unwrap();

        assert_eq!(selected.trial, 1);
        assert!(!selected.statistics[0].feasible);
    }

    #[test]
    fn test_any_matrix_scope() {
        let mut tight = open_windows();
        tight[2] = TimeWindow::new(0.0, 5.0);
        let first = inputs(1.0, open_windows());
        let second = inputs(2.0, tight);
        let routes = vec![
            route(0, vec![(0, 1), (1, 2), (2, 1), (1, 0)], &first),
            route(1, vec![(0, 1), (1, 0)], &second),
        ];
        let refs: Vec<&TrialRoute> = routes.iter().collect();

        // Trial 0 breaks node 2's window under trial 1's inputs
        let own = RobustnessSelector::new(FeasibilityScope::OwnMatrix).select(JobId(0), &refs);
        let any = RobustnessSelector::new(FeasibilityScope::AnyMatrix).select(JobId(0), &refs);

        assert!(own.unwrap().statistics[0].feasible);
        assert_eq!(any.unwrap().trial, 1);
    }

    #[test]
    fn test_no_feasible_trial() {
        let mut tight = open_windows();
        tight[2] = TimeWindow::new(0.0, 1.0);
        let only = inputs(1.0, tight);
        let routes = vec![route(0, vec![(0, 1), (1, 2), (2, 0)], &only)];

        let selections = RobustnessSelector::new(FeasibilityScope::OwnMatrix).select_all(&routes);
        assert_eq!(selections.get(&JobId(0)), Some(&None));
    }
}
