use crate::extraction::trial_route::TrialInputs;

/// Sum of travel plus origin service time over the arcs of a route. `None`
/// when an arc does not fit the matrix.
pub fn route_distance(arcs: &[(usize, usize)], inputs: &TrialInputs) -> Option<f64> {
    arcs.iter().try_fold(0.0, |total, &(from, to)| {
        let time = inputs.time_matrix.get(from)?.get(to)?;
        let service = inputs.stop_durations.get(from)?;
        Some(total + time + service)
    })
}

/// Replays a route without waiting and checks every visit is reached inside
/// its window. Leaving the depot resets the clock so that the next visit is
/// reached exactly when its window opens. `None` when an arc does not fit the
/// inputs.
pub fn time_window_check(
    arcs: &[(usize, usize)],
    inputs: &TrialInputs,
    departure_time: f64,
) -> Option<bool> {
    let mut current = departure_time;

    for &(from, to) in arcs {
        let transit = inputs.time_matrix.get(from)?.get(to)? + inputs.stop_durations.get(from)?;
        let window = inputs.time_windows.get(to)?;

        if from == 0 {
            current = window.start() - transit;
        }
        current += transit;

        if to != 0 && !window.contains(current) {
            return Some(false);
        }
    }

    Some(true)
}
