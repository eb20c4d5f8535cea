use crate::problem::routing_instance::{NodeIdx, RoutingInstance};

#[derive(Debug, Clone, Copy)]
struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    fn intersect(self, lo: f64, hi: f64) -> Option<Interval> {
        let interval = Interval {
            lo: self.lo.max(lo),
            hi: self.hi.min(hi),
        };
        (interval.lo <= interval.hi).then_some(interval)
    }
}

/// Cumulative times along a route, the depot start and end included.
///
/// Every hop must satisfy `cumul[next] - cumul[prev] - transit(prev, next)` in
/// `[0, waiting_slack]`. Visits are bounded by their time window, the start by
/// the depot window and everything by the horizon. Among the feasible
/// schedules, the one starting as early as possible and arriving as early as
/// possible afterwards is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    cumuls: Vec<f64>,
}

impl Schedule {
    pub fn compute(
        instance: &RoutingInstance,
        stops: &[NodeIdx],
        waiting_slack: f64,
        horizon: f64,
    ) -> Option<Schedule> {
        let path: Vec<NodeIdx> = std::iter::once(NodeIdx::DEPOT)
            .chain(stops.iter().copied())
            .chain(std::iter::once(NodeIdx::DEPOT))
            .collect();
        let last = path.len() - 1;

        let bounds = |position: usize| -> (f64, f64) {
            if position == last {
                return (0.0, horizon);
            }
            let window = instance.node(path[position]).window;
            (window.start().max(0.0), window.end().min(horizon))
        };

        // Forward pass: every cumul value reachable from a feasible start.
        let mut forward = Vec::with_capacity(path.len());
        let (lo, hi) = bounds(0);
        forward.push(Interval { lo, hi }.intersect(lo, hi)?);
        for position in 1..path.len() {
            let previous = forward[position - 1];
            let transit = instance.transit(path[position - 1], path[position]);
            let (lo, hi) = bounds(position);
            let reachable = Interval {
                lo: previous.lo + transit,
                hi: previous.hi + transit + waiting_slack,
            };
            forward.push(reachable.intersect(lo, hi)?);
        }

        // Backward pass: keep only values that can still reach the end.
        let mut feasible = forward.clone();
        for position in (0..last).rev() {
            let next = feasible[position + 1];
            let transit = instance.transit(path[position], path[position + 1]);
            feasible[position] =
                feasible[position].intersect(next.lo - transit - waiting_slack, next.hi - transit)?;
        }

        let mut cumuls = Vec::with_capacity(path.len());
        cumuls.push(feasible[0].lo);
        for position in 1..path.len() {
            let transit = instance.transit(path[position - 1], path[position]);
            cumuls.push((cumuls[position - 1] + transit).max(feasible[position].lo));
        }

        Some(Schedule { cumuls })
    }

    pub fn cumuls(&self) -> &[f64] {
        &self.cumuls
    }

    pub fn start(&self) -> f64 {
        self.cumuls[0]
    }

    pub fn end(&self) -> f64 {
        self.cumuls[self.cumuls.len() - 1]
    }

    pub fn duration(&self) -> f64 {
        self.end() - self.start()
    }
}
