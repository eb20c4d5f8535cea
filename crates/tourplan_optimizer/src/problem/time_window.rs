use serde::{Deserialize, Serialize};

/// Closed interval in minutes from the start of the simulated day.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    pub const fn new(start: f64, end: f64) -> Self {
        TimeWindow { start, end }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start <= self.end
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Bounds in seconds, truncated like every other output quantity.
    pub fn to_seconds(&self) -> (i64, i64) {
        ((self.start * 60.0) as i64, (self.end * 60.0) as i64)
    }
}
