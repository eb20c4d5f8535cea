use jiff::{SignedDuration, Timestamp};

/// Wall-clock budget of a single solve.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started_at: Timestamp,
    limit: SignedDuration,
}

impl Deadline {
    pub fn new(limit: SignedDuration) -> Self {
        Deadline {
            started_at: Timestamp::now(),
            limit,
        }
    }

    pub fn elapsed(&self) -> SignedDuration {
        Timestamp::now().duration_since(self.started_at)
    }

    pub fn is_reached(&self) -> bool {
        self.elapsed() > self.limit
    }
}
