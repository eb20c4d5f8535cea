use serde::{Deserialize, Serialize};

use crate::problem::ids::TourId;

/// Run-wide counters for tour ids and synthetic depot ids.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct IdSequences {
    next_tour: u64,
    next_depot: u64,
}

impl IdSequences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_tour(&mut self) -> TourId {
        let id = TourId(self.next_tour);
        self.next_tour += 1;
        id
    }

    pub fn next_depot(&mut self) -> u64 {
        let id = self.next_depot;
        self.next_depot += 1;
        id
    }

    pub fn peek_tour(&self) -> TourId {
        TourId(self.next_tour)
    }
}
