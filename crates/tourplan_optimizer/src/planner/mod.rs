pub mod error_ledger;
pub mod group;
pub mod planner_params;
pub mod reference_data;
pub mod tour_planner;
