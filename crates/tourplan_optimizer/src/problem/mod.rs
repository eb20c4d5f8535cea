pub mod carrier;
pub mod fleet_ledger;
pub mod ids;
pub mod job_kind;
pub mod payload;
pub mod problem_builder;
pub mod routing_instance;
pub mod stop_distribution;
pub mod time_window;
pub mod vehicle_type;
