pub mod arc_cost;
pub mod capacity_dimension;
pub mod pickup_delivery;
pub mod route_constraint;
pub mod stop_count_dimension;
pub mod time_dimension;
