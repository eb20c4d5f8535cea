pub mod backend;
pub mod constraints;
pub mod construction;
pub mod deadline;
pub mod insertion;
pub mod insertion_backend;
pub mod ls;
pub mod routing_model;
pub mod routing_solution;
pub mod schedule;
pub mod score;
pub mod solve_status;
pub mod solver_adapter;
pub mod solver_params;
pub mod working_solution;
