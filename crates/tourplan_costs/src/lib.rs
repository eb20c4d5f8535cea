pub mod cost_resolver;
pub mod fallback;
pub mod ids;
pub mod tables;
pub mod travel_matrices;
