pub mod evaluation;
pub mod montecarlo_params;
pub mod perturbation;
pub mod selection;
