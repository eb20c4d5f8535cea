use thiserror::Error;

/// Why a routing instance produced no solution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveFailure {
    #[error("PROBLEM NOT YET SOLVED")]
    NotSolved,
    #[error("NO SOLUTION FOUND FOR PROBLEM")]
    Infeasible,
    #[error("TIME LIMIT REACHED BEFORE FINDING A SOLUTION")]
    TimeLimitExceeded,
    #[error("MODEL, PARAMETERS, OR FLAGS ARE INVALID: {0}")]
    InvalidModel(String),
}
