pub mod id_sequences;
pub mod records;
pub mod solution_extractor;
pub mod trial_route;
