pub mod best_insertion;
pub mod path_cheapest_arc;
