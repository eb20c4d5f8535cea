pub mod local_search;
pub mod operator;
pub mod relocate;
pub mod two_opt;
