pub mod models;
pub mod utils;

// Plain data shared by the engine and any client of the price comparison service.
// Pipeline logic (pivoting, normalization, ordering) lives in the `engine` crate.
