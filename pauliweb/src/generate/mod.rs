//! Diagram and stabilizer generators for tests, benchmarks and experiments.

mod codes;
mod random;
mod shor;
mod zweb;

pub use codes::{rotated_planar_surface_code_stabilisers, steane_code_stabilisers};
pub use random::random_clifford;
pub use shor::{shor_extraction, ShorExtraction};
pub use zweb::zweb;
