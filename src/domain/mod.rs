// Domain layer - Pure models and computations, no I/O
pub mod alert;
pub mod dashboard;
pub mod fleet;
pub mod heuristics;
pub mod machine;
pub mod quality;
pub mod query;
pub mod status;
pub mod trends;
