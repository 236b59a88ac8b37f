//! benchmark/mod.rs
//! Parallel codec benchmarking, scoring and the optimal-compression flow.

pub mod scoring;
pub mod worker;
pub mod coordinator;

pub use scoring::*;
pub use worker::*;
pub use coordinator::*;
