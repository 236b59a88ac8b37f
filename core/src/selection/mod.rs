//! selection/mod.rs
//! Codec selection: rule data, learned model variants and the policy that
//! applies them.

pub mod rules;
pub mod model;
pub mod policy;

pub use rules::*;
pub use model::*;
pub use policy::*;
