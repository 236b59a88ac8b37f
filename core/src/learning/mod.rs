//! learning/mod.rs
//! Outcome history, the retraining learner and its snapshot persistence.

pub mod history;
pub mod learner;
pub mod snapshot;

pub use history::*;
pub use learner::*;
pub use snapshot::*;
