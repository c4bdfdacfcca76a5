//! Recovery planning
//!
//! Builds recovery plans for the four supported intents: point-in-time
//! recovery over a bracketed backup timeline, selective restore of named
//! data subsets, scenario-optimized full/partial/incremental restores, and
//! automated failover procedures. Plans are ordered step lists registered
//! with the engine's plan registry; the planner never performs restore I/O.

pub mod failover;
pub mod planner;
pub mod types;

pub use failover::*;
pub use planner::*;
pub use types::*;
