//! Background Tasks Module
//!
//! Contains the one background activity of the engine.
//!
//! # Tasks
//! - Expiry sweep: removes stale items at a configured interval

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
pub use sweep::SweepHandle;
