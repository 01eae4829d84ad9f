//! ClearPath core: the ambulance progress simulator, signal preemption,
//! officer and driver alerts, and the engine that drives them on a
//! virtual clock.

pub mod alert;
pub mod analytics;
pub mod backend;
pub mod clock;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod event;
pub mod rng;
pub mod scheduler;
pub mod sequence;
pub mod signal;
pub mod simulator;
pub mod snapshot;
pub mod timestamp;
pub mod types;
