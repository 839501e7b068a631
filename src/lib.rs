//! Street-lighting load scenarios from mapped street features and a
//! standard load profile.

pub mod config;
pub mod error;
pub mod features;
/// CSV readers and writers for every table the pipeline touches.
pub mod io;
pub mod profile;
pub mod runner;
/// Scenario definitions and the load engine.
pub mod scenario;
pub mod summary;
pub mod telemetry;
