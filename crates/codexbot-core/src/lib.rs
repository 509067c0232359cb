pub mod agent;
pub mod config;
pub mod queue;
pub mod telemetry;
pub mod types;
pub mod workspace;

pub use types::*;
