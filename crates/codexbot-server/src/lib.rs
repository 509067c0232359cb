use std::sync::Arc;

use codexbot_core::{
    agent::{AgentBackend, PrGenerator},
    config::Config,
    queue::JobQueue,
    telemetry::Telemetry,
    types::JobPayload,
    workspace::CodeHost,
};

pub mod jobs;
pub mod routes;
pub mod update;
pub mod webhook;

/// Shared state handed to every route handler and the job consumer.
pub struct AppState {
    pub config: Config,
    pub code: Arc<dyn CodeHost>,
    pub agent: Arc<dyn AgentBackend>,
    pub pr: Arc<dyn PrGenerator>,
    pub queue: JobQueue<JobPayload>,
    pub telemetry: Telemetry,
}
