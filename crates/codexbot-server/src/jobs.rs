use std::sync::Arc;

use codexbot_core::{queue::Job, types::JobPayload};
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tracing::info;

use crate::{update, AppState};

/// Spawn the single background consumer that drains the job queue.
///
/// Jobs run to completion one at a time; a failed job is logged and
/// captured to telemetry, never retried.
pub fn spawn_consumer(
    state: Arc<AppState>,
    mut rx: UnboundedReceiver<Job<JobPayload>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            info!(
                job_key = %job.key,
                task_id = job.payload.data.task.id,
                "processing task"
            );
            match update::run(&state, &job.payload.base_url, &job.payload.data).await {
                Ok(_) => info!(job_key = %job.key, "task processed"),
                Err(e) => state.telemetry.capture(&e, &format!("job {}", job.key)),
            }
        }
    })
}
