use anyhow::Result;
use codexbot_agent::{completion::parse_agent_completion, instruction::build_instruction};
use codexbot_core::{
    types::{Proposal, WebhookData},
    workspace::CodeFolder,
};
use tracing::{info, warn};

use crate::AppState;

/// Run the full task-update pipeline for one job.
///
/// A download failure propagates without any cleanup since nothing was
/// acquired. Once the checkout exists, cleanup runs exactly once whatever
/// the inner pipeline does; a cleanup failure is logged and the pipeline
/// result wins.
pub async fn run(state: &AppState, base_url: &str, data: &WebhookData) -> Result<String> {
    let folder = state.code.download(data, base_url).await?;

    let result = update_and_propose(state, &folder, data, base_url).await;

    if let Err(e) = state.code.cleanup(data).await {
        warn!(task_id = data.task.id, "cleanup failed: {e:#}");
    }

    result
}

async fn update_and_propose(
    state: &AppState,
    folder: &CodeFolder,
    data: &WebhookData,
    base_url: &str,
) -> Result<String> {
    let instruction = build_instruction(&data.task);
    info!(task_id = data.task.id, "running agent");

    let stdout = state.agent.run_task(folder, &instruction).await?;
    let final_message = parse_agent_completion(&stdout)?;

    // Make sure all created files are tracked before proposing.
    folder.add_all()?;

    let proposal = match state.pr.generate(&final_message).await? {
        Some(metadata) => Proposal {
            title: Some(metadata.title),
            body: Some(metadata.body),
        },
        None => Proposal::default(),
    };

    state.code.propose(data, &proposal, base_url).await?;

    info!(task_id = data.task.id, "task update proposed");
    Ok(final_message)
}
