use std::sync::Arc;

use codexbot_agent::{codex::CodexBackend, pr::OpenAiGenerator};
use codexbot_core::{
    config::Config, queue::JobQueue, telemetry::Telemetry, workspace::AutomaClient,
};
use codexbot_server::{jobs, routes, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codexbot_server=info,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    let (queue, rx) = JobQueue::new();

    let state = Arc::new(AppState {
        code: Arc::new(AutomaClient::new()),
        agent: Arc::new(CodexBackend::new(config.codex_bin.clone())),
        pr: Arc::new(OpenAiGenerator::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.openai_base_url.clone(),
        )),
        queue,
        telemetry: Telemetry::new(config.telemetry_endpoint.clone()),
        config,
    });

    jobs::spawn_consumer(Arc::clone(&state), rx);

    let app = routes::router(Arc::clone(&state));
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
