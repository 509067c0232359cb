use serde_json::json;
use tracing::error;

/// Forwards captured errors to an optional external collector.
/// With no endpoint configured, capture degrades to an error log.
#[derive(Clone)]
pub struct Telemetry {
    endpoint: Option<String>,
    http: reqwest::Client,
}

impl Telemetry {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    /// Record an error with its request/job context. Fire-and-forget:
    /// delivery failures are logged, never propagated.
    pub fn capture(&self, err: &anyhow::Error, context: &str) {
        error!(context = %context, "captured error: {err:#}");

        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };
        let body = json!({
            "message": format!("{err:#}"),
            "context": context,
        });
        let http = self.http.clone();
        tokio::spawn(async move {
            if let Err(e) = http.post(&endpoint).json(&body).send().await {
                error!("failed to deliver telemetry event: {e}");
            }
        });
    }
}
