use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use codexbot_core::agent::{PrGenerator, PrMetadata};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

const INSTRUCTIONS: &str = "Generate a github pull request title (should be short) and body \
(using markdown) based on the description given by the user. Make sure to not include any \
diffs in pull request body.";

/// Drafts pull-request metadata with the OpenAI Responses API, constrained
/// to a strict `{title, body}` JSON schema.
pub struct OpenAiGenerator {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

/// First `output_text` block of the first message item, if any.
/// Refusals and empty outputs yield `None`.
fn extract_output_text(reply: &ResponsesReply) -> Option<&str> {
    reply
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .flat_map(|item| item.content.iter())
        .find(|c| c.kind == "output_text")
        .map(|c| c.text.as_str())
}

#[async_trait]
impl PrGenerator for OpenAiGenerator {
    async fn generate(&self, description: &str) -> Result<Option<PrMetadata>> {
        let body = json!({
            "model": self.model,
            "instructions": INSTRUCTIONS,
            "input": description,
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": "pr",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 72 },
                            "body": { "type": "string" }
                        },
                        "required": ["title", "body"],
                        "additionalProperties": false
                    }
                }
            }
        });

        let url = format!("{}/responses", self.base_url.trim_end_matches('/'));
        info!(model = %self.model, "requesting pull request metadata");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("openai returned {status}: {body}");
        }

        let reply: ResponsesReply = response
            .json()
            .await
            .context("failed to decode openai response")?;

        let Some(text) = extract_output_text(&reply) else {
            warn!("model declined to produce pull request metadata");
            return Ok(None);
        };

        let metadata: PrMetadata = serde_json::from_str(text)
            .context("failed to decode structured pull request metadata")?;
        Ok(Some(metadata))
    }
}
