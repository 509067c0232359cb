use anyhow::{bail, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

/// The completed-message shape codex emits as its last stdout line.
#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    OutputText { text: String },

    #[serde(other)]
    Unknown,
}

/// Extract the agent's final message from raw subprocess stdout.
///
/// The contract with codex is implicit: the last non-empty stdout line is
/// a JSON message with `type: "message"`, `status: "completed"`, and an
/// `output_text` block first in `content`. Anything that decodes but does
/// not match that shape is rejected outright rather than salvaged.
pub fn parse_agent_completion(raw_stdout: &str) -> Result<String> {
    let last_line = raw_stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");

    let value: Value = match serde_json::from_str(last_line) {
        Ok(v) => v,
        Err(e) => {
            error!("failed to parse codex output: {e}");
            bail!("failed to parse codex output");
        }
    };

    let message: CompletionMessage = match serde_json::from_value(value.clone()) {
        Ok(m) => m,
        Err(_) => return reject(&value),
    };

    if message.kind != "message" || message.status != "completed" {
        return reject(&value);
    }

    match message.content.first() {
        Some(ContentBlock::OutputText { text }) => Ok(text.clone()),
        _ => reject(&value),
    }
}

fn reject(value: &Value) -> Result<String> {
    error!(result = %value, "codex did not complete the task");
    bail!("codex did not complete the task")
}
