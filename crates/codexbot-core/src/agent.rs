use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::workspace::CodeFolder;

/// Structured pull-request fields drafted by a [`PrGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrMetadata {
    pub title: String,
    pub body: String,
}

#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Run one agent invocation against the checkout, returning the raw
    /// combined stdout. Process-level failure or a non-zero exit is an
    /// error.
    async fn run_task(&self, folder: &CodeFolder, instruction: &str) -> Result<String>;
}

#[async_trait]
pub trait PrGenerator: Send + Sync {
    /// Draft pull-request metadata from the agent's final message.
    /// `None` means the model declined to produce a structured object.
    async fn generate(&self, description: &str) -> Result<Option<PrMetadata>>;
}
