use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Webhook envelope ─────────────────────────────────────────────────────

/// Webhook envelope as delivered by the task platform. Received once per
/// HTTP call; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub id: String,
    pub timestamp: String,
    pub data: WebhookData,
}

/// The task/repo/org triple carried through every code-host call.
/// Repo and org are kept opaque so they round-trip unchanged to the
/// originating server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookData {
    pub task: Task,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Value>,
}

// ── Task ─────────────────────────────────────────────────────────────────

/// A unit of work requested by the upstream platform, immutable as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub token: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<TaskItem>,
}

/// One item attached to a task. Items with unrecognized types deserialize
/// to `Unknown` and are ignored everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskItem {
    /// Free-text description added by the requester.
    Message {
        #[serde(default)]
        id: Option<i64>,
        data: MessageData,
    },

    /// The upstream issue the task originated from, possibly carrying
    /// its comment thread.
    Origin {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default)]
        data: OriginData,
    },

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginData {
    /// Comments on the originating issue, oldest first. A missing list is
    /// the same as an empty one.
    #[serde(default, rename = "issueComments")]
    pub issue_comments: Vec<IssueComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueComment {
    #[serde(rename = "userName")]
    pub user_name: String,
    pub body: String,
}

// ── Proposal ─────────────────────────────────────────────────────────────

/// A drafted change request sent back to the code-hosting platform.
/// Both fields are optional downstream; absent fields are omitted from the
/// wire representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

// ── Jobs ─────────────────────────────────────────────────────────────────

/// Payload of one background job: everything the task-update pipeline
/// needs, captured at webhook receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    /// Origin server named by the webhook, used for all outbound calls.
    pub base_url: String,
    pub data: WebhookData,
}
