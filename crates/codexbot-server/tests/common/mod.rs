// Shared mocks for route and pipeline tests. Each mock records its calls
// so tests can assert exact call counts and arguments.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use codexbot_core::{
    agent::{AgentBackend, PrGenerator, PrMetadata},
    config::Config,
    queue::{Job, JobQueue},
    telemetry::Telemetry,
    types::{JobPayload, MessageData, Proposal, Task, TaskItem, WebhookData},
    workspace::{CodeFolder, CodeHost},
};
use codexbot_server::AppState;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

pub const BASE_URL: &str = "https://api.automa.app";

pub fn test_config() -> Config {
    Config {
        webhook_secret: "atma_whsec_codex".into(),
        openai_api_key: "sk-test".into(),
        openai_model: "gpt-4.1-mini".into(),
        openai_base_url: "http://localhost:0".into(),
        port: 0,
        codex_bin: "codex".into(),
        telemetry_endpoint: None,
    }
}

pub fn sample_data() -> WebhookData {
    WebhookData {
        task: Task {
            id: 1,
            token: "abcdef".into(),
            title: "Fix a minor bug".into(),
            items: vec![],
        },
        repo: None,
        org: None,
    }
}

pub fn data_with_description() -> WebhookData {
    let mut data = sample_data();
    data.task.items.push(TaskItem::Message {
        id: Some(1),
        data: MessageData {
            content: "It does not work".into(),
        },
    });
    data
}

pub fn completed_stdout(text: &str) -> String {
    serde_json::json!({
        "type": "message",
        "status": "completed",
        "content": [ { "type": "output_text", "text": text } ]
    })
    .to_string()
}

// ── CodeHost mock ────────────────────────────────────────────────────────

pub struct MockCodeHost {
    pub downloads: Mutex<Vec<(WebhookData, String)>>,
    pub proposals: Mutex<Vec<(WebhookData, Proposal, String)>>,
    pub cleanups: Mutex<Vec<WebhookData>>,
    pub fail_download: bool,
    pub fail_propose: bool,
    dir: TempDir,
}

impl MockCodeHost {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        // A real repo so add_all works on the success path.
        let status = std::process::Command::new("git")
            .arg("-C")
            .arg(dir.path())
            .args(["init", "-q"])
            .status()
            .unwrap();
        assert!(status.success());
        Self {
            downloads: Mutex::new(vec![]),
            proposals: Mutex::new(vec![]),
            cleanups: Mutex::new(vec![]),
            fail_download: false,
            fail_propose: false,
            dir,
        }
    }

    pub fn failing_download() -> Self {
        Self {
            fail_download: true,
            ..Self::new()
        }
    }

    pub fn failing_propose() -> Self {
        Self {
            fail_propose: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl CodeHost for MockCodeHost {
    async fn download(&self, data: &WebhookData, base_url: &str) -> Result<CodeFolder> {
        self.downloads
            .lock()
            .unwrap()
            .push((data.clone(), base_url.to_string()));
        if self.fail_download {
            bail!("download error");
        }
        Ok(CodeFolder::new(self.dir.path()))
    }

    async fn propose(
        &self,
        data: &WebhookData,
        proposal: &Proposal,
        base_url: &str,
    ) -> Result<()> {
        self.proposals
            .lock()
            .unwrap()
            .push((data.clone(), proposal.clone(), base_url.to_string()));
        if self.fail_propose {
            bail!("propose error");
        }
        Ok(())
    }

    async fn cleanup(&self, data: &WebhookData) -> Result<()> {
        self.cleanups.lock().unwrap().push(data.clone());
        Ok(())
    }
}

// ── Agent mock ───────────────────────────────────────────────────────────

pub struct MockAgent {
    pub stdout: String,
    pub fail: bool,
    pub instructions: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn completing(text: &str) -> Self {
        Self {
            stdout: format!("{}\n", completed_stdout(text)),
            fail: false,
            instructions: Mutex::new(vec![]),
        }
    }

    pub fn with_stdout(stdout: &str) -> Self {
        Self {
            stdout: stdout.into(),
            fail: false,
            instructions: Mutex::new(vec![]),
        }
    }

    pub fn failing() -> Self {
        Self {
            stdout: String::new(),
            fail: true,
            instructions: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl AgentBackend for MockAgent {
    async fn run_task(&self, _folder: &CodeFolder, instruction: &str) -> Result<String> {
        self.instructions.lock().unwrap().push(instruction.into());
        if self.fail {
            bail!("codex error");
        }
        Ok(self.stdout.clone())
    }
}

// ── PrGenerator mock ─────────────────────────────────────────────────────

pub struct MockPr {
    pub metadata: Option<PrMetadata>,
    pub inputs: Mutex<Vec<String>>,
}

impl MockPr {
    pub fn fixed() -> Self {
        Self {
            metadata: Some(PrMetadata {
                title: "Fix a minor bug".into(),
                body: "This PR fixes a minor bug.".into(),
            }),
            inputs: Mutex::new(vec![]),
        }
    }

    pub fn declining() -> Self {
        Self {
            metadata: None,
            inputs: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl PrGenerator for MockPr {
    async fn generate(&self, description: &str) -> Result<Option<PrMetadata>> {
        self.inputs.lock().unwrap().push(description.into());
        Ok(self.metadata.clone())
    }
}

// ── State builder ────────────────────────────────────────────────────────

pub fn build_state(
    code: Arc<MockCodeHost>,
    agent: Arc<MockAgent>,
    pr: Arc<MockPr>,
) -> (Arc<AppState>, UnboundedReceiver<Job<JobPayload>>) {
    let (queue, rx) = JobQueue::new();
    let state = Arc::new(AppState {
        config: test_config(),
        code,
        agent,
        pr,
        queue,
        telemetry: Telemetry::new(None),
    });
    (state, rx)
}
