use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::Command,
    sync::Mutex,
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::types::{Proposal, WebhookData};

// ── CodeFolder ───────────────────────────────────────────────────────────

/// Handle to a local checkout of a task's repository. Owned exclusively by
/// the task-update run that created it.
#[derive(Debug, Clone)]
pub struct CodeFolder {
    pub path: PathBuf,
}

impl CodeFolder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stage every file in the checkout, including newly created ones.
    pub fn add_all(&self) -> Result<()> {
        let result = git(&self.path, &["add", "-A"])?;
        if !result.success() {
            bail!("git add -A failed: {}", result.combined_output());
        }
        Ok(())
    }

    /// Unified diff of the working tree (staged and unstaged) against HEAD.
    pub fn diff(&self) -> Result<String> {
        let result = git(&self.path, &["diff", "HEAD"])?;
        if !result.success() {
            bail!("git diff HEAD failed: {}", result.combined_output());
        }
        Ok(result.stdout)
    }
}

struct ExecResult {
    stdout: String,
    stderr: String,
    exit_code: i32,
}

impl ExecResult {
    fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<ExecResult> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .with_context(|| format!("failed to spawn git -C {} {}", dir.display(), args.join(" ")))?;

    Ok(ExecResult {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code().unwrap_or(1),
    })
}

// ── CodeHost ─────────────────────────────────────────────────────────────

/// Operations against the originating code-hosting server.
#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Download the task's repository checkout into a fresh local folder.
    async fn download(&self, data: &WebhookData, base_url: &str) -> Result<CodeFolder>;

    /// Send a drafted change request for the task, with the checkout's diff.
    async fn propose(&self, data: &WebhookData, proposal: &Proposal, base_url: &str)
        -> Result<()>;

    /// Release the remote-side task lock and delete the local checkout.
    /// No-op when no checkout is tracked for the task.
    async fn cleanup(&self, data: &WebhookData) -> Result<()>;
}

struct Checkout {
    dir: TempDir,
    base_url: String,
}

/// HTTP client for the Automa code-hosting API. Live checkouts are tracked
/// per task id, which is why `cleanup` needs only the task data.
pub struct AutomaClient {
    http: reqwest::Client,
    checkouts: Mutex<HashMap<i64, Checkout>>,
}

impl AutomaClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            checkouts: Mutex::new(HashMap::new()),
        }
    }

    fn checkout_path(&self, task_id: i64) -> Option<PathBuf> {
        let checkouts = self
            .checkouts
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        checkouts.get(&task_id).map(|c| c.dir.path().to_path_buf())
    }
}

impl Default for AutomaClient {
    fn default() -> Self {
        Self::new()
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

#[async_trait]
impl CodeHost for AutomaClient {
    async fn download(&self, data: &WebhookData, base_url: &str) -> Result<CodeFolder> {
        let url = endpoint(base_url, "code/download");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "id": data.task.id, "token": data.task.token }))
            .send()
            .await
            .context("code download request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("code download returned {status}");
        }
        let bytes = response
            .bytes()
            .await
            .context("failed to read checkout archive")?;

        let dir = TempDir::new().context("failed to create checkout dir")?;
        let decoder = flate2::read::GzDecoder::new(bytes.as_ref());
        tar::Archive::new(decoder)
            .unpack(dir.path())
            .context("failed to unpack checkout archive")?;

        // Base commit so later staging and diffing have a HEAD.
        let setup: &[&[&str]] = &[
            &["init", "-q"],
            &["add", "-A"],
            &[
                "-c",
                "user.name=codexbot",
                "-c",
                "user.email=codexbot@localhost",
                "commit",
                "-q",
                "--allow-empty",
                "-m",
                "base",
            ],
        ];
        for args in setup {
            let result = git(dir.path(), args)?;
            if !result.success() {
                bail!(
                    "git {} failed during checkout setup: {}",
                    args.join(" "),
                    result.combined_output()
                );
            }
        }

        let path = dir.path().to_path_buf();
        {
            let mut checkouts = self.checkouts.lock().unwrap_or_else(|e| e.into_inner());
            checkouts.insert(
                data.task.id,
                Checkout {
                    dir,
                    base_url: base_url.to_string(),
                },
            );
        }

        info!(task_id = data.task.id, path = %path.display(), "downloaded code");
        Ok(CodeFolder::new(path))
    }

    async fn propose(
        &self,
        data: &WebhookData,
        proposal: &Proposal,
        base_url: &str,
    ) -> Result<()> {
        let diff = match self.checkout_path(data.task.id) {
            Some(path) => CodeFolder::new(path).diff()?,
            None => String::new(),
        };

        let mut body = serde_json::to_value(data).context("failed to encode task data")?;
        if let Value::Object(map) = &mut body {
            map.insert(
                "proposal".into(),
                serde_json::to_value(proposal).context("failed to encode proposal")?,
            );
            map.insert("diff".into(), Value::String(diff));
        }

        let url = endpoint(base_url, "code/propose");
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("code propose request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("code propose returned {status}");
        }

        info!(task_id = data.task.id, "proposed code");
        Ok(())
    }

    async fn cleanup(&self, data: &WebhookData) -> Result<()> {
        let checkout = {
            let mut checkouts = self.checkouts.lock().unwrap_or_else(|e| e.into_inner());
            checkouts.remove(&data.task.id)
        };
        let Some(checkout) = checkout else {
            debug!(task_id = data.task.id, "no checkout to clean up");
            return Ok(());
        };

        let url = endpoint(&checkout.base_url, "code/cleanup");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "id": data.task.id, "token": data.task.token }))
            .send()
            .await
            .context("code cleanup request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("code cleanup returned {status}");
        }

        // Dropping the TempDir removes the local checkout.
        drop(checkout);
        info!(task_id = data.task.id, "cleaned up code");
        Ok(())
    }
}
