use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use codexbot_core::{agent::AgentBackend, workspace::CodeFolder};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Runs the packaged `codex` CLI as the coding-agent backend.
///
/// Invoked in full-auto quiet mode with the instruction as the final
/// argument. The only contract with the process is its stdout; the last
/// JSON line carries the completion message (see [`crate::completion`]).
pub struct CodexBackend {
    codex_bin: String,
}

impl CodexBackend {
    pub fn new(bin: impl Into<String>) -> Self {
        Self {
            codex_bin: bin.into(),
        }
    }
}

#[async_trait]
impl AgentBackend for CodexBackend {
    async fn run_task(&self, folder: &CodeFolder, instruction: &str) -> Result<String> {
        info!(path = %folder.path.display(), "spawning codex subprocess");

        let mut child = tokio::process::Command::new(&self.codex_bin)
            .arg("--approval-mode")
            .arg("full-auto")
            .arg("-q")
            .arg(instruction)
            .current_dir(&folder.path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn codex binary: {}", self.codex_bin))?;

        let stdout = child.stdout.take().context("failed to take stdout")?;
        let stderr = child.stderr.take().context("failed to take stderr")?;

        let mut output_lines = Vec::new();
        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        loop {
            tokio::select! {
                line = stdout_reader.next_line() => {
                    match line.context("error reading stdout")? {
                        Some(l) => output_lines.push(l),
                        None => break,
                    }
                }
                line = stderr_reader.next_line() => {
                    if let Ok(Some(l)) = line {
                        if !l.is_empty() {
                            warn!("codex stderr: {}", l);
                        }
                    }
                }
            }
        }

        while let Ok(Some(l)) = stderr_reader.next_line().await {
            if !l.is_empty() {
                warn!("codex stderr: {}", l);
            }
        }

        let exit_status = child
            .wait()
            .await
            .context("failed to wait for codex process")?;
        if !exit_status.success() {
            bail!("codex exited with {exit_status}");
        }

        let output = output_lines.join("\n");
        info!(output_len = output.len(), "codex subprocess finished");
        Ok(output)
    }
}
