// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// The git operations the commit flow needs.
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Raw `git diff --cached` output; empty when nothing is staged.
    async fn staged_diff(&self) -> Result<String>;

    /// Editor command as resolved by `git var GIT_EDITOR`.
    async fn editor(&self) -> Result<String>;

    /// `git commit -F <path>`
    async fn commit_from_file(&self, path: &Path) -> Result<()>;
}

/// Shells out to the `git` binary in a working directory.
pub struct GitCli {
    work_dir: PathBuf,
}

impl GitCli {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.work_dir);
        cmd
    }
}

#[async_trait]
impl GitBackend for GitCli {
    async fn staged_diff(&self) -> Result<String> {
        let output = self.git().args(["diff", "--cached"]).output().await?;

        // A failing git (no repo, no HEAD yet, ...) reads as "nothing staged"
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, stderr = %stderr.trim(), "git diff --cached failed");
            return Ok(String::new());
        }

        let diff = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = diff.len(), "staged diff collected");
        Ok(diff)
    }

    async fn editor(&self) -> Result<String> {
        let output = self
            .git()
            .args(["var", "GIT_EDITOR"])
            .output()
            .await
            .map_err(|e| Error::Editor(format!("cannot run git var GIT_EDITOR: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Editor(format!(
                "git var GIT_EDITOR failed: {}",
                stderr.trim()
            )));
        }

        let editor = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if editor.is_empty() {
            return Err(Error::Editor("git resolved an empty editor command".into()));
        }

        debug!(editor = %editor, "editor resolved");
        Ok(editor)
    }

    async fn commit_from_file(&self, path: &Path) -> Result<()> {
        // Inherit stdio so hook output and git's summary reach the user
        let status = self
            .git()
            .arg("commit")
            .arg("-F")
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if !status.success() {
            return Err(Error::Git(format!("git commit exited with {status}")));
        }

        Ok(())
    }
}
