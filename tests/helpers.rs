// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use ai_commit::domain::StagedDiff;
use ai_commit::error::{Error, Result};
use ai_commit::services::git::GitBackend;
use ai_commit::services::llm::LlmProvider;

/// What `git commit -F` saw: the path and the file contents at that moment.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct CommitCall {
    pub path: PathBuf,
    pub contents: String,
}

/// In-memory git that records every call.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeGit {
    pub diff: String,
    pub editor: String,
    pub fail_commit: bool,
    pub diff_calls: AtomicUsize,
    pub editor_calls: AtomicUsize,
    pub commits: Mutex<Vec<CommitCall>>,
}

#[allow(dead_code)]
impl FakeGit {
    pub fn new(diff: &str, editor: &str) -> Self {
        Self {
            diff: diff.to_string(),
            editor: editor.to_string(),
            ..Self::default()
        }
    }

    pub fn commits(&self) -> Vec<CommitCall> {
        self.commits.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitBackend for FakeGit {
    async fn staged_diff(&self) -> Result<String> {
        self.diff_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.diff.clone())
    }

    async fn editor(&self) -> Result<String> {
        self.editor_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.editor.clone())
    }

    async fn commit_from_file(&self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        self.commits.lock().unwrap().push(CommitCall {
            path: path.to_path_buf(),
            contents,
        });
        if self.fail_commit {
            return Err(Error::Git("pre-commit hook rejected the commit".into()));
        }
        Ok(())
    }
}

/// Provider that replays fixed fragments, or fails.
#[allow(dead_code)]
pub struct FakeProvider {
    pub fragments: Vec<String>,
    pub fail_with: Option<String>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeProvider {
    pub fn replying(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fragments: Vec::new(),
            fail_with: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn generate(
        &self,
        _diff: &StagedDiff,
        token_tx: mpsc::Sender<String>,
        _cancel: CancellationToken,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref message) = self.fail_with {
            return Err(Error::Completion {
                message: message.clone(),
            });
        }
        let mut full = String::new();
        for fragment in &self.fragments {
            let _ = token_tx.send(fragment.clone()).await;
            full.push_str(fragment);
        }
        Ok(full)
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Editor command that overwrites the draft with `contents`.
#[allow(dead_code)]
pub fn editor_writing(dir: &Path, contents: &str) -> String {
    let source = dir.join("edited.txt");
    std::fs::write(&source, contents).unwrap();
    let script = dir.join("editor.sh");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\nprintf '%s' \"$1\" > '{}'\ncat '{}' > \"$1\"\n",
            dir.join("draft-path").display(),
            source.display()
        ),
    )
    .unwrap();
    format!("sh '{}'", script.display())
}

/// Path of the draft the `editor_writing` script was handed.
#[allow(dead_code)]
pub fn edited_draft(dir: &Path) -> PathBuf {
    PathBuf::from(std::fs::read_to_string(dir.join("draft-path")).unwrap())
}

#[allow(dead_code)]
pub const SAMPLE_DIFF: &str = "diff --git a/src/lib.rs b/src/lib.rs
index 3b18e51..a2c4f9d 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,3 +1,4 @@
 pub fn answer() -> u32 {
-    41
+    42
 }
+pub fn feature_x() {}
";
