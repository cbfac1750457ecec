// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Draft file handed to the editor and then to `git commit -F`.
///
/// The file lives in the default temp directory and is removed when the
/// session is closed or dropped, so blank and failed commits clean up too.
pub struct EditSession {
    file: NamedTempFile,
}

impl EditSession {
    pub fn create(message: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("ai-commit-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(message.as_bytes())?;
        file.flush()?;
        debug!(path = %file.path().display(), "draft written");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Current contents, as left by the editor.
    pub fn read(&self) -> Result<String> {
        Ok(std::fs::read_to_string(self.path())?)
    }

    /// Remove the draft, reporting failures instead of swallowing them.
    pub fn close(self) -> Result<()> {
        self.file.close()?;
        Ok(())
    }
}

/// Run `editor` on `path` and wait for it to exit.
///
/// Like git, the editor string goes through the shell on Unix so values
/// such as `code --wait` work.
pub async fn launch(editor: &str, path: &Path) -> Result<()> {
    let mut cmd = editor_command(editor, path)?;

    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| Error::Editor(format!("failed to launch '{editor}': {e}")))?;

    if !status.success() {
        return Err(Error::Editor(format!("'{editor}' exited with {status}")));
    }

    Ok(())
}

#[cfg(unix)]
fn editor_command(editor: &str, path: &Path) -> Result<Command> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(format!("{editor} \"$@\""))
        .arg(editor)
        .arg(path);
    Ok(cmd)
}

#[cfg(not(unix))]
fn editor_command(editor: &str, path: &Path) -> Result<Command> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(Error::Editor("empty editor command".into()));
    };
    let mut cmd = Command::new(program);
    cmd.args(parts).arg(path);
    Ok(cmd)
}
