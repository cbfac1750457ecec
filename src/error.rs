// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("OPENAI_API_KEY environment variable not set")]
    #[diagnostic(
        code(ai_commit::config::missing_key),
        help("Export your key first: export OPENAI_API_KEY=sk-...")
    )]
    MissingApiKey,

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Error in generating commit message: {message}")]
    #[diagnostic(code(ai_commit::completion::error))]
    Completion { message: String },

    #[error("Editor error: {0}")]
    #[diagnostic(
        code(ai_commit::editor::error),
        help("Set GIT_EDITOR, core.editor, VISUAL or EDITOR to a working editor")
    )]
    Editor(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ai_commit::config::error))]
    Config(String),

    #[error("Git error: {0}")]
    #[diagnostic(code(ai_commit::git::error))]
    Git(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn completion(message: impl Into<String>) -> Self {
        Error::Completion {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
