// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub mod openai;

use crate::config::Config;
use crate::domain::StagedDiff;
use crate::error::Result;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Draft a commit message for `diff`.
    ///
    /// Streaming providers forward each fragment on `token_tx` as it arrives.
    async fn generate(
        &self,
        diff: &StagedDiff,
        token_tx: mpsc::Sender<String>,
        cancel: CancellationToken,
    ) -> Result<String>;

    fn name(&self) -> &str;
}

/// Fails with the missing-key error before anything is sent.
pub fn create_provider(config: &Config) -> Result<Box<dyn LlmProvider>> {
    Ok(Box::new(openai::OpenAiProvider::new(config)?))
}
