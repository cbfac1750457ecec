// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::io::IsTerminal;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::ExposeSecret;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::{Cli, Commands};
use crate::config::{API_KEY_ENV, Config, OutputMode, Transport};
use crate::domain::{StagedDiff, is_blank_message};
use crate::error::{Error, Result};
use crate::services::{
    editor::{self, EditSession},
    git::{GitBackend, GitCli},
    llm::{self, LlmProvider},
    prompt,
};

/// How a run ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `git diff --cached` was empty
    NoChanges,
    /// Print mode: the message went to stdout
    Printed(String),
    /// The edited message was blank, nothing committed
    Aborted,
    Committed,
}

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        // A commit run reports the missing key ahead of any config problem
        if cli.command.is_none() && Config::api_key_from_env().is_none() {
            return Err(Error::MissingApiKey);
        }

        let config = Config::load(&cli)?;
        debug!(
            model = %config.model,
            transport = %config.transport,
            output = %config.output,
            "config loaded"
        );
        Ok(Self {
            cli,
            config,
            cancel_token: CancellationToken::new(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        if let Some(ref cmd) = self.cli.command {
            return self.handle_command(cmd);
        }

        // The credential is checked before git or the network is touched
        let provider = llm::create_provider(&self.config)?;
        let git = GitCli::current_dir()?;

        let flow = CommitFlow {
            git: &git,
            provider: provider.as_ref(),
            transport: self.config.transport,
            output: self.config.output,
            show_prompt: self.cli.show_prompt,
            cancel: self.cancel_token.clone(),
        };

        let outcome = flow.run().await?;
        debug!(?outcome, "finished");
        Ok(())
    }

    fn handle_command(&self, cmd: &Commands) -> Result<()> {
        match cmd {
            Commands::Init => {
                let path = Config::create_default()?;
                println!("Created config: {}", path.display());
                Ok(())
            }
            Commands::Config => {
                let rendered = toml::to_string_pretty(&self.config)
                    .map_err(|e| Error::Config(e.to_string()))?;
                print!("{rendered}");
                let key_state = match self.config.api_key {
                    Some(ref key) if !key.expose_secret().is_empty() => "set",
                    _ => "not set",
                };
                println!("# {API_KEY_ENV}: {key_state}");
                if let Some(path) = Config::config_path() {
                    let status = if path.exists() { "found" } else { "not found" };
                    println!("# config file: {} ({status})", path.display());
                }
                Ok(())
            }
            Commands::Completions { shell } => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(*shell, &mut cmd, "ai-commit", &mut std::io::stdout());
                Ok(())
            }
        }
    }
}

/// One pass of diff → message → (print | edit → commit).
pub struct CommitFlow<'a> {
    pub git: &'a dyn GitBackend,
    pub provider: &'a dyn LlmProvider,
    pub transport: Transport,
    pub output: OutputMode,
    pub show_prompt: bool,
    pub cancel: CancellationToken,
}

impl CommitFlow<'_> {
    pub async fn run(&self) -> Result<Outcome> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let Some(diff) = StagedDiff::new(self.git.staged_diff().await?) else {
            print_outcome("No changes to commit.");
            return Ok(Outcome::NoChanges);
        };

        let (insertions, deletions) = diff.line_counts();
        print_info(&format!(
            "{} files with changes detected (+{insertions} -{deletions})",
            diff.files_changed()
        ));

        if self.show_prompt {
            eprintln!("{}", style("--- PROMPT ---").dim());
            eprintln!("{}", prompt::render(&diff));
            eprintln!("{}", style("--- END PROMPT ---").dim());
        }

        let message = self.generate(&diff).await?;

        match self.output {
            OutputMode::Print => {
                println!("{message}");
                Ok(Outcome::Printed(message))
            }
            OutputMode::Edit => self.edit_and_commit(&message).await,
        }
    }

    async fn generate(&self, diff: &StagedDiff) -> Result<String> {
        print_status("Generating commit message...");

        let echo = std::io::stderr().is_terminal();
        let streaming = self.transport == Transport::Stream;

        let spinner = (!streaming).then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(s) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
                pb.set_style(s);
            }
            pb.set_message("waiting for completion");
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        });

        let (tx, mut rx) = mpsc::channel::<String>(64);
        let print_handle = tokio::spawn(async move {
            while let Some(token) = rx.recv().await {
                if echo {
                    eprint!("{token}");
                }
            }
        });

        let result = self
            .provider
            .generate(diff, tx, self.cancel.clone())
            .await;

        let _ = print_handle.await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let message = result?;

        if echo && streaming && !message.is_empty() {
            eprintln!(); // Newline after streaming
        }

        if message.trim().is_empty() {
            warn!(provider = self.provider.name(), "empty response from LLM");
        }

        debug!(chars = message.len(), "message generated");
        Ok(message)
    }

    async fn edit_and_commit(&self, message: &str) -> Result<Outcome> {
        let session = EditSession::create(message)?;
        let editor_cmd = self.git.editor().await?;

        editor::launch(&editor_cmd, session.path()).await?;

        let edited = session.read()?;
        if is_blank_message(&edited) {
            print_outcome("Commit aborted: no commit message provided after editing.");
            session.close()?;
            return Ok(Outcome::Aborted);
        }

        // The draft goes away whatever git decides
        let committed = self.git.commit_from_file(session.path()).await;
        let closed = session.close();
        committed?;
        closed?;

        eprintln!("{} Committed!", style("✓").green().bold());
        Ok(Outcome::Committed)
    }
}

fn print_status(msg: &str) {
    eprintln!("{} {}", style("→").cyan(), msg);
}

fn print_info(msg: &str) {
    eprintln!("{} {}", style("info:").cyan(), msg);
}

/// Final word of a run that ended without a commit; goes to stdout.
fn print_outcome(msg: &str) {
    println!("{msg}");
}
