// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "ai-commit")]
#[command(version)]
#[command(
    about = "Draft a commit message from the staged diff, edit it, then commit",
    long_about = None
)]
pub struct Cli {
    /// Model name
    #[arg(short, long, env = "AI_COMMIT_MODEL")]
    pub model: Option<String>,

    /// Print the message only, don't open an editor or commit
    #[arg(long)]
    pub print: bool,

    /// Wait for the whole completion instead of streaming it
    #[arg(long)]
    pub blocking: bool,

    /// Show the prompt sent to the LLM
    #[arg(long)]
    pub show_prompt: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
