// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use url::Url;

use crate::cli::Cli;
use crate::error::{Error, Result};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// How the completion is fetched
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stream,
    Blocking,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream => write!(f, "stream"),
            Self::Blocking => write!(f, "blocking"),
        }
    }
}

/// What happens with the generated message
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Open the editor on a draft, then `git commit -F`
    #[default]
    Edit,
    /// Write the message to stdout and stop
    Print,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::Print => write!(f, "print"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for OpenAI-compatible APIs (default: https://api.openai.com/v1)
    #[serde(default)]
    pub openai_base_url: Option<String>,

    #[serde(default)]
    pub transport: Transport,

    #[serde(default)]
    pub output: OutputMode,

    /// Token budget for blocking completions (default 256)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; the API default applies when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds (default 300)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Only ever populated from OPENAI_API_KEY, never from config files.
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_max_tokens() -> u32 {
    256
}
fn default_timeout_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            openai_base_url: None,
            transport: Transport::default(),
            output: OutputMode::default(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load with priority: CLI > ENV > project config > user config > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // User-level config
        if let Some(path) = Self::config_path() {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
            }
        }

        // Project-level config (.ai-commit.toml in the working directory)
        if let Ok(cwd) = std::env::current_dir() {
            let project_config = cwd.join(".ai-commit.toml");
            if project_config.exists() {
                figment = figment.merge(Toml::file(&project_config));
            }
        }

        // AI_COMMIT_MODEL, AI_COMMIT_TRANSPORT, etc.
        figment = figment.merge(Env::prefixed("AI_COMMIT_"));

        let mut config: Config = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.api_key = Self::api_key_from_env();

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ai-commit").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref m) = cli.model {
            self.model = m.clone();
        }
        if cli.print {
            self.output = OutputMode::Print;
        }
        if cli.blocking {
            self.transport = Transport::Blocking;
        }
    }

    /// `OPENAI_API_KEY`, with a blank value counting as unset.
    pub fn api_key_from_env() -> Option<SecretString> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from)
    }

    /// The credential, or the missing-key error when it was never set.
    pub fn api_key(&self) -> Result<&SecretString> {
        self.api_key.as_ref().ok_or(Error::MissingApiKey)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("model cannot be empty".into()));
        }

        if let Some(ref base) = self.openai_base_url {
            let parsed = Url::parse(base).map_err(|e| {
                Error::Config(format!("openai_base_url is not a valid URL ({e}): '{base}'"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!(
                    "openai_base_url must start with http:// or https://, got '{base}'"
                )));
            }
        }

        if !(1..=16_384).contains(&self.max_tokens) {
            return Err(Error::Config(format!(
                "max_tokens must be 1–16384, got {}",
                self.max_tokens
            )));
        }

        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(Error::Config(format!(
                    "temperature must be 0.0–2.0, got {t}"
                )));
            }
        }

        if !(1..=3600).contains(&self.timeout_secs) {
            return Err(Error::Config(format!(
                "timeout_secs must be 1–3600, got {}",
                self.timeout_secs
            )));
        }

        Ok(())
    }

    /// Create default config file with secure permissions
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };

        fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        let content = r#"# ai-commit configuration
#
# The API key is read from OPENAI_API_KEY only and never stored here.

# Chat model used to draft the message
model = "gpt-4o-mini"

# OpenAI-compatible endpoint
# openai_base_url = "https://api.openai.com/v1"

# stream: show the message while it is generated
# blocking: wait for the whole completion
transport = "stream"

# edit: open the draft in your git editor, then commit
# print: write the message to stdout only
output = "edit"

# Token budget for blocking completions
max_tokens = 256

# Sampling temperature (0.0-2.0), API default when unset
# temperature = 0.3

# Request timeout in seconds
timeout_secs = 300
"#;

        fs::write(&path, content)?;

        // Set secure permissions (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}
