use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Args;
use crate::errors::IcpError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub api_base: String,
    /// Environment variable holding the API key, read at call time.
    pub api_key_env: String,
    /// Inline key; takes precedence over `api_key_env` when set.
    pub api_key: Option<String>,
    pub dictation_command: Option<String>,
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key_env: "GEMINI_API_KEY".into(),
            api_key: None,
            dictation_command: None,
            debug: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Defaults, then the TOML file if given, then command-line flags.
    pub fn load(args: &Args) -> Result<Self> {
        let mut cfg = match &args.config {
            Some(p) => Self::from_file(Path::new(p))?,
            None => Self::default(),
        };
        cfg.apply_args(args);
        Ok(cfg)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(m) = &args.model {
            self.model = m.clone();
        }
        if let Some(b) = &args.api_base {
            self.api_base = b.clone();
        }
        if let Some(v) = &args.api_key_env {
            self.api_key_env = v.clone();
        }
        if let Some(d) = &args.dictation_command {
            self.dictation_command = Some(d.clone());
        }
        self.debug |= args.debug;
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            inline: self.api_key.clone(),
            env_var: self.api_key_env.clone(),
        }
    }
}

/// Where the API key comes from. Resolved on every call so a key exported
/// after startup is picked up without a restart.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub inline: Option<String>,
    pub env_var: String,
}

impl Credentials {
    pub fn resolve(&self) -> Result<String, IcpError> {
        let present = |k: &String| !k.trim().is_empty();
        self.inline
            .clone()
            .filter(present)
            .or_else(|| std::env::var(&self.env_var).ok())
            .filter(present)
            .ok_or_else(|| {
                IcpError::Config(format!(
                    "API key not found. Set {} in your environment or api_key in the config file.",
                    self.env_var
                ))
            })
    }
}
