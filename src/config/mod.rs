//! Configuration system (layered: CLI flags > env > config file > defaults).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::auth::PollPolicy;
use crate::backend::{ClientCredentials, InitializeOptions};
use crate::error::HarnessError;

/// Harness configuration.
///
/// Resolution order, lowest first:
/// 1. Built-in placeholders
/// 2. TOML file (explicit path, or `~/.eos-auth/config.toml` when present)
/// 3. Environment variables (a `.env` file is loaded first if present)
/// 4. CLI flags, applied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub product_id: String,
    pub sandbox_id: String,
    pub deployment_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub product_name: String,
    pub product_version: String,
    pub poll: PollPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            product_id: "your_product_id".to_string(),
            sandbox_id: "your_sandbox_id".to_string(),
            deployment_id: "your_deployment_id".to_string(),
            client_id: "your_client_id".to_string(),
            client_secret: "your_client_secret".to_string(),
            product_name: "EOS Auth Harness".to_string(),
            product_version: "1.0".to_string(),
            poll: PollPolicy::default(),
        }
    }
}

/// On-disk form; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    product_id: Option<String>,
    sandbox_id: Option<String>,
    deployment_id: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    product_name: Option<String>,
    product_version: Option<String>,
    poll_attempts: Option<u32>,
    poll_interval_ms: Option<u64>,
}

impl HarnessConfig {
    /// Load defaults, then the config file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, HarnessError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`HarnessConfig::load`], with `lookup` as the only source of
    /// environment overrides. No `.env` file is read.
    pub fn load_with_env(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, HarnessError> {
        let mut config = Self::default();

        match path {
            Some(path) => config.merge_file(path)?,
            None => {
                if let Some(path) = default_config_path().filter(|p| p.is_file()) {
                    config.merge_file(&path)?;
                }
            }
        }

        config.merge_env_from(lookup)?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, HarnessError> {
        let mut config = Self::default();
        config.merge_toml_str(raw)?;
        Ok(config)
    }

    pub fn merge_file(&mut self, path: &Path) -> Result<(), HarnessError> {
        let raw = fs::read_to_string(path)?;
        self.merge_toml_str(&raw)
            .map_err(|e| HarnessError::Configuration(format!("{}: {e}", path.display())))
    }

    fn merge_toml_str(&mut self, raw: &str) -> Result<(), HarnessError> {
        let file: ConfigFile =
            toml::from_str(raw).map_err(|e| HarnessError::Configuration(e.to_string()))?;

        let fields = [
            (file.product_id, &mut self.product_id),
            (file.sandbox_id, &mut self.sandbox_id),
            (file.deployment_id, &mut self.deployment_id),
            (file.client_id, &mut self.client_id),
            (file.client_secret, &mut self.client_secret),
            (file.product_name, &mut self.product_name),
            (file.product_version, &mut self.product_version),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(attempts) = file.poll_attempts {
            self.poll.max_attempts = attempts;
        }
        if let Some(ms) = file.poll_interval_ms {
            self.poll.interval = Duration::from_millis(ms);
        }
        Ok(())
    }

    /// Apply `EOS_*` environment overrides from `lookup`.
    pub fn merge_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), HarnessError> {
        let env_mappings = [
            ("EOS_PRODUCT_ID", &mut self.product_id),
            ("EOS_SANDBOX_ID", &mut self.sandbox_id),
            ("EOS_DEPLOYMENT_ID", &mut self.deployment_id),
            ("EOS_CLIENT_ID", &mut self.client_id),
            ("EOS_CLIENT_SECRET", &mut self.client_secret),
        ];
        for (env_var, slot) in env_mappings {
            if let Some(value) = lookup(env_var) {
                *slot = value;
            }
        }

        if let Some(raw) = lookup("EOS_POLL_ATTEMPTS") {
            self.poll.max_attempts = parse_env("EOS_POLL_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("EOS_POLL_INTERVAL_MS") {
            self.poll.interval = Duration::from_millis(parse_env("EOS_POLL_INTERVAL_MS", &raw)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.poll.max_attempts == 0 {
            return Err(HarnessError::Configuration(
                "poll attempts must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("product_id", &self.product_id),
            ("sandbox_id", &self.sandbox_id),
            ("deployment_id", &self.deployment_id),
        ] {
            if value.trim().is_empty() {
                return Err(HarnessError::Configuration(format!("{name} is empty")));
            }
        }
        Ok(())
    }

    pub fn initialize_options(&self) -> InitializeOptions {
        InitializeOptions {
            product_name: self.product_name.clone(),
            product_version: self.product_version.clone(),
        }
    }

    pub fn client_credentials(&self) -> ClientCredentials {
        ClientCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, HarnessError> {
    raw.trim()
        .parse()
        .map_err(|_| HarnessError::Configuration(format!("{name} is not a valid number: {raw}")))
}

/// `~/.eos-auth/config.toml`, if a home directory can be found.
pub fn default_config_path() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".eos-auth").join("config.toml"))
}
