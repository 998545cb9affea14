mod api;
mod defaults;
mod validation;

use crate::api::{ClientConfig, KeyCoding};
use crate::cli::Args;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use api::ApiConfig;
pub use defaults::{default_base_url, default_stream_timeout_secs, default_timeout_secs};
pub use validation::{expand_env_var_in_string, parse_flag};

pub const ENV_BASE_URL: &str = "MICHI_API_BASE_URL";
pub const ENV_TIMEOUT: &str = "MICHI_API_TIMEOUT";
pub const ENV_STREAM_TIMEOUT: &str = "MICHI_STREAM_TIMEOUT";
pub const ENV_KEY_CODING: &str = "MICHI_KEY_CODING";
pub const ENV_CREDENTIALS_PATH: &str = "MICHI_CREDENTIALS_PATH";
pub const ENV_VERBOSE: &str = "MICHI_VERBOSE";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
    #[serde(default)]
    pub credentials_path: Option<String>,
}

/// Shape of `.michi.yaml` / `michi.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub client: ClientConfig,
    /// `None` means the default location in the user's config directory.
    pub credentials_path: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file = FileConfig::load()?;
        Self::from_sources(args, &|name: &str| env::var(name).ok(), file)
    }

    /// Precedence: CLI args > environment > config file > defaults.
    pub fn from_sources(
        args: &Args,
        env: &dyn Fn(&str) -> Option<String>,
        file: FileConfig,
    ) -> Result<Self> {
        let file = file.expand_env(env);

        let base_url = args
            .base_url
            .clone()
            .or_else(|| env(ENV_BASE_URL))
            .or(file.api.base_url)
            .unwrap_or_else(default_base_url);

        let timeout = seconds_from_env(env, ENV_TIMEOUT)?
            .or(file.api.timeout)
            .unwrap_or_else(default_timeout_secs);

        let stream_timeout = seconds_from_env(env, ENV_STREAM_TIMEOUT)?
            .or(file.api.stream_timeout)
            .unwrap_or_else(default_stream_timeout_secs);

        let key_coding = match env(ENV_KEY_CODING) {
            Some(raw) => raw
                .parse::<KeyCoding>()
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("invalid {}", ENV_KEY_CODING))?,
            None => file.api.key_coding.unwrap_or_default(),
        };

        let credentials_path = env(ENV_CREDENTIALS_PATH)
            .or(file.session.credentials_path)
            .map(PathBuf::from);

        let verbose = args.verbose
            || env(ENV_VERBOSE)
                .map(|v| parse_flag(&v))
                .or(file.session.verbose)
                .unwrap_or(false);

        Ok(Config {
            client: ClientConfig::new(base_url)
                .with_request_timeout(Duration::from_secs(timeout))
                .with_stream_timeout(Duration::from_secs(stream_timeout))
                .with_key_coding(key_coding),
            credentials_path,
            verbose,
        })
    }
}

fn seconds_from_env(env: &dyn Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>> {
    env(name)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a whole number of seconds, got `{}`", name, raw))
        })
        .transpose()
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".michi.yaml"),
            PathBuf::from(".michi.yml"),
            PathBuf::from(".michi.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("michi");
            paths.push(config_dir.join("michi.yaml"));
            paths.push(config_dir.join("michi.yml"));
            paths.push(config_dir.join("michi.json"));
        }

        paths
    }

    fn expand_env(mut self, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let expand = |value: Option<String>| value.map(|v| expand_env_var_in_string(&v, env));
        self.api.base_url = expand(self.api.base_url.take());
        self.session.credentials_path = expand(self.session.credentials_path.take());
        self
    }
}
