//! Assessor configuration and loader factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use assessor_core::clock::ZeroLimitPolicy;
use assessor_core::traits::QuestionSetLoader;

use crate::files::FileLoader;
use crate::http::HttpLoader;

/// Where tests are loaded from.
///
/// Custom Debug impl masks the API token so it never reaches logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// A TOML file or a directory of them.
    Files {
        #[serde(default = "default_tests_dir")]
        dir: PathBuf,
    },
    /// The testing backend's REST API.
    Http {
        base_url: String,
        #[serde(default)]
        api_token: Option<String>,
    },
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceConfig::Files { dir } => f.debug_struct("Files").field("dir", dir).finish(),
            SourceConfig::Http {
                base_url,
                api_token,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_token", &api_token.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Files {
            dir: default_tests_dir(),
        }
    }
}

fn default_tests_dir() -> PathBuf {
    PathBuf::from("./tests")
}

/// Top-level assessor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessorConfig {
    /// How an untimed test (no or zero time limit) behaves.
    #[serde(default)]
    pub zero_time_limit: ZeroLimitPolicy,
    /// Length of one clock tick in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Output directory for attempt records.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub source: SourceConfig,
}

fn default_tick_interval() -> u64 {
    1000
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./assessor-results")
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self {
            zero_time_limit: ZeroLimitPolicy::default(),
            tick_interval_ms: default_tick_interval(),
            output_dir: default_output_dir(),
            source: SourceConfig::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&std::env::var(&rest[start + 2..start + len]).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::Files { dir } => SourceConfig::Files {
            dir: PathBuf::from(resolve_env_vars(&dir.to_string_lossy())),
        },
        SourceConfig::Http {
            base_url,
            api_token,
        } => SourceConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_token: api_token
                .as_deref()
                .map(resolve_env_vars)
                .filter(|t| !t.is_empty()),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `assessor.toml` in the current directory
/// 2. `~/.config/assessor/config.toml`
///
/// Environment variable overrides: `ASSESSOR_API_URL` switches the source to
/// the HTTP backend, `ASSESSOR_API_TOKEN` sets its bearer token.
pub fn load_config() -> Result<AssessorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AssessorConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("assessor.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => AssessorConfig::default(),
    };

    if let Ok(url) = std::env::var("ASSESSOR_API_URL") {
        let api_token = match &config.source {
            SourceConfig::Http { api_token, .. } => api_token.clone(),
            SourceConfig::Files { .. } => None,
        };
        config.source = SourceConfig::Http {
            base_url: url,
            api_token,
        };
    }

    if let Ok(token) = std::env::var("ASSESSOR_API_TOKEN") {
        if let SourceConfig::Http { api_token, .. } = &mut config.source {
            *api_token = Some(token);
        }
    }

    config.source = resolve_source_config(&config.source);

    Ok(config)
}

/// Parse a configuration document.
pub fn parse_config(content: &str) -> Result<AssessorConfig> {
    let config: AssessorConfig = toml::from_str(content)?;
    if config.tick_interval_ms == 0 {
        anyhow::bail!("tick_interval_ms must be greater than zero");
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("assessor"))
}

/// Create a loader from its source configuration.
pub fn create_loader(config: &SourceConfig) -> Result<Box<dyn QuestionSetLoader>> {
    match config {
        SourceConfig::Files { dir } => Ok(Box::new(FileLoader::open(dir)?)),
        SourceConfig::Http {
            base_url,
            api_token,
        } => Ok(Box::new(HttpLoader::new(base_url, api_token.clone())?)),
    }
}
