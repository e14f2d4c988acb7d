//! Configuration for the Coursepath CLI.
//!
//! Provides the [`CoursepathConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `COURSEPATH_CONFIG` environment variable
//! 3. XDG default: `~/.config/coursepath/config.toml`
//! 4. Built-in defaults
//!
//! Every setting can be overridden by a `COURSEPATH_*` variable, e.g.
//! `COURSEPATH_CONTENT_FETCH_MODE=per-level` or
//! `COURSEPATH_REBUILD_MAX_RETRIES=5`. `coursepath config export` prints the
//! same variables.

use confyg::{Confygery, env};
use coursepath_cache::RetryPolicy;
use coursepath_core::traits::ConfigProvider;
use coursepath_core::{Error, Result};
use coursepath_tree::FetchMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Coursepath CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoursepathConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Base path for all project data.
    pub base_path: Option<String>,

    /// Course outline configuration.
    pub content: ContentConfig,

    /// Database configuration.
    pub storage: StorageConfig,

    /// Retry policy for rebuilds.
    pub rebuild: RetryPolicy,
}

/// Where course outlines come from and how they are fetched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory of course outline JSON files.
    pub path: Option<String>,

    /// `bulk` or `per-level`.
    pub fetch_mode: FetchMode,
}

/// Database configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the redb database file.
    pub database: Option<String>,
}

impl Default for CoursepathConfig {
    fn default() -> Self {
        Self {
            project_name: "coursepath".to_string(),
            base_path: None,
            content: ContentConfig::default(),
            storage: StorageConfig::default(),
            rebuild: RetryPolicy::default(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl CoursepathConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        // String-valued sections only; env values arrive as strings.
        let mut env_opts = env::Options::with_top_level(ENV_PREFIX);
        env_opts.add_section("content");
        env_opts.add_section("storage");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let mut config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;
        config.apply_rebuild_env(|name| std::env::var(name).ok())?;

        Ok(config)
    }

    /// Override the numeric `[rebuild]` settings from `COURSEPATH_REBUILD_*`.
    fn apply_rebuild_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        let parse = |key: &str| -> Result<Option<u64>> {
            let name = env_key(&["REBUILD", key]);
            var(&name)
                .map(|raw| {
                    raw.trim()
                        .parse()
                        .map_err(|e| Error::config(format!("{name}={raw}: {e}")))
                })
                .transpose()
        };

        if let Some(retries) = parse("MAX_RETRIES")? {
            self.rebuild.max_retries = usize::try_from(retries)
                .map_err(|e| Error::config(format!("max_retries: {e}")))?;
        }
        if let Some(delay) = parse("INITIAL_DELAY_MS")? {
            self.rebuild.initial_delay_ms = delay;
        }
        if let Some(delay) = parse("MAX_DELAY_MS")? {
            self.rebuild.max_delay_ms = delay;
        }
        Ok(())
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(env_key(&["CONFIG"])) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("coursepath").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The `COURSEPATH_*` variables that reproduce this config through
    /// [`load`](Self::load). Unset optional paths are left out.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        let optional = [
            (env_key(&["BASE_PATH"]), &self.base_path),
            (env_key(&["CONTENT", "PATH"]), &self.content.path),
            (env_key(&["STORAGE", "DATABASE"]), &self.storage.database),
        ];

        let mut vars = vec![(env_key(&["PROJECT_NAME"]), self.project_name.clone())];
        vars.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.clone().map(|v| (key, v))),
        );
        vars.push((
            env_key(&["CONTENT", "FETCH_MODE"]),
            self.content.fetch_mode.as_str().to_string(),
        ));
        vars.push((
            env_key(&["REBUILD", "MAX_RETRIES"]),
            self.rebuild.max_retries.to_string(),
        ));
        vars.push((
            env_key(&["REBUILD", "INITIAL_DELAY_MS"]),
            self.rebuild.initial_delay_ms.to_string(),
        ));
        vars.push((
            env_key(&["REBUILD", "MAX_DELAY_MS"]),
            self.rebuild.max_delay_ms.to_string(),
        ));
        vars
    }
}

const ENV_PREFIX: &str = "COURSEPATH";

fn env_key(parts: &[&str]) -> String {
    std::iter::once(ENV_PREFIX)
        .chain(parts.iter().copied())
        .collect::<Vec<_>>()
        .join("_")
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for CoursepathConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn base_path(&self) -> Result<PathBuf> {
        match &self.base_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("Could not determine base path: {e}"))),
        }
    }

    fn content_path(&self) -> Result<PathBuf> {
        match &self.content.path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(self.base_path()?.join("courses")),
        }
    }

    fn database_path(&self) -> Result<PathBuf> {
        match &self.storage.database {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(self.base_path()?.join("coursepath.redb")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
