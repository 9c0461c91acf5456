//! Config file discovery and layered overrides

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use ollama_kernel_api::parse_host_spec;

use super::{parse_bool, parse_port, parse_width, ConfigError, KernelConfig};

/// File name searched for in every candidate directory
pub const DEFAULT_CONFIG_FILE: &str = "ollama_kernel_config.toml";

/// Environment variable overriding the config file name
pub const CONFIG_FILE_ENV: &str = "OLLAMA_KERNEL_CONFIG";

/// Directories searched for the config file, most general first
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/etc/jupyter")];
    if let Ok(home) = env::var("HOME").or_else(|_| env::var("USERPROFILE")) {
        dirs.push(PathBuf::from(home).join(".jupyter"));
    }
    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd);
    }
    dirs
}

/// First existing `file_name` in `dirs`
///
/// An absolute `file_name` is found regardless of the directory list.
pub fn find_config_file(file_name: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    if Path::new(file_name).is_absolute() {
        let path = PathBuf::from(file_name);
        return path.is_file().then_some(path);
    }
    dirs.iter()
        .map(|dir| dir.join(file_name))
        .find(|path| path.is_file())
}

/// Read and parse one TOML config file
pub fn load_config_file(path: &Path) -> Result<KernelConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: KernelConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}

/// Configuration after all layers were applied
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: KernelConfig,
    /// File the base layer came from, if any
    pub path: Option<PathBuf>,
}

/// Where session configuration comes from
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub file_name: String,
    pub search_dirs: Vec<PathBuf>,
    /// Apply `OLLAMA_KERNEL_*` environment overrides
    pub read_env: bool,
}

impl ConfigSource {
    /// Standard locations, file name taken from the environment when set
    pub fn standard() -> Self {
        Self {
            file_name: env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string()),
            search_dirs: candidate_dirs(),
            read_env: true,
        }
    }

    /// Only the given directories, no environment
    pub fn in_dirs(file_name: impl Into<String>, dirs: Vec<PathBuf>) -> Self {
        Self {
            file_name: file_name.into(),
            search_dirs: dirs,
            read_env: false,
        }
    }

    /// Defaults only
    pub fn none() -> Self {
        Self::in_dirs(DEFAULT_CONFIG_FILE, Vec::new())
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// File, then environment, then `overrides`
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<LoadedConfig> {
        let path = find_config_file(&self.file_name, &self.search_dirs);
        let mut config = match &path {
            Some(path) => load_config_file(path)?,
            None => KernelConfig::default(),
        };

        self.apply_layers(&mut config, overrides, env_lookup)
            .context("Invalid OLLAMA_KERNEL_* environment variable")?;

        config.validate().context("Invalid configuration")?;
        Ok(LoadedConfig { config, path })
    }

    /// Defaults, then environment, then `overrides`
    ///
    /// Used when the file layer could not be loaded.
    pub fn fallback(&self, overrides: &ConfigOverrides) -> KernelConfig {
        self.fallback_with(overrides, env_lookup)
    }

    /// [`fallback`](Self::fallback) reading the environment through `lookup`
    ///
    /// A malformed environment layer is skipped as a whole.
    pub fn fallback_with(
        &self,
        overrides: &ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> KernelConfig {
        let mut config = KernelConfig::default();
        if self.apply_layers(&mut config, overrides, lookup).is_err() {
            overrides.apply(&mut config);
        }
        config
    }

    fn apply_layers(
        &self,
        config: &mut KernelConfig,
        overrides: &ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if self.read_env {
            ConfigOverrides::from_lookup(lookup)?.apply(config);
        }
        overrides.apply(config);
        Ok(())
    }
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Partial configuration layered over a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub width: Option<usize>,
    pub markdown: Option<bool>,
    pub verbose: Option<bool>,
}

impl ConfigOverrides {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Read `OLLAMA_KERNEL_*` keys through `lookup`
    ///
    /// `OLLAMA_KERNEL_HOST` accepts `host[:port]`; an explicit
    /// `OLLAMA_KERNEL_PORT` wins over the port part.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut overrides = Self::default();

        if let Some(spec) = get("OLLAMA_KERNEL_HOST") {
            let (host, port) = parse_host_spec(&spec);
            overrides.host = Some(host);
            if let Some(port) = port {
                overrides.port = Some(parse_port(&port)?);
            }
        }
        if let Some(port) = get("OLLAMA_KERNEL_PORT") {
            overrides.port = Some(parse_port(&port)?);
        }
        overrides.model = get("OLLAMA_KERNEL_MODEL").map(|model| model.trim().to_string());
        if let Some(width) = get("OLLAMA_KERNEL_WIDTH") {
            overrides.width = Some(parse_width(&width)?);
        }
        if let Some(markdown) = get("OLLAMA_KERNEL_MARKDOWN") {
            overrides.markdown = Some(parse_bool(&markdown)?);
        }
        Ok(overrides)
    }

    pub fn apply(&self, config: &mut KernelConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(markdown) = self.markdown {
            config.markdown = markdown;
        }
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }
    }
}
