use serde::{Deserialize, Serialize};
use thiserror::Error;

use ollama_kernel_api::{base_url, validate_base_url, DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT};

pub mod loader;

pub use loader::{
    candidate_dirs, find_config_file, load_config_file, ConfigOverrides, ConfigSource,
    CONFIG_FILE_ENV, DEFAULT_CONFIG_FILE,
};

/// Default wrapping width in columns
pub const DEFAULT_WIDTH: usize = 70;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub width: usize,
    pub markdown: bool,
    pub verbose: bool,
    pub transcript: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            width: DEFAULT_WIDTH,
            markdown: false,
            verbose: false,
            transcript: false,
        }
    }
}

impl KernelConfig {
    /// Base URL of the model service, validated
    pub fn base_url(&self) -> Result<String, ConfigError> {
        let url = base_url(&self.host, self.port);
        match validate_base_url(&url) {
            Some(_) => Ok(url),
            None => Err(ConfigError::InvalidHost(self.host.clone())),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::InvalidWidth("0".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort("0".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingArgument("model"));
        }
        self.base_url().map(|_| ())
    }
}

/// Invalid configuration values and command arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("width must be a positive integer, got {0:?}")]
    InvalidWidth(String),

    #[error("port must be an integer between 1 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("{0:?} is not a valid host name")]
    InvalidHost(String),

    #[error("expected true/false, yes/no, on/off, 1/0 or toggle, got {0:?}")]
    InvalidBool(String),

    #[error("%%{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("unknown command %%{0}, try %%help")]
    UnknownCommand(String),
}

/// Parse a wrapping width: a positive integer
pub fn parse_width(text: &str) -> Result<usize, ConfigError> {
    match text.trim().parse::<usize>() {
        Ok(width) if width > 0 => Ok(width),
        _ => Err(ConfigError::InvalidWidth(text.trim().to_string())),
    }
}

/// Parse a TCP port, rejecting 0
pub fn parse_port(text: &str) -> Result<u16, ConfigError> {
    match text.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(text.trim().to_string())),
    }
}

/// Parse boolean-ish text
pub fn parse_bool(text: &str) -> Result<bool, ConfigError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool(text.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KernelConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 11434);
        assert_eq!(config.model, "llama2");
        assert_eq!(config.width, 70);
        assert!(!config.markdown);
        assert_eq!(config.base_url().unwrap(), "http://localhost:11434");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: KernelConfig = toml::from_str("model = \"llama3\"\nwidth = 100\n").unwrap();
        assert_eq!(config.model, "llama3");
        assert_eq!(config.width, 100);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 11434);
    }

    #[test]
    fn test_parse_width() {
        assert_eq!(parse_width("40"), Ok(40));
        assert_eq!(parse_width(" 80 "), Ok(80));
        assert_eq!(parse_width("abc"), Err(ConfigError::InvalidWidth("abc".into())));
        assert_eq!(parse_width("0"), Err(ConfigError::InvalidWidth("0".into())));
        assert!(parse_width("-5").is_err());
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080"), Ok(8080));
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
        assert!(parse_port("http").is_err());
    }

    #[test]
    fn test_parse_bool() {
        for yes in ["true", "YES", "on", "1"] {
            assert_eq!(parse_bool(yes), Ok(true));
        }
        for no in ["false", "No", "off", "0"] {
            assert_eq!(parse_bool(no), Ok(false));
        }
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = KernelConfig::default();
        config.width = 0;
        assert!(config.validate().is_err());

        let mut config = KernelConfig::default();
        config.host = "bad host/".to_string();
        assert_eq!(config.validate(), Err(ConfigError::InvalidHost("bad host/".into())));

        let mut config = KernelConfig::default();
        config.host = "gpu-box.local".to_string();
        assert!(config.validate().is_ok());
    }
}
