use clap::Parser;

use ollama_kernel_api::parse_host_spec;

use crate::config::{parse_port, ConfigError, ConfigOverrides, ConfigSource};

/// CLI arguments for the terminal host
#[derive(Parser, Debug)]
#[command(name = "ollama-kernel")]
#[command(about = "Notebook-style prompt session against a local Ollama server")]
#[command(version)]
pub struct Cli {
    /// Config file name searched in /etc/jupyter, ~/.jupyter and the current directory
    /// (an absolute path is used as is)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Model server host, optionally with a port (HOST[:PORT])
    #[arg(long, value_name = "HOST", value_parser = parse_host_arg)]
    pub host: Option<String>,

    /// Model server port
    #[arg(long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Model used for prompts
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Wrapping width in columns
    #[arg(long, value_name = "COLUMNS", value_parser = clap::value_parser!(u64).range(1..))]
    pub width: Option<u64>,

    /// Render responses as markdown blocks
    #[arg(long)]
    pub markdown: bool,

    /// Log requests and streamed records to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config_source(&self) -> ConfigSource {
        let source = ConfigSource::standard();
        match &self.config {
            Some(file_name) => source.with_file_name(file_name.clone()),
            None => source,
        }
    }

    /// Settings given on the command line, applied over file and environment
    pub fn overrides(&self) -> ConfigOverrides {
        let (host, port_from_host) = match &self.host {
            Some(spec) => {
                let (host, port) = parse_host_spec(spec);
                (Some(host), port.and_then(|p| parse_port(&p).ok()))
            }
            None => (None, None),
        };

        ConfigOverrides {
            host,
            port: self.port.or(port_from_host),
            model: self.model.clone(),
            width: self.width.map(|w| w as usize),
            markdown: self.markdown.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }
}

/// `--host` value: the port part, when present, must be a valid port
fn parse_host_arg(spec: &str) -> Result<String, ConfigError> {
    if let (_, Some(port)) = parse_host_spec(spec) {
        parse_port(&port)?;
    }
    Ok(spec.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_overrides() {
        let cli = Cli::parse_from(["ollama-kernel", "--host", "gpu-box:11500", "--model", "llama3", "--width", "90", "--markdown"]);
        let overrides = cli.overrides();

        assert_eq!(overrides.host.as_deref(), Some("gpu-box"));
        assert_eq!(overrides.port, Some(11500));
        assert_eq!(overrides.model.as_deref(), Some("llama3"));
        assert_eq!(overrides.width, Some(90));
        assert_eq!(overrides.markdown, Some(true));
        assert_eq!(overrides.verbose, None);
    }

    #[test]
    fn test_explicit_port_wins() {
        let cli = Cli::parse_from(["ollama-kernel", "--host", "gpu-box:11500", "--port", "9000"]);
        assert_eq!(cli.overrides().port, Some(9000));
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(Cli::try_parse_from(["ollama-kernel", "--width", "0"]).is_err());
    }

    #[test]
    fn test_no_flags_no_overrides() {
        let cli = Cli::parse_from(["ollama-kernel"]);
        assert_eq!(cli.overrides(), ConfigOverrides::default());
    }

    #[test]
    fn test_bad_port_in_host_rejected() {
        assert!(Cli::try_parse_from(["ollama-kernel", "--host", "gpu:abc"]).is_err());
        assert!(Cli::try_parse_from(["ollama-kernel", "--host", "gpu:0"]).is_err());
        assert!(Cli::try_parse_from(["ollama-kernel", "--host", "gpu:"]).is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        assert!(Cli::try_parse_from(["ollama-kernel", "--port", "0"]).is_err());
        assert!(Cli::try_parse_from(["ollama-kernel", "--port", "70000"]).is_err());
    }
}
