/// Default host of a local Ollama server
pub const DEFAULT_HOST: &str = "localhost";

/// Default Ollama port
pub const DEFAULT_PORT: u16 = 11434;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "llama2";

/// Build the base URL the client talks to
pub fn base_url(host: &str, port: u16) -> String {
    format!("http://{}:{}", host, port)
}

/// Split a `host[:port]` specification
/// Returns (host, port text); the port is left unparsed so callers can report bad input
pub fn parse_host_spec(spec: &str) -> (String, Option<String>) {
    let spec = spec.trim();
    match spec.split_once(':') {
        Some((host, port)) => (host.trim().to_string(), Some(port.trim().to_string())),
        None => (spec.to_string(), None),
    }
}

/// Check that a base URL names a plain http(s) origin: a host, no path, query or credentials
pub fn validate_base_url(url: &str) -> Option<reqwest::Url> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let plain_origin = matches!(parsed.scheme(), "http" | "https")
        && parsed.host_str().map(|h| !h.is_empty()).unwrap_or(false)
        && parsed.path() == "/"
        && parsed.query().is_none()
        && parsed.fragment().is_none()
        && parsed.username().is_empty()
        && parsed.password().is_none();
    if plain_origin {
        Some(parsed)
    } else {
        None
    }
}
