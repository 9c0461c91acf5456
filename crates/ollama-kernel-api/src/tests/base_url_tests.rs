#[cfg(test)]
mod base_url_tests {
    use crate::config::{base_url, parse_host_spec, validate_base_url, DEFAULT_PORT};

    #[test]
    fn test_parse_host_only() {
        let (host, port) = parse_host_spec("gpu-box");

        assert_eq!(host, "gpu-box");
        assert_eq!(port, None);
    }

    #[test]
    fn test_parse_host_and_port() {
        let (host, port) = parse_host_spec("gpu-box:8080");

        assert_eq!(host, "gpu-box");
        assert_eq!(port, Some("8080".to_string()));
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let (host, port) = parse_host_spec("  10.0.0.5 : 11435 ");

        assert_eq!(host, "10.0.0.5");
        assert_eq!(port, Some("11435".to_string()));
    }

    #[test]
    fn test_parse_keeps_non_numeric_port_for_caller() {
        let (host, port) = parse_host_spec("host:abc");

        assert_eq!(host, "host");
        assert_eq!(port, Some("abc".to_string()));
    }

    #[test]
    fn test_base_url_format() {
        assert_eq!(base_url("localhost", DEFAULT_PORT), "http://localhost:11434");
    }

    #[test]
    fn test_validate_accepts_plain_origins() {
        assert!(validate_base_url("http://localhost:11434").is_some());
        assert!(validate_base_url("http://192.168.1.20:8080").is_some());
        assert!(validate_base_url("http://Gpu-Box:80").is_some());
    }

    #[test]
    fn test_validate_rejects_paths_and_garbage() {
        assert!(validate_base_url("http://:11434").is_none());
        assert!(validate_base_url("http://host/api:11434").is_none());
        assert!(validate_base_url("http://user@host:11434").is_none());
        assert!(validate_base_url("http://my host:11434").is_none());
        assert!(validate_base_url("http://host?x:11434").is_none());
    }
}
