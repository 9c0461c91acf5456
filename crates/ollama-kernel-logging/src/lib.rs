// Logging module - request tracing and transcript logging
pub mod request_logger;
pub mod transcript;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub use request_logger::{log_request, log_response, log_stream_chunk};
pub use transcript::TranscriptLogger;

/// Safely truncate a string to a maximum number of characters
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        // Reserve space for "..." suffix
        let trunc_chars = max_chars.saturating_sub(3);
        format!("{}...", s.chars().take(trunc_chars).collect::<String>())
    }
}

/// Get or create the kernel state directory (~/.ollama-kernel)
pub fn get_state_dir() -> Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .context("Failed to get home directory")?;

    let state_dir = PathBuf::from(home_dir).join(".ollama-kernel");

    if !state_dir.exists() {
        std::fs::create_dir_all(&state_dir)
            .context("Failed to create ollama-kernel directory")?;
    }

    Ok(state_dir)
}

/// Get or create the logs directory (~/.ollama-kernel/logs)
pub fn get_logs_dir() -> Result<PathBuf> {
    let logs_dir = get_state_dir()?.join("logs");

    if !logs_dir.exists() {
        std::fs::create_dir_all(&logs_dir)
            .context("Failed to create logs directory")?;
    }

    Ok(logs_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate_short_string_untouched() {
        assert_eq!(safe_truncate("hello", 10), "hello");
    }

    #[test]
    fn test_safe_truncate_counts_chars_not_bytes() {
        assert_eq!(safe_truncate("äöüäöüäöü", 6), "äöü...");
        assert_eq!(safe_truncate("abcdef", 2), "...");
    }
}
