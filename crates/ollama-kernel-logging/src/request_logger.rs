use colored::Colorize;
use serde::Serialize;

use crate::safe_truncate;

const MAX_BODY_CHARS: usize = 5000;
const MAX_CHUNK_CHARS: usize = 200;

// Everything here goes to stderr: stdout belongs to the rendered response.

/// Log HTTP request details for debugging
pub fn log_request<T: Serialize + ?Sized>(method: &str, url: &str, body: Option<&T>, verbose: bool) {
    if !verbose {
        return;
    }

    eprintln!("\n{}", "═".repeat(80).bright_cyan());
    eprintln!("{}", "🔍 HTTP REQUEST DEBUG".bright_cyan().bold());
    eprintln!("{}", "═".repeat(80).bright_cyan());

    eprintln!("{}: {} {}", "Request".bright_yellow(), method, url);
    if let Ok(parsed_url) = reqwest::Url::parse(url) {
        eprintln!("{}: {}", "Host".bright_yellow(), parsed_url.host_str().unwrap_or("unknown"));
        eprintln!(
            "{}: {}",
            "Port".bright_yellow(),
            parsed_url
                .port_or_known_default()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );
    }

    if let Some(body) = body {
        eprintln!("\n{}", "Request Body:".bright_yellow());
        match serde_json::to_string_pretty(body) {
            Ok(json) => print_truncated(&json),
            Err(e) => eprintln!("{}", format!("Error serializing request: {}", e).red()),
        }
    }

    eprintln!("{}", "═".repeat(80).bright_cyan());
}

/// Log a failed HTTP response
pub fn log_response(status: &reqwest::StatusCode, body: &str, verbose: bool) {
    if !verbose {
        return;
    }

    eprintln!("\n{}", "═".repeat(80).bright_green());
    eprintln!("{}", "📥 HTTP RESPONSE DEBUG".bright_green().bold());
    eprintln!("{}", "═".repeat(80).bright_green());
    eprintln!(
        "{}: {} {}",
        "Status".bright_yellow(),
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );

    eprintln!("\n{}", "Response Body:".bright_yellow());
    match serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
    {
        Some(pretty) => print_truncated(&pretty),
        None => print_truncated(body),
    }

    eprintln!("{}", "═".repeat(80).bright_green());
}

/// Log one streamed NDJSON record
pub fn log_stream_chunk(chunk_num: usize, data: &str, verbose: bool) {
    if !verbose {
        return;
    }

    eprintln!(
        "{}",
        format!(
            "📦 Stream Chunk #{}: {}",
            chunk_num,
            if data.chars().count() > MAX_CHUNK_CHARS {
                format!("{}... ({} bytes)", safe_truncate(data, MAX_CHUNK_CHARS), data.len())
            } else {
                data.to_string()
            }
        )
        .bright_black()
    );
}

fn print_truncated(text: &str) {
    if text.chars().count() > MAX_BODY_CHARS {
        eprintln!("{}", safe_truncate(text, MAX_BODY_CHARS));
        eprintln!(
            "\n{}",
            format!("... (truncated, total {} bytes)", text.len()).bright_black()
        );
    } else {
        eprintln!("{}", text);
    }
}
