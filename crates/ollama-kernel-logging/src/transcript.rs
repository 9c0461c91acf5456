use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Serialize)]
struct TranscriptEntry<'a> {
    timestamp: String, // ISO‑8601 UTC
    model: &'a str,
    prompt: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Appends one JSON line per prompt/response exchange
pub struct TranscriptLogger {
    file_path: PathBuf,
    file: Option<tokio::fs::File>,
}

impl TranscriptLogger {
    /// Create a new logger in `logs_dir`; the file name is derived from the current UTC time.
    pub async fn new(logs_dir: &Path) -> Result<Self> {
        fs::create_dir_all(logs_dir).await?;

        let now: DateTime<Utc> = Utc::now();
        let filename = format!("transcript-{}.jsonl", now.format("%Y-%m-%d-%H%M%S"));
        let file_path = logs_dir.join(filename);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;
        Ok(Self {
            file_path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Append a single exchange. Write failures are reported, never raised.
    pub async fn log_exchange(&mut self, model: &str, prompt: &str, response: &str, error: Option<&str>) {
        let entry = TranscriptEntry {
            timestamp: Utc::now().to_rfc3339(),
            model,
            prompt,
            response,
            error,
        };
        if let Some(file) = &mut self.file {
            if let Ok(mut json) = serde_json::to_string(&entry) {
                json.push('\n');
                if let Err(e) = file.write_all(json.as_bytes()).await {
                    eprintln!("[Logging error] {}", e);
                } else if let Err(e) = file.flush().await {
                    eprintln!("[Logging error] {}", e);
                }
            }
        }
    }

    /// Flush and close the file
    pub async fn shutdown(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.sync_all().await;
        }
    }
}
