//! Live progress line for model downloads

use std::time::{Duration, Instant};

use ollama_kernel_api::PullStatus;

use super::format::{clock, human_size};

/// Where timing of the current layer started
#[derive(Debug, Clone)]
struct LayerBaseline {
    digest: Option<String>,
    started: Instant,
    completed: u64,
}

impl LayerBaseline {
    /// Remaining bytes over the rate observed since the baseline
    fn eta(&self, completed: u64, total: u64, now: Instant) -> Option<Duration> {
        if completed >= total {
            return Some(Duration::ZERO);
        }
        let transferred = completed.saturating_sub(self.completed);
        let elapsed = now.saturating_duration_since(self.started);
        if transferred == 0 || elapsed.is_zero() {
            return None;
        }
        let rate = transferred as f64 / elapsed.as_secs_f64();
        Some(Duration::from_secs_f64((total - completed) as f64 / rate))
    }
}

/// Turns pull records into terminal output
///
/// Byte-counting records redraw one line per layer; an update is only
/// written once the percentage advanced by at least 0.1. Status-only
/// records are printed on lines of their own.
#[derive(Debug, Default)]
pub struct PullProgress {
    layer: Option<LayerBaseline>,
    last_permille: Option<u64>,
    line_open: bool,
    line_len: usize,
}

impl PullProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to write for `record` received at `now`, if any
    pub fn observe(&mut self, record: &PullStatus, now: Instant) -> Option<String> {
        let mut out = String::new();

        let Some((completed, total)) = record.byte_counts() else {
            if let Some(newline) = self.finish() {
                out.push_str(&newline);
            }
            if !record.status.is_empty() {
                out.push_str(&record.status);
                out.push('\n');
            }
            return (!out.is_empty()).then_some(out);
        };
        let completed = completed.min(total);

        let same_layer = matches!(&self.layer, Some(layer) if layer.digest == record.digest);
        if !same_layer {
            if let Some(newline) = self.finish() {
                out.push_str(&newline);
            }
            self.layer = Some(LayerBaseline {
                digest: record.digest.clone(),
                started: now,
                completed,
            });
            self.last_permille = None;
        }

        let permille = (completed as u128 * 1000 / total as u128) as u64;
        if self.last_permille.is_some_and(|last| permille <= last) {
            return (!out.is_empty()).then_some(out);
        }
        self.last_permille = Some(permille);

        let eta = self
            .layer
            .as_ref()
            .and_then(|layer| layer.eta(completed, total, now))
            .map(clock)
            .unwrap_or_else(|| "--:--".to_string());
        let line = format!(
            "{}: {:>5.1}% ({} / {}) ETA {}",
            record.status,
            permille as f64 / 10.0,
            human_size(completed),
            human_size(total),
            eta,
        );
        let padding = self.line_len.saturating_sub(line.chars().count());
        self.line_len = line.chars().count();
        self.line_open = true;

        out.push('\r');
        out.push_str(&line);
        out.push_str(&" ".repeat(padding));
        Some(out)
    }

    /// Newline ending an open progress line
    pub fn finish(&mut self) -> Option<String> {
        if self.line_open {
            self.line_open = false;
            self.line_len = 0;
            Some("\n".to_string())
        } else {
            None
        }
    }
}
