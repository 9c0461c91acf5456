//! Text formatting for command output

use chrono::{DateTime, FixedOffset, Local};
use std::time::Duration;

use ollama_kernel_api::{ModelDescriptor, ModelDetails};

use crate::config::KernelConfig;

/// Human-readable byte count in decimal units
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1000 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1000.0;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Modification stamp in local time
pub fn local_timestamp(stamp: &DateTime<FixedOffset>) -> String {
    stamp.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// `mm:ss`, or `h:mm:ss` past an hour
pub fn clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Table of installed models
pub fn model_table(models: &[ModelDescriptor]) -> String {
    if models.is_empty() {
        return "No models installed.\n".to_string();
    }

    let name_width = models
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut table = format!("{:<name_width$}  {:>9}  {}\n", "NAME", "SIZE", "MODIFIED");
    for model in models {
        table.push_str(&format!(
            "{:<name_width$}  {:>9}  {}\n",
            model.name,
            human_size(model.size),
            local_timestamp(&model.modified_at),
        ));
    }
    table
}

/// Labelled sections of `show` output
pub fn model_details(name: &str, details: &ModelDetails) -> String {
    let sections = details.sections();
    if sections.is_empty() {
        return format!("No details available for {}\n", name);
    }

    let mut text = String::new();
    for (label, body) in sections {
        text.push_str(&format!("{}:\n{}\n\n", label, body.trim_end()));
    }
    text
}

/// Current session settings, one per line
pub fn config_summary(config: &KernelConfig, base_url: &str) -> String {
    format!(
        "host:       {}\nport:       {}\nbase_url:   {}\nmodel:      {}\nwidth:      {}\nmarkdown:   {}\nverbose:    {}\ntranscript: {}\n",
        config.host,
        config.port,
        base_url,
        config.model,
        config.width,
        config.markdown,
        config.verbose,
        config.transcript,
    )
}
