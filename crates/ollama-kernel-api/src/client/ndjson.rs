//! Newline-delimited JSON decoding for streamed responses

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

use ollama_kernel_logging::log_stream_chunk;

use crate::error::ServiceError;

/// Splits a byte stream into complete, non-blank lines
///
/// Bytes are buffered until a newline arrives so a multi-byte character split
/// across network chunks is decoded intact.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes, returning every line they complete
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        lines
    }

    /// Whatever is left once the stream closed without a trailing newline
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let text = String::from_utf8_lossy(&rest);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Decode one record, turning an `error` field into a service error
pub fn decode_record<T: DeserializeOwned>(line: &str) -> Result<T, ServiceError> {
    let value: serde_json::Value =
        serde_json::from_str(line).map_err(|e| ServiceError::malformed(e, line))?;

    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ServiceError::Service(message));
    }

    serde_json::from_value(value).map_err(|e| ServiceError::malformed(e, line))
}

/// Decode a streamed HTTP body into typed records
pub fn records<T>(
    response: reqwest::Response,
    verbose: bool,
) -> impl Stream<Item = Result<T, ServiceError>> + Send
where
    T: DeserializeOwned + Send + 'static,
{
    try_stream! {
        let mut bytes = response.bytes_stream();
        let mut decoder = LineDecoder::new();
        let mut chunk_counter = 0;

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk?;
            for line in decoder.push(&chunk) {
                chunk_counter += 1;
                log_stream_chunk(chunk_counter, &line, verbose);
                yield decode_record::<T>(&line)?;
            }
        }

        if let Some(line) = decoder.finish() {
            chunk_counter += 1;
            log_stream_chunk(chunk_counter, &line, verbose);
            yield decode_record::<T>(&line)?;
        }
    }
}
