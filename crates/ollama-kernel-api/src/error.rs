use ollama_kernel_logging::safe_truncate;
use thiserror::Error;

/// Failure classes surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service could not be reached or answered with a non-2xx status
    Transport,
    /// A streamed record was not the JSON the endpoint promises
    Protocol,
    /// The service reported an error inside a record
    Service,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "TransportError"),
            ErrorKind::Protocol => write!(f, "ProtocolError"),
            ErrorKind::Service => write!(f, "ServiceError"),
        }
    }
}

/// Errors raised by the model service client
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("connection to model service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model service answered HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("malformed record from model service: {message}")]
    Protocol { message: String },

    #[error("{0}")]
    Service(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Transport(_) | ServiceError::HttpStatus { .. } => ErrorKind::Transport,
            ServiceError::Protocol { .. } => ErrorKind::Protocol,
            ServiceError::Service(_) => ErrorKind::Service,
        }
    }

    pub(crate) fn malformed(err: impl std::fmt::Display, line: &str) -> Self {
        ServiceError::Protocol {
            message: format!("{} in {:?}", err, safe_truncate(line, 120)),
        }
    }

    pub(crate) fn truncated(endpoint: &str) -> Self {
        ServiceError::Protocol {
            message: format!("{} stream ended before the final record", endpoint),
        }
    }
}
