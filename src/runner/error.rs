use thiserror::Error;

/// Why a single probe step failed
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request never produced a response (connection refused, DNS, ...)
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered with something other than 200
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// A 200 response whose body could not be parsed as JSON
    #[error("invalid JSON in response: {source}")]
    InvalidBody {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON, but not the shape the step reads from
    #[error("unexpected response shape: {message}")]
    UnexpectedShape { status: u16, message: String },
}

impl ProbeError {
    /// Status code the gateway returned, if it returned one
    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeError::Transport(_) => None,
            ProbeError::UnexpectedStatus { status, .. }
            | ProbeError::InvalidBody { status, .. }
            | ProbeError::UnexpectedShape { status, .. } => Some(*status),
        }
    }
}
