// Upstream API error taxonomy
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout and similar.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The envelope carried `success: false`.
    #[error("backend rejected the request: {message}")]
    Rejected { message: String },

    /// Body parsed but matched none of the accepted shapes, or did not parse.
    #[error("unexpected response shape: {message}")]
    UnexpectedShape { message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },
}

impl ApiError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Status { status, .. } => *status == 404,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Worth retrying from the view's "Retry" action.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
