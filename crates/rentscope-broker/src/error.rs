use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed {context} response: {reason}")]
    MalformedResponse { context: String, reason: String },

    #[error("broker reported failure: {message}")]
    Upstream { message: String },

    #[error("invalid broker base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("invalid value for header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },
}

impl BrokerError {
    /// HTTP status of a failed call. `None` means the request never got a
    /// response (connect failure, timeout, TLS) or failed after a 2xx.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            BrokerError::Http(e) => e.status().map(|s| s.as_u16()),
            BrokerError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for failures at the HTTP boundary, as opposed to a 2xx response
    /// with an unusable payload.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BrokerError::Http(_) | BrokerError::UnexpectedStatus { .. } | BrokerError::EmptyBody { .. }
        )
    }
}
