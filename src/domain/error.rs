use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A failure handed out to every caller that shared one request.
    #[error("{0}")]
    Shared(Arc<TrackError>),
}

impl TrackError {
    /// HTTP status of the failed call, looking through shared wrappers.
    pub fn status(&self) -> Option<u16> {
        match self {
            TrackError::Api { status, .. } => Some(*status),
            TrackError::Http(e) => e.status().map(|s| s.as_u16()),
            TrackError::Shared(inner) => inner.status(),
            _ => None,
        }
    }
}

impl From<Arc<TrackError>> for TrackError {
    fn from(err: Arc<TrackError>) -> Self {
        TrackError::Shared(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_through_shared() {
        let inner = Arc::new(TrackError::Api {
            status: 404,
            message: "Order not found".to_string(),
        });
        let err = TrackError::from(inner);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "API error (404): Order not found");
    }

    #[test]
    fn test_status_absent_for_local_errors() {
        let err = TrackError::InvalidInput("order id is empty".to_string());
        assert_eq!(err.status(), None);
    }
}
