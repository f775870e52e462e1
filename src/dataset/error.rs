use std::time::Duration;

/// Why a single feature was dropped
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("feature is not a JSON object")]
    NotAnObject,

    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("geometry has no type")]
    MissingGeometryType,

    #[error("unsupported geometry type {0}")]
    UnsupportedGeometry(String),

    #[error("malformed coordinates: {0}")]
    BadCoordinates(&'static str),

    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    OutOfRange { lat: f64, lon: f64 },

    #[error("missing required property {0}")]
    MissingProperty(&'static str),
}

/// Why a whole dataset load attempt failed
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("read timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("gzip decode failed: {0}")]
    Gzip(std::io::Error),

    #[error("unexpected payload: {0}")]
    Format(String),

    #[error("parser task failed: {0}")]
    Task(String),
}

impl DatasetError {
    /// Whether another attempt may succeed. Client-error statuses are
    /// permanent except 408 and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            DatasetError::Io(_) | DatasetError::Http(_) | DatasetError::Timeout(_) => true,
            DatasetError::Status(status) => {
                !status.is_client_error()
                    || *status == reqwest::StatusCode::REQUEST_TIMEOUT
                    || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_status_transience() {
        assert!(!DatasetError::Status(StatusCode::NOT_FOUND).is_transient());
        assert!(!DatasetError::Status(StatusCode::FORBIDDEN).is_transient());
        assert!(DatasetError::Status(StatusCode::TOO_MANY_REQUESTS).is_transient());
        assert!(DatasetError::Status(StatusCode::BAD_GATEWAY).is_transient());
    }

    #[test]
    fn test_decode_errors_are_permanent() {
        assert!(!DatasetError::Format("no features".into()).is_transient());
        assert!(DatasetError::Timeout(Duration::from_secs(1)).is_transient());
    }
}
