use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized - API key may be invalid")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Query limit reached - please wait before retrying")]
    QueryLimit,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Places API rejected the request ({status}): {message}")]
    PlacesStatus { status: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::QueryLimit,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Build an error from the status field a places response body carries.
    pub fn from_places_status(status: &str, message: Option<String>) -> Self {
        match status {
            "OVER_QUERY_LIMIT" => ApiError::QueryLimit,
            "REQUEST_DENIED" => ApiError::AccessDenied(message.unwrap_or_default()),
            other => ApiError::PlacesStatus {
                status: other.to_string(),
                message: message.unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::QueryLimit
        ));
        assert!(matches!(
            ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, "upstream down"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_from_places_status() {
        assert!(matches!(
            ApiError::from_places_status("OVER_QUERY_LIMIT", None),
            ApiError::QueryLimit
        ));
        assert!(matches!(
            ApiError::from_places_status("REQUEST_DENIED", Some("bad key".to_string())),
            ApiError::AccessDenied(_)
        ));
        match ApiError::from_places_status("INVALID_REQUEST", Some("missing location".to_string()))
        {
            ApiError::PlacesStatus { status, message } => {
                assert_eq!(status, "INVALID_REQUEST");
                assert_eq!(message, "missing location");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
