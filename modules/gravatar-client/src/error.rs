use thiserror::Error;

pub type Result<T> = std::result::Result<T, GravatarError>;

/// Failures talking to Gravatar. `NotFound` is not an error here; lookups
/// report it as an outcome.
#[derive(Debug, Error)]
pub enum GravatarError {
    /// Connection refused, reset, DNS failure, or a body that could not be read.
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the client-wide timeout.
    #[error("Gravatar request timed out: {0}")]
    Timeout(String),

    /// Any status other than 200 or 404.
    #[error("Gravatar returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed profile body: {0}")]
    Parse(String),

    #[error("Could not build HTTP client: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for GravatarError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GravatarError::Timeout(err.to_string())
        } else {
            GravatarError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GravatarError {
    fn from(err: serde_json::Error) -> Self {
        GravatarError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_becomes_parse_error() {
        let err: GravatarError = serde_json::from_str::<serde_json::Value>("{\"entry\":[")
            .unwrap_err()
            .into();
        assert!(matches!(err, GravatarError::Parse(_)), "{err}");
    }

    #[test]
    fn api_error_message_carries_status() {
        let err = GravatarError::Api {
            status: 503,
            message: "busy".into(),
        };
        assert_eq!(err.to_string(), "Gravatar returned status 503: busy");
    }
}
