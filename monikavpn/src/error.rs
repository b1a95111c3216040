use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
    },

    #[error("Recommendation error: {0}")]
    Recommendation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown server: {0}")]
    UnknownServer(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::Network(_) => "Check your internet connection.".to_string(),
            AppError::Api { status, .. } => match *status {
                StatusCode::TOO_MANY_REQUESTS => {
                    "Too many requests. Please try again later.".to_string()
                }
                StatusCode::SERVICE_UNAVAILABLE => "Service is currently unavailable.".to_string(),
                _ => format!("Service error ({})", status),
            },
            AppError::UnknownServer(id) => format!("No server with id {} in the catalog.", id),
            AppError::Handshake(msg) => format!("VPN Connection Error: {}", msg),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let err = AppError::Api {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "quota".to_string(),
        };
        assert_eq!(
            err.user_friendly_message(),
            "Too many requests. Please try again later."
        );

        let err = AppError::UnknownServer("42".to_string());
        assert!(err.user_friendly_message().contains("42"));

        let err: AppError = config::ConfigError::Message("bad window".to_string()).into();
        assert!(matches!(err, AppError::Config(msg) if msg == "bad window"));
    }
}
