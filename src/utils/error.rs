use thiserror::Error;

use crate::domain::model::Bitrate;

#[derive(Error, Debug)]
pub enum SxmError {
    #[error("Request to {url} failed: {source}")]
    RequestError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Authentication failed for {handle}: {message}")]
    AuthenticationError { handle: String, message: String },

    #[error("Unexpected API response: {context}")]
    ApiContractError { context: String },

    #[error("No {bitrate} variant in the stream manifest")]
    MissingBitrateError { bitrate: Bitrate },

    #[error("Key decode error: {0}")]
    KeyDecodeError(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, SxmError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Contract,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SxmError {
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        SxmError::RequestError {
            url: url.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SxmError::RequestError { .. } => ErrorCategory::Network,
            SxmError::AuthenticationError { .. } => ErrorCategory::Authentication,
            SxmError::ApiContractError { .. }
            | SxmError::MissingBitrateError { .. }
            | SxmError::KeyDecodeError(_)
            | SxmError::SerializationError(_) => ErrorCategory::Contract,
            SxmError::InvalidConfigValueError { .. } | SxmError::MissingConfigError { .. } => {
                ErrorCategory::Configuration
            }
            SxmError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SxmError::RequestError { .. } | SxmError::MissingBitrateError { .. } => {
                ErrorSeverity::Medium
            }
            SxmError::AuthenticationError { .. }
            | SxmError::ApiContractError { .. }
            | SxmError::KeyDecodeError(_)
            | SxmError::SerializationError(_)
            | SxmError::IoError(_) => ErrorSeverity::High,
            SxmError::InvalidConfigValueError { .. } | SxmError::MissingConfigError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SxmError::RequestError { .. } => {
                "Check network connectivity and retry; SiriusXM may be temporarily unavailable"
                    .to_string()
            }
            SxmError::AuthenticationError { .. } => {
                "Verify SXM_USERNAME and SXM_PASSWORD, and that the subscription is active"
                    .to_string()
            }
            SxmError::ApiContractError { .. } => {
                "The SiriusXM API may have changed; retry, or update this client".to_string()
            }
            SxmError::MissingBitrateError { .. } => {
                "Request one of the bitrates listed in the stream manifest".to_string()
            }
            SxmError::KeyDecodeError(_) | SxmError::SerializationError(_) => {
                "The response payload was malformed; retry, or update this client".to_string()
            }
            SxmError::IoError(_) => "Check file paths and permissions".to_string(),
            SxmError::InvalidConfigValueError { field, .. }
            | SxmError::MissingConfigError { field } => {
                format!("Fix the '{}' setting and restart", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SxmError::RequestError { url, .. } => format!("Could not reach SiriusXM ({})", url),
            SxmError::AuthenticationError { handle, .. } => {
                format!("SiriusXM rejected the login for '{}'", handle)
            }
            SxmError::ApiContractError { .. }
            | SxmError::KeyDecodeError(_)
            | SxmError::SerializationError(_) => {
                "SiriusXM returned a response this client does not understand".to_string()
            }
            SxmError::MissingBitrateError { bitrate } => {
                format!("The stream does not offer a {} rendition", bitrate)
            }
            SxmError::IoError(e) => format!("File operation failed: {}", e),
            SxmError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem in '{}': {}", field, reason)
            }
            SxmError::MissingConfigError { field } => {
                format!("Configuration value '{}' is not set", field)
            }
        }
    }
}
