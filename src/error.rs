// Error types shared by the library modules.
//
// Every operation returns `Result<T, ApiError>`; a failed step is a value the
// caller inspects, never a panic. Payload validation failures carry the
// name of the field that broke the contract.

use thiserror::Error;

/// Errors raised while talking to the API or the asset host.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API key not found. Please set the environment variable DB_API_KEY")]
    MissingCredential,
    #[error("API key contains characters that cannot be sent in a header")]
    InvalidToken,
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("response body was empty")]
    EmptyBody,
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid download url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("asset host answered with status {status}")]
    AssetStatus { status: u16 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A JSON payload did not have the shape an operation depends on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing `{field}` in {context}")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },
    #[error("`{field}` in {context} is not a {expected}")]
    WrongType {
        context: &'static str,
        field: &'static str,
        expected: &'static str,
    },
    #[error("invalid {context}: {message}")]
    Invalid {
        context: &'static str,
        message: String,
    },
}

impl SchemaError {
    /// Name of the field whose absence or type broke the payload, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SchemaError::MissingField { field, .. } | SchemaError::WrongType { field, .. } => {
                Some(field)
            }
            SchemaError::Invalid { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
