// Client configuration: where the API lives and which bearer token to use.

use std::fmt;

use crate::error::{ApiError, Result};

/// Origin of the public API. Overridable with `DB_API_BASE`.
pub const DEFAULT_API_BASE: &str = "https://api.digitalblasphemy.com";

pub const API_KEY_VAR: &str = "DB_API_KEY";
pub const API_BASE_VAR: &str = "DB_API_BASE";

#[derive(Clone)]
pub struct Config {
    /// Scheme + host (+ port) of the API, without a trailing slash.
    pub api_base: String,
    pub token: String,
}

impl Config {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Config {
            api_base,
            token: token.into(),
        }
    }

    /// Read the token from `DB_API_KEY` and the API origin from
    /// `DB_API_BASE`, falling back to [`DEFAULT_API_BASE`].
    ///
    /// A missing or blank token is fatal and is reported before any client
    /// is built.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(API_KEY_VAR).map_err(|_| ApiError::MissingCredential)?;
        if token.trim().is_empty() {
            return Err(ApiError::MissingCredential);
        }
        let api_base = std::env::var(API_BASE_VAR).unwrap_or_else(|_| DEFAULT_API_BASE.into());
        Ok(Config::new(api_base, token.trim()))
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}
