use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use thiserror::Error;

pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const TOKEN_ENV_VAR: &str = "CLOCKIFY_TOKEN";

/// API token used to authenticate every request.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("Missing API token (set {TOKEN_ENV_VAR} or `token` in the config file)")]
    MissingToken,
    #[error("API token contains characters that are not allowed in a header")]
    InvalidToken,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CredentialsError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(CredentialsError::MissingToken);
        }

        Ok(Self { api_key })
    }

    /// Reads the token from the environment, honouring a `.env` file.
    pub fn from_env() -> Result<Self, CredentialsError> {
        let api_key = dotenvy::var(TOKEN_ENV_VAR).map_err(|_| CredentialsError::MissingToken)?;
        Self::new(api_key)
    }

    pub fn headers(&self) -> Result<HeaderMap, CredentialsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key).map_err(|_| CredentialsError::InvalidToken)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("clockify-cli/", env!("CARGO_PKG_VERSION"))),
        );
        Ok(headers)
    }
}
