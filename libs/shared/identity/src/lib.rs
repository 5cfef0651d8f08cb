use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Verified caller identity as reported by the external account service.
/// The scheduling core treats `account_id` as an opaque reference and never
/// authenticates tokens itself.
#[derive(Debug, Clone)]
pub struct RequesterContext {
    pub account_id: String,
    pub role: Option<String>,
}

impl RequesterContext {
    /// Resource administration is restricted to hospital staff roles.
    pub fn is_staff(&self) -> bool {
        matches!(self.role.as_deref(), Some("admin") | Some("manager"))
    }
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("account service unreachable: {0}")]
    Unreachable(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<RequesterContext, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
    account_id: Option<String>,
    role: Option<String>,
}

/// Calls the account service's validate endpoint with the caller's bearer
/// token passed through unchanged.
pub struct HttpIdentityVerifier {
    client: Client,
    validate_url: String,
}

impl HttpIdentityVerifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            validate_url: config.account_service_url.clone(),
        }
    }

    pub fn with_url(validate_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            validate_url: validate_url.into(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<RequesterContext, IdentityError> {
        debug!("Validating token against {}", self.validate_url);

        let response = self
            .client
            .get(&self.validate_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                error!("Account service request failed: {}", e);
                IdentityError::Unreachable(e.to_string())
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(IdentityError::InvalidToken)
            }
            status => {
                return Err(IdentityError::Unreachable(format!(
                    "unexpected status {}",
                    status
                )))
            }
        }

        let body: ValidateResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Unreachable(e.to_string()))?;

        if !body.valid {
            return Err(IdentityError::InvalidToken);
        }

        let account_id = body.account_id.ok_or(IdentityError::InvalidToken)?;
        Ok(RequesterContext {
            account_id,
            role: body.role,
        })
    }
}

/// Accepts every token with a fixed context. Collaborator double for tests
/// and local development without an account service.
pub struct StaticVerifier {
    context: RequesterContext,
}

impl StaticVerifier {
    pub fn new(account_id: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            context: RequesterContext {
                account_id: account_id.into(),
                role: role.map(str::to_string),
            },
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, _token: &str) -> Result<RequesterContext, IdentityError> {
        Ok(self.context.clone())
    }
}
