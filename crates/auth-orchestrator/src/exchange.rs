//! Identity service exchange: host identity token in, application session out.

use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use gig_auth_config::{Config, UserRole};
use platform_capability_adapter::{CurrentUser, HostProfile};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    pub identity_assertion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<HostProfile>,
    #[serde(rename = "role")]
    pub requested_role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeResponse {
    pub session_token: String,
    pub user: CurrentUser,
}

/// Error payload the identity service returns on non-2xx.
#[derive(Debug, Clone, Deserialize)]
struct ExchangeErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// The backend exchange endpoint.
#[async_trait]
pub trait IdentityExchange: Send + Sync {
    async fn exchange(&self, request: &ExchangeRequest) -> AuthResult<ExchangeResponse>;
}

/// HTTP client for the identity service with an explicit request timeout.
pub struct IdentityServiceClient {
    http_client: Client,
    exchange_url: Url,
    timeout: Duration,
}

impl IdentityServiceClient {
    pub fn new(http_client: Client, exchange_url: Url, timeout: Duration) -> Self {
        Self {
            http_client,
            exchange_url,
            timeout,
        }
    }

    pub fn from_config(http_client: Client, config: &Config) -> AuthResult<Self> {
        let exchange_url = config
            .exchange_url()
            .map_err(|e| AuthError::Config(e.to_string()))?;
        Ok(Self::new(http_client, exchange_url, config.exchange_timeout()))
    }

    pub fn exchange_url(&self) -> &Url {
        &self.exchange_url
    }
}

#[async_trait]
impl IdentityExchange for IdentityServiceClient {
    async fn exchange(&self, request: &ExchangeRequest) -> AuthResult<ExchangeResponse> {
        debug!(url = %self.exchange_url, role = request.requested_role.as_str(), "Exchanging identity token");

        let response = self
            .http_client
            .post(self.exchange_url.clone())
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let (message, code) = match serde_json::from_str::<ExchangeErrorBody>(&body) {
                Ok(parsed) => (parsed.message, parsed.code),
                Err(_) if body.is_empty() => (format!("HTTP {}", status), None),
                Err(_) => (body, None),
            };
            warn!(status = %status, code = ?code, error = %message, "Identity exchange rejected");
            return Err(AuthError::AuthExchange {
                status: Some(status.as_u16()),
                code,
                message,
            });
        }

        let data: ExchangeResponse = response.json().await.map_err(transport_error)?;
        info!(user_id = %data.user.id, "Identity exchange succeeded");
        Ok(data)
    }
}

fn transport_error(e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::Timeout
    } else if e.is_connect() {
        AuthError::NetworkUnavailable
    } else {
        AuthError::Http(e)
    }
}
