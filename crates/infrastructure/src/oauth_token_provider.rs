//! OAuth2 client-credentials token acquisition for the PAM tenant.

use chrono::{DateTime, Duration, Utc};
use pamsync_core::{AppError, AppResult};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, error};
use url::Url;

use crate::pam_client_config::{PamClientConfig, TokenCacheMode};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Out-of-range lifetimes fall back to `now`, so such tokens are never reused.
fn expiry_after(now: DateTime<Utc>, expires_in: Option<i64>) -> DateTime<Utc> {
    expires_in
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(now)
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// Acquires bearer tokens with the client-credentials grant.
pub struct OAuthTokenProvider {
    http_client: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    scope: String,
    cache_mode: TokenCacheMode,
    cached_token: RwLock<Option<CachedToken>>,
    grace_period: Duration,
}

impl OAuthTokenProvider {
    /// Creates a token provider for the configured tenant.
    pub fn new(http_client: reqwest::Client, config: &PamClientConfig) -> AppResult<Self> {
        let mut token_url = config.tenant_url.clone();
        token_url
            .path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "tenant URL '{}' cannot carry a path",
                    config.tenant_url
                ))
            })?
            .pop_if_empty()
            .extend(["oauth2", "token", config.oauth_app_id.as_str()]);

        Ok(Self {
            http_client,
            token_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.oauth_scope.clone(),
            cache_mode: config.token_cache,
            cached_token: RwLock::new(None),
            grace_period: Duration::minutes(1),
        })
    }

    /// Returns a bearer token, requesting a new one unless a cached token is still valid.
    pub async fn access_token(&self) -> AppResult<String> {
        if self.cache_mode == TokenCacheMode::PerRequest {
            return Ok(self.request_token().await?.access_token);
        }

        {
            let cache = self.cached_token.read().await;
            if let Some(token) = cache.as_ref()
                && !token.is_expired(self.grace_period)
            {
                debug!("using cached access token");
                return Ok(token.access_token.clone());
            }
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *self.cached_token.write().await = Some(token);

        Ok(access_token)
    }

    async fn request_token(&self) -> AppResult<CachedToken> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|error| {
                error!(error = %error, "access token request failed");
                AppError::Authentication(format!("token request failed: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            error!(status = status.as_u16(), body = %body, "access token request rejected");
            return Err(AppError::Authentication(format!(
                "token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|error| {
            AppError::Authentication(format!("failed to decode token response: {error}"))
        })?;

        let access_token = token_response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                error!("token response did not contain an access token");
                AppError::Authentication(
                    "unable to retrieve access token, please see logs for more details".to_owned(),
                )
            })?;

        let expires_at = expiry_after(Utc::now(), token_response.expires_in);
        debug!(expires_at = %expires_at, "acquired access token");

        Ok(CachedToken {
            access_token,
            expires_at,
        })
    }
}
